use serde::{Deserialize, Serialize};

use super::Id;

/// An electable entity and its last confirmed vote count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub id: Id,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub party: Option<String>,
    #[serde(default, alias = "image", skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Missing counts mean nobody has voted yet.
    #[serde(default)]
    pub votes: u64,
    /// Some deployments nest the display name under the candidate's account.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<CandidateUser>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateUser {
    pub name: String,
}

impl Candidate {
    pub fn new(id: impl Into<Id>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            party: None,
            image_url: None,
            votes: 0,
            user: None,
        }
    }

    pub fn with_party(mut self, party: impl Into<String>) -> Self {
        self.party = Some(party.into());
        self
    }

    pub fn with_votes(mut self, votes: u64) -> Self {
        self.votes = votes;
        self
    }

    /// The account name if the server nested one, otherwise the candidate name.
    pub fn display_name(&self) -> &str {
        self.user
            .as_ref()
            .map(|user| user.name.as_str())
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.name)
    }

    pub fn party_or_na(&self) -> &str {
        self.party.as_deref().unwrap_or("N/A")
    }
}
