use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};

use super::Id;

/// Length of the random part of a placeholder voter ID.
pub const PLACEHOLDER_LENGTH: usize = 6;

/// A registered voter, as listed on the admin dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Voter {
    pub id: Id,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voter_id: Option<String>,
}

impl Voter {
    /// Fill in a display-only placeholder if the server didn't provide a voter ID.
    /// The placeholder is never sent back to the server.
    pub fn with_placeholder_id(mut self) -> Self {
        if self.voter_id.as_deref().map_or(true, str::is_empty) {
            self.voter_id = Some(placeholder_voter_id());
        }
        self
    }
}

/// `VOTER-` followed by random upper-case alphanumerics.
pub fn placeholder_voter_id() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(PLACEHOLDER_LENGTH)
        .map(|byte| char::from(byte).to_ascii_uppercase())
        .collect();
    format!("VOTER-{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_shape() {
        let id = placeholder_voter_id();
        let suffix = id.strip_prefix("VOTER-").unwrap();
        assert_eq!(suffix.len(), PLACEHOLDER_LENGTH);
        assert!(suffix
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    }

    #[test]
    fn existing_ids_kept() {
        let voter = Voter {
            id: Id::Num(3),
            name: "Joe".into(),
            email: "joe@x.com".into(),
            voter_id: Some("V-2002".into()),
        };
        assert_eq!(
            voter.clone().with_placeholder_id().voter_id.as_deref(),
            Some("V-2002")
        );

        let unnamed = Voter {
            voter_id: None,
            ..voter
        };
        assert!(unnamed
            .with_placeholder_id()
            .voter_id
            .unwrap()
            .starts_with("VOTER-"));
    }
}
