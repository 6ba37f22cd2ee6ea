use serde::{Deserialize, Serialize};

use super::auth::require;
use crate::error::Result;
use crate::model::Id;

/// Identity confirmation submitted before a voter may see the ballot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    pub name: String,
    pub voter_id: String,
}

impl VerifyRequest {
    pub fn new(name: impl Into<String>, voter_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            voter_id: voter_id.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        require("Full name", &self.name)?;
        require("Voter ID", &self.voter_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    /// Ballot token for the voting calls that follow.
    pub token: String,
    pub voter_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    pub candidate_id: Id,
}

/// The server's new count for the candidate just voted for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteResponse {
    pub votes: u64,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn vote_request_shape() {
        let request = VoteRequest {
            candidate_id: Id::Num(5),
        };
        assert_eq!(
            serde_json::to_value(request).unwrap(),
            json!({ "candidateId": 5 })
        );
    }

    #[test]
    fn verify_request_shape() {
        let request = VerifyRequest::new("Ada Lovelace", "V-1001");
        assert!(request.validate().is_ok());
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({ "name": "Ada Lovelace", "voterId": "V-1001" })
        );
        assert!(VerifyRequest::new("Ada", " ").validate().is_err());
    }
}
