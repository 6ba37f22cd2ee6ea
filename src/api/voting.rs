use super::ApiClient;
use crate::error::Result;
use crate::model::{
    api::{VerifyRequest, VerifyResponse, VoteRequest, VoteResponse},
    Candidate, Id,
};

/// Which candidate list to read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateScope {
    /// `GET /vote/candidates`, optionally narrowed to one election.
    Ballot(Option<Id>),
    /// `GET /admin/candidates`.
    Admin,
}

impl ApiClient {
    /// `POST /vote/verify`: confirm the voter's identity before showing the ballot.
    /// The session token is sent if there is one.
    pub async fn verify_voter(
        &self,
        request: &VerifyRequest,
        token: Option<&str>,
    ) -> Result<VerifyResponse> {
        request.validate()?;
        self.post("/vote/verify", request, token).await
    }

    /// `GET /vote/candidates[?electionId=<id>]`.
    pub async fn ballot_candidates(
        &self,
        election: Option<&Id>,
        token: &str,
    ) -> Result<Vec<Candidate>> {
        let query = election
            .map(|id| vec![("electionId", id.to_string())])
            .unwrap_or_default();
        self.get("/vote/candidates", &query, Some(token)).await
    }

    /// Read whichever candidate list `scope` names.
    pub async fn candidates(&self, scope: &CandidateScope, token: &str) -> Result<Vec<Candidate>> {
        match scope {
            CandidateScope::Ballot(election) => {
                self.ballot_candidates(election.as_ref(), token).await
            }
            CandidateScope::Admin => self.admin_candidates(token).await,
        }
    }

    /// `POST /vote`. Returns the candidate's new total as counted by the server.
    ///
    /// There is no idempotency key: a request that times out on our side may
    /// still have been counted.
    pub async fn cast_vote(&self, candidate: &Id, token: &str) -> Result<u64> {
        let request = VoteRequest {
            candidate_id: candidate.clone(),
        };
        let response: VoteResponse = self.post("/vote", &request, Some(token)).await?;
        Ok(response.votes)
    }
}
