use std::fmt::{Display, Formatter};

use log::{info, warn};

use super::Ballot;
use crate::api::{ApiClient, CandidateScope};
use crate::error::{Error, Result};
use crate::model::{
    api::{VerifyRequest, VerifyResponse},
    Id,
};
use crate::session::Session;

/// `/vote` and `/vote/<electionId>`: identity check, then the ballot.
#[derive(Debug, Default)]
pub struct VotingPage {
    election: Option<Id>,
    verification: Option<VerifyResponse>,
    ballot: Ballot,
    error: Option<String>,
}

impl VotingPage {
    pub fn new(election: Option<Id>) -> Self {
        Self {
            election,
            ..Self::default()
        }
    }

    pub fn is_verified(&self) -> bool {
        self.verification.is_some()
    }

    pub fn voter_id(&self) -> Option<&str> {
        self.verification.as_ref().map(|v| v.voter_id.as_str())
    }

    pub fn ballot(&self) -> &Ballot {
        &self.ballot
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Submit the verification form. Only a successful verification unlocks
    /// the ballot and loads its candidates.
    pub async fn verify(
        &mut self,
        api: &ApiClient,
        session: &Session,
        request: &VerifyRequest,
    ) -> Result<()> {
        self.error = None;
        match api.verify_voter(request, session.token()).await {
            Ok(response) => {
                info!("Voter {} verified", response.voter_id);
                self.verification = Some(response);
            }
            Err(e) => {
                warn!("Verification failed: {e}");
                self.error = Some(format!("Verification failed: {}", e.user_message()));
                return Err(e);
            }
        }
        self.load_candidates(api, session).await
    }

    /// (Re)load the candidates for this page's election.
    pub async fn load_candidates(&mut self, api: &ApiClient, session: &Session) -> Result<()> {
        let token = self.ballot_token(session)?.to_string();
        let scope = CandidateScope::Ballot(self.election.clone());
        let result = self.ballot.refresh(api, &scope, &token).await;
        self.record(result)
    }

    pub fn open(&mut self, candidate: &Id) -> Result<()> {
        self.ensure_verified()?;
        self.ballot.open(candidate)
    }

    pub fn cancel(&mut self, candidate: &Id) {
        self.ballot.cancel(candidate);
    }

    /// Submit the vote whose prompt is open.
    pub async fn confirm(
        &mut self,
        candidate: &Id,
        api: &ApiClient,
        session: &Session,
    ) -> Result<u64> {
        let token = self.ballot_token(session).ok().map(str::to_owned);
        self.ballot.confirm(candidate, api, token.as_deref()).await
    }

    pub fn unmount(&mut self) {
        self.ballot.unmount();
    }

    /// The token for ballot calls: the one issued by verification if the
    /// server sent one, otherwise the session's.
    fn ballot_token<'a>(&'a self, session: &'a Session) -> Result<&'a str> {
        let verification = self.ensure_verified()?;
        match verification.token.as_str() {
            "" => session.require_token(),
            token => Ok(token),
        }
    }

    fn ensure_verified(&self) -> Result<&VerifyResponse> {
        self.verification.as_ref().ok_or(Error::NotVerified)
    }

    fn record(&mut self, result: Result<()>) -> Result<()> {
        if let Err(e) = &result {
            self.error = Some(e.user_message());
        }
        result
    }
}

impl Display for VotingPage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Cast Your Vote")?;
        if let Some(election) = &self.election {
            writeln!(f, "Election {election}")?;
        }
        let Some(verification) = &self.verification else {
            writeln!(f, "Verify your identity to continue: Full Name, Voter ID.")?;
            if let Some(error) = &self.error {
                writeln!(f, "! {error}")?;
            }
            return Ok(());
        };

        writeln!(f, "Verified as voter {}", verification.voter_id)?;
        if let Some(error) = &self.error {
            writeln!(f, "! {error}")?;
        }
        write!(f, "{}", self.ballot)
    }
}
