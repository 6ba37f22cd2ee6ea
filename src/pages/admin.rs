use std::fmt::{Display, Formatter};

use log::warn;

use crate::api::ApiClient;
use crate::error::Result;
use crate::model::{Candidate, Voter};
use crate::session::Session;

/// `/admin`: every candidate's count and every registered voter.
#[derive(Debug, Clone, Default)]
pub struct AdminDashboard {
    candidates: Vec<Candidate>,
    voters: Vec<Voter>,
    error: Option<String>,
}

impl AdminDashboard {
    /// Build the dashboard and load it once. A failed load is shown inline.
    pub async fn load(api: &ApiClient, session: &Session) -> Self {
        let mut dashboard = Self::default();
        // The error is already recorded for display.
        let _ = dashboard.refresh(api, session).await;
        dashboard
    }

    /// Fetch candidates and voters together. Either failing leaves both
    /// lists as they were.
    pub async fn refresh(&mut self, api: &ApiClient, session: &Session) -> Result<()> {
        self.error = None;
        let result: Result<(Vec<Candidate>, Vec<Voter>)> = async {
            let token = session.require_token()?;
            tokio::try_join!(api.admin_candidates(token), api.admin_voters(token))
        }
        .await;

        match result {
            Ok((candidates, voters)) => {
                self.candidates = candidates;
                self.voters = voters.into_iter().map(Voter::with_placeholder_id).collect();
                Ok(())
            }
            Err(e) => {
                warn!("Admin dashboard refresh failed: {e}");
                self.error = Some(e.user_message());
                Err(e)
            }
        }
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn voters(&self) -> &[Voter] {
        &self.voters
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

impl Display for AdminDashboard {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Admin Dashboard")?;
        if let Some(error) = &self.error {
            writeln!(f, "! {error}")?;
        }

        writeln!(f, "\nCandidates")?;
        if self.candidates.is_empty() {
            writeln!(f, "  No candidates found.")?;
        }
        for c in &self.candidates {
            writeln!(
                f,
                "  {} ({}) - Votes: {}",
                c.display_name(),
                c.party_or_na(),
                c.votes
            )?;
        }

        writeln!(f, "\nRegistered Voters")?;
        if self.voters.is_empty() {
            writeln!(f, "  No voters found.")?;
        }
        for v in &self.voters {
            writeln!(
                f,
                "  {} - {} (ID: {})",
                v.name,
                v.email,
                v.voter_id.as_deref().unwrap_or_default()
            )?;
        }
        Ok(())
    }
}
