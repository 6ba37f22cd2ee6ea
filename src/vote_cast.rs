//! The vote button behind each candidate.
//!
//! A [`VoteCommand`] walks `Idle → Confirming → Submitting → Voted`, falling
//! back to `Failed` (which behaves like `Idle`) when the submission doesn't go
//! through. Once `Voted`, the command never opens its prompt or submits again.
//! The displayed count only changes when the server reports the new total.

use std::fmt::{Display, Formatter};

use log::{info, warn};

use crate::api::ApiClient;
use crate::board::{CandidateBoard, Ticket};
use crate::error::{Error, Result};
use crate::model::{Candidate, Id};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoteState {
    Idle,
    /// The "are you sure?" prompt is showing.
    Confirming,
    /// The vote is on its way to the server.
    Submitting,
    /// The server accepted the vote and reported this total.
    Voted(u64),
    /// The last submission failed with this message; the vote was not counted.
    Failed(String),
}

impl Display for VoteState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::Confirming => f.write_str("confirming"),
            Self::Submitting => f.write_str("submitting"),
            Self::Voted(_) => f.write_str("already voted"),
            Self::Failed(_) => f.write_str("failed"),
        }
    }
}

/// The vote control for one candidate.
#[derive(Debug, Clone)]
pub struct VoteCommand {
    candidate: Id,
    name: String,
    state: VoteState,
}

impl VoteCommand {
    pub fn new(candidate: &Candidate) -> Self {
        Self {
            candidate: candidate.id.clone(),
            name: candidate.display_name().to_string(),
            state: VoteState::Idle,
        }
    }

    pub fn candidate(&self) -> &Id {
        &self.candidate
    }

    pub fn state(&self) -> &VoteState {
        &self.state
    }

    pub fn has_voted(&self) -> bool {
        matches!(self.state, VoteState::Voted(_))
    }

    /// Whether the button can be pressed.
    pub fn is_enabled(&self) -> bool {
        !matches!(self.state, VoteState::Submitting | VoteState::Voted(_))
    }

    pub fn label(&self) -> &'static str {
        match self.state {
            VoteState::Voted(_) => "Voted",
            VoteState::Submitting => "Submitting...",
            _ => "Vote",
        }
    }

    /// The confirmation question, while it is showing.
    pub fn prompt(&self) -> Option<String> {
        (self.state == VoteState::Confirming)
            .then(|| format!("Are you sure you want to vote for {}?", self.name))
    }

    /// The error from the last failed submission.
    pub fn error(&self) -> Option<&str> {
        match &self.state {
            VoteState::Failed(message) => Some(message),
            _ => None,
        }
    }

    /// Show the confirmation prompt.
    pub fn open(&mut self) -> Result<()> {
        match self.state {
            VoteState::Idle | VoteState::Failed(_) => {
                self.state = VoteState::Confirming;
                Ok(())
            }
            VoteState::Confirming => Ok(()),
            VoteState::Submitting | VoteState::Voted(_) => Err(self.refuse("open the vote prompt")),
        }
    }

    /// Dismiss the prompt without voting.
    pub fn cancel(&mut self) {
        if self.state == VoteState::Confirming {
            self.state = VoteState::Idle;
        }
    }

    /// Submit the vote and record the confirmed count on `board`.
    ///
    /// Only valid while the prompt is showing. Without a token nothing is sent.
    pub async fn confirm(
        &mut self,
        api: &ApiClient,
        token: Option<&str>,
        board: &mut CandidateBoard,
    ) -> Result<u64> {
        let (token, ticket) = self.begin(token, board)?;
        let result = api.cast_vote(&self.candidate, token).await;
        self.settle(result, ticket, board)
    }

    /// Move to `Submitting`, or fail without sending anything.
    fn begin<'t>(
        &mut self,
        token: Option<&'t str>,
        board: &mut CandidateBoard,
    ) -> Result<(&'t str, Ticket)> {
        if self.state != VoteState::Confirming {
            return Err(self.refuse("submit a vote"));
        }
        let Some(token) = token else {
            let err = Error::NotAuthenticated;
            self.state = VoteState::Failed(err.user_message());
            return Err(err);
        };
        self.state = VoteState::Submitting;
        Ok((token, board.issue()))
    }

    /// Record the outcome of a submission started by [`Self::begin`].
    fn settle(
        &mut self,
        result: Result<u64>,
        ticket: Ticket,
        board: &mut CandidateBoard,
    ) -> Result<u64> {
        match result {
            Ok(votes) => {
                info!("Vote for candidate {} accepted, now {votes}", self.candidate);
                self.state = VoteState::Voted(votes);
                board.apply_vote(ticket, &self.candidate, votes);
                Ok(votes)
            }
            Err(e) => {
                warn!("Vote for candidate {} failed: {e}", self.candidate);
                self.state = VoteState::Failed(e.user_message());
                Err(e)
            }
        }
    }

    fn refuse(&self, action: &'static str) -> Error {
        Error::VoteState {
            action,
            state: self.state.clone(),
        }
    }
}
