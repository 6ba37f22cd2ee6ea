use std::collections::{HashMap, HashSet};
use std::fmt::{Display, Formatter};

use log::warn;

use crate::api::{ApiClient, CandidateScope};
use crate::board::CandidateBoard;
use crate::error::{Error, Result};
use crate::model::{Candidate, Id};
use crate::vote_cast::VoteCommand;

/// A list of candidates, each with its own vote control.
///
/// Shared by the voting page and the election cards on the home page.
#[derive(Debug, Clone, Default)]
pub struct Ballot {
    board: CandidateBoard,
    commands: HashMap<Id, VoteCommand>,
}

impl Ballot {
    pub fn new(candidates: Vec<Candidate>) -> Self {
        let mut ballot = Self {
            board: CandidateBoard::new(candidates),
            commands: HashMap::new(),
        };
        ballot.sync_commands();
        ballot
    }

    pub fn board(&self) -> &CandidateBoard {
        &self.board
    }

    pub fn candidates(&self) -> &[Candidate] {
        self.board.candidates()
    }

    pub fn command(&self, id: &Id) -> Option<&VoteCommand> {
        self.commands.get(id)
    }

    /// Re-read the candidate list. On failure the current list stays as it is.
    pub async fn refresh(
        &mut self,
        api: &ApiClient,
        scope: &CandidateScope,
        token: &str,
    ) -> Result<()> {
        let ticket = self.board.issue();
        let candidates = api.candidates(scope, token).await?;
        if self.board.apply_fetch(ticket, candidates) {
            self.sync_commands();
        }
        Ok(())
    }

    /// Show the confirmation prompt for `id`.
    pub fn open(&mut self, id: &Id) -> Result<()> {
        self.command_mut(id)?.open()
    }

    pub fn cancel(&mut self, id: &Id) {
        if let Some(command) = self.commands.get_mut(id) {
            command.cancel();
        }
    }

    /// Confirm the open prompt for `id`, submitting the vote.
    pub async fn confirm(&mut self, id: &Id, api: &ApiClient, token: Option<&str>) -> Result<u64> {
        let command = self
            .commands
            .get_mut(id)
            .ok_or_else(|| Error::UnknownCandidate(id.clone()))?;
        command.confirm(api, token, &mut self.board).await
    }

    /// Open and immediately confirm: the prompt already happened elsewhere.
    pub async fn vote(&mut self, id: &Id, api: &ApiClient, token: Option<&str>) -> Result<u64> {
        self.open(id)?;
        self.confirm(id, api, token).await
    }

    /// The page is going away; late results are dropped.
    pub fn unmount(&mut self) {
        self.board.unmount();
    }

    fn command_mut(&mut self, id: &Id) -> Result<&mut VoteCommand> {
        self.commands
            .get_mut(id)
            .ok_or_else(|| Error::UnknownCandidate(id.clone()))
    }

    /// Give every listed candidate a control, keeping the state of existing ones.
    /// A control that has voted is kept even while its candidate is unlisted.
    fn sync_commands(&mut self) {
        let listed: HashSet<&Id> = self.board.candidates().iter().map(|c| &c.id).collect();
        if listed.len() != self.board.candidates().len() {
            warn!("Candidate list contains duplicate IDs");
        }
        self.commands
            .retain(|id, command| command.has_voted() || listed.contains(id));
        for candidate in self.board.candidates() {
            if !self.commands.contains_key(&candidate.id) {
                self.commands
                    .insert(candidate.id.clone(), VoteCommand::new(candidate));
            }
        }
    }

    /// Render one candidate row, with its control when `votable`.
    pub(crate) fn fmt_candidate(
        &self,
        f: &mut Formatter<'_>,
        candidate: &Candidate,
        votable: bool,
    ) -> std::fmt::Result {
        write!(
            f,
            "  [{}] {} ({}) - {} votes",
            candidate.id,
            candidate.display_name(),
            candidate.party_or_na(),
            candidate.votes
        )?;
        let Some(command) = self.commands.get(&candidate.id).filter(|_| votable) else {
            return writeln!(f);
        };
        writeln!(f, "  <{}>", command.label())?;
        if let Some(prompt) = command.prompt() {
            writeln!(f, "      {prompt} [yes/cancel]")?;
        }
        if let Some(error) = command.error() {
            writeln!(f, "      Failed to submit vote: {error}")?;
        }
        Ok(())
    }
}

impl Display for Ballot {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.board.is_empty() {
            return writeln!(f, "  No candidates available.");
        }
        for candidate in self.board.candidates() {
            self.fmt_candidate(f, candidate, true)?;
        }
        Ok(())
    }
}
