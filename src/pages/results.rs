use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::time::Duration;

use log::warn;
use tokio::sync::{watch, Mutex};

use crate::api::{ApiClient, CandidateScope};
use crate::board::CandidateBoard;
use crate::error::Error;
use crate::model::Role;
use crate::polling::Poller;
use crate::session::Session;

/// Widest bar in the chart, in characters.
const BAR_WIDTH: u64 = 30;

/// What the results page is currently showing.
#[derive(Debug, Clone, Default)]
pub struct ResultsState {
    board: CandidateBoard,
    error: Option<String>,
    loaded: bool,
}

impl ResultsState {
    pub fn board(&self) -> &CandidateBoard {
        &self.board
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Whether any fetch has succeeded yet.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }
}

impl Display for ResultsState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Election Results")?;
        if let Some(error) = &self.error {
            writeln!(f, "! {error}")?;
        }
        let candidates = self.board.candidates();
        if candidates.is_empty() {
            if self.error.is_none() {
                writeln!(f, "No results yet.")?;
            }
            return Ok(());
        }

        let name_width = candidates
            .iter()
            .map(|c| c.display_name().chars().count())
            .max()
            .unwrap_or(0);
        let most = candidates.iter().map(|c| c.votes).max().unwrap_or(0).max(1);
        for candidate in candidates {
            let mut len = u128::from(candidate.votes) * u128::from(BAR_WIDTH) / u128::from(most);
            if candidate.votes > 0 {
                len = len.max(1);
            }
            let bar = "#".repeat(len as usize);
            writeln!(
                f,
                "{:<name_width$} |{:<width$}| {} ({})",
                candidate.display_name(),
                bar,
                candidate.votes,
                candidate.party_or_na(),
                width = BAR_WIDTH as usize,
            )?;
        }
        Ok(())
    }
}

/// `/results`: the candidate list, re-fetched on a fixed period while mounted.
pub struct ResultsPage {
    state: Arc<Mutex<ResultsState>>,
    updates: watch::Receiver<u64>,
    poller: Option<Poller>,
    scope: CandidateScope,
}

impl ResultsPage {
    /// Admins read the admin candidate list; everyone else the ballot.
    pub fn scope_for(session: &Session) -> CandidateScope {
        if session.role() == Some(Role::Admin) {
            CandidateScope::Admin
        } else {
            CandidateScope::Ballot(None)
        }
    }

    /// Fetch now and then every `period`. Without a session token nothing is
    /// fetched and the page shows why.
    pub fn mount(api: ApiClient, session: &Session, period: Duration) -> Self {
        let scope = Self::scope_for(session);
        let (notify, updates) = watch::channel(0);
        let Some(token) = session.token().map(str::to_owned) else {
            let state = ResultsState {
                error: Some(Error::NotAuthenticated.user_message()),
                ..ResultsState::default()
            };
            return Self {
                state: Arc::new(Mutex::new(state)),
                updates,
                poller: None,
                scope,
            };
        };

        let state = Arc::new(Mutex::new(ResultsState::default()));
        let notify = Arc::new(notify);
        let poller = Poller::mount(period, {
            let state = state.clone();
            let scope = scope.clone();
            move || {
                let api = api.clone();
                let state = state.clone();
                let scope = scope.clone();
                let token = token.clone();
                let notify = notify.clone();
                async move {
                    fetch(&api, &state, &scope, &token).await;
                    notify.send_modify(|generation| *generation += 1);
                }
            }
        });

        Self {
            state,
            updates,
            poller: Some(poller),
            scope,
        }
    }

    pub fn scope(&self) -> &CandidateScope {
        &self.scope
    }

    pub fn is_polling(&self) -> bool {
        self.poller.as_ref().map_or(false, Poller::is_mounted)
    }

    /// A copy of what the page shows right now.
    pub async fn snapshot(&self) -> ResultsState {
        self.state.lock().await.clone()
    }

    /// Wait for the next completed fetch. Returns `false` once polling has
    /// stopped and no more updates will come.
    pub async fn changed(&mut self) -> bool {
        self.updates.changed().await.is_ok()
    }

    /// Stop polling. A fetch still in flight is cancelled and nothing lands afterwards.
    pub async fn unmount(&mut self) {
        if let Some(poller) = self.poller.take() {
            poller.unmount().await;
        }
        self.state.lock().await.board.unmount();
    }
}

/// One poll: fetch and apply. Failures keep the last good list on screen.
async fn fetch(api: &ApiClient, state: &Mutex<ResultsState>, scope: &CandidateScope, token: &str) {
    let ticket = state.lock().await.board.issue();
    let result = api.candidates(scope, token).await;

    let mut state = state.lock().await;
    match result {
        Ok(candidates) => {
            if state.board.apply_fetch(ticket, candidates) {
                state.loaded = true;
                state.error = None;
            }
        }
        Err(e) => {
            warn!("Results refresh failed: {e}");
            state.error = Some(e.user_message());
        }
    }
}
