use std::fmt::{Display, Formatter};

use log::warn;

use super::Ballot;
use crate::api::ApiClient;
use crate::model::Election;
use crate::router::Route;
use crate::session::Session;

/// Candidates shown on a card before the rest are summarised.
const CARD_CANDIDATES: usize = 3;

const NO_TOKEN: &str = "No token found. Showing default candidates.";
const LIVE_FETCH_FAILED: &str = "Could not fetch live candidates. Showing default candidates.";
const ELECTIONS_FAILED: &str = "Could not load elections. Showing the default election.";

/// One election on the home page.
#[derive(Debug)]
pub struct ElectionCard {
    election: Election,
    ballot: Ballot,
    notice: Option<String>,
}

impl ElectionCard {
    /// A card for `election`. Active elections try to replace the candidates
    /// bundled with the election by the live list.
    pub async fn load(api: &ApiClient, election: Election, token: Option<&str>) -> Self {
        let mut card = Self {
            ballot: Ballot::new(election.candidates.clone()),
            election,
            notice: None,
        };
        if card.election.is_active() {
            card.fetch_live(api, token).await;
        }
        card
    }

    async fn fetch_live(&mut self, api: &ApiClient, token: Option<&str>) {
        let Some(token) = token else {
            self.notice = Some(NO_TOKEN.to_string());
            return;
        };
        match api.ballot_candidates(Some(&self.election.id), token).await {
            Ok(live) if live.is_empty() => {}
            Ok(live) => self.ballot = Ballot::new(live),
            Err(e) => {
                warn!("Live candidates for election {}: {e}", self.election.id);
                self.notice = Some(LIVE_FETCH_FAILED.to_string());
            }
        }
    }

    pub fn election(&self) -> &Election {
        &self.election
    }

    pub fn ballot(&self) -> &Ballot {
        &self.ballot
    }

    /// The vote controls; closed elections have none.
    pub fn ballot_mut(&mut self) -> Option<&mut Ballot> {
        self.election.is_active().then_some(&mut self.ballot)
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }
}

impl Display for ElectionCard {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let election = &self.election;
        writeln!(f, "== {} [{}] ==", election.title, election.status)?;
        write!(f, "Start: {}  End: {}", election.start_date, election.end_date)?;
        match election.election_date {
            Some(day) => writeln!(f, "  Election Day: {day}")?,
            None => writeln!(f)?,
        }
        if let Some(description) = &election.description {
            writeln!(f, "{description}")?;
        }
        if let Some(notice) = &self.notice {
            writeln!(f, "! {notice}")?;
        }

        let candidates = self.ballot.candidates();
        if candidates.is_empty() {
            writeln!(f, "  No candidates available")?;
        }
        for candidate in candidates.iter().take(CARD_CANDIDATES) {
            self.ballot
                .fmt_candidate(f, candidate, election.is_active())?;
        }
        if candidates.len() > CARD_CANDIDATES {
            writeln!(f, "  +{} more", candidates.len() - CARD_CANDIDATES)?;
        }
        if election.is_active() {
            writeln!(f, "Vote Now: {}", Route::Vote(Some(election.id.clone())))?;
        }
        Ok(())
    }
}

/// `/`: the elections on offer.
#[derive(Debug)]
pub struct HomePage {
    cards: Vec<ElectionCard>,
    notice: Option<String>,
}

impl HomePage {
    /// Fetch the elections, falling back to the default election when the
    /// list can't be read.
    pub async fn load(api: &ApiClient, session: &Session) -> Self {
        let token = session.token();
        let (elections, notice) = match api.elections(token).await {
            Ok(elections) => (elections, None),
            Err(e) => {
                warn!("Could not load elections: {e}");
                (vec![Election::fallback()], Some(ELECTIONS_FAILED.to_string()))
            }
        };

        let mut cards = Vec::with_capacity(elections.len());
        for election in elections {
            cards.push(ElectionCard::load(api, election, token).await);
        }
        Self { cards, notice }
    }

    pub fn cards(&self) -> &[ElectionCard] {
        &self.cards
    }

    pub fn cards_mut(&mut self) -> &mut [ElectionCard] {
        &mut self.cards
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }
}

impl Display for HomePage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Welcome to the Voting App")?;
        writeln!(
            f,
            "A secure, transparent, and fair platform to cast your vote online."
        )?;
        writeln!(f, "\nActive Elections")?;
        if let Some(notice) = &self.notice {
            writeln!(f, "! {notice}")?;
        }
        if self.cards.is_empty() {
            writeln!(f, "No active elections at the moment.")?;
        }
        for card in &self.cards {
            writeln!(f)?;
            write!(f, "{card}")?;
        }
        Ok(())
    }
}
