//! The candidate list a page displays, and the rules for updating it.
//!
//! Fetches and votes can resolve in any order. Every request takes a
//! [`Ticket`] from the board when it is *issued*, and its result is only
//! applied if nothing newer has already been applied to the same data.
//! A vote result only ever touches the `votes` of its own candidate.

use std::collections::HashMap;

use log::debug;

use crate::model::{Candidate, Id};

/// Issue order of a request against a [`CandidateBoard`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

#[derive(Debug, Clone)]
pub struct CandidateBoard {
    candidates: Vec<Candidate>,
    next_ticket: u64,
    /// Ticket of the fetch that produced the current list.
    list_ticket: Ticket,
    /// Tickets of votes applied since that fetch, by candidate.
    vote_tickets: HashMap<Id, Ticket>,
    mounted: bool,
}

impl Default for CandidateBoard {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl CandidateBoard {
    /// A board showing `candidates` until the first fetch lands.
    pub fn new(candidates: Vec<Candidate>) -> Self {
        Self {
            candidates,
            next_ticket: 1,
            list_ticket: Ticket(0),
            vote_tickets: HashMap::new(),
            mounted: true,
        }
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn get(&self, id: &Id) -> Option<&Candidate> {
        self.candidates.iter().find(|candidate| &candidate.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Take a ticket for a request about to be sent.
    pub fn issue(&mut self) -> Ticket {
        let ticket = Ticket(self.next_ticket);
        self.next_ticket += 1;
        ticket
    }

    /// Replace the list with a fetch result.
    ///
    /// Ignored if a fetch issued later has already landed. Candidates whose
    /// count was set by a vote issued after this fetch keep that count.
    /// Returns whether anything was applied.
    pub fn apply_fetch(&mut self, ticket: Ticket, mut candidates: Vec<Candidate>) -> bool {
        if !self.mounted {
            debug!("Dropping fetch {ticket:?}: board unmounted");
            return false;
        }
        if ticket <= self.list_ticket {
            debug!("Dropping stale fetch {ticket:?}");
            return false;
        }

        for candidate in &mut candidates {
            let newer_vote = self
                .vote_tickets
                .get(&candidate.id)
                .map_or(false, |vote| *vote > ticket);
            if newer_vote {
                if let Some(current) = self.get(&candidate.id) {
                    candidate.votes = current.votes;
                }
            }
        }

        self.candidates = candidates;
        self.list_ticket = ticket;
        self.vote_tickets.retain(|_, vote| *vote > ticket);
        true
    }

    /// Record the server's confirmed count for one candidate.
    ///
    /// Ignored if the candidate isn't listed, or a newer fetch or vote for it
    /// has already landed. Returns whether the count was applied.
    pub fn apply_vote(&mut self, ticket: Ticket, id: &Id, votes: u64) -> bool {
        if !self.mounted {
            debug!("Dropping vote result {ticket:?}: board unmounted");
            return false;
        }
        if ticket <= self.list_ticket || self.vote_tickets.get(id).map_or(false, |t| *t >= ticket)
        {
            debug!("Dropping stale vote result {ticket:?} for candidate {id}");
            return false;
        }
        match self.candidates.iter_mut().find(|candidate| &candidate.id == id) {
            Some(candidate) => {
                candidate.votes = votes;
                self.vote_tickets.insert(id.clone(), ticket);
                true
            }
            None => false,
        }
    }

    /// Stop accepting results; the page that owned the board is gone.
    pub fn unmount(&mut self) {
        self.mounted = false;
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board() -> CandidateBoard {
        CandidateBoard::new(vec![
            Candidate::new(1, "Alice").with_votes(10),
            Candidate::new(5, "Bob").with_votes(41),
            Candidate::new(7, "Carol").with_votes(3),
        ])
    }

    fn votes(board: &CandidateBoard) -> Vec<u64> {
        board.candidates().iter().map(|c| c.votes).collect()
    }

    #[test]
    fn vote_touches_only_its_candidate() {
        let mut board = board();
        let ticket = board.issue();
        assert!(board.apply_vote(ticket, &Id::Num(5), 42));
        assert_eq!(votes(&board), [10, 42, 3]);
    }

    #[test]
    fn vote_for_unknown_candidate_ignored() {
        let mut board = board();
        let ticket = board.issue();
        assert!(!board.apply_vote(ticket, &Id::Num(99), 1));
        assert_eq!(votes(&board), [10, 41, 3]);
    }

    #[test]
    fn stale_fetch_cannot_undo_newer_vote() {
        let mut board = board();
        let fetch = board.issue();
        let vote = board.issue();
        assert!(board.apply_vote(vote, &Id::Num(5), 42));

        // The fetch was issued before the vote, so it may predate it.
        let fetched = vec![
            Candidate::new(1, "Alice").with_votes(11),
            Candidate::new(5, "Bob").with_votes(41),
            Candidate::new(7, "Carol").with_votes(3),
        ];
        assert!(board.apply_fetch(fetch, fetched));
        assert_eq!(votes(&board), [11, 42, 3]);
    }

    #[test]
    fn newer_fetch_supersedes_vote() {
        let mut board = board();
        let vote = board.issue();
        let fetch = board.issue();
        assert!(board.apply_vote(vote, &Id::Num(5), 42));
        assert!(board.apply_fetch(fetch, vec![Candidate::new(5, "Bob").with_votes(50)]));
        assert_eq!(votes(&board), [50]);
    }

    #[test]
    fn out_of_order_fetches() {
        let mut board = board();
        let older = board.issue();
        let newer = board.issue();
        assert!(board.apply_fetch(newer, vec![Candidate::new(1, "Alice").with_votes(20)]));
        assert!(!board.apply_fetch(older, vec![Candidate::new(1, "Alice").with_votes(15)]));
        assert_eq!(votes(&board), [20]);
    }

    #[test]
    fn vote_older_than_list_ignored() {
        let mut board = board();
        let vote = board.issue();
        let fetch = board.issue();
        assert!(board.apply_fetch(fetch, vec![Candidate::new(5, "Bob").with_votes(60)]));
        assert!(!board.apply_vote(vote, &Id::Num(5), 42));
        assert_eq!(votes(&board), [60]);
    }

    #[test]
    fn unmounted_board_is_frozen() {
        let mut board = board();
        let fetch = board.issue();
        let vote = board.issue();
        board.unmount();
        assert!(!board.is_mounted());
        assert!(!board.apply_fetch(fetch, Vec::new()));
        assert!(!board.apply_vote(vote, &Id::Num(1), 99));
        assert_eq!(votes(&board), [10, 41, 3]);
    }
}
