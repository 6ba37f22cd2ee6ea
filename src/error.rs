use thiserror::Error;

use crate::model::{Id, Role};
use crate::vote_cast::VoteState;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The request never produced a response.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    /// The server answered with a non-success status.
    #[error("Request failed ({status}): {message}")]
    Api { status: u16, message: String },
    /// A required form field was empty; the request was never sent.
    #[error("{0} is required")]
    Validation(&'static str),
    /// An operation needing a session token was attempted without one.
    #[error("You are not authenticated. Please log in.")]
    NotAuthenticated,
    /// The account signed in fine but can't use this page.
    #[error("This account does not have the {0} role")]
    WrongRole(Role),
    /// Ballot operations attempted before the voter's identity was confirmed.
    #[error("Verify your identity before voting")]
    NotVerified,
    #[error("Unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Session storage failed: {0}")]
    Storage(#[from] std::io::Error),
    #[error("Invalid configuration: {0}")]
    Config(String),
    /// A vote was attempted for a candidate the page isn't showing.
    #[error("No candidate with ID {0} on this ballot")]
    UnknownCandidate(Id),
    /// A vote control was driven out of order, e.g. confirming without a prompt.
    #[error("Cannot {action} while {state}")]
    VoteState {
        action: &'static str,
        state: VoteState,
    },
}

impl Error {
    /// Text to show inline on a page: the server's own message for API
    /// errors, the full description otherwise.
    pub fn user_message(&self) -> String {
        match self {
            Self::Api { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    /// The HTTP status, if the server produced one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::Config(err.to_string())
    }
}
