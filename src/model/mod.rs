//! Data owned by the remote service, as the client sees it.
//!
//! Everything here is read-only from the client's point of view, except the
//! locally cached vote counts on [`Candidate`], which are only ever replaced
//! by counts the server has confirmed.

pub mod api;
pub mod candidate;
pub mod date;
pub mod election;
pub mod id;
pub mod user;
pub mod voter;

pub use candidate::Candidate;
pub use election::{Election, ElectionStatus};
pub use id::Id;
pub use user::{Role, User};
pub use voter::Voter;
