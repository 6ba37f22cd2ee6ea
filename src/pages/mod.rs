//! Page models: the state behind each screen, the operations a user can
//! perform on it, and a plain-text rendering.
//!
//! Pages never fail to render. Errors from their operations are returned to
//! the caller and also kept for display.

mod admin;
mod ballot;
mod home;
mod login;
mod register;
mod results;
mod voting;

pub use admin::AdminDashboard;
pub use ballot::Ballot;
pub use home::{ElectionCard, HomePage};
pub use login::{LoginPage, Portal};
pub use register::RegisterPage;
pub use results::{ResultsPage, ResultsState};
pub use voting::VotingPage;
