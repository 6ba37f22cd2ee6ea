//! Request and response bodies exchanged with the voting API.
//!
//! Field names follow the server's camelCase JSON.

pub mod auth;
pub mod voting;

pub use auth::{AuthResponse, Credentials, RegisterRequest, RegisterResponse};
pub use voting::{VerifyRequest, VerifyResponse, VoteRequest, VoteResponse};
