//! Client side of an online voting platform.
//!
//! Every page is a thin view over a remote HTTP API. The [`session`] module
//! remembers who is signed in, [`api`] talks to the server, [`router`] decides
//! which page a path shows, and [`pages`] holds the page models themselves.

#[cfg(test)]
#[macro_use]
extern crate rocket;

#[cfg(test)]
#[macro_use]
extern crate client_test;

pub mod api;
pub mod board;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod pages;
pub mod polling;
pub mod router;
pub mod session;
pub mod vote_cast;

#[cfg(test)]
mod mock;

pub use api::ApiClient;
pub use config::Config;
pub use error::{Error, Result};
