//! # board-client
//!
//! Authenticated client core for the community board application.
//!
//! The crate is organized leaf to root:
//! - `storage`: JSON key-value store over a durable and a session scope.
//! - `net`: the HTTP client core (bearer injection, envelope normalization,
//!   single-flight token refresh) and the wire DTOs.
//! - `state`: the session-state broadcaster consumed by UI layers.
//! - `services`: auth, posts and comments wrappers over the HTTP core.
//! - `util`: validators, user-facing error messages and navigation helpers.
//! - `app`: the composition root wiring exactly one of each for a session.

pub mod app;
pub mod config;
pub mod error;
pub mod navigator;
pub mod net;
pub mod services;
pub mod state;
pub mod storage;
pub mod util;

pub use app::BoardApp;
pub use config::ClientConfig;
pub use error::ClientError;
pub use net::types::{ApiResponse, UserProfile};
