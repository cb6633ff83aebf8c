//! Shared client-side state.
//!
//! DESIGN
//! ======
//! Only session state lives here. Everything else a UI shows is fetched on
//! demand through the services, so there is a single mutable model to keep
//! consistent with storage.

pub mod auth;

pub use auth::{AuthSnapshot, AuthState, Subscription};
