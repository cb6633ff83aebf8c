//! Utility helpers shared by every UI surface.
//!
//! SYSTEM CONTEXT
//! ==============
//! Pure functions over inputs and envelopes, plus the navigation helpers that
//! go through the `Navigator` boundary. None of them touch the network.

pub mod error_message;
pub mod router;
pub mod validators;
