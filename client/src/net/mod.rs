//! Networking modules for the REST backend.
//!
//! SYSTEM CONTEXT
//! ==============
//! `api` owns the transport, bearer injection and token renewal; `types`
//! defines the response envelope and the backend wire schema.

pub mod api;
pub mod types;
