//! Persistent key-value store over two scopes.
//!
//! DESIGN
//! ======
//! `Scope::Local` survives restarts, `Scope::Session` lives as long as the
//! process. Values are JSON-encoded on write and decoded on read. Backends
//! report typed [`StorageError`]s, but [`Store`] swallows them: every write
//! is best-effort and every read degrades to `None`, so callers never have
//! to handle storage failures.
//!
//! TRADE-OFFS
//! ==========
//! A failed write is only visible in the logs. In-memory session state stays
//! correct; it just will not survive a restart.

pub mod auth;
pub mod backend;

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;

use std::path::PathBuf;

use serde::Serialize;
use serde::de::DeserializeOwned;

pub use auth::{AuthStorage, STORAGE_KEYS, StorageKeys};
pub use backend::{FileBackend, MemoryBackend};

/// Which storage scope a key lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Durable scope, survives restarts.
    Local,
    /// Transient scope, cleared when the session ends.
    Session,
}

/// Errors reported by storage backends.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage io failed at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("value serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("storage quota exceeded ({used} of {limit} bytes)")]
    QuotaExceeded { used: usize, limit: usize },

    #[error("storage backend lock poisoned")]
    Poisoned,
}

/// Raw string storage for one scope.
pub trait StorageBackend: Send + Sync {
    /// Read the raw stored string for `key`.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    /// Write the raw string for `key`.
    fn set(&self, key: &str, value: String) -> Result<(), StorageError>;
    /// Delete `key`; deleting a missing key succeeds.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
    /// Delete every key in the scope.
    fn clear(&self) -> Result<(), StorageError>;
}

/// JSON-serializing facade over a durable and a session backend.
pub struct Store {
    local: Box<dyn StorageBackend>,
    session: Box<dyn StorageBackend>,
}

impl Store {
    #[must_use]
    pub fn new(local: Box<dyn StorageBackend>, session: Box<dyn StorageBackend>) -> Self {
        Self { local, session }
    }

    /// Store with both scopes held in memory.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryBackend::new()), Box::new(MemoryBackend::new()))
    }

    /// Store whose durable scope is a JSON file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory cannot be created or the
    /// existing file cannot be read.
    pub fn with_local_file(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let local = FileBackend::open(path)?;
        Ok(Self::new(Box::new(local), Box::new(MemoryBackend::new())))
    }

    fn backend(&self, scope: Scope) -> &dyn StorageBackend {
        match scope {
            Scope::Local => self.local.as_ref(),
            Scope::Session => self.session.as_ref(),
        }
    }

    /// Serialize `value` and write it under `key`. Failures are logged and dropped.
    pub fn set<T: Serialize + ?Sized>(&self, scope: Scope, key: &str, value: &T) {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::error!(error = %e, ?scope, key, "storage set: serialization failed");
                return;
            }
        };
        if let Err(e) = self.backend(scope).set(key, raw) {
            tracing::error!(error = %e, ?scope, key, "storage set failed");
        }
    }

    /// Read and decode `key`. Missing, `null` or malformed values yield `None`.
    #[must_use]
    pub fn get<T: DeserializeOwned>(&self, scope: Scope, key: &str) -> Option<T> {
        let raw = match self.backend(scope).get(key) {
            Ok(Some(raw)) if !raw.is_empty() => raw,
            Ok(_) => return None,
            Err(e) => {
                tracing::error!(error = %e, ?scope, key, "storage get failed");
                return None;
            }
        };
        let value: serde_json::Value = match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!(error = %e, ?scope, key, "storage get: malformed JSON");
                return None;
            }
        };
        if value.is_null() {
            return None;
        }
        match serde_json::from_value(value) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                tracing::error!(error = %e, ?scope, key, "storage get: unexpected shape");
                None
            }
        }
    }

    pub fn remove(&self, scope: Scope, key: &str) {
        if let Err(e) = self.backend(scope).remove(key) {
            tracing::error!(error = %e, ?scope, key, "storage remove failed");
        }
    }

    pub fn clear(&self, scope: Scope) {
        if let Err(e) = self.backend(scope).clear() {
            tracing::error!(error = %e, ?scope, "storage clear failed");
        }
    }
}
