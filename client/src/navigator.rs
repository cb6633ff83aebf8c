//! UI boundary driven by the client core.
//!
//! SYSTEM CONTEXT
//! ==============
//! The core never renders anything. When it has to talk to the user (session
//! expired) or move them (redirect to login), it goes through a `Navigator`
//! supplied by the UI layer.

#[cfg(test)]
#[path = "navigator_test.rs"]
mod tests;

use std::sync::Mutex;

/// Severity of a transient notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Info,
    Warning,
    Error,
}

/// Capability the UI layer hands to the core.
pub trait Navigator: Send + Sync {
    /// Show a non-blocking notification.
    fn toast(&self, kind: ToastKind, message: &str);
    /// Perform a full-page navigation to `location`.
    fn navigate(&self, location: &str);
}

/// Navigator that only logs. Used when no UI is attached.
#[derive(Debug, Default)]
pub struct TracingNavigator;

impl Navigator for TracingNavigator {
    fn toast(&self, kind: ToastKind, message: &str) {
        match kind {
            ToastKind::Error | ToastKind::Warning => tracing::warn!(?kind, message, "toast"),
            ToastKind::Success | ToastKind::Info => tracing::info!(?kind, message, "toast"),
        }
    }

    fn navigate(&self, location: &str) {
        tracing::info!(location, "navigate");
    }
}

/// One thing a [`RecordingNavigator`] saw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigatorEvent {
    Toast(ToastKind, String),
    Navigate(String),
}

/// Navigator that remembers every call, for tests and headless callers.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    events: Mutex<Vec<NavigatorEvent>>,
}

impl RecordingNavigator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn events(&self) -> Vec<NavigatorEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Locations passed to `navigate`, in order.
    #[must_use]
    pub fn locations(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                NavigatorEvent::Navigate(location) => Some(location),
                NavigatorEvent::Toast(..) => None,
            })
            .collect()
    }

    fn push(&self, event: NavigatorEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

impl Navigator for RecordingNavigator {
    fn toast(&self, kind: ToastKind, message: &str) {
        self.push(NavigatorEvent::Toast(kind, message.to_owned()));
    }

    fn navigate(&self, location: &str) {
        self.push(NavigatorEvent::Navigate(location.to_owned()));
    }
}
