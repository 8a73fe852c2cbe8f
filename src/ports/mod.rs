//! Collaborator interfaces consumed by the workflow.
//!
//! The workflow never talks to a UI toolkit, a router, or an event bus
//! directly; it goes through these traits so front ends and tests can plug
//! in their own implementations.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

/// Severity of a user-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Blocking failure the user must acknowledge.
    Alert,
    /// Informational notice.
    Notice,
}

/// The user's answer at the stale-branch confirmation gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Proceed,
    Abort,
}

/// Suspends the workflow for an explicit user decision.
///
/// This is the single suspension point with unbounded latency; the workflow
/// waits for the returned future without a timeout.
#[async_trait]
pub trait ConfirmationPort: Send + Sync {
    /// Ask whether to commit onto a branch whose HEAD has moved since
    /// editing began.
    async fn confirm_stale_branch_commit(&self) -> Decision;
}

/// Receives fire-and-forget notifications that a file's committed content
/// changed, e.g. so a live editor surface can refresh its model.
pub trait ContentChangeListener: Send + Sync {
    fn content_changed(&self, path: &str, content: &str);
}

/// Per-path registry of content-change listeners.
///
/// Listeners are invoked synchronously by the reconciler, at most once per
/// path per reconciliation.
#[derive(Default)]
pub struct ListenerRegistry {
    listeners: Mutex<HashMap<String, Vec<Arc<dyn ContentChangeListener>>>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for one path.
    pub fn register(&self, path: impl Into<String>, listener: Arc<dyn ContentChangeListener>) {
        let mut listeners = self.listeners.lock().expect("listener registry poisoned");
        listeners.entry(path.into()).or_default().push(listener);
    }

    /// Notify every listener registered for `path`.
    pub fn notify(&self, path: &str, content: &str) {
        let listeners = self.listeners.lock().expect("listener registry poisoned");
        if let Some(for_path) = listeners.get(path) {
            for listener in for_path {
                listener.content_changed(path, content);
            }
        }
    }
}

/// Side-effecting navigation to a client-side route.
pub trait Navigator: Send + Sync {
    fn navigate_to(&self, path: &str);
}

/// The UI surface the workflow reports into.
pub trait UiShell: Send + Sync {
    /// Show a user-visible message.
    fn report_error(&self, message: &str, severity: Severity);

    /// Signal that the layout may need recomputing, e.g. after a modal
    /// altered it during a failed submission.
    fn refresh_layout(&self);
}
