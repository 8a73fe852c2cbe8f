//! Commit orchestration for IDE-style staged edits.
//!
//! `commitflow` drives a single commit attempt against a single target
//! branch on a GitLab-like server: it builds the request from the staged
//! edit set, checks whether the branch moved since editing began, pauses
//! for an explicit user decision when it did, submits the commit, and
//! reconciles local state with the server's authoritative result.
//!
//! The workflow talks to the outside world only through traits: the
//! [`api::CommitGateway`] transport seam and the UI collaborators in
//! [`ports`]. Front ends supply implementations; tests supply mocks.

pub mod api;
pub mod domain;
pub mod error;
pub mod ports;
pub mod text;
pub mod urls;
pub mod workflow;

pub use api::{ApiClient, CommitGateway};
pub use domain::{
    shared_state, BranchContext, BranchState, CommitIntent, CommitOutcome, CommitPhase,
    CommitState, EditKind, FollowUpAction, LastCommit, SharedCommitState, StagedEdit,
};
pub use error::CommitError;
pub use ports::{
    ConfirmationPort, ContentChangeListener, Decision, ListenerRegistry, Navigator, Severity,
    UiShell,
};
pub use workflow::CommitWorkflow;
