//! Domain types shared across modules.
//!
//! This module contains the data structures used by multiple parts of the
//! workflow (payload building, submission, reconciliation, the API gateway).
//! Keeping them here avoids circular dependencies between modules.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

/// How a staged edit changes its file, used to infer the commit action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKind {
    /// File does not exist on the branch yet.
    Create,
    /// File exists and its content changed.
    Update,
    /// File is being removed.
    Delete,
}

/// One file's pending change.
///
/// Created when a file is edited; removed from the staged set once a commit
/// that includes it succeeds.
#[derive(Debug, Clone)]
pub struct StagedEdit {
    /// Repository-relative path; unique key within the staged set.
    pub path: String,
    /// Current editor content.
    pub content: String,
    /// Denormalized copy of the committed content, written back after commit.
    pub raw_content: String,
    /// Inferred commit action for this edit.
    pub kind: EditKind,
    /// Metadata of the last commit that included this file.
    pub last_commit: Option<LastCommit>,
}

impl StagedEdit {
    pub fn new(path: impl Into<String>, content: impl Into<String>, kind: EditKind) -> Self {
        let content = content.into();
        Self {
            path: path.into(),
            raw_content: content.clone(),
            content,
            kind,
            last_commit: None,
        }
    }
}

/// Denormalized metadata of the most recent commit touching a file or branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastCommit {
    /// Web path of the commit, e.g. `{web_url}/commit/{id}`.
    pub commit_path: String,
    pub id: String,
    pub message: String,
    pub authored_date: Option<DateTime<Utc>>,
    pub author_name: Option<String>,
}

/// Per-project, per-branch record of what the client believes is HEAD.
///
/// Mutated only by the post-commit reconciler or by an external
/// branch-refresh collaborator.
#[derive(Debug, Clone, Default)]
pub struct BranchState {
    /// The commit id the client believes is the current HEAD.
    pub working_reference: String,
    /// Metadata of the last commit seen on this branch.
    pub last_commit: Option<LastCommit>,
}

impl BranchState {
    pub fn new(working_reference: impl Into<String>) -> Self {
        Self {
            working_reference: working_reference.into(),
            last_commit: None,
        }
    }
}

/// What should happen after the commit lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FollowUpAction {
    /// Commit to the branch currently checked out and stay on it.
    #[default]
    StayOnCurrentBranch,
    /// Commit to a newly created branch and switch to it.
    SwitchToNewBranch,
    /// Commit to a newly created branch and open a merge request for it.
    OpenMergeRequest,
}

impl FollowUpAction {
    /// Whether this action commits to a branch that does not exist yet.
    pub fn creates_new_branch(&self) -> bool {
        !matches!(self, FollowUpAction::StayOnCurrentBranch)
    }
}

/// Ephemeral description of one commit attempt; discarded after resolution.
#[derive(Debug, Clone)]
pub struct CommitIntent {
    pub target_branch_name: String,
    pub create_new_branch: bool,
    pub follow_up: FollowUpAction,
    pub message: String,
}

impl CommitIntent {
    /// Build the intent for the pending commit described by `state`.
    ///
    /// When the pending follow-up creates a new branch the target is the
    /// drafted new-branch name, otherwise the branch currently checked out.
    pub fn from_pending(state: &CommitState, ctx: &BranchContext) -> Self {
        let create_new_branch = state.pending_follow_up.creates_new_branch();
        let target_branch_name = if create_new_branch {
            state.new_branch_name.clone()
        } else {
            ctx.branch_id.clone()
        };

        Self {
            target_branch_name,
            create_new_branch,
            follow_up: state.pending_follow_up,
            message: state.draft_message.clone(),
        }
    }
}

/// Workflow phase, observable through the shared state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommitPhase {
    #[default]
    Idle,
    Building,
    CheckingStaleness,
    AwaitingUserDecision,
    Submitting,
    Reconciling,
}

/// Terminal result of a commit attempt that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// The commit landed and local state was reconciled.
    Committed { reference: String, summary: String },
    /// The commit landed on a new branch and the client was redirected to
    /// the merge-request form; no reconciliation ran.
    MergeRequestRedirect { url: String },
    /// The user declined to commit onto a branch that had moved.
    AbortedByUser,
}

/// Identifies the project and branch a commit attempt runs against.
#[derive(Debug, Clone)]
pub struct BranchContext {
    pub project_id: String,
    /// The branch currently checked out in the client.
    pub branch_id: String,
    /// Base web URL of the project, used for commit and merge-request links.
    pub web_url: String,
}

/// Client-held state a commit attempt reads and reconciles.
///
/// Passed explicitly into the workflow; nothing reads it ambiently. The
/// staged set and `branch.working_reference` never disagree about what has
/// been durably committed: the reconciler drains the one and advances the
/// other under a single write lock.
#[derive(Debug, Default)]
pub struct CommitState {
    /// Pending edits keyed by path.
    pub staged: BTreeMap<String, StagedEdit>,
    pub branch: BranchState,
    /// Drafted commit message for the next attempt.
    pub draft_message: String,
    /// Drafted follow-up action for the next attempt.
    pub pending_follow_up: FollowUpAction,
    /// Drafted name for a branch to be created, if any.
    pub new_branch_name: String,
    /// Path of the file currently open in the editor, used for post-commit
    /// navigation when a new branch was created.
    pub active_path: Option<String>,
    /// Human-readable summary of the last successful commit.
    pub last_commit_summary: Option<String>,
    /// True for the whole async span of a submission, false otherwise.
    pub loading: bool,
    pub phase: CommitPhase,
}

impl CommitState {
    pub fn new(branch: BranchState) -> Self {
        Self {
            branch,
            ..Self::default()
        }
    }

    /// Add or replace the pending edit for a path.
    pub fn stage(&mut self, edit: StagedEdit) {
        self.staged.insert(edit.path.clone(), edit);
    }

    pub fn update_draft_message(&mut self, message: impl Into<String>) {
        self.draft_message = message.into();
    }

    pub fn discard_draft(&mut self) {
        self.draft_message.clear();
    }

    pub fn set_pending_follow_up(&mut self, follow_up: FollowUpAction) {
        self.pending_follow_up = follow_up;
    }

    pub fn set_new_branch_name(&mut self, name: impl Into<String>) {
        self.new_branch_name = name.into();
    }
}

/// Shared handle to the commit state for async observation and mutation.
pub type SharedCommitState = Arc<RwLock<CommitState>>;

/// Wrap a [`CommitState`] for sharing with the workflow and UI collaborators.
pub fn shared_state(state: CommitState) -> SharedCommitState {
    Arc::new(RwLock::new(state))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> BranchContext {
        BranchContext {
            project_id: "group/project".to_string(),
            branch_id: "main".to_string(),
            web_url: "https://gitlab.example.com/group/project".to_string(),
        }
    }

    #[test]
    fn intent_targets_current_branch_by_default() {
        let state = CommitState::new(BranchState::new("abc"));
        let intent = CommitIntent::from_pending(&state, &ctx());
        assert_eq!(intent.target_branch_name, "main");
        assert!(!intent.create_new_branch);
        assert_eq!(intent.follow_up, FollowUpAction::StayOnCurrentBranch);
    }

    #[test]
    fn intent_targets_drafted_branch_when_creating_one() {
        let mut state = CommitState::new(BranchState::new("abc"));
        state.set_pending_follow_up(FollowUpAction::SwitchToNewBranch);
        state.set_new_branch_name("feature-x");

        let intent = CommitIntent::from_pending(&state, &ctx());
        assert_eq!(intent.target_branch_name, "feature-x");
        assert!(intent.create_new_branch);
    }

    #[test]
    fn draft_message_can_be_discarded() {
        let mut state = CommitState::new(BranchState::new("abc"));
        state.update_draft_message("wip: saving work");
        assert_eq!(state.draft_message, "wip: saving work");

        state.discard_draft();
        assert!(state.draft_message.is_empty());
    }

    #[test]
    fn staging_replaces_by_path() {
        let mut state = CommitState::new(BranchState::new("abc"));
        state.stage(StagedEdit::new("a.txt", "one", EditKind::Update));
        state.stage(StagedEdit::new("a.txt", "two", EditKind::Update));

        assert_eq!(state.staged.len(), 1);
        assert_eq!(state.staged["a.txt"].content, "two");
    }
}
