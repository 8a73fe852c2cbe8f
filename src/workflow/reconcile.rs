//! Post-commit reconciliation of client-held state.

use tracing::debug;

use crate::domain::{BranchContext, CommitIntent, CommitState, FollowUpAction, LastCommit};
use crate::ports::{ListenerRegistry, Navigator};
use crate::urls::{blob_route, commit_web_path};

use super::AcceptedCommit;

/// Rewrite local state to match the server's authoritative commit result.
///
/// The caller holds the state write lock for the whole call, so the steps
/// appear atomic to every other reader: the working reference never
/// disagrees with the staged set about what has been committed.
///
/// Draining the staged set in the same pass that attaches metadata makes
/// reconciliation idempotent; a second call with the same result finds an
/// empty set and notifies no one.
pub(crate) fn reconcile_after_commit(
    state: &mut CommitState,
    ctx: &BranchContext,
    intent: &CommitIntent,
    accepted: &AcceptedCommit,
    listeners: &ListenerRegistry,
    navigator: &dyn Navigator,
) {
    let last_commit = LastCommit {
        commit_path: commit_web_path(&ctx.web_url, &accepted.id),
        id: accepted.id.clone(),
        message: accepted.message.clone(),
        authored_date: accepted.committed_date,
        author_name: accepted.committer_name.clone(),
    };

    state.branch.working_reference = accepted.id.clone();
    state.branch.last_commit = Some(last_commit.clone());

    for (path, mut edit) in std::mem::take(&mut state.staged) {
        edit.last_commit = Some(last_commit.clone());
        edit.raw_content = edit.content.clone();
        listeners.notify(&path, &edit.raw_content);
    }

    debug!(
        "Reconciled {} to {}; staged set cleared",
        ctx.branch_id, accepted.id
    );

    if intent.create_new_branch {
        if let Some(active_path) = &state.active_path {
            navigator.navigate_to(&blob_route(
                &ctx.project_id,
                &intent.target_branch_name,
                active_path,
            ));
        }
    }

    state.pending_follow_up = FollowUpAction::StayOnCurrentBranch;
}
