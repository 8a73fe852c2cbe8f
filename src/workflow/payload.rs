//! Payload builder: staged edits in, commit request body out.

use std::collections::BTreeMap;

use crate::api::{CommitAction, CommitActionKind, CommitRequest};
use crate::domain::{CommitIntent, EditKind, StagedEdit};
use crate::error::CommitError;

/// Assemble the commit request for one attempt.
///
/// Pure; the only failure is an empty staged set, raised before any network
/// call. `start_branch` is set when the intent creates a new branch so the
/// server forks it from the branch editing began on.
pub fn build_commit_payload(
    intent: &CommitIntent,
    current_branch: &str,
    staged: &BTreeMap<String, StagedEdit>,
) -> Result<CommitRequest, CommitError> {
    if staged.is_empty() {
        return Err(CommitError::EmptyCommit);
    }

    let actions = staged.values().map(file_action).collect();

    Ok(CommitRequest {
        branch: intent.target_branch_name.clone(),
        commit_message: intent.message.clone(),
        actions,
        start_branch: intent
            .create_new_branch
            .then(|| current_branch.to_string()),
    })
}

fn file_action(edit: &StagedEdit) -> CommitAction {
    let (action, content) = match edit.kind {
        EditKind::Create => (CommitActionKind::Create, Some(edit.content.clone())),
        EditKind::Update => (CommitActionKind::Update, Some(edit.content.clone())),
        EditKind::Delete => (CommitActionKind::Delete, None),
    };

    CommitAction {
        action,
        file_path: edit.path.clone(),
        content,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FollowUpAction;

    fn intent(target: &str, create_new_branch: bool) -> CommitIntent {
        CommitIntent {
            target_branch_name: target.to_string(),
            create_new_branch,
            follow_up: if create_new_branch {
                FollowUpAction::SwitchToNewBranch
            } else {
                FollowUpAction::StayOnCurrentBranch
            },
            message: "update files".to_string(),
        }
    }

    fn staged(edits: Vec<StagedEdit>) -> BTreeMap<String, StagedEdit> {
        edits
            .into_iter()
            .map(|edit| (edit.path.clone(), edit))
            .collect()
    }

    #[test]
    fn empty_staged_set_is_an_error() {
        let result = build_commit_payload(&intent("main", false), "main", &BTreeMap::new());
        assert!(matches!(result, Err(CommitError::EmptyCommit)));
    }

    #[test]
    fn actions_inferred_per_edit_kind() {
        let staged = staged(vec![
            StagedEdit::new("new.txt", "fresh", EditKind::Create),
            StagedEdit::new("a.txt", "changed", EditKind::Update),
            StagedEdit::new("old.txt", "", EditKind::Delete),
        ]);

        let payload = build_commit_payload(&intent("main", false), "main", &staged).unwrap();
        assert_eq!(payload.branch, "main");
        assert_eq!(payload.commit_message, "update files");
        assert!(payload.start_branch.is_none());
        assert_eq!(payload.actions.len(), 3);

        let by_path: BTreeMap<_, _> = payload
            .actions
            .iter()
            .map(|action| (action.file_path.as_str(), action))
            .collect();
        assert_eq!(by_path["new.txt"].action, CommitActionKind::Create);
        assert_eq!(by_path["a.txt"].action, CommitActionKind::Update);
        assert_eq!(by_path["old.txt"].action, CommitActionKind::Delete);
        assert!(by_path["old.txt"].content.is_none());
        assert_eq!(by_path["a.txt"].content.as_deref(), Some("changed"));
    }

    #[test]
    fn new_branch_commit_records_start_branch() {
        let staged = staged(vec![StagedEdit::new("a.txt", "changed", EditKind::Update)]);
        let payload = build_commit_payload(&intent("feature-x", true), "main", &staged).unwrap();
        assert_eq!(payload.branch, "feature-x");
        assert_eq!(payload.start_branch.as_deref(), Some("main"));
    }
}
