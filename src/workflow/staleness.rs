//! Branch staleness pre-check.

use tracing::{debug, warn};

use crate::api::CommitGateway;
use crate::domain::BranchContext;
use crate::error::CommitError;

/// Compare the branch's server-side HEAD with the locally held working
/// reference.
///
/// `Ok(true)` means the branch has moved since editing began. A transport
/// failure is an error, not "not stale": the caller must treat it as
/// "cannot proceed safely".
pub(crate) async fn branch_has_moved(
    gateway: &dyn CommitGateway,
    ctx: &BranchContext,
    working_reference: &str,
) -> Result<bool, CommitError> {
    debug!(
        "Checking whether {}@{} moved past {}",
        ctx.project_id, ctx.branch_id, working_reference
    );

    let current = gateway
        .fetch_branch_reference(&ctx.project_id, &ctx.branch_id)
        .await
        .map_err(|source| CommitError::StalenessCheck { source })?;

    let moved = current != working_reference;
    if moved {
        warn!(
            "Branch {} moved from {} to {} since editing began",
            ctx.branch_id, working_reference, current
        );
    }

    Ok(moved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{CommitRequest, CommitResponse, GatewayError};
    use async_trait::async_trait;

    struct FixedReference(Result<String, u16>);

    #[async_trait]
    impl CommitGateway for FixedReference {
        async fn fetch_branch_reference(
            &self,
            _project_id: &str,
            _branch_id: &str,
        ) -> Result<String, GatewayError> {
            match &self.0 {
                Ok(id) => Ok(id.clone()),
                Err(status) => Err(GatewayError::Http {
                    status: *status,
                    body: String::new(),
                }),
            }
        }

        async fn submit_commit(
            &self,
            _project_id: &str,
            _request: &CommitRequest,
        ) -> Result<CommitResponse, GatewayError> {
            unreachable!("staleness check never submits")
        }
    }

    fn ctx() -> BranchContext {
        BranchContext {
            project_id: "group/project".to_string(),
            branch_id: "main".to_string(),
            web_url: "https://gitlab.example.com/group/project".to_string(),
        }
    }

    #[tokio::test]
    async fn matching_reference_is_not_stale() {
        let gateway = FixedReference(Ok("abc".to_string()));
        let moved = branch_has_moved(&gateway, &ctx(), "abc").await.unwrap();
        assert!(!moved);
    }

    #[tokio::test]
    async fn advanced_reference_is_stale() {
        let gateway = FixedReference(Ok("def".to_string()));
        let moved = branch_has_moved(&gateway, &ctx(), "abc").await.unwrap();
        assert!(moved);
    }

    #[tokio::test]
    async fn fetch_failure_is_an_error_not_fresh() {
        let gateway = FixedReference(Err(503));
        let result = branch_has_moved(&gateway, &ctx(), "abc").await;
        assert!(matches!(result, Err(CommitError::StalenessCheck { .. })));
    }
}
