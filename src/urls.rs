//! Builders for the client-side routes and web links the workflow emits.

use url::form_urlencoded;

/// URL of the merge-request creation form for a branch that was just pushed.
pub fn new_merge_request_url(web_url: &str, source_branch: &str, target_branch: &str) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("merge_request[source_branch]", source_branch)
        .append_pair("merge_request[target_branch]", target_branch)
        .finish();
    format!(
        "{}/merge_requests/new?{}",
        web_url.trim_end_matches('/'),
        query
    )
}

/// Client-side route showing `file_path` on `branch`, used for post-commit
/// navigation when the commit created a new branch.
pub fn blob_route(project_id: &str, branch: &str, file_path: &str) -> String {
    format!("/project/{}/blob/{}/{}", project_id, branch, file_path)
}

/// Web link of a commit, denormalized into last-commit metadata.
pub fn commit_web_path(web_url: &str, commit_id: &str) -> String {
    format!("{}/commit/{}", web_url.trim_end_matches('/'), commit_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_request_url_encodes_both_branches() {
        let url = new_merge_request_url(
            "https://gitlab.example.com/group/project/",
            "feature-x",
            "main",
        );
        assert_eq!(
            url,
            "https://gitlab.example.com/group/project/merge_requests/new?\
             merge_request%5Bsource_branch%5D=feature-x&merge_request%5Btarget_branch%5D=main"
        );
    }

    #[test]
    fn blob_route_includes_branch_and_path() {
        assert_eq!(
            blob_route("group/project", "feature-x", "src/app.js"),
            "/project/group/project/blob/feature-x/src/app.js"
        );
    }

    #[test]
    fn commit_web_path_joins_cleanly() {
        assert_eq!(
            commit_web_path("https://gitlab.example.com/group/project", "deadbeef"),
            "https://gitlab.example.com/group/project/commit/deadbeef"
        );
    }
}
