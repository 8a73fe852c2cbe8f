//! User-facing text helpers: commit summaries and HTML sanitization.

use std::sync::OnceLock;

use regex::Regex;

use crate::api::CommitStats;

fn html_tag_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"<[^>]*>").expect("valid html tag pattern"))
}

/// Strip HTML tags from server-provided text before showing it to the user.
pub fn strip_html(input: &str) -> String {
    let stripped = html_tag_pattern().replace_all(input, "");
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Human-readable summary of a successful commit, published as the
/// "last commit message" after submission.
pub fn commit_summary(short_id: &str, stats: Option<&CommitStats>) -> String {
    match stats {
        Some(stats) => format!(
            "Your changes have been committed. Commit {} with {} additions, {} deletions.",
            short_id, stats.additions, stats.deletions
        ),
        None => format!("Your changes have been committed. Commit {}", short_id),
    }
}
