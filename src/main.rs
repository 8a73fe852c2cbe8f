use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use commitflow::{
    shared_state, ApiClient, BranchContext, BranchState, CommitGateway, CommitIntent,
    CommitOutcome, CommitState, CommitWorkflow, ConfirmationPort, Decision, EditKind,
    FollowUpAction, ListenerRegistry, Navigator, Severity, StagedEdit, UiShell,
};

/// Commitflow CLI - stage files and drive one commit attempt
#[derive(Parser)]
#[command(name = "commitflow")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Base API URL, e.g. https://gitlab.example.com/api/v4/
    #[arg(long, env = "COMMITFLOW_API_URL")]
    api_url: String,

    /// Access token, forwarded as a bearer token
    #[arg(long, env = "COMMITFLOW_TOKEN")]
    token: Option<String>,

    /// Project id or full path
    #[arg(short, long)]
    project: String,

    /// Branch currently checked out
    #[arg(short, long)]
    branch: String,

    /// Project web URL for commit and merge-request links; defaults to the
    /// API URL with the project path appended
    #[arg(long)]
    web_url: Option<String>,

    /// Commit message
    #[arg(short, long)]
    message: String,

    /// Commit to a new branch with this name instead of the current one
    #[arg(long)]
    new_branch: Option<String>,

    /// Open a merge request for the new branch after committing
    #[arg(long, requires = "new_branch")]
    merge_request: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Files whose on-disk content should be committed
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

/// Stdin-backed confirmation gate: y commits onto the moved branch,
/// anything else aborts.
struct TerminalConfirmation;

#[async_trait]
impl ConfirmationPort for TerminalConfirmation {
    async fn confirm_stale_branch_commit(&self) -> Decision {
        eprintln!("The branch has changed since you started editing. Commit anyway? [y/N]");
        let line = tokio::task::spawn_blocking(|| {
            let mut answer = String::new();
            std::io::stdin().read_line(&mut answer).map(|_| answer)
        })
        .await;

        match line {
            Ok(Ok(answer)) if answer.trim().eq_ignore_ascii_case("y") => Decision::Proceed,
            _ => Decision::Abort,
        }
    }
}

struct TerminalShell;

impl UiShell for TerminalShell {
    fn report_error(&self, message: &str, severity: Severity) {
        match severity {
            Severity::Alert => error!("{}", message),
            Severity::Notice => info!("{}", message),
        }
    }

    fn refresh_layout(&self) {
        // No layout to refresh on a terminal.
    }
}

struct TerminalNavigator;

impl Navigator for TerminalNavigator {
    fn navigate_to(&self, path: &str) {
        println!("Open: {}", path);
    }
}

/// Read each file's on-disk content into a staged edit. Files are staged
/// as updates; the server reports a failure if a path does not exist on
/// the target branch.
fn stage_files(files: &[PathBuf]) -> Result<Vec<StagedEdit>> {
    files
        .iter()
        .map(|file| {
            let content = std::fs::read_to_string(file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            Ok(StagedEdit::new(
                path_key(file),
                content,
                EditKind::Update,
            ))
        })
        .collect()
}

fn path_key(file: &Path) -> String {
    file.to_string_lossy().trim_start_matches("./").to_string()
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let gateway = Arc::new(
        ApiClient::new(&cli.api_url, cli.token.clone()).context("Invalid API URL")?,
    );

    // Refresh the working reference so the staleness check compares
    // against the HEAD we are editing from.
    let working_reference = gateway
        .fetch_branch_reference(&cli.project, &cli.branch)
        .await
        .with_context(|| format!("Failed to look up branch {}", cli.branch))?;
    info!("Branch {} is at {}", cli.branch, working_reference);

    let web_url = cli.web_url.clone().unwrap_or_else(|| {
        format!(
            "{}/{}",
            cli.api_url.trim_end_matches('/'),
            cli.project
        )
    });
    let ctx = BranchContext {
        project_id: cli.project.clone(),
        branch_id: cli.branch.clone(),
        web_url,
    };

    let mut commit_state = CommitState::new(BranchState::new(working_reference));
    for edit in stage_files(&cli.files)? {
        commit_state.stage(edit);
    }
    commit_state.update_draft_message(cli.message.clone());
    if let Some(new_branch) = &cli.new_branch {
        commit_state.set_new_branch_name(new_branch.clone());
        commit_state.set_pending_follow_up(if cli.merge_request {
            FollowUpAction::OpenMergeRequest
        } else {
            FollowUpAction::SwitchToNewBranch
        });
    }

    let intent = CommitIntent::from_pending(&commit_state, &ctx);
    let state = shared_state(commit_state);

    let workflow = CommitWorkflow::new(
        gateway,
        Arc::new(TerminalConfirmation),
        Arc::new(TerminalNavigator),
        Arc::new(TerminalShell),
        Arc::new(ListenerRegistry::new()),
    );

    match workflow.commit_changes(&ctx, &state, intent).await {
        Ok(CommitOutcome::Committed { summary, .. }) => {
            println!("{}", summary);
            Ok(())
        }
        Ok(CommitOutcome::MergeRequestRedirect { .. }) => Ok(()),
        Ok(CommitOutcome::AbortedByUser) => {
            warn!("Commit aborted");
            Ok(())
        }
        // Already reported through the shell; propagate for the exit code.
        Err(err) => Err(err.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn stage_files_reads_disk_content() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("notes.txt");
        let mut f = std::fs::File::create(&file).unwrap();
        writeln!(f, "hello").unwrap();

        let edits = stage_files(&[file.clone()]).unwrap();
        assert_eq!(edits.len(), 1);
        assert_eq!(edits[0].content, "hello\n");
        assert_eq!(edits[0].kind, EditKind::Update);
    }

    #[test]
    fn stage_files_fails_on_missing_file() {
        assert!(stage_files(&[PathBuf::from("/does/not/exist.txt")]).is_err());
    }

    #[test]
    fn path_key_drops_leading_dot_slash() {
        assert_eq!(path_key(Path::new("./src/app.js")), "src/app.js");
    }
}
