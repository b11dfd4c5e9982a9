use chrono::{DateTime, Local};
use tracing::info;

use crate::context::AppContext;
use crate::domain::change::ChangeStats;
use crate::domain::commit::AuthorIdentity;
use crate::domain::report::{ReportOutcome, SummaryReport};
use crate::domain::window::LookbackWindow;
use crate::error::{AppError, AppResult};
use crate::workflow::collect::collect_commits;
use crate::workflow::summary::request_summary;

#[derive(Debug, Clone)]
pub struct DigestRequest {
    pub now: DateTime<Local>,
    /// Replaces the git-configured identity when set.
    pub author: Option<String>,
}

/// Collects the current user's recent commits and summarizes them.
///
/// An empty window is not an error: it yields a [`ReportOutcome::NoCommits`]
/// report without contacting the language model.
pub async fn generate_digest(
    ctx: &AppContext,
    request: DigestRequest,
) -> AppResult<SummaryReport> {
    if !ctx.version_control.is_repository().await? {
        return Err(AppError::NotARepository(ctx.config.workspace_root.clone()));
    }

    let author = match request.author {
        Some(pattern) => AuthorIdentity::new(pattern.clone(), pattern),
        None => ctx.version_control.current_identity().await?,
    };
    if author.is_empty() {
        return Err(AppError::Configuration(
            "git user.name and user.email are not set; configure them or pass --author"
                .to_string(),
        ));
    }

    let limits = ctx.config.limits;
    let window = LookbackWindow::ending_at(request.now, ctx.config.hours);
    let collection =
        collect_commits(ctx.version_control.as_ref(), &author, &window, limits.max_commits).await;
    let stats = ChangeStats::from_commits(&collection.commits);

    let (outcome, usage) = if collection.is_empty() {
        info!(
            hours = window.hours,
            branches = collection.branches_scanned,
            "no commits found in the lookback window"
        );
        (ReportOutcome::NoCommits, None)
    } else {
        info!(
            commits = stats.total_commits,
            files = stats.total_files(),
            branches = stats.branches.len(),
            truncated = collection.is_truncated(),
            "analyzed commits"
        );
        let summary = request_summary(
            ctx.language_model.as_ref(),
            &collection.commits,
            &stats,
            &limits,
        )
        .await?;
        (
            ReportOutcome::Summarized {
                bullets: summary.bullets,
            },
            summary.usage,
        )
    };

    Ok(SummaryReport {
        author,
        generated_at: request.now,
        window,
        outcome,
        stats,
        total_found: collection.total_found,
        commits: collection.commits,
        limits,
        usage,
    })
}
