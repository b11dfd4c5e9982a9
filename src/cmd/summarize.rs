use std::path::{Path, PathBuf};

use chrono::{DateTime, Days, Duration, Local, NaiveTime, TimeZone};
use tracing::info;

use crate::context::AppContext;
use crate::domain::report::SummaryReport;
use crate::error::AppResult;
use crate::output;
use crate::workflow::digest::{DigestRequest, generate_digest};

#[derive(Debug, Clone)]
pub struct SummarizeCommandArgs {
    pub author: Option<String>,
    pub save: bool,
    /// Sleep until this instant before running.
    pub run_at: Option<DateTime<Local>>,
}

pub struct SummarizeOutcome {
    pub report: SummaryReport,
    pub markdown: String,
    pub saved_to: Option<PathBuf>,
}

pub async fn run(
    ctx: &AppContext,
    args: SummarizeCommandArgs,
    log_file: Option<&Path>,
) -> AppResult<SummarizeOutcome> {
    if let Some(target) = args.run_at {
        wait_until(target).await;
    }

    let now = Local::now();
    info!(hours = ctx.config.hours, "analyzing commits across all branches");
    let report = generate_digest(
        ctx,
        DigestRequest {
            now,
            author: args.author,
        },
    )
    .await?;
    info!(bullets = report.bullets().len(), "report ready");
    let markdown = report.render_markdown(log_file);

    let saved_to = if args.save {
        let path = output::save_report(
            &ctx.config.output_dir,
            &output::report_file_name(now),
            &markdown,
        )?;
        info!(path = %path.display(), "report saved");
        Some(path)
    } else {
        None
    };

    Ok(SummarizeOutcome {
        report,
        markdown,
        saved_to,
    })
}

async fn wait_until(target: DateTime<Local>) {
    let delay = (target - Local::now()).to_std().unwrap_or_default();
    info!(
        next_run = %target.format("%Y-%m-%d %H:%M:%S %:z"),
        wait_secs = delay.as_secs(),
        "scheduled run"
    );
    tokio::time::sleep(delay).await;
}

/// First local instant strictly after `now` whose wall-clock time is `at`.
pub fn next_occurrence(now: DateTime<Local>, at: NaiveTime) -> DateTime<Local> {
    (0..=2)
        .filter_map(|offset| now.date_naive().checked_add_days(Days::new(offset)))
        .filter_map(|date| Local.from_local_datetime(&date.and_time(at)).earliest())
        .find(|candidate| *candidate > now)
        .unwrap_or_else(|| now + Duration::days(1))
}
