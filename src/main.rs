mod cmd;
mod config;
mod context;
mod domain;
mod error;
mod infra;
mod logging;
mod output;
mod services;
mod workflow;

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, NaiveTime};
use clap::{Args, Parser, Subcommand};
use tracing::{error, info, warn};

use crate::cmd::config::{self as config_cmd, ConfigArgs};
use crate::cmd::summarize::{self, SummarizeCommandArgs};
use crate::config::{API_KEY_ENV, AppConfig, ConfigOverrides};
use crate::context::AppContext;
use crate::error::{AppError, AppResult};

const DEFAULT_SCHEDULE_TIME: &str = "02:30";

#[derive(Parser)]
#[command(
    name = "worklog",
    author,
    version,
    about = "Summarize your recent commits across every branch"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Collect your commits from the lookback window and write an AI summary.
    Summarize(SummarizeArgs),
    /// Manage CLI configuration.
    Config(ConfigArgs),
}

#[derive(Args)]
struct SummarizeArgs {
    /// Hours back to analyze (default 24, or the configured value).
    #[arg(long)]
    hours: Option<u32>,
    /// Print the report without saving it to a file.
    #[arg(long)]
    no_save: bool,
    /// Only log warnings and errors; do not print the report.
    #[arg(short, long)]
    quiet: bool,
    /// Log debug details, including every git invocation.
    #[arg(short, long)]
    verbose: bool,
    /// OpenAI API key (overrides the environment and config file).
    #[arg(long)]
    api_key: Option<String>,
    /// Match commits by this name or email instead of the git identity.
    #[arg(long)]
    author: Option<String>,
    /// Repository to analyze (defaults to the current directory).
    #[arg(long)]
    repo: Option<PathBuf>,
    /// Directory for the report and log files.
    #[arg(long)]
    output_dir: Option<PathBuf>,
    /// Wait until the next scheduled time before running.
    #[arg(long)]
    schedule: bool,
    /// Local time of day for --schedule, as HH:MM (default 02:30).
    #[arg(long, value_parser = parse_time_of_day, requires = "schedule")]
    at: Option<NaiveTime>,
}

fn parse_time_of_day(value: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M")
        .map_err(|err| format!("expected HH:MM, got '{value}': {err}"))
}

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> AppResult<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Config(args) => {
            config_cmd::run(args.command)?;
            Ok(())
        }
        Commands::Summarize(args) => run_summarize(args).await,
    }
}

async fn run_summarize(args: SummarizeArgs) -> AppResult<()> {
    let workspace_root = match args.repo.clone() {
        Some(repo) => repo,
        None => std::env::current_dir()?,
    };
    let config = AppConfig::load(
        &workspace_root,
        ConfigOverrides {
            api_key: args.api_key.clone(),
            hours: args.hours,
            output_dir: args.output_dir.clone(),
        },
    )?;

    let schedule_at = if args.schedule {
        Some(match args.at {
            Some(at) => at,
            None => parse_time_of_day(DEFAULT_SCHEDULE_TIME).map_err(|err| {
                AppError::Configuration(format!("invalid default schedule: {err}"))
            })?,
        })
    } else {
        None
    };
    let now = Local::now();
    let run_at = schedule_at.map(|at| summarize::next_occurrence(now, at));

    let log_file = log_file_path(&config.output_dir, now, run_at);
    logging::init(
        logging::console_level(args.quiet, args.verbose),
        Some(&log_file),
    )?;

    if config.openai_api_key.is_none() {
        warn!(
            "OpenAI API key not configured (set {API_KEY_ENV} or pass --api-key); summaries will fail."
        );
    }

    let context = AppContext::from_config(config)?;

    let outcome = summarize::run(
        &context,
        SummarizeCommandArgs {
            author: args.author,
            save: !args.no_save,
            run_at,
        },
        Some(&log_file),
    )
    .await
    .inspect_err(|err| error!(%err, "summary run failed"))?;

    info!(
        commits = outcome.report.commits.len(),
        log_file = %log_file.display(),
        "analysis completed"
    );
    if !args.quiet {
        println!("{}", outcome.markdown);
        if let Some(path) = &outcome.saved_to {
            println!("Report saved to: {}", path.display());
        }
    }

    Ok(())
}

/// Log path dated by when the run starts, which is `run_at` when scheduled.
fn log_file_path(
    output_dir: &Path,
    now: DateTime<Local>,
    run_at: Option<DateTime<Local>>,
) -> PathBuf {
    output_dir.join(output::log_file_name(run_at.unwrap_or(now)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_summarize_flags() {
        let cli = Cli::try_parse_from([
            "worklog",
            "summarize",
            "--hours",
            "48",
            "--no-save",
            "--quiet",
            "--author",
            "ada@example.com",
            "--schedule",
            "--at",
            "07:45",
        ])
        .expect("parse");

        let Commands::Summarize(args) = cli.command else {
            panic!("expected summarize");
        };
        assert_eq!(args.hours, Some(48));
        assert!(args.no_save && args.quiet && args.schedule);
        assert_eq!(args.author.as_deref(), Some("ada@example.com"));
        assert_eq!(args.at, NaiveTime::from_hms_opt(7, 45, 0));
    }

    #[test]
    fn at_requires_schedule() {
        assert!(Cli::try_parse_from(["worklog", "summarize", "--at", "07:45"]).is_err());
        assert!(Cli::try_parse_from(["worklog", "summarize", "--schedule", "--at", "7pm"]).is_err());
    }

    #[test]
    fn default_schedule_time_parses() {
        assert_eq!(
            parse_time_of_day(DEFAULT_SCHEDULE_TIME),
            Ok(NaiveTime::from_hms_opt(2, 30, 0).unwrap())
        );
    }

    #[test]
    fn scheduled_run_logs_to_the_day_it_fires() {
        use chrono::TimeZone;

        let now = Local.with_ymd_and_hms(2026, 10, 15, 12, 0, 0).unwrap();
        let at = parse_time_of_day(DEFAULT_SCHEDULE_TIME).unwrap();
        let run_at = summarize::next_occurrence(now, at);

        assert_eq!(
            log_file_path(Path::new("out"), now, Some(run_at)),
            PathBuf::from("out/worklog_20261016.log")
        );
        assert_eq!(
            log_file_path(Path::new("out"), now, None),
            PathBuf::from("out/worklog_20261015.log")
        );
    }
}
