use std::path::Path;

use chrono::{DateTime, Local};

use crate::config::SummaryLimits;
use crate::domain::change::ChangeStats;
use crate::domain::commit::{AuthorIdentity, Commit};
use crate::domain::window::LookbackWindow;
use crate::services::TokenUsage;

const REPORT_BRANCHES: usize = 5;
const REPORT_FILES: usize = 15;
const REPORT_FILE_TYPES: usize = 5;
const REPORT_COMMITS: usize = 10;
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S %:z";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportOutcome {
    Summarized { bullets: Vec<String> },
    NoCommits,
}

#[derive(Debug, Clone)]
pub struct SummaryReport {
    pub author: AuthorIdentity,
    pub generated_at: DateTime<Local>,
    pub window: LookbackWindow,
    pub outcome: ReportOutcome,
    pub stats: ChangeStats,
    pub commits: Vec<Commit>,
    /// Matching commits before the analysis cap was applied.
    pub total_found: usize,
    pub limits: SummaryLimits,
    pub usage: Option<TokenUsage>,
}

impl SummaryReport {
    pub fn bullets(&self) -> &[String] {
        match &self.outcome {
            ReportOutcome::Summarized { bullets } => bullets,
            ReportOutcome::NoCommits => &[],
        }
    }

    pub fn no_commits_message(&self) -> String {
        format!(
            "No commits found in the last {} hours across any branch.",
            self.window.hours
        )
    }

    pub fn render_markdown(&self, log_file: Option<&Path>) -> String {
        let generated = self.generated_at.format(TIMESTAMP_FORMAT);

        let mut out = format!(
            "# Git Activity Summary\n\n\
             **Author:** {}  \n\
             **Generated:** {generated}  \n\
             **Period:** last {} hours (since {})  \n\
             **Branches:** {}\n\n",
            self.author,
            self.window.hours,
            self.window.since.format(TIMESTAMP_FORMAT),
            self.branch_line()
        );

        out.push_str("## Quick Stats\n\n");
        if self.total_found > self.commits.len() {
            out.push_str(&format!(
                "- **Commits:** {} (limited to the {} most recent)\n",
                self.total_found,
                self.commits.len()
            ));
        } else {
            out.push_str(&format!("- **Commits:** {}\n", self.stats.total_commits));
        }
        out.push_str(&format!(
            "- **Files modified:** {}\n\
             - **Lines:** +{} / -{}\n\
             - **Branches touched:** {}\n\n",
            self.stats.total_files(),
            self.stats.insertions,
            self.stats.deletions,
            self.stats.branches.len()
        ));

        out.push_str("## Summary\n\n");
        match &self.outcome {
            ReportOutcome::Summarized { bullets } => {
                for bullet in bullets {
                    out.push_str(&format!("- {bullet}\n"));
                }
            }
            ReportOutcome::NoCommits => {
                out.push_str(&format!("{}\n", self.no_commits_message()));
            }
        }
        out.push('\n');

        if !self.stats.files.is_empty() {
            out.push_str("## Files Modified\n\n");
            for path in self.stats.files.iter().take(REPORT_FILES) {
                out.push_str(&format!("- `{path}`\n"));
            }
            if self.stats.files.len() > REPORT_FILES {
                out.push_str(&format!(
                    "- ... and {} more files\n",
                    self.stats.files.len() - REPORT_FILES
                ));
            }
            out.push('\n');
        }

        let file_types = self.stats.top_file_types(REPORT_FILE_TYPES);
        if !file_types.is_empty() {
            out.push_str("## File Types\n\n");
            for (ext, count) in file_types {
                out.push_str(&format!("- `{ext}`: {count}\n"));
            }
            out.push('\n');
        }

        if !self.commits.is_empty() {
            out.push_str("## Recent Commits\n\n");
            for (index, commit) in self.commits.iter().take(REPORT_COMMITS).enumerate() {
                out.push_str(&format!(
                    "{}. **{}** [{}] {}\n",
                    index + 1,
                    commit.short_hash(),
                    commit.branch,
                    commit.message
                ));
            }
            if self.commits.len() > REPORT_COMMITS {
                out.push_str(&format!(
                    "   ... and {} more commits\n",
                    self.commits.len() - REPORT_COMMITS
                ));
            }
            out.push('\n');
        }

        out.push_str(&format!(
            "---\n\
             *Generated by worklog at {generated}*  \n\
             *Configuration: max {} commits, {} bullets, {} words each*\n",
            self.limits.max_commits, self.limits.max_bullets, self.limits.max_words_per_bullet
        ));
        if let Some(usage) = &self.usage {
            out.push_str(&format!(
                "*Tokens: {} prompt + {} completion = {} total (est. ${:.4})*  \n",
                usage.prompt_tokens,
                usage.completion_tokens,
                usage.total_tokens,
                usage.estimated_cost_usd()
            ));
        }
        if let Some(path) = log_file {
            out.push_str(&format!("*Log file: {}*\n", path.display()));
        }

        out
    }

    fn branch_line(&self) -> String {
        let branches = &self.stats.branches;
        if branches.is_empty() {
            return "none".to_string();
        }
        let shown = branches
            .iter()
            .take(REPORT_BRANCHES)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        if branches.len() > REPORT_BRANCHES {
            format!("{shown}...")
        } else {
            shown
        }
    }
}
