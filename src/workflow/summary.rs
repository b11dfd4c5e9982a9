use tracing::info;

use crate::config::SummaryLimits;
use crate::domain::change::ChangeStats;
use crate::domain::commit::Commit;
use crate::error::{AppError, AppResult};
use crate::services::{LanguageModelService, Prompt, TokenUsage};

const PROMPT_COMMITS: usize = 20;
const PROMPT_FILES_PER_COMMIT: usize = 3;
const PROMPT_BRANCHES: usize = 5;
const PROMPT_FILE_TYPES: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryOutcome {
    pub bullets: Vec<String>,
    pub usage: Option<TokenUsage>,
}

/// Sends one completion request describing `commits` and turns the reply
/// into at most `limits.max_bullets` bullets.
pub async fn request_summary(
    model: &dyn LanguageModelService,
    commits: &[Commit],
    stats: &ChangeStats,
    limits: &SummaryLimits,
) -> AppResult<SummaryOutcome> {
    let prompt = build_prompt(commits, stats, limits);
    info!(
        max_bullets = limits.max_bullets,
        max_words = limits.max_words_per_bullet,
        "requesting summary"
    );

    let completion = model.complete(&prompt).await?;
    if let Some(usage) = completion.usage {
        info!(
            prompt_tokens = usage.prompt_tokens,
            completion_tokens = usage.completion_tokens,
            total_tokens = usage.total_tokens,
            estimated_cost_usd = usage.estimated_cost_usd(),
            "language model usage"
        );
    }

    let bullets = parse_bullets(&completion.text, limits);
    if bullets.is_empty() {
        return Err(AppError::LanguageModel(
            "language model returned no bullet points".to_string(),
        ));
    }
    info!(count = bullets.len(), "generated bullet points");

    Ok(SummaryOutcome {
        bullets,
        usage: completion.usage,
    })
}

pub fn build_prompt(commits: &[Commit], stats: &ChangeStats, limits: &SummaryLimits) -> Prompt {
    let bullets = limits.max_bullets;
    let words = limits.max_words_per_bullet;
    let shown = commits.len().min(PROMPT_COMMITS);

    let system = format!(
        "You are a senior software engineer reviewing a developer's recent work. \
         Provide exactly {bullets} high-level technical bullet points summarizing the major \
         accomplishments, not individual commits. Each bullet must be at most {words} words."
    );

    let mut user = String::from(
        "Summarize these git commits as a high-level technical overview of the work accomplished.\n\n",
    );
    user.push_str(&format!("COMMITS ANALYZED: {shown} of {}\n\n", commits.len()));
    user.push_str("COMMIT DETAILS:\n");
    for commit in commits.iter().take(PROMPT_COMMITS) {
        user.push_str(&format!("[{}] {}", commit.branch, commit.message));
        if !commit.files_changed.is_empty() {
            let files = commit
                .files_changed
                .iter()
                .take(PROMPT_FILES_PER_COMMIT)
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(", ");
            user.push_str(&format!(" (files: {files})"));
        }
        user.push('\n');
    }

    let branches = stats
        .branches
        .iter()
        .take(PROMPT_BRANCHES)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    let file_types = stats
        .top_file_types(PROMPT_FILE_TYPES)
        .into_iter()
        .map(|(ext, count)| format!("{ext}: {count}"))
        .collect::<Vec<_>>()
        .join(", ");

    user.push_str(&format!(
        "\nSTATISTICS:\n\
         - Total commits: {}\n\
         - Branches worked on: {branches}\n\
         - Files modified: {}\n\
         - Lines changed: +{} / -{}\n\
         - File types: {file_types}\n\n",
        stats.total_commits,
        stats.total_files(),
        stats.insertions,
        stats.deletions
    ));

    user.push_str(&format!(
        "Provide exactly {bullets} bullet points, each starting with \"- \" and at most {words} words:\n"
    ));
    user.push_str(
        "- Focus on major features, components, or architectural changes rather than individual fixes\n\
         - Include concrete numbers (files modified, components built, features added) where they help\n\
         - Group related changes together\n\
         - Prioritize impact: major features, then refactoring, then bug fixes, then minor changes",
    );

    Prompt { system, user }
}

/// Extracts bullet lines from model output.
///
/// Lines with a list marker win; if the reply has none, every non-empty line
/// counts. Output never exceeds `max_bullets` entries or
/// `max_words_per_bullet` words per entry.
pub fn parse_bullets(text: &str, limits: &SummaryLimits) -> Vec<String> {
    let lines = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>();
    let marked = lines
        .iter()
        .filter_map(|line| strip_marker(line))
        .collect::<Vec<_>>();
    let candidates = if marked.is_empty() { lines } else { marked };

    candidates
        .into_iter()
        .map(strip_quotes)
        .map(|bullet| truncate_words(bullet, limits.max_words_per_bullet))
        .filter(|bullet| !bullet.is_empty())
        .take(limits.max_bullets)
        .collect()
}

fn strip_marker(line: &str) -> Option<&str> {
    if let Some(rest) = line.strip_prefix('•') {
        return Some(rest.trim_start());
    }
    for marker in ['-', '*', '+'] {
        if let Some(rest) = line.strip_prefix(marker) {
            if rest.starts_with(char::is_whitespace) {
                return Some(rest.trim_start());
            }
        }
    }

    let digits = line.chars().take_while(char::is_ascii_digit).count();
    if digits > 0 {
        let rest = &line[digits..];
        let rest = rest.strip_prefix('.').or_else(|| rest.strip_prefix(')'))?;
        if rest.starts_with(char::is_whitespace) {
            return Some(rest.trim_start());
        }
    }
    None
}

fn strip_quotes(bullet: &str) -> &str {
    let bullet = bullet.trim();
    for (open, close) in [('"', '"'), ('\u{201c}', '\u{201d}')] {
        if let Some(inner) = bullet
            .strip_prefix(open)
            .and_then(|rest| rest.strip_suffix(close))
        {
            return inner.trim();
        }
    }
    bullet
}

fn truncate_words(bullet: &str, max_words: usize) -> String {
    bullet
        .split_whitespace()
        .take(max_words)
        .collect::<Vec<_>>()
        .join(" ")
}
