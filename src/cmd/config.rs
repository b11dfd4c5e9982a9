use std::io::{self, Write};
use std::str::FromStr;

use clap::{Args, Subcommand};

use crate::config::{
    DEFAULT_BASE_URL, DEFAULT_HOURS, DEFAULT_MODEL, StoredConfig, SummaryLimits, config_file_path,
};
use crate::error::AppResult;

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommand {
    /// Run the interactive configuration wizard.
    Init,
    /// Show the stored configuration (secrets masked).
    Show,
}

pub fn run(command: ConfigCommand) -> AppResult<()> {
    match command {
        ConfigCommand::Init => run_init(),
        ConfigCommand::Show => run_show(),
    }
}

fn run_init() -> AppResult<()> {
    let mut cfg = StoredConfig::load()?;

    println!("Configuring worklog.");
    println!("Press Enter to keep the current value, '-' to clear it.");
    println!("Secrets are stored in the local config file; protect your filesystem accordingly.");
    println!();

    apply_prompt("OpenAI API key", &mut cfg.openai_api_key, true)?;
    apply_prompt(
        &format!("Model (default {DEFAULT_MODEL})"),
        &mut cfg.openai_model,
        false,
    )?;
    apply_prompt(
        &format!("API base URL (default {DEFAULT_BASE_URL})"),
        &mut cfg.openai_base_url,
        false,
    )?;

    let defaults = SummaryLimits::default();
    apply_number_prompt(
        &format!("Default lookback hours (default {DEFAULT_HOURS})"),
        &mut cfg.default_hours,
    )?;
    apply_number_prompt(
        &format!("Max commits to analyze (default {})", defaults.max_commits),
        &mut cfg.max_commits,
    )?;
    apply_number_prompt(
        &format!("Max bullet points (default {})", defaults.max_bullets),
        &mut cfg.max_bullets,
    )?;
    apply_number_prompt(
        &format!(
            "Max words per bullet (default {})",
            defaults.max_words_per_bullet
        ),
        &mut cfg.max_words_per_bullet,
    )?;
    apply_prompt(
        "Report output directory (default: repository root)",
        &mut cfg.output_dir,
        false,
    )?;

    cfg.save()?;

    let path = config_file_path()?;
    println!("\nConfiguration saved to {}", path.display());
    Ok(())
}

fn run_show() -> AppResult<()> {
    let cfg = StoredConfig::load()?;
    let path = config_file_path()?;

    println!("Configuration file: {}", path.display());
    println!("OpenAI API key: {}", mask_secret(&cfg.openai_api_key));
    println!("Model: {}", display_value(&cfg.openai_model));
    println!("API base URL: {}", display_value(&cfg.openai_base_url));
    println!("Default hours: {}", display_number(cfg.default_hours));
    println!("Max commits: {}", display_number(cfg.max_commits));
    println!("Max bullets: {}", display_number(cfg.max_bullets));
    println!(
        "Max words per bullet: {}",
        display_number(cfg.max_words_per_bullet)
    );
    println!("Output directory: {}", display_value(&cfg.output_dir));

    Ok(())
}

fn apply_prompt(field: &str, target: &mut Option<String>, secret: bool) -> AppResult<()> {
    match prompt(field, target.as_deref(), secret)? {
        PromptAction::Keep => {}
        PromptAction::Clear => *target = None,
        PromptAction::Set(value) => *target = Some(value),
    }
    Ok(())
}

fn apply_number_prompt<T>(field: &str, target: &mut Option<T>) -> AppResult<()>
where
    T: FromStr + ToString,
{
    let current = target.as_ref().map(ToString::to_string);
    match prompt(field, current.as_deref(), false)? {
        PromptAction::Keep => {}
        PromptAction::Clear => *target = None,
        PromptAction::Set(value) => match value.parse::<T>() {
            Ok(number) => *target = Some(number),
            Err(_) => println!("'{value}' is not a valid number; keeping the previous value."),
        },
    }
    Ok(())
}

fn prompt(field: &str, current: Option<&str>, secret: bool) -> AppResult<PromptAction> {
    let mut stdout = io::stdout();

    match (current, secret) {
        (Some(_), true) => write!(stdout, "{field} [****] (Enter to keep, '-' to clear): ")?,
        (Some(value), false) => {
            write!(stdout, "{field} [{value}] (Enter to keep, '-' to clear): ")?
        }
        (None, _) => write!(stdout, "{field} (Enter to skip): ")?,
    }
    stdout.flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(PromptAction::from_input(&input))
}

fn display_value(value: &Option<String>) -> String {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .map(|v| v.to_string())
        .unwrap_or_else(|| "<not set>".to_string())
}

fn display_number<T: ToString>(value: Option<T>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| "<not set>".to_string())
}

fn mask_secret(value: &Option<String>) -> String {
    match value {
        Some(token) if token.len() > 6 => {
            let prefix = token.get(..3).unwrap_or_default();
            let suffix = token.get(token.len() - 3..).unwrap_or_default();
            format!("{prefix}***{suffix}")
        }
        Some(token) if !token.is_empty() => "***".to_string(),
        _ => "<not set>".to_string(),
    }
}

#[derive(Debug, PartialEq, Eq)]
enum PromptAction {
    Keep,
    Clear,
    Set(String),
}

impl PromptAction {
    fn from_input(input: &str) -> Self {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            PromptAction::Keep
        } else if trimmed == "-" {
            PromptAction::Clear
        } else {
            PromptAction::Set(trimmed.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_secrets() {
        assert_eq!(mask_secret(&Some("sk-abcdef123".to_string())), "sk-***123");
        assert_eq!(mask_secret(&Some("short".to_string())), "***");
        assert_eq!(mask_secret(&None), "<not set>");
    }

    #[test]
    fn interprets_prompt_input() {
        assert_eq!(PromptAction::from_input("\n"), PromptAction::Keep);
        assert_eq!(PromptAction::from_input(" - \n"), PromptAction::Clear);
        assert_eq!(
            PromptAction::from_input("gpt-4o-mini\n"),
            PromptAction::Set("gpt-4o-mini".to_string())
        );
    }

    #[test]
    fn displays_unset_values() {
        assert_eq!(display_value(&Some(String::new())), "<not set>");
        assert_eq!(display_number::<u32>(None), "<not set>");
        assert_eq!(display_number(Some(48u32)), "48");
    }
}
