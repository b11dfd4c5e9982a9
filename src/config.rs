use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

const CONFIG_DIR_NAME: &str = "worklog";
const CONFIG_FILE_NAME: &str = "config.json";

pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_HOURS: u32 = 24;

pub const API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const MODEL_ENV: &str = "WORKLOG_MODEL";
pub const BASE_URL_ENV: &str = "WORKLOG_OPENAI_BASE_URL";

/// Bounds applied to collection and summarization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryLimits {
    pub max_commits: usize,
    pub max_bullets: usize,
    pub max_words_per_bullet: usize,
}

impl Default for SummaryLimits {
    fn default() -> Self {
        Self {
            max_commits: 50,
            max_bullets: 6,
            max_words_per_bullet: 100,
        }
    }
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub openai_base_url: String,
    pub hours: u32,
    pub limits: SummaryLimits,
    pub workspace_root: PathBuf,
    pub output_dir: PathBuf,
}

/// Values supplied on the command line; they win over everything else.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub api_key: Option<String>,
    pub hours: Option<u32>,
    pub output_dir: Option<PathBuf>,
}

impl AppConfig {
    pub fn load(workspace_root: &Path, overrides: ConfigOverrides) -> AppResult<Self> {
        let stored = StoredConfig::load()?;
        Self::resolve(stored, overrides, workspace_root, |key| env::var(key).ok())
    }

    pub fn resolve(
        stored: StoredConfig,
        overrides: ConfigOverrides,
        workspace_root: &Path,
        env_lookup: impl Fn(&str) -> Option<String>,
    ) -> AppResult<Self> {
        let from_env = |key: &str| env_lookup(key).filter(|value| !value.trim().is_empty());
        let defaults = SummaryLimits::default();

        let limits = SummaryLimits {
            max_commits: stored.max_commits.unwrap_or(defaults.max_commits),
            max_bullets: stored.max_bullets.unwrap_or(defaults.max_bullets),
            max_words_per_bullet: stored
                .max_words_per_bullet
                .unwrap_or(defaults.max_words_per_bullet),
        };
        let hours = overrides
            .hours
            .or(stored.default_hours)
            .unwrap_or(DEFAULT_HOURS);

        if hours == 0 {
            return Err(AppError::Configuration(
                "lookback hours must be greater than zero".to_string(),
            ));
        }
        if limits.max_commits == 0 || limits.max_bullets == 0 || limits.max_words_per_bullet == 0
        {
            return Err(AppError::Configuration(
                "commit, bullet and word limits must be greater than zero".to_string(),
            ));
        }

        let output_dir = overrides
            .output_dir
            .or(stored.output_dir.map(PathBuf::from))
            .unwrap_or_else(|| workspace_root.to_path_buf());

        Ok(Self {
            openai_api_key: overrides
                .api_key
                .or_else(|| from_env(API_KEY_ENV))
                .or(stored.openai_api_key),
            openai_model: from_env(MODEL_ENV)
                .or(stored.openai_model)
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            openai_base_url: from_env(BASE_URL_ENV)
                .or(stored.openai_base_url)
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            hours,
            limits,
            workspace_root: workspace_root.to_path_buf(),
            output_dir,
        })
    }
}

/// On-disk configuration edited by `worklog config init`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoredConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openai_api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openai_model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openai_base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_hours: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_commits: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_bullets: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_words_per_bullet: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<String>,
}

impl StoredConfig {
    pub fn load() -> AppResult<Self> {
        Self::load_from(&config_file_path()?)
    }

    pub fn load_from(path: &Path) -> AppResult<Self> {
        match fs::read_to_string(path) {
            Ok(contents) => serde_json::from_str(&contents).map_err(|err| {
                AppError::Configuration(format!("invalid config file {}: {err}", path.display()))
            }),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(AppError::Io(err)),
        }
    }

    pub fn save(&self) -> AppResult<()> {
        self.save_to(&config_file_path()?)
    }

    pub fn save_to(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(self)
            .map_err(|err| AppError::Configuration(format!("failed to write config: {err}")))?;
        fs::write(path, data)?;
        Ok(())
    }
}

pub fn config_directory() -> AppResult<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join(CONFIG_DIR_NAME))
        .ok_or_else(|| {
            AppError::Configuration("unable to determine the user config directory".to_string())
        })
}

pub fn config_file_path() -> AppResult<PathBuf> {
    Ok(config_directory()?.join(CONFIG_FILE_NAME))
}
