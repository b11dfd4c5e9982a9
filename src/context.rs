use std::sync::Arc;

use crate::config::AppConfig;
use crate::error::AppResult;
use crate::infra::git::GitCli;
use crate::infra::llm::OpenAiClient;
use crate::services::{LanguageModelService, VersionControlService};

/// Resolved configuration plus the services a digest run talks to.
#[derive(Clone)]
pub struct AppContext {
    pub config: AppConfig,
    pub version_control: Arc<dyn VersionControlService>,
    pub language_model: Arc<dyn LanguageModelService>,
}

impl AppContext {
    pub fn new(
        config: AppConfig,
        version_control: Arc<dyn VersionControlService>,
        language_model: Arc<dyn LanguageModelService>,
    ) -> Self {
        Self {
            config,
            version_control,
            language_model,
        }
    }

    /// Wires the git CLI and the OpenAI client for `config`.
    pub fn from_config(config: AppConfig) -> AppResult<Self> {
        let language_model = Arc::new(OpenAiClient::new(
            config.openai_api_key.clone(),
            config.openai_model.clone(),
            config.openai_base_url.clone(),
        )?);
        let version_control = Arc::new(GitCli::new(config.workspace_root.clone()));
        Ok(Self::new(config, version_control, language_model))
    }
}
