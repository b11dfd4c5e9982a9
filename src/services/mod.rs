pub mod language_model;
pub mod version_control;

pub use language_model::{Completion, LanguageModelService, Prompt, TokenUsage};
pub use version_control::VersionControlService;
