use async_trait::async_trait;

use crate::error::AppResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

/// USD per 1K tokens at gpt-3.5-turbo list prices.
const PROMPT_PRICE_PER_1K: f64 = 0.0015;
const COMPLETION_PRICE_PER_1K: f64 = 0.002;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

impl TokenUsage {
    /// Rough spend for this request; other models are priced differently.
    pub fn estimated_cost_usd(&self) -> f64 {
        (self.prompt_tokens as f64 * PROMPT_PRICE_PER_1K
            + self.completion_tokens as f64 * COMPLETION_PRICE_PER_1K)
            / 1000.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub text: String,
    pub usage: Option<TokenUsage>,
}

#[async_trait]
pub trait LanguageModelService: Send + Sync {
    async fn complete(&self, prompt: &Prompt) -> AppResult<Completion>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estimates_cost_from_token_counts() {
        let usage = TokenUsage {
            prompt_tokens: 1000,
            completion_tokens: 500,
            total_tokens: 1500,
        };
        assert!((usage.estimated_cost_usd() - 0.0025).abs() < 1e-9);
        assert_eq!(TokenUsage::default().estimated_cost_usd(), 0.0);
    }
}
