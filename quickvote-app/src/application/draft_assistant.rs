use crate::infrastructure::cerebras::{
    build_category_prompt, build_options_prompt, build_refine_prompt, parse_category_reply,
    parse_options_reply, parse_refined_reply, CerebrasClient, Sampling,
};
use crate::infrastructure::security::{CostTracker, InputSanitizer};
use quickvote_errors::AppError;
use std::sync::Arc;

/// The three AI drafting helpers. Each validates first, then spends from the
/// daily budget, then makes exactly one model call.
pub struct DraftAssistant {
    client: CerebrasClient,
    budget: Arc<CostTracker>,
}

impl DraftAssistant {
    pub fn new(client: CerebrasClient, budget: Arc<CostTracker>) -> Self {
        Self { client, budget }
    }

    pub fn is_configured(&self) -> bool {
        self.client.is_configured()
    }

    /// Suggests 4-6 options, never repeating `used_options`. A malformed reply yields no options.
    pub async fn generate_options(
        &self,
        question: &str,
        used_options: &[String],
    ) -> Result<Vec<String>, AppError> {
        let question = Self::check_question(question)?;
        self.spend(&question)?;

        let raw = self
            .client
            .complete(build_options_prompt(&question, used_options), Sampling::OPTIONS)
            .await?;
        Ok(parse_options_reply(&raw, used_options))
    }

    pub async fn refine_question(&self, question: &str) -> Result<String, AppError> {
        let question = Self::check_question(question)?;
        self.spend(&question)?;

        let raw = self
            .client
            .complete(build_refine_prompt(&question), Sampling::REFINE)
            .await?;
        Ok(parse_refined_reply(&raw, &question))
    }

    pub async fn categorize(&self, title: &str, options: &[String]) -> Result<String, AppError> {
        let (title, options) = Self::check_category_input(title, options)?;
        self.spend(&title)?;

        let raw = self
            .client
            .complete(build_category_prompt(&title, &options), Sampling::CATEGORY)
            .await?;
        Ok(parse_category_reply(&raw))
    }

    /// Input check for options and refine, usable before any rate limit is charged.
    pub fn check_question(question: &str) -> Result<String, AppError> {
        InputSanitizer::validate_question(question)
    }

    /// Trimmed title and non-blank options, or the validation error for categorize.
    pub fn check_category_input(
        title: &str,
        options: &[String],
    ) -> Result<(String, Vec<String>), AppError> {
        let title = title.trim();
        if title.is_empty() || options.is_empty() {
            return Err(AppError::validation("Title and options are required"));
        }
        let options: Vec<String> = options
            .iter()
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .collect();
        if options.len() < 2 {
            return Err(AppError::validation(
                "Please provide a title and at least 2 options",
            ));
        }
        Ok((title.to_string(), options))
    }

    fn spend(&self, input: &str) -> Result<(), AppError> {
        if !self.client.is_configured() {
            return Err(AppError::AiNotConfigured);
        }
        if InputSanitizer::contains_injection_attempt(input) {
            tracing::warn!("Possible prompt injection in drafting input");
        }
        self.budget.check_and_increment()?;
        Ok(())
    }
}
