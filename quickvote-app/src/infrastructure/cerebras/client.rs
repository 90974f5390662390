use super::types::{ChatCompletionRequest, ChatCompletionResponse, Sampling};
use quickvote_errors::AppError;

pub const DEFAULT_API_URL: &str = "https://api.cerebras.ai/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "llama-3.3-70b";

pub struct CerebrasClient {
    http_client: reqwest::Client,
    api_key: Option<String>,
    api_url: String,
    model: String,
}

impl CerebrasClient {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            api_url: DEFAULT_API_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    pub fn with_endpoint(mut self, api_url: impl Into<String>, model: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self.model = model.into();
        self
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Sends one user prompt and returns the raw text of the first choice.
    pub async fn complete(&self, prompt: String, sampling: Sampling) -> Result<String, AppError> {
        let api_key = self.api_key.as_ref().ok_or(AppError::AiNotConfigured)?;
        let request = ChatCompletionRequest::new(&self.model, prompt, sampling);

        let response = self
            .http_client
            .post(&self.api_url)
            .bearer_auth(api_key)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Cerebras request failed: {}", e);
                AppError::AiFailed(e.to_string())
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Cerebras error: {} - {}", status, body);
            return Err(AppError::AiFailed(format!("API error: {}", status)));
        }

        let completion: ChatCompletionResponse = response.json().await.map_err(|e| {
            tracing::error!("Cerebras returned an unreadable body: {}", e);
            AppError::AiFailed(e.to_string())
        })?;

        Ok(completion.first_text())
    }
}
