use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sampling {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Sampling {
    pub const OPTIONS: Sampling = Sampling {
        temperature: 0.7,
        max_tokens: 150,
    };
    pub const REFINE: Sampling = Sampling {
        temperature: 0.3,
        max_tokens: 50,
    };
    pub const CATEGORY: Sampling = Sampling {
        temperature: 0.2,
        max_tokens: 10,
    };
}

#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, Serialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: MessageContent,
}

#[derive(Debug, Deserialize)]
pub struct MessageContent {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatCompletionRequest {
    pub fn new(model: &str, prompt: String, sampling: Sampling) -> Self {
        Self {
            model: model.to_string(),
            messages: vec![Message {
                role: "user".to_string(),
                content: prompt,
            }],
            max_tokens: sampling.max_tokens,
            temperature: sampling.temperature,
        }
    }
}

impl ChatCompletionResponse {
    /// Text of the first choice; an absent choice or null content reads as empty.
    pub fn first_text(&self) -> String {
        self.choices
            .first()
            .and_then(|c| c.message.content.clone())
            .unwrap_or_default()
    }
}
