pub mod gemini;
pub mod groq;
pub mod session;

pub use gemini::GeminiClient;
pub use groq::GroqClient;
pub use session::ChatSession;

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;

/// Speaker of a turn in a multi-turn chat history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Model,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Turn {
    pub role: TurnRole,
    pub text: String,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self { role: TurnRole::User, text: text.into() }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self { role: TurnRole::Model, text: text.into() }
    }
}

/// A model that continues a conversation given its full history.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Generate the next model turn for `history` (last turn is the user's).
    /// `None` leaves the output length to the provider.
    async fn generate(&self, history: &[Turn], max_output_tokens: Option<u32>) -> Result<String>;

    fn model(&self) -> &str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }
}

/// One non-streaming chat completion call.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    /// Ask the provider to constrain the reply to a single JSON object.
    pub json_object: bool,
}

impl CompletionRequest {
    pub fn new(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            messages,
            temperature: None,
            max_tokens: None,
            json_object: false,
        }
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn json_object(mut self) -> Self {
        self.json_object = true;
        self
    }
}

/// Stateless completion backend (OpenAI-compatible chat completions).
#[async_trait]
pub trait CompletionModel: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;
}
