use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{CompletionModel, CompletionRequest, Message};

/// Groq client over its OpenAI-compatible chat completions endpoint.
#[derive(Clone)]
pub struct GroqClient {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct ChatCompletionBody<'a> {
    model: &'a str,
    messages: &'a [Message],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl GroqClient {
    pub fn new(base_url: String, api_key: String, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            client,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/openai/v1/chat/completions", self.base_url)
    }
}

fn build_body(request: &CompletionRequest) -> ChatCompletionBody<'_> {
    ChatCompletionBody {
        model: &request.model,
        messages: &request.messages,
        temperature: request.temperature,
        max_tokens: request.max_tokens,
        response_format: request
            .json_object
            .then_some(ResponseFormat { kind: "json_object" }),
    }
}

fn first_content(response: ChatCompletionResponse) -> Result<String> {
    response
        .choices
        .into_iter()
        .find_map(|c| c.message.content)
        .context("No choices in Groq response")
}

#[async_trait]
impl CompletionModel for GroqClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let body = build_body(request);

        debug!(
            model = %request.model,
            messages = request.messages.len(),
            json_object = request.json_object,
            "POST chat/completions"
        );

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("Failed to send request to Groq")?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            anyhow::bail!("Groq request failed ({}): {}", status, text);
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .context("Failed to parse Groq response")?;

        first_content(completion)
    }
}
