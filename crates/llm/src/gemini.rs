use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{ChatModel, Turn, TurnRole};

/// Gemini `generateContent` client (Google AI Studio API).
#[derive(Clone)]
pub struct GeminiClient {
    base_url: String,
    model: String,
    api_key: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct GenerationConfig {
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ResponseContent>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GeminiClient {
    pub fn new(base_url: String, model: String, api_key: String, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            api_key,
            client,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model)
    }
}

fn build_request(history: &[Turn], max_output_tokens: Option<u32>) -> GenerateRequest<'_> {
    let contents = history
        .iter()
        .map(|turn| Content {
            role: match turn.role {
                TurnRole::User => "user",
                TurnRole::Model => "model",
            },
            parts: vec![Part { text: &turn.text }],
        })
        .collect();

    GenerateRequest {
        contents,
        generation_config: max_output_tokens.map(|max_output_tokens| GenerationConfig { max_output_tokens }),
    }
}

/// Joins all text parts of the first candidate.
fn extract_text(response: GenerateResponse) -> Result<String> {
    let candidate = response
        .candidates
        .into_iter()
        .next()
        .context("No candidates in Gemini response")?;

    let text: String = candidate
        .content
        .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.is_empty() {
        let reason = candidate.finish_reason.as_deref().unwrap_or("unknown");
        anyhow::bail!("No text in Gemini response (finish reason: {})", reason);
    }
    Ok(text)
}

#[async_trait]
impl ChatModel for GeminiClient {
    async fn generate(&self, history: &[Turn], max_output_tokens: Option<u32>) -> Result<String> {
        let request = build_request(history, max_output_tokens);

        debug!(model = %self.model, turns = history.len(), "POST generateContent");

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .context("Failed to send request to Gemini")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Gemini request failed ({}): {}", status, body);
        }

        let gen_response: GenerateResponse = response
            .json()
            .await
            .context("Failed to parse Gemini response")?;

        extract_text(gen_response)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let history = vec![Turn::user("system"), Turn::model("ok"), Turn::user("question")];
        let body = serde_json::to_value(build_request(&history, Some(150))).unwrap();

        assert_eq!(body["contents"].as_array().unwrap().len(), 3);
        assert_eq!(body["contents"][1]["role"], "model");
        assert_eq!(body["contents"][2]["parts"][0]["text"], "question");
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 150);
    }

    #[test]
    fn test_no_output_cap_omits_generation_config() {
        let history = vec![Turn::user("question")];
        let body = serde_json::to_value(build_request(&history, None)).unwrap();

        assert!(body.get("generationConfig").is_none());
        assert_eq!(body["contents"][0]["role"], "user");
    }

    #[test]
    fn test_truncated_reply_reports_finish_reason() {
        let raw = r#"{"candidates":[{"content":{"role":"model"},"finishReason":"MAX_TOKENS"}]}"#;
        let response: GenerateResponse = serde_json::from_str(raw).unwrap();

        let err = extract_text(response).unwrap_err();
        assert!(err.to_string().contains("MAX_TOKENS"));
    }

    #[test]
    fn test_extract_text_joins_parts() {
        let raw = r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"Hello "},{"text":"world"}]}}]}"#;
        let response: GenerateResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(extract_text(response).unwrap(), "Hello world");
    }

    #[test]
    fn test_extract_text_without_candidates() {
        let response: GenerateResponse = serde_json::from_str(r#"{"promptFeedback":{}}"#).unwrap();
        assert!(extract_text(response).is_err());
    }

    #[test]
    fn test_endpoint_strips_trailing_slash() {
        let client = GeminiClient::new(
            "https://generativelanguage.googleapis.com/".to_string(),
            "gemini-2.5-flash".to_string(),
            "key".to_string(),
            reqwest::Client::new(),
        );
        assert_eq!(
            client.endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }
}
