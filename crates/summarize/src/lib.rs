pub mod prompt;

use anyhow::{Context, Result};
use llm::{CompletionModel, CompletionRequest, Message};
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone)]
pub struct SummarizeConfig {
    /// Long-form generation model.
    pub model: String,
    /// Cheap model for the chart decision and chart JSON.
    pub fast_model: String,
}

impl Default for SummarizeConfig {
    fn default() -> Self {
        Self {
            model: "llama-3.3-70b-versatile".to_string(),
            fast_model: "llama-3.1-8b-instant".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryResult {
    pub summary: String,
    pub visualization_data: Map<String, Value>,
    /// True when `summary` is the error fallback rather than model output.
    #[serde(skip)]
    pub fallback: bool,
}

/// Markdown summary generation with an optional Chart.js payload.
pub struct SummarizeService {
    model: Arc<dyn CompletionModel>,
    config: SummarizeConfig,
}

impl SummarizeService {
    pub fn new(model: Arc<dyn CompletionModel>, config: SummarizeConfig) -> Self {
        info!(model = %config.model, fast_model = %config.fast_model, "SummarizeService initialized");
        Self { model, config }
    }

    pub async fn generate_summary(&self, query: &str) -> SummaryResult {
        let summary = match self.generate_markdown(query).await {
            Ok(summary) => summary,
            Err(e) => {
                error!(error = %e, "Summary generation failed");
                return SummaryResult {
                    summary: prompt::error_summary(&format!("{:#}", e)),
                    visualization_data: Map::new(),
                    fallback: true,
                };
            }
        };

        let visualization_data = self.generate_visualization_data(query, &summary).await;

        SummaryResult {
            summary,
            visualization_data,
            fallback: false,
        }
    }

    async fn generate_markdown(&self, query: &str) -> Result<String> {
        let request = CompletionRequest::new(
            self.config.model.clone(),
            vec![
                Message::system(prompt::SYSTEM_PROMPT),
                Message::user(prompt::build_topic_prompt(query)),
            ],
        )
        .temperature(0.7)
        .max_tokens(4096);

        let markdown = self
            .model
            .complete(&request)
            .await
            .context("Summary model call failed")?;

        debug!(summary_len = markdown.len(), "Summary generated");
        Ok(markdown)
    }

    /// Chart.js configuration for the summary, or an empty object when the
    /// topic is not chartable or any step fails.
    pub async fn generate_visualization_data(&self, query: &str, summary: &str) -> Map<String, Value> {
        match self.should_visualize(query, summary).await {
            Ok(true) => {}
            Ok(false) => return Map::new(),
            Err(e) => {
                warn!(error = %e, "Visualization check failed");
                return Map::new();
            }
        }

        info!("Visualization is needed, generating chart data");
        match self.generate_chart(query, summary).await {
            Ok(chart) => chart,
            Err(e) => {
                warn!(error = %e, "Visualization data generation failed");
                Map::new()
            }
        }
    }

    async fn should_visualize(&self, query: &str, summary: &str) -> Result<bool> {
        let request = CompletionRequest::new(
            self.config.fast_model.clone(),
            vec![Message::user(prompt::build_visualization_check_prompt(query, summary))],
        )
        .temperature(0.0)
        .max_tokens(5);

        let decision = self.model.complete(&request).await?.trim().to_uppercase();
        info!(decision = %decision, "Visualization decision");

        Ok(decision.contains("YES"))
    }

    async fn generate_chart(&self, query: &str, summary: &str) -> Result<Map<String, Value>> {
        let request = CompletionRequest::new(
            self.config.fast_model.clone(),
            vec![
                Message::system(prompt::VISUALIZATION_SYSTEM_PROMPT),
                Message::user(prompt::build_visualization_input(query, summary)),
            ],
        )
        .json_object();

        let raw = self.model.complete(&request).await?;
        parse_chart(&raw)
    }
}

/// The chart payload must be a single JSON object.
pub fn parse_chart(raw: &str) -> Result<Map<String, Value>> {
    let value: Value = serde_json::from_str(raw.trim()).context("Chart JSON did not parse")?;
    match value {
        Value::Object(map) => Ok(map),
        other => anyhow::bail!("Chart JSON is not an object: {}", other),
    }
}
