use axum::{Json, extract::State};
use serde::Serialize;

use crate::metrics::MetricsSnapshot;
use crate::state::AppState;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelPerformance {
    pub chatbot_accuracy: f64,
    pub summarizer_rouge_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardData {
    pub total_requests: u64,
    pub active_users: u64,
    pub model_performance: ModelPerformance,
}

/// Placeholder figures for the dashboard UI; live counters are under `/metrics`.
pub fn mock_dashboard() -> DashboardData {
    DashboardData {
        total_requests: 1024,
        active_users: 128,
        model_performance: ModelPerformance {
            chatbot_accuracy: 0.94,
            summarizer_rouge_score: 0.88,
        },
    }
}

pub async fn dashboard_data() -> Json<DashboardData> {
    Json(mock_dashboard())
}

pub async fn dashboard_metrics(State(state): State<AppState>) -> Json<MetricsSnapshot> {
    Json(state.metrics.snapshot())
}
