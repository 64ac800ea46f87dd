use ::summarize::SummaryResult;
use axum::{Json, extract::State, extract::rejection::JsonRejection};
use serde::Deserialize;
use tracing::info;

use crate::error::AppResult;
use crate::metrics::TimedOperation;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SummarizeRequest {
    pub text: String,
}

/// Always 200 once the body parses; provider failures come back as the
/// fallback summary.
pub async fn summarize(
    State(state): State<AppState>,
    payload: Result<Json<SummarizeRequest>, JsonRejection>,
) -> AppResult<Json<SummaryResult>> {
    let Json(request) = payload?;
    let timer = TimedOperation::start();

    let result = state.summarizer.generate_summary(&request.text).await;

    info!(
        fallback = result.fallback,
        chart = !result.visualization_data.is_empty(),
        "Summary request finished"
    );
    state.metrics.record_summarize(timer.elapsed(), !result.fallback);

    Ok(Json(result))
}

#[cfg(test)]
mod tests {
    use super::super::{router, test_support::*};
    use axum::http::StatusCode;
    use retrieval::Retrieved;

    const CHART: &str = r#"{"type":"line","data":{"labels":["2020"],"datasets":[{"label":"x","data":[1]}]},"options":{}}"#;

    #[tokio::test]
    async fn test_summary_with_chart() {
        let app = router(state(Retrieved::default(), Ok("unused"), vec![Ok("# Summary"), Ok("YES"), Ok(CHART)]));

        let (status, body) = body_json(post_json(app, "/api/v1/summarize/", r#"{"text":"EV sales"}"#).await).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["summary"], "# Summary");
        assert_eq!(body["visualization_data"]["type"], "line");
        assert!(body.get("fallback").is_none());
    }

    #[tokio::test]
    async fn test_path_without_trailing_slash() {
        let app = router(state(Retrieved::default(), Ok("unused"), vec![Ok("# Summary"), Ok("NO")]));

        let (status, body) = body_json(post_json(app, "/api/v1/summarize", r#"{"text":"poems"}"#).await).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["visualization_data"], serde_json::json!({}));
    }

    #[tokio::test]
    async fn test_provider_error_is_200_with_fallback() {
        let state = state(Retrieved::default(), Ok("unused"), vec![Err("401 invalid api key")]);
        let app = router(state.clone());

        let (status, body) = body_json(post_json(app, "/api/v1/summarize/", r#"{"text":"topic"}"#).await).await;
        assert_eq!(status, StatusCode::OK);
        let summary = body["summary"].as_str().unwrap();
        assert!(summary.starts_with("# Error<br><br>"));
        assert!(summary.contains("401 invalid api key"));
        assert_eq!(body["visualization_data"], serde_json::json!({}));

        let metrics = state.metrics.snapshot();
        assert_eq!(metrics.summarize_requests, 1);
        assert_eq!(metrics.failed_requests, 1);
    }
}
