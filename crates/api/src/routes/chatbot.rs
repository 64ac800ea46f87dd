use ::chatbot::ReplyKind;
use axum::{Json, extract::State, extract::rejection::JsonRejection};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::error::AppResult;
use crate::metrics::TimedOperation;
use crate::state::AppState;

pub const ROUTE_FAILURE_REPLY: &str = "Sorry, I'm having trouble processing your request right now.";

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
}

pub async fn send_message(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> AppResult<Json<ChatResponse>> {
    let Json(request) = payload?;
    let timer = TimedOperation::start();

    // Run on its own task so a panic below the handler still yields a reply.
    let chatbot = state.chatbot.clone();
    let task = tokio::spawn(async move {
        chatbot
            .reply(&request.message, request.session_id.as_deref())
            .await
    });

    let (reply, success) = match task.await {
        Ok(reply) => {
            let success = reply.kind != ReplyKind::Failed;
            (reply.text, success)
        }
        Err(e) => {
            error!(error = %e, "Chat task failed");
            (ROUTE_FAILURE_REPLY.to_string(), false)
        }
    };

    state.metrics.record_chat(timer.elapsed(), success);
    Ok(Json(ChatResponse { reply }))
}
