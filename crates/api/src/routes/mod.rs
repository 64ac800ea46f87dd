pub mod chatbot;
pub mod dashboard;
pub mod summarize;

use axum::{
    Json, Router,
    routing::{get, post},
};
use serde::Serialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;

#[derive(Serialize)]
struct WelcomeResponse {
    message: &'static str,
}

async fn root() -> Json<WelcomeResponse> {
    Json(WelcomeResponse {
        message: "Welcome to the AI Services API!",
    })
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/api/v1/chatbot/message", post(chatbot::send_message))
        .route("/api/v1/summarize/", post(summarize::summarize))
        .route("/api/v1/summarize", post(summarize::summarize))
        .route("/api/v1/dashboard/data", get(dashboard::dashboard_data))
        .route("/api/v1/dashboard/metrics", get(dashboard::dashboard_metrics))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::{AppState, Router};
    use ::chatbot::{ChatbotConfig, ChatbotService};
    use ::summarize::{SummarizeConfig, SummarizeService};
    use async_trait::async_trait;
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode},
        response::Response,
    };
    use llm::{ChatModel, CompletionModel, CompletionRequest, Turn};
    use retrieval::{Retrieved, Retriever, SourcePaper};
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};
    use tower::ServiceExt;

    pub struct StaticRetriever(pub Retrieved);

    #[async_trait]
    impl Retriever for StaticRetriever {
        async fn query(&self, _user_query: &str, _top_k: usize) -> Retrieved {
            self.0.clone()
        }
    }

    pub struct FixedChat(pub Result<String, String>);

    #[async_trait]
    impl ChatModel for FixedChat {
        async fn generate(&self, _history: &[Turn], _max: Option<u32>) -> anyhow::Result<String> {
            self.0.clone().map_err(|message| anyhow::anyhow!(message))
        }

        fn model(&self) -> &str {
            "fixed"
        }
    }

    /// Pops one scripted reply per completion call.
    pub struct ScriptedCompletion(pub Mutex<VecDeque<Result<String, String>>>);

    #[async_trait]
    impl CompletionModel for ScriptedCompletion {
        async fn complete(&self, _request: &CompletionRequest) -> anyhow::Result<String> {
            match self.0.lock().unwrap().pop_front() {
                Some(reply) => reply.map_err(|message| anyhow::anyhow!(message)),
                None => anyhow::bail!("no scripted reply left"),
            }
        }
    }

    pub fn one_passage() -> Retrieved {
        Retrieved {
            texts: vec!["Water ice exists at the Martian poles.".into()],
            sources: vec![SourcePaper {
                title: "Polar Ice".into(),
                authors: "Smith".into(),
            }],
        }
    }

    pub fn state(retrieved: Retrieved, chat: Result<&str, &str>, completions: Vec<Result<&str, &str>>) -> AppState {
        let chat = chat.map(str::to_string).map_err(str::to_string);
        let completions = completions
            .into_iter()
            .map(|r| r.map(str::to_string).map_err(str::to_string))
            .collect();

        AppState::new(
            ChatbotService::new(
                Arc::new(StaticRetriever(retrieved)),
                Arc::new(FixedChat(chat)),
                ChatbotConfig::default(),
            ),
            SummarizeService::new(
                Arc::new(ScriptedCompletion(Mutex::new(completions))),
                SummarizeConfig::default(),
            ),
        )
    }

    pub async fn get(app: Router, uri: &str) -> Response {
        app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    pub async fn post_json(app: Router, uri: &str, body: &str) -> Response {
        app.oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
    }

    pub async fn body_json(response: Response) -> (StatusCode, serde_json::Value) {
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }
}
