pub mod prompt;
pub mod session;

pub use session::SessionStore;

use llm::ChatModel;
use retrieval::{Retriever, DEFAULT_TOP_K};
use std::sync::Arc;
use tracing::{debug, error, info};

#[derive(Debug, Clone)]
pub struct ChatbotConfig {
    /// Passages requested from the retriever per message.
    pub top_k: usize,
    /// Output cap sent to the chat model; `None` sends no cap.
    pub max_output_tokens: Option<u32>,
    /// Exchanges kept per session after the seed instruction (0 = unbounded).
    pub max_history_exchanges: usize,
    pub max_sessions: usize,
}

impl Default for ChatbotConfig {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            max_output_tokens: None,
            max_history_exchanges: 50,
            max_sessions: 1000,
        }
    }
}

/// How a reply was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyKind {
    EmptyQuery,
    NoContext,
    Answered,
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatReply {
    pub text: String,
    pub kind: ReplyKind,
}

/// Retrieval-grounded chat over a seeded, per-session conversation.
pub struct ChatbotService {
    retriever: Arc<dyn Retriever>,
    model: Arc<dyn ChatModel>,
    sessions: SessionStore,
    config: ChatbotConfig,
}

impl ChatbotService {
    pub fn new(retriever: Arc<dyn Retriever>, model: Arc<dyn ChatModel>, config: ChatbotConfig) -> Self {
        info!(
            model = model.model(),
            top_k = config.top_k,
            max_output_tokens = ?config.max_output_tokens,
            max_sessions = config.max_sessions,
            "ChatbotService initialized"
        );

        Self {
            retriever,
            model,
            sessions: SessionStore::new(config.max_history_exchanges, config.max_sessions),
            config,
        }
    }

    /// Reply text only; see [`ChatbotService::reply`].
    pub async fn get_concise_answer(&self, query: &str, session_id: Option<&str>) -> String {
        self.reply(query, session_id).await.text
    }

    pub async fn reply(&self, query: &str, session_id: Option<&str>) -> ChatReply {
        let query = query.trim();
        if query.is_empty() {
            return ChatReply {
                text: prompt::EMPTY_QUERY_REPLY.to_string(),
                kind: ReplyKind::EmptyQuery,
            };
        }

        let retrieved = self.retriever.query(query, self.config.top_k).await;
        if retrieved.is_empty() {
            info!("No passages retrieved, skipping chat model");
            return ChatReply {
                text: prompt::NO_CONTEXT_REPLY.to_string(),
                kind: ReplyKind::NoContext,
            };
        }

        let context = prompt::build_context(&retrieved.texts);
        let sources = prompt::format_sources(&retrieved.sources);
        let answer_prompt = prompt::build_answer_prompt(query, &context, &sources);

        info!(
            passages = retrieved.texts.len(),
            sources = retrieved.sources.len(),
            prompt_len = answer_prompt.len(),
            "Sending grounded prompt to chat model"
        );

        let session = self.sessions.get(session_id);
        debug!(sessions = self.sessions.len(), "Session resolved");
        let mut session = session.lock().await;

        match session
            .send_message(self.model.as_ref(), &answer_prompt, self.config.max_output_tokens)
            .await
        {
            Ok(text) => ChatReply {
                text: text.trim().to_string(),
                kind: ReplyKind::Answered,
            },
            Err(e) => {
                error!(error = %e, "Chat model call failed");
                ChatReply {
                    text: format!("An error occurred: {}", e),
                    kind: ReplyKind::Failed,
                }
            }
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }
}
