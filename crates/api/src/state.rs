use chatbot::ChatbotService;
use std::sync::Arc;
use summarize::SummarizeService;

use crate::metrics::Metrics;

/// Services built once at startup and shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub chatbot: Arc<ChatbotService>,
    pub summarizer: Arc<SummarizeService>,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    pub fn new(chatbot: ChatbotService, summarizer: SummarizeService) -> Self {
        Self {
            chatbot: Arc::new(chatbot),
            summarizer: Arc::new(summarizer),
            metrics: Metrics::new(),
        }
    }
}
