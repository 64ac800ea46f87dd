mod config;
mod error;
mod metrics;
mod routes;
mod state;

use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use chatbot::{ChatbotConfig, ChatbotService};
use config::AppConfig;
use llm::{GeminiClient, GroqClient};
use retrieval::{EmbeddingClient, PineconeIndex, RagService};
use state::AppState;
use summarize::SummarizeService;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info,tower_http=debug"))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn http_client(timeout_secs: Option<u64>) -> anyhow::Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder();
    if let Some(secs) = timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    builder.build().context("Failed to build HTTP client")
}

async fn build_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let client = http_client(config.http_timeout_secs)?;

    // Retrieval
    let retrieval_config = &config.retrieval;
    let embedder = EmbeddingClient::new(
        retrieval_config.embedding_url.clone(),
        retrieval_config.embedding_model.clone(),
        client.clone(),
    );
    let index = PineconeIndex::connect(
        &retrieval_config.control_url,
        retrieval_config.api_key.expose().to_string(),
        retrieval_config.index_name.clone(),
        client.clone(),
    )
    .await
    .context("Failed to connect to Pinecone")?;

    let stats = index
        .describe_index_stats()
        .await
        .context("Failed to read Pinecone index stats")?;
    tracing::info!(index = index.index_name(), stats = %stats, "Pinecone index ready");

    let rag = RagService::new(Arc::new(embedder), Arc::new(index));

    // Chat
    let gemini = GeminiClient::new(
        config.chat.base_url.clone(),
        config.chat.model.clone(),
        config.chat.api_key.expose().to_string(),
        client.clone(),
    );
    let chatbot = ChatbotService::new(
        Arc::new(rag),
        Arc::new(gemini),
        ChatbotConfig {
            top_k: retrieval_config.top_k,
            max_output_tokens: config.chat.max_output_tokens,
            max_history_exchanges: config.chat.history_turns,
            max_sessions: config.chat.max_sessions,
        },
    );

    // Summarize
    let groq = GroqClient::new(
        config.summarize.base_url.clone(),
        config.summarize.api_key.expose().to_string(),
        client,
    );
    let summarizer = SummarizeService::new(
        Arc::new(groq),
        summarize::SummarizeConfig {
            model: config.summarize.model.clone(),
            fast_model: config.summarize.fast_model.clone(),
        },
    );

    Ok(AppState::new(chatbot, summarizer))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutting down");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env().context("Invalid configuration")?;
    tracing::info!(config = ?config, "Configuration loaded");

    let state = build_state(&config).await?;
    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind(&config.address)
        .await
        .with_context(|| format!("Failed to bind {}", config.address))?;

    tracing::info!("Server listening on http://{}", config.address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}
