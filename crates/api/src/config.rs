use serde::Serialize;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("invalid number in {var}: {value:?}")]
    InvalidNumber { var: &'static str, value: String },
}

/// An API key; never printed or serialized.
#[derive(Clone)]
pub struct Secret(String);

impl Secret {
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AppConfig {
    pub address: String,
    pub http_timeout_secs: Option<u64>,
    pub chat: ChatConfig,
    pub retrieval: RetrievalConfig,
    pub summarize: SummarizeConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatConfig {
    #[serde(skip)]
    pub api_key: Secret,
    pub base_url: String,
    pub model: String,
    pub max_output_tokens: Option<u32>,
    pub history_turns: usize,
    pub max_sessions: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RetrievalConfig {
    #[serde(skip)]
    pub api_key: Secret,
    pub control_url: String,
    pub index_name: String,
    pub embedding_url: String,
    pub embedding_model: String,
    pub top_k: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SummarizeConfig {
    #[serde(skip)]
    pub api_key: Secret,
    pub base_url: String,
    pub model: String,
    pub fast_model: String,
}

/// Reads variables through `lookup`, treating blank values as unset.
struct Env<F> {
    lookup: F,
}

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, var: &str) -> Option<String> {
        (self.lookup)(var).filter(|v| !v.trim().is_empty())
    }

    fn required(&self, var: &'static str) -> Result<Secret, ConfigError> {
        self.get(var).map(Secret).ok_or(ConfigError::MissingVar(var))
    }

    fn or(&self, var: &str, default: &str) -> String {
        self.get(var).unwrap_or_else(|| default.to_string())
    }

    fn number<T: std::str::FromStr>(&self, var: &'static str) -> Result<Option<T>, ConfigError> {
        match self.get(var) {
            Some(value) => value
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| ConfigError::InvalidNumber { var, value }),
            None => Ok(None),
        }
    }

    /// Like [`Env::number`], but zero is rejected.
    fn positive<T>(&self, var: &'static str) -> Result<Option<T>, ConfigError>
    where
        T: std::str::FromStr + PartialEq + Default,
    {
        match self.number::<T>(var)? {
            Some(n) if n == T::default() => Err(ConfigError::InvalidNumber {
                var,
                value: self.get(var).unwrap_or_default(),
            }),
            other => Ok(other),
        }
    }
}

impl AppConfig {
    /// Load from the process environment (call `dotenvy::dotenv()` first).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env { lookup };

        Ok(Self {
            address: env.or("API_ADDRESS", "0.0.0.0:8000"),
            http_timeout_secs: env.positive("HTTP_TIMEOUT_SECS")?,
            chat: ChatConfig {
                api_key: env.required("GEMINI_API_KEY")?,
                base_url: env.or("GEMINI_URL", "https://generativelanguage.googleapis.com"),
                model: env.or("GEMINI_MODEL", "gemini-2.5-flash"),
                max_output_tokens: env.positive("CHAT_MAX_OUTPUT_TOKENS")?,
                history_turns: env.number("CHAT_HISTORY_TURNS")?.unwrap_or(50),
                max_sessions: env.positive("CHAT_MAX_SESSIONS")?.unwrap_or(1000),
            },
            retrieval: RetrievalConfig {
                api_key: env.required("PINECONE_API_KEY")?,
                control_url: env.or("PINECONE_CONTROL_URL", "https://api.pinecone.io"),
                index_name: env.or("PINECONE_INDEX", "research-papers"),
                embedding_url: env.or("EMBEDDING_URL", "http://localhost:11434"),
                embedding_model: env.or("EMBEDDING_MODEL", "all-minilm"),
                top_k: env.positive("RAG_TOP_K")?.unwrap_or(retrieval::DEFAULT_TOP_K),
            },
            summarize: SummarizeConfig {
                api_key: env.required("GROQ_API_KEY")?,
                base_url: env.or("GROQ_URL", "https://api.groq.com"),
                model: env.or("GROQ_MODEL", "llama-3.3-70b-versatile"),
                fast_model: env.or("GROQ_FAST_MODEL", "llama-3.1-8b-instant"),
            },
        })
    }
}
