use std::env;

/// Per-backend credentials and model overrides, read from the environment
/// variables named in the external-interfaces contract. A provider is
/// considered available iff its key is non-empty, except Ollama, which
/// authenticates with nothing and is instead gated on having at least
/// one model reported by `/api/tags`.
#[derive(Debug, Clone, Default)]
pub struct ProviderEnv {
    pub anthropic_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
    pub xai_api_key: Option<String>,
    pub ollama_host: String,

    pub claude_model: Option<String>,
    pub openai_model: Option<String>,
    pub gemini_model: Option<String>,
    pub grok_model: Option<String>,
    pub ollama_model: Option<String>,
}

impl ProviderEnv {
    pub fn from_environment() -> Self {
        Self {
            anthropic_api_key: non_empty_var("ANTHROPIC_API_KEY"),
            openai_api_key: non_empty_var("OPENAI_API_KEY"),
            gemini_api_key: non_empty_var("GEMINI_API_KEY").or_else(|| non_empty_var("GOOGLE_API_KEY")),
            xai_api_key: non_empty_var("XAI_API_KEY"),
            ollama_host: env::var("OLLAMA_HOST").unwrap_or_else(|_| "http://localhost:11434".to_string()),

            claude_model: non_empty_var("CLAUDE_MODEL"),
            openai_model: non_empty_var("OPENAI_MODEL"),
            gemini_model: non_empty_var("GEMINI_MODEL"),
            grok_model: non_empty_var("GROK_MODEL"),
            ollama_model: non_empty_var("OLLAMA_MODEL"),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}

/// Engine-wide tunables that have a sensible default but may be
/// overridden by the embedding application: a plain struct with a
/// `Default` impl, no external config-file crate.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub source_queue_capacity: usize,
    pub duplicate_similarity_threshold: f64,
    pub top_stories_min: usize,
    pub top_stories_max: usize,
    pub top_stories_ttl_hours: i64,
    pub analysis_semaphore_capacity: usize,
    pub stream_channel_capacity: usize,
    pub default_request_timeout_secs: u64,
    pub long_request_timeout_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            source_queue_capacity: 200,
            duplicate_similarity_threshold: 0.85,
            top_stories_min: 3,
            top_stories_max: 8,
            top_stories_ttl_hours: 24,
            analysis_semaphore_capacity: 6,
            stream_channel_capacity: 10,
            default_request_timeout_secs: 30,
            long_request_timeout_secs: 120,
        }
    }
}
