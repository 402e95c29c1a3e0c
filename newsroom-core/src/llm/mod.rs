mod clients;
mod config;
mod http_provider;
mod mock;
mod ollama;
mod registry;

pub use clients::SharedClients;
pub use config::{
    anthropic_config, gemini_config, grok_config, ollama_config, openai_config, AuthScheme, ProviderConfig,
    StreamEvent,
};
pub use http_provider::HttpProvider;
pub use mock::MockProvider;
pub use registry::ProviderRegistry;
