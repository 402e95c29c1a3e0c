use std::sync::Arc;

use newsroom_interfaces::Provider;

use crate::config::ProviderEnv;
use crate::EngineConfig;

use super::clients::SharedClients;
use super::config::{anthropic_config, gemini_config, grok_config, ollama_config, openai_config};
use super::http_provider::HttpProvider;
use super::ollama;

const DEFAULT_CLAUDE_MODEL: &str = "claude-sonnet-4-20250514";
const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
const DEFAULT_GROK_MODEL: &str = "grok-beta";

/// Builds the set of active providers from environment credentials: a
/// provider missing credentials (or, for Ollama, missing any installed
/// model) never enters `cloud` / `local`, so downstream selection never
/// has to notice it's unusable.
pub struct ProviderRegistry {
    pub cloud: Vec<Arc<dyn Provider>>,
    pub local: Option<Arc<dyn Provider>>,
}

impl ProviderRegistry {
    pub async fn from_env(env: &ProviderEnv, clients: &SharedClients, config: &EngineConfig) -> Self {
        let mut cloud: Vec<Arc<dyn Provider>> = Vec::new();

        let anthropic = anthropic_config(
            env.anthropic_api_key.clone(),
            env.claude_model.clone().unwrap_or_else(|| DEFAULT_CLAUDE_MODEL.to_string()),
        );
        push_if_available(&mut cloud, anthropic, clients, config);

        let openai = openai_config(
            env.openai_api_key.clone(),
            env.openai_model.clone().unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
        );
        push_if_available(&mut cloud, openai, clients, config);

        let gemini = gemini_config(
            env.gemini_api_key.clone(),
            env.gemini_model.clone().unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
        );
        push_if_available(&mut cloud, gemini, clients, config);

        let grok = grok_config(
            env.xai_api_key.clone(),
            env.grok_model.clone().unwrap_or_else(|| DEFAULT_GROK_MODEL.to_string()),
        );
        push_if_available(&mut cloud, grok, clients, config);

        let resolved_model = ollama::resolve_model(&clients.default, &env.ollama_host, env.ollama_model.clone()).await;
        let local = resolved_model.map(|model| {
            let provider = HttpProvider::new(
                ollama_config(&env.ollama_host, model),
                clients.long.clone(),
                clients.streaming.clone(),
                config.stream_channel_capacity,
            );
            Arc::new(provider) as Arc<dyn Provider>
        });

        Self { cloud, local }
    }

    pub fn is_empty(&self) -> bool {
        self.cloud.is_empty() && self.local.is_none()
    }
}

fn push_if_available(
    cloud: &mut Vec<Arc<dyn Provider>>,
    provider_config: super::config::ProviderConfig,
    clients: &SharedClients,
    config: &EngineConfig,
) {
    if !provider_config.has_credentials() {
        return;
    }
    let provider = HttpProvider::new(
        provider_config,
        clients.long.clone(),
        clients.streaming.clone(),
        config.stream_channel_capacity,
    );
    cloud.push(Arc::new(provider));
}
