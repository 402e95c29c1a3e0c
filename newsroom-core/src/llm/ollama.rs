use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

/// Queries `/api/tags` and resolves the model to use: the first whose name
/// contains "instruct", falling back to the first listed, or `None` when
/// no models are installed. Called once at engine construction so the
/// provider's (synchronous) `available()` can be a plain field check
/// afterward.
pub async fn resolve_model(client: &Client, host: &str, configured_model: Option<String>) -> Option<String> {
    if let Some(model) = configured_model {
        return Some(model);
    }

    let url = format!("{host}/api/tags");
    let response = match client.get(&url).send().await {
        Ok(resp) => resp,
        Err(err) => {
            warn!(error = %err, "failed to query ollama /api/tags");
            return None;
        }
    };

    let body: Value = match response.json().await {
        Ok(body) => body,
        Err(err) => {
            warn!(error = %err, "failed to parse ollama /api/tags response");
            return None;
        }
    };

    let models = body["models"].as_array()?;
    let names: Vec<&str> = models.iter().filter_map(|m| m["name"].as_str()).collect();
    if names.is_empty() {
        debug!("ollama reports no installed models");
        return None;
    }

    let instruct = names.iter().find(|name| name.contains("instruct"));
    Some(instruct.copied().unwrap_or(names[0]).to_string())
}
