use newsroom_interfaces::Request;
use serde_json::Value;

/// Where the API key (if any) is attached to an outgoing request.
#[derive(Debug, Clone)]
pub enum AuthScheme {
    None,
    Header { name: &'static str, prefix: Option<&'static str> },
}

/// Builds the JSON request body for one backend from a generic [`Request`].
pub type RequestBuilder = fn(&ProviderConfig, &Request) -> Value;

/// Extracts `(content, model)` from a backend's non-streaming JSON
/// response. Takes the already-parsed body plus the config (so the parser
/// can fall back to `config.model` for backends that don't echo it back).
pub type ResponseParser = fn(&ProviderConfig, &Value) -> anyhow::Result<(String, String)>;

/// One decoded event from a streaming line, per backend.
#[derive(Debug, Clone)]
pub enum StreamEvent {
    /// Incremental text to append.
    Delta(String),
    /// Stream is finished; carries the model name if this backend echoes
    /// one on its terminal event.
    Done(Option<String>),
    /// Line carried no actionable content (e.g. a `ping` event); skip it.
    Skip,
}

/// Parses one already-dechunked line of a streaming response.
pub type StreamLineParser = fn(&ProviderConfig, &str) -> StreamEvent;

/// Immutable per-backend configuration. A single [`super::HttpProvider`]
/// is parameterized by one of these instead of the engine carrying a
/// class per backend.
#[derive(Clone)]
pub struct ProviderConfig {
    pub name: String,
    pub endpoint: String,
    /// Separate streaming endpoint for backends (Gemini) whose streaming
    /// call is a distinct URL rather than a `stream: true` body flag.
    pub stream_endpoint: String,
    pub api_key: Option<String>,
    pub model: String,
    pub auth: AuthScheme,
    pub extra_headers: Vec<(String, String)>,
    pub default_max_tokens: u32,
    pub build_request: RequestBuilder,
    pub parse_response: ResponseParser,
    pub parse_stream_line: StreamLineParser,
}

impl ProviderConfig {
    /// A provider is available iff it carries a non-empty key. Ollama is
    /// the one exception and is handled separately at construction time
    /// (model auto-detection), not through this check.
    pub fn has_credentials(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }

    pub fn endpoint_for(&self, streaming: bool) -> &str {
        if streaming {
            &self.stream_endpoint
        } else {
            &self.endpoint
        }
    }
}

// ---------------------------------------------------------------------
// Anthropic
// ---------------------------------------------------------------------

pub fn anthropic_config(api_key: Option<String>, model: String) -> ProviderConfig {
    ProviderConfig {
        name: "anthropic".to_string(),
        endpoint: "https://api.anthropic.com/v1/messages".to_string(),
        stream_endpoint: "https://api.anthropic.com/v1/messages".to_string(),
        api_key,
        model,
        auth: AuthScheme::Header { name: "x-api-key", prefix: None },
        extra_headers: vec![("anthropic-version".to_string(), "2023-06-01".to_string())],
        default_max_tokens: 4096,
        build_request: anthropic_build_request,
        parse_response: anthropic_parse_response,
        parse_stream_line: anthropic_parse_stream_line,
    }
}

fn anthropic_build_request(config: &ProviderConfig, request: &Request) -> Value {
    let mut body = serde_json::json!({
        "model": config.model,
        "max_tokens": request.max_tokens.unwrap_or(config.default_max_tokens),
        "messages": [{"role": "user", "content": request.user_prompt}],
        "stream": request.stream,
    });
    if let Some(system) = &request.system_prompt {
        body["system"] = Value::String(system.clone());
    }
    body
}

fn anthropic_parse_response(config: &ProviderConfig, body: &Value) -> anyhow::Result<(String, String)> {
    let content = body["content"]
        .as_array()
        .map(|blocks| {
            blocks
                .iter()
                .filter_map(|b| b["text"].as_str())
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();
    let model = body["model"].as_str().unwrap_or(&config.model).to_string();
    Ok((content, model))
}

fn anthropic_parse_stream_line(_config: &ProviderConfig, line: &str) -> StreamEvent {
    let Some(payload) = line.strip_prefix("data: ") else {
        return StreamEvent::Skip;
    };
    let Ok(event) = serde_json::from_str::<Value>(payload) else {
        return StreamEvent::Skip;
    };
    match event["type"].as_str() {
        Some("content_block_delta") => {
            let text = event["delta"]["text"].as_str().unwrap_or_default();
            StreamEvent::Delta(text.to_string())
        }
        Some("message_delta") => {
            if event["delta"]["stop_reason"].is_string() {
                StreamEvent::Done(None)
            } else {
                StreamEvent::Skip
            }
        }
        Some("message_stop") => StreamEvent::Done(None),
        _ => StreamEvent::Skip,
    }
}

// ---------------------------------------------------------------------
// OpenAI / Grok (OpenAI-compatible chat completions)
// ---------------------------------------------------------------------

pub fn openai_config(api_key: Option<String>, model: String) -> ProviderConfig {
    openai_compatible_config("openai", "https://api.openai.com/v1/chat/completions", api_key, model)
}

pub fn grok_config(api_key: Option<String>, model: String) -> ProviderConfig {
    openai_compatible_config("grok", "https://api.x.ai/v1/chat/completions", api_key, model)
}

fn openai_compatible_config(name: &str, endpoint: &str, api_key: Option<String>, model: String) -> ProviderConfig {
    ProviderConfig {
        name: name.to_string(),
        endpoint: endpoint.to_string(),
        stream_endpoint: endpoint.to_string(),
        api_key,
        model,
        auth: AuthScheme::Header { name: "Authorization", prefix: Some("Bearer ") },
        extra_headers: Vec::new(),
        default_max_tokens: 4096,
        build_request: openai_build_request,
        parse_response: openai_parse_response,
        parse_stream_line: openai_parse_stream_line,
    }
}

fn openai_build_request(config: &ProviderConfig, request: &Request) -> Value {
    let mut messages = Vec::new();
    if let Some(system) = &request.system_prompt {
        messages.push(serde_json::json!({"role": "system", "content": system}));
    }
    messages.push(serde_json::json!({"role": "user", "content": request.user_prompt}));
    serde_json::json!({
        "model": config.model,
        "messages": messages,
        "max_tokens": request.max_tokens.unwrap_or(config.default_max_tokens),
        "stream": request.stream,
    })
}

fn openai_parse_response(config: &ProviderConfig, body: &Value) -> anyhow::Result<(String, String)> {
    let content = body["choices"][0]["message"]["content"].as_str().unwrap_or_default().to_string();
    let model = body["model"].as_str().unwrap_or(&config.model).to_string();
    Ok((content, model))
}

fn openai_parse_stream_line(_config: &ProviderConfig, line: &str) -> StreamEvent {
    let Some(payload) = line.strip_prefix("data: ") else {
        return StreamEvent::Skip;
    };
    let payload = payload.trim();
    if payload == "[DONE]" {
        return StreamEvent::Done(None);
    }
    let Ok(event) = serde_json::from_str::<Value>(payload) else {
        return StreamEvent::Skip;
    };
    let choice = &event["choices"][0];
    if choice["finish_reason"].is_string() {
        return StreamEvent::Done(event["model"].as_str().map(|s| s.to_string()));
    }
    let delta = choice["delta"]["content"].as_str().unwrap_or_default();
    if delta.is_empty() {
        StreamEvent::Skip
    } else {
        StreamEvent::Delta(delta.to_string())
    }
}

// ---------------------------------------------------------------------
// Gemini
// ---------------------------------------------------------------------

pub fn gemini_config(api_key: Option<String>, model: String) -> ProviderConfig {
    let endpoint = format!("https://generativelanguage.googleapis.com/v1beta/models/{model}:generateContent");
    let stream_endpoint =
        format!("https://generativelanguage.googleapis.com/v1beta/models/{model}:streamGenerateContent?alt=sse");
    ProviderConfig {
        name: "gemini".to_string(),
        endpoint,
        stream_endpoint,
        api_key,
        model,
        // Never embedded in the URL, header only.
        auth: AuthScheme::Header { name: "x-goog-api-key", prefix: None },
        extra_headers: Vec::new(),
        default_max_tokens: 4096,
        build_request: gemini_build_request,
        parse_response: gemini_parse_response,
        parse_stream_line: gemini_parse_stream_line,
    }
}

fn gemini_build_request(config: &ProviderConfig, request: &Request) -> Value {
    let mut body = serde_json::json!({
        "contents": [{"role": "user", "parts": [{"text": request.user_prompt}]}],
        "generationConfig": {"maxOutputTokens": request.max_tokens.unwrap_or(config.default_max_tokens)},
    });
    if let Some(system) = &request.system_prompt {
        body["systemInstruction"] = serde_json::json!({"parts": [{"text": system}]});
    }
    body
}

fn gemini_parse_response(config: &ProviderConfig, body: &Value) -> anyhow::Result<(String, String)> {
    let content = body["candidates"][0]["content"]["parts"][0]["text"].as_str().unwrap_or_default().to_string();
    Ok((content, config.model.clone()))
}

fn gemini_parse_stream_line(config: &ProviderConfig, line: &str) -> StreamEvent {
    let Some(payload) = line.strip_prefix("data: ") else {
        return StreamEvent::Skip;
    };
    let Ok(event) = serde_json::from_str::<Value>(payload) else {
        return StreamEvent::Skip;
    };
    let finish = event["candidates"][0]["finishReason"].as_str();
    if matches!(finish, Some("STOP") | Some("MAX_TOKENS")) {
        return StreamEvent::Done(Some(config.model.clone()));
    }
    let text = event["candidates"][0]["content"]["parts"][0]["text"].as_str().unwrap_or_default();
    if text.is_empty() {
        StreamEvent::Skip
    } else {
        StreamEvent::Delta(text.to_string())
    }
}

// ---------------------------------------------------------------------
// Ollama
// ---------------------------------------------------------------------

pub fn ollama_config(host: &str, model: String) -> ProviderConfig {
    ProviderConfig {
        name: "ollama".to_string(),
        endpoint: format!("{host}/api/chat"),
        stream_endpoint: format!("{host}/api/chat"),
        api_key: None,
        model,
        auth: AuthScheme::None,
        extra_headers: Vec::new(),
        default_max_tokens: 4096,
        build_request: ollama_build_request,
        parse_response: ollama_parse_response,
        parse_stream_line: ollama_parse_stream_line,
    }
}

fn ollama_build_request(config: &ProviderConfig, request: &Request) -> Value {
    let mut messages = Vec::new();
    if let Some(system) = &request.system_prompt {
        messages.push(serde_json::json!({"role": "system", "content": system}));
    }
    messages.push(serde_json::json!({"role": "user", "content": request.user_prompt}));
    serde_json::json!({
        "model": config.model,
        "messages": messages,
        "stream": request.stream,
    })
}

fn ollama_parse_response(config: &ProviderConfig, body: &Value) -> anyhow::Result<(String, String)> {
    let content = body["message"]["content"].as_str().unwrap_or_default().to_string();
    let model = body["model"].as_str().unwrap_or(&config.model).to_string();
    Ok((content, model))
}

fn ollama_parse_stream_line(config: &ProviderConfig, line: &str) -> StreamEvent {
    let line = line.trim();
    if line.is_empty() {
        return StreamEvent::Skip;
    }
    let Ok(event) = serde_json::from_str::<Value>(line) else {
        return StreamEvent::Skip;
    };
    if event["done"].as_bool().unwrap_or(false) {
        return StreamEvent::Done(event["model"].as_str().map(|s| s.to_string()).or_else(|| Some(config.model.clone())));
    }
    let text = event["message"]["content"].as_str().unwrap_or_default();
    if text.is_empty() {
        StreamEvent::Skip
    } else {
        StreamEvent::Delta(text.to_string())
    }
}
