//! Oracle backends
//!
//! Each backend turns a [`CompletionRequest`] into raw text. Normalization
//! happens one level up in [`crate::oracle::parse`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::debug;

use super::models::{select_model, ModelTask};
use crate::config::OracleConfig;
use crate::error::OracleError;

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// One request to a text-completion backend
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub task: ModelTask,
    pub system: Option<String>,
    pub prompt: String,
}

impl CompletionRequest {
    pub fn new(task: ModelTask, system: &str, prompt: String) -> Self {
        Self {
            task,
            system: Some(system.to_string()),
            prompt,
        }
    }
}

/// Which backend the oracle ended up with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    None,
    LocalOllama,
    OpenAi,
    Anthropic,
    Scripted,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BackendKind::None => "none",
            BackendKind::LocalOllama => "ollama",
            BackendKind::OpenAi => "openai",
            BackendKind::Anthropic => "anthropic",
            BackendKind::Scripted => "scripted",
        };
        write!(f, "{}", name)
    }
}

pub(crate) fn http_client(timeout_secs: u64) -> Result<reqwest::blocking::Client, OracleError> {
    reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| OracleError::Http(format!("Failed to create HTTP client: {}", e)))
}

/// Send a request and decode the JSON body, mapping every failure mode
fn send_json(
    request: reqwest::blocking::RequestBuilder,
    timeout_secs: u64,
    provider: &str,
) -> Result<serde_json::Value, OracleError> {
    let response = request.send().map_err(|e| {
        if e.is_timeout() {
            OracleError::Timeout(timeout_secs)
        } else {
            OracleError::Http(format!("Request to {} failed: {}", provider, e))
        }
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(OracleError::Status(status.as_u16(), provider.to_string()));
    }

    response.json().map_err(|e| {
        if e.is_timeout() {
            OracleError::Timeout(timeout_secs)
        } else {
            OracleError::InvalidPayload(format!("{} body is not JSON: {}", provider, e))
        }
    })
}

fn non_empty(text: Option<&str>) -> Result<String, OracleError> {
    match text.map(str::trim) {
        Some(t) if !t.is_empty() => Ok(t.to_string()),
        _ => Err(OracleError::Empty),
    }
}

/// Local Ollama server
pub struct OllamaBackend {
    client: reqwest::blocking::Client,
    url: String,
    models: Vec<String>,
    default_model: String,
    timeout_secs: u64,
}

impl OllamaBackend {
    /// `models` are the names enumerated by the reachability probe
    pub fn new(config: &OracleConfig, models: Vec<String>) -> Result<Self, OracleError> {
        Ok(Self {
            client: http_client(config.request_timeout_secs)?,
            url: config.ollama_url.trim_end_matches('/').to_string(),
            models,
            default_model: config.default_model.clone(),
            timeout_secs: config.request_timeout_secs,
        })
    }

    pub fn models(&self) -> &[String] {
        &self.models
    }

    pub fn complete(&self, request: &CompletionRequest) -> Result<String, OracleError> {
        let model = select_model(request.task, &self.models, &self.default_model);
        debug!("Ollama {:?} request using model {}", request.task, model);

        let mut body = serde_json::json!({
            "model": model,
            "prompt": request.prompt,
            "stream": false,
            "options": {
                "temperature": request.task.temperature(),
                "top_p": 0.9,
                "num_predict": request.task.max_tokens(),
            },
        });
        if let Some(system) = &request.system {
            body["system"] = serde_json::Value::String(system.clone());
        }

        let url = format!("{}/api/generate", self.url);
        let json = send_json(
            self.client.post(&url).json(&body),
            self.timeout_secs,
            "Ollama",
        )?;

        non_empty(json.get("response").and_then(|v| v.as_str()))
    }
}

/// OpenAI chat-completions API
pub struct OpenAiBackend {
    client: reqwest::blocking::Client,
    url: String,
    model: String,
    api_key: String,
    timeout_secs: u64,
}

impl OpenAiBackend {
    pub fn new(config: &OracleConfig, api_key: String) -> Result<Self, OracleError> {
        Ok(Self {
            client: http_client(config.request_timeout_secs)?,
            url: config.openai_url.trim_end_matches('/').to_string(),
            model: config.openai_model.clone(),
            api_key,
            timeout_secs: config.request_timeout_secs,
        })
    }

    pub fn complete(&self, request: &CompletionRequest) -> Result<String, OracleError> {
        let mut messages = Vec::new();
        if let Some(system) = &request.system {
            messages.push(serde_json::json!({"role": "system", "content": system}));
        }
        messages.push(serde_json::json!({"role": "user", "content": request.prompt}));

        let body = serde_json::json!({
            "model": self.model,
            "messages": messages,
            "max_tokens": request.task.max_tokens(),
            "temperature": request.task.temperature(),
        });

        let url = format!("{}/v1/chat/completions", self.url);
        let json = send_json(
            self.client.post(&url).bearer_auth(&self.api_key).json(&body),
            self.timeout_secs,
            "OpenAI",
        )?;

        non_empty(
            json.get("choices")
                .and_then(|v| v.get(0))
                .and_then(|v| v.get("message"))
                .and_then(|v| v.get("content"))
                .and_then(|v| v.as_str()),
        )
    }
}

/// Anthropic messages API
pub struct AnthropicBackend {
    client: reqwest::blocking::Client,
    url: String,
    model: String,
    api_key: String,
    timeout_secs: u64,
}

impl AnthropicBackend {
    pub fn new(config: &OracleConfig, api_key: String) -> Result<Self, OracleError> {
        Ok(Self {
            client: http_client(config.request_timeout_secs)?,
            url: config.anthropic_url.trim_end_matches('/').to_string(),
            model: config.anthropic_model.clone(),
            api_key,
            timeout_secs: config.request_timeout_secs,
        })
    }

    pub fn complete(&self, request: &CompletionRequest) -> Result<String, OracleError> {
        let mut body = serde_json::json!({
            "model": self.model,
            "max_tokens": request.task.max_tokens(),
            "temperature": request.task.temperature(),
            "messages": [{"role": "user", "content": request.prompt}],
        });
        if let Some(system) = &request.system {
            body["system"] = serde_json::Value::String(system.clone());
        }

        let url = format!("{}/v1/messages", self.url);
        let json = send_json(
            self.client
                .post(&url)
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", ANTHROPIC_VERSION)
                .json(&body),
            self.timeout_secs,
            "Anthropic",
        )?;

        non_empty(
            json.get("content")
                .and_then(|v| v.get(0))
                .and_then(|v| v.get("text"))
                .and_then(|v| v.as_str()),
        )
    }
}

type ScriptFn = dyn Fn(&CompletionRequest) -> Result<String, OracleError> + Send + Sync;

/// In-process backend driven by a closure, for tests and simulations
pub struct ScriptedBackend {
    script: Box<ScriptFn>,
    calls: AtomicUsize,
}

impl ScriptedBackend {
    pub fn from_fn<F>(script: F) -> Self
    where
        F: Fn(&CompletionRequest) -> Result<String, OracleError> + Send + Sync + 'static,
    {
        Self {
            script: Box::new(script),
            calls: AtomicUsize::new(0),
        }
    }

    /// Same text for every request
    pub fn always(text: impl Into<String>) -> Self {
        let text = text.into();
        Self::from_fn(move |_| Ok(text.clone()))
    }

    /// Same error for every request
    pub fn failing(error: OracleError) -> Self {
        Self::from_fn(move |_| Err(error.clone()))
    }

    /// Fixed reply per task; tasks without an entry get [`OracleError::Empty`]
    pub fn per_task(
        replies: impl IntoIterator<Item = (ModelTask, Result<String, OracleError>)>,
    ) -> Self {
        let replies: Vec<(ModelTask, Result<String, OracleError>)> = replies.into_iter().collect();
        Self::from_fn(move |request| {
            replies
                .iter()
                .find(|(task, _)| *task == request.task)
                .map(|(_, reply)| reply.clone())
                .unwrap_or(Err(OracleError::Empty))
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn complete(&self, request: &CompletionRequest) -> Result<String, OracleError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.script)(request)
    }
}

impl fmt::Debug for ScriptedBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptedBackend")
            .field("calls", &self.call_count())
            .finish()
    }
}

/// The backend the oracle talks to
pub enum Backend {
    Ollama(OllamaBackend),
    OpenAi(OpenAiBackend),
    Anthropic(AnthropicBackend),
    Scripted(ScriptedBackend),
}

impl Backend {
    pub fn kind(&self) -> BackendKind {
        match self {
            Backend::Ollama(_) => BackendKind::LocalOllama,
            Backend::OpenAi(_) => BackendKind::OpenAi,
            Backend::Anthropic(_) => BackendKind::Anthropic,
            Backend::Scripted(_) => BackendKind::Scripted,
        }
    }

    pub fn complete(&self, request: &CompletionRequest) -> Result<String, OracleError> {
        match self {
            Backend::Ollama(b) => b.complete(request),
            Backend::OpenAi(b) => b.complete(request),
            Backend::Anthropic(b) => b.complete(request),
            Backend::Scripted(b) => b.complete(request),
        }
    }

    pub fn as_scripted(&self) -> Option<&ScriptedBackend> {
        match self {
            Backend::Scripted(b) => Some(b),
            _ => None,
        }
    }
}

impl fmt::Debug for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Backend({})", self.kind())
    }
}
