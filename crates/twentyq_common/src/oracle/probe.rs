//! Backend discovery
//!
//! Probed once at start-up. Order: local Ollama, then OpenAI, then Anthropic.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::backend::{http_client, BackendKind};
use crate::config::OracleConfig;

/// What the start-up probe found
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OracleStatus {
    pub selected: BackendKind,
    pub local_ollama: bool,
    pub openai: bool,
    pub anthropic: bool,
    #[serde(default)]
    pub ollama_models: Vec<String>,
}

impl OracleStatus {
    pub fn unavailable() -> Self {
        Self {
            selected: BackendKind::None,
            local_ollama: false,
            openai: false,
            anthropic: false,
            ollama_models: Vec::new(),
        }
    }

    pub fn is_available(&self) -> bool {
        self.selected != BackendKind::None
    }

    /// Human-readable status lines
    pub fn describe(&self) -> Vec<String> {
        let yes_no = |b: bool| if b { "available" } else { "unavailable" };
        let mut lines = vec![
            format!("Selected backend: {}", self.selected),
            format!("Local Ollama: {}", yes_no(self.local_ollama)),
            format!("OpenAI: {}", if self.openai { "configured" } else { "not configured" }),
            format!(
                "Anthropic: {}",
                if self.anthropic { "configured" } else { "not configured" }
            ),
        ];
        if !self.ollama_models.is_empty() {
            lines.push(format!("Ollama models: {}", self.ollama_models.join(", ")));
        }
        lines
    }
}

/// GET `/api/tags`. `Some(models)` when the server answers in time.
pub fn probe_ollama(url: &str, timeout_secs: u64) -> Option<Vec<String>> {
    let client = http_client(timeout_secs).ok()?;

    let endpoint = format!("{}/api/tags", url.trim_end_matches('/'));
    let response = match client.get(&endpoint).send() {
        Ok(r) if r.status().is_success() => r,
        Ok(r) => {
            debug!("Ollama probe at {} returned HTTP {}", endpoint, r.status());
            return None;
        }
        Err(e) => {
            debug!("Ollama probe at {} failed: {}", endpoint, e);
            return None;
        }
    };

    // A reachable server with an unreadable body still counts as up
    let models = response
        .json::<serde_json::Value>()
        .ok()
        .and_then(|json| {
            json.get("models").and_then(|m| m.as_array()).map(|list| {
                list.iter()
                    .filter_map(|m| m.get("name").and_then(|n| n.as_str()))
                    .map(String::from)
                    .collect()
            })
        })
        .unwrap_or_default();

    Some(models)
}

/// Non-empty credential from the named environment variable
pub fn credential(var: &str) -> Option<String> {
    std::env::var(var)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Pick a backend from availability flags, in fixed preference order
pub fn select_kind(local_ollama: bool, openai: bool, anthropic: bool) -> BackendKind {
    if local_ollama {
        BackendKind::LocalOllama
    } else if openai {
        BackendKind::OpenAi
    } else if anthropic {
        BackendKind::Anthropic
    } else {
        BackendKind::None
    }
}

/// Probe everything the config allows
pub fn discover(config: &OracleConfig) -> OracleStatus {
    if !config.enabled {
        info!("Oracle disabled in configuration");
        return OracleStatus::unavailable();
    }

    let models = probe_ollama(&config.ollama_url, config.probe_timeout_secs);
    let local_ollama = models.is_some();
    let openai = credential(&config.openai_key_env).is_some();
    let anthropic = credential(&config.anthropic_key_env).is_some();

    let status = OracleStatus {
        selected: select_kind(local_ollama, openai, anthropic),
        local_ollama,
        openai,
        anthropic,
        ollama_models: models.unwrap_or_default(),
    };
    info!("Oracle backend: {}", status.selected);
    status
}
