//! Oracle adapter
//!
//! Optional text-completion backend that can propose questions, estimate
//! confidence in a candidate, and identify a person outright. Every public
//! operation returns `Option`: a failed call looks exactly like an absent
//! oracle to the rest of the engine.

pub mod backend;
pub mod models;
pub mod parse;
pub mod probe;
pub mod prompts;

use tracing::{debug, warn};

pub use backend::{
    AnthropicBackend, Backend, BackendKind, CompletionRequest, OllamaBackend, OpenAiBackend,
    ScriptedBackend,
};
pub use models::ModelTask;
pub use parse::Identification;
pub use probe::OracleStatus;
pub use prompts::GameContext;

use crate::candidate::Candidate;
use crate::config::OracleConfig;
use crate::error::OracleError;

/// Handle to the selected backend, or to nothing
#[derive(Debug)]
pub struct Oracle {
    backend: Option<Backend>,
    status: OracleStatus,
}

impl Oracle {
    /// Oracle that never answers
    pub fn disabled() -> Self {
        Self {
            backend: None,
            status: OracleStatus::unavailable(),
        }
    }

    /// Probe backends once and connect to the preferred one
    pub fn probe(config: &OracleConfig) -> Self {
        let status = probe::discover(config);

        let built = match status.selected {
            BackendKind::LocalOllama => {
                OllamaBackend::new(config, status.ollama_models.clone()).map(Backend::Ollama)
            }
            BackendKind::OpenAi => match probe::credential(&config.openai_key_env) {
                Some(key) => OpenAiBackend::new(config, key).map(Backend::OpenAi),
                None => Err(OracleError::Disabled),
            },
            BackendKind::Anthropic => match probe::credential(&config.anthropic_key_env) {
                Some(key) => AnthropicBackend::new(config, key).map(Backend::Anthropic),
                None => Err(OracleError::Disabled),
            },
            BackendKind::None | BackendKind::Scripted => return Self::disabled_with(status),
        };

        match built {
            Ok(backend) => Self {
                backend: Some(backend),
                status,
            },
            Err(e) => {
                warn!("Could not set up {} backend: {}", status.selected, e);
                Self::disabled_with(OracleStatus {
                    selected: BackendKind::None,
                    ..status
                })
            }
        }
    }

    /// Wrap an already-built backend
    pub fn with_backend(backend: Backend) -> Self {
        let kind = backend.kind();
        let ollama_models = match &backend {
            Backend::Ollama(b) => b.models().to_vec(),
            _ => Vec::new(),
        };
        Self {
            status: OracleStatus {
                selected: kind,
                local_ollama: kind == BackendKind::LocalOllama,
                openai: kind == BackendKind::OpenAi,
                anthropic: kind == BackendKind::Anthropic,
                ollama_models,
            },
            backend: Some(backend),
        }
    }

    fn disabled_with(status: OracleStatus) -> Self {
        Self {
            backend: None,
            status,
        }
    }

    pub fn is_available(&self) -> bool {
        self.backend.is_some()
    }

    pub fn kind(&self) -> BackendKind {
        self.backend
            .as_ref()
            .map(Backend::kind)
            .unwrap_or(BackendKind::None)
    }

    pub fn status(&self) -> &OracleStatus {
        &self.status
    }

    pub fn backend(&self) -> Option<&Backend> {
        self.backend.as_ref()
    }

    fn complete(&self, request: &CompletionRequest) -> Result<String, OracleError> {
        let backend = self.backend.as_ref().ok_or(OracleError::Disabled)?;
        backend.complete(request)
    }

    /// Propose the next yes/no question
    pub fn generate_question(&self, ctx: &GameContext<'_>) -> Option<String> {
        if !self.is_available() {
            return None;
        }
        let request = CompletionRequest::new(
            ModelTask::QuestionGeneration,
            prompts::QUESTION_SYSTEM_PROMPT,
            prompts::question_prompt(ctx),
        );

        let result = self.complete(&request).and_then(|raw| {
            parse::clean_question(&raw)
                .ok_or_else(|| OracleError::InvalidPayload("blank question".to_string()))
        });

        match result {
            Ok(question) => {
                debug!("Oracle question: {}", question);
                Some(question)
            }
            Err(e) => {
                warn!("Oracle question generation failed: {}", e);
                None
            }
        }
    }

    /// Name the person outright
    pub fn identify_candidate(&self, ctx: &GameContext<'_>) -> Option<Identification> {
        if !self.is_available() {
            return None;
        }
        let request = CompletionRequest::new(
            ModelTask::Identification,
            prompts::IDENTIFY_SYSTEM_PROMPT,
            prompts::identification_prompt(ctx),
        );

        let result = self.complete(&request).and_then(|raw| {
            parse::parse_identification(&raw).ok_or_else(|| {
                OracleError::InvalidPayload(format!("unusable identification: {}", raw.trim()))
            })
        });

        match result {
            Ok(identification) => {
                debug!(
                    "Oracle identified {} ({:.2})",
                    identification.name, identification.confidence
                );
                Some(identification)
            }
            Err(e) => {
                warn!("Oracle identification failed: {}", e);
                None
            }
        }
    }

    /// Confidence in [0, 1] that `candidate` is the answer
    pub fn estimate_confidence(&self, candidate: &Candidate, ctx: &GameContext<'_>) -> Option<f64> {
        if !self.is_available() {
            return None;
        }
        let request = CompletionRequest::new(
            ModelTask::ConfidenceAnalysis,
            prompts::CONFIDENCE_SYSTEM_PROMPT,
            prompts::confidence_prompt(candidate, ctx),
        );

        let result = self.complete(&request).and_then(|raw| {
            parse::parse_confidence(&raw).ok_or_else(|| {
                OracleError::InvalidPayload(format!("unusable confidence: {}", raw.trim()))
            })
        });

        match result {
            Ok(confidence) => {
                debug!("Oracle confidence in {}: {:.2}", candidate.name, confidence);
                Some(confidence)
            }
            Err(e) => {
                warn!("Oracle confidence estimate failed: {}", e);
                None
            }
        }
    }
}
