//! Per-task model preference for multi-model backends

use serde::{Deserialize, Serialize};

/// What the oracle is being asked to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelTask {
    QuestionGeneration,
    ConfidenceAnalysis,
    Identification,
    General,
}

impl ModelTask {
    /// Preferred model names, most capable first
    pub fn preferences(self) -> &'static [&'static str] {
        match self {
            ModelTask::QuestionGeneration => {
                &["llama2", "codellama", "mistral", "llama2:13b", "llama2:7b"]
            }
            ModelTask::ConfidenceAnalysis => &["llama2", "mistral", "codellama", "llama2:13b"],
            ModelTask::Identification | ModelTask::General => {
                &["llama2", "mistral", "codellama", "llama2:13b", "llama2:7b"]
            }
        }
    }

    /// Sampling temperature for the task
    pub fn temperature(self) -> f32 {
        match self {
            ModelTask::QuestionGeneration => 0.3,
            ModelTask::ConfidenceAnalysis => 0.1,
            ModelTask::Identification => 0.2,
            ModelTask::General => 0.3,
        }
    }

    /// Response token budget for the task
    pub fn max_tokens(self) -> u32 {
        match self {
            ModelTask::QuestionGeneration => 100,
            ModelTask::ConfidenceAnalysis => 20,
            ModelTask::Identification => 200,
            ModelTask::General => 200,
        }
    }
}

/// Pick a model for `task` from the enumerated `available` names.
///
/// For each preference in order: exact name first, then any name containing
/// it. Falls back to the first available model, then to `default_model`.
pub fn select_model(task: ModelTask, available: &[String], default_model: &str) -> String {
    for preferred in task.preferences() {
        if let Some(exact) = available.iter().find(|m| m.as_str() == *preferred) {
            return exact.clone();
        }
        if let Some(partial) = available.iter().find(|m| m.contains(preferred)) {
            return partial.clone();
        }
    }

    available
        .first()
        .cloned()
        .unwrap_or_else(|| default_model.to_string())
}
