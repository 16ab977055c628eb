//! Guess decision policy
//!
//! Re-evaluated after every answer with no memory of earlier calls.

use crate::config::GameConfig;

/// Outcome of one policy evaluation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decision {
    pub guess: bool,
    /// Oracle estimate consulted for this decision, if any
    pub oracle_confidence: Option<f64>,
}

/// When to stop asking and commit to a guess
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GuessPolicy {
    pub fallback_question_cap: usize,
    pub oracle_min_questions: usize,
    pub guess_threshold: f64,
}

impl GuessPolicy {
    pub fn from_config(config: &GameConfig) -> Self {
        Self {
            fallback_question_cap: config.fallback_question_cap,
            oracle_min_questions: config.oracle_min_questions,
            guess_threshold: config.guess_threshold,
        }
    }

    /// Evaluate the policy.
    ///
    /// `oracle_estimate` is `None` when no oracle is configured. It is only
    /// invoked once the oracle question floor is reached. An estimate that
    /// comes back empty degrades to the question-count rule.
    pub fn decide<F>(&self, asked_count: usize, oracle_estimate: Option<F>) -> Decision
    where
        F: FnOnce() -> Option<f64>,
    {
        let Some(estimate) = oracle_estimate else {
            return Decision {
                guess: asked_count >= self.fallback_question_cap,
                oracle_confidence: None,
            };
        };

        if asked_count < self.oracle_min_questions {
            return Decision {
                guess: false,
                oracle_confidence: None,
            };
        }

        match estimate() {
            Some(confidence) => Decision {
                guess: confidence > self.guess_threshold,
                oracle_confidence: Some(confidence),
            },
            None => Decision {
                guess: asked_count >= self.fallback_question_cap,
                oracle_confidence: None,
            },
        }
    }

    pub fn should_guess<F>(&self, asked_count: usize, oracle_estimate: Option<F>) -> bool
    where
        F: FnOnce() -> Option<f64>,
    {
        self.decide(asked_count, oracle_estimate).guess
    }
}

impl Default for GuessPolicy {
    fn default() -> Self {
        Self::from_config(&GameConfig::default())
    }
}
