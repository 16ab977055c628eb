//! Turn API
//!
//! Stateless between calls: the caller passes back the [`GameState`] it got
//! from the previous turn. The only thing the engine mutates is the
//! candidate store, when the oracle names someone it has never seen.

use serde::{Deserialize, Serialize};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info, warn};

use crate::answer::{AnswerValue, QuestionId};
use crate::candidate::{Candidate, CandidateStore};
use crate::config::{GameConfig, TwentyqConfig};
use crate::database::Database;
use crate::decision::GuessPolicy;
use crate::error::Result;
use crate::filter::remaining_candidates;
use crate::oracle::{GameContext, Identification, Oracle};
use crate::schema::TraitSchema;
use crate::scorer::{best_match, leader};
use crate::selector::{next_question, Question};
use crate::state::GameState;

/// Who produced a final guess
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuessSource {
    Scorer,
    Oracle,
}

/// First turn of a game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartOutcome {
    /// `None` only when the schema has no questions at all
    pub question: Option<Question>,
    pub progress: f64,
    pub state: GameState,
}

/// Result of submitting one answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TurnOutcome {
    Question {
        question: Question,
        /// asked / schema size * 100, may pass 100 with oracle questions
        progress: f64,
        state: GameState,
    },
    Result {
        /// `None` means the game could not determine anyone
        candidate: Option<Candidate>,
        confidence: f64,
        questions_asked: usize,
        source: GuessSource,
    },
}

impl TurnOutcome {
    pub fn is_result(&self) -> bool {
        matches!(self, TurnOutcome::Result { .. })
    }
}

enum Step {
    Done(TurnOutcome),
    Identified(Identification, GameState),
}

/// The guessing engine
#[derive(Debug)]
pub struct GameEngine {
    schema: TraitSchema,
    store: RwLock<CandidateStore>,
    oracle: Oracle,
    config: GameConfig,
    policy: GuessPolicy,
}

impl GameEngine {
    pub fn new(database: Database, oracle: Oracle, config: GameConfig) -> Self {
        info!(
            "Engine ready: {} people, {} questions, oracle {}",
            database.store.len(),
            database.schema.len(),
            oracle.kind()
        );
        Self {
            schema: database.schema,
            store: RwLock::new(database.store),
            oracle,
            policy: GuessPolicy::from_config(&config),
            config,
        }
    }

    /// Load the database and probe the oracle as configured
    pub fn from_config(config: &TwentyqConfig) -> Result<Self> {
        let database = Database::load(&config.database.path)?;
        let oracle = Oracle::probe(&config.oracle);
        Ok(Self::new(database, oracle, config.game.clone()))
    }

    pub fn schema(&self) -> &TraitSchema {
        &self.schema
    }

    pub fn oracle(&self) -> &Oracle {
        &self.oracle
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Snapshot of the candidate store
    pub fn candidates(&self) -> Vec<Candidate> {
        self.read_store().as_slice().to_vec()
    }

    fn read_store(&self) -> RwLockReadGuard<'_, CandidateStore> {
        self.store.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_store(&self) -> RwLockWriteGuard<'_, CandidateStore> {
        self.store.write().unwrap_or_else(|e| e.into_inner())
    }

    /// `asked / schema size * 100`
    pub fn progress(&self, state: &GameState) -> f64 {
        if self.schema.is_empty() {
            return 0.0;
        }
        state.asked_count() as f64 / self.schema.len() as f64 * 100.0
    }

    pub fn start(&self) -> StartOutcome {
        let state = GameState::new();
        let store = self.read_store();
        let question = next_question(
            store.as_slice(),
            &self.schema,
            &state,
            &self.oracle,
            &mut rand::thread_rng(),
        );

        StartOutcome {
            question,
            progress: 0.0,
            state,
        }
    }

    /// Record one answer and produce the next question or a final guess
    pub fn submit_answer(
        &self,
        question_id: QuestionId,
        value: AnswerValue,
        prior_state: GameState,
    ) -> TurnOutcome {
        let mut state = prior_state;
        state.record_answer(question_id, value);
        let questions_asked = state.asked_count();

        let (identified, state) = {
            let store = self.read_store();
            match self.evaluate(store.as_slice(), state) {
                Step::Done(outcome) => return outcome,
                Step::Identified(identification, state) => (identification, state),
            }
        };

        let stored = self.write_store().append_synthesized(
            &identified.name,
            &identified.description,
            Some(identified.image.clone()),
        );
        let candidate = match stored {
            Ok(candidate) => candidate,
            Err(e) => {
                warn!("Could not store oracle guess {}: {}", identified.name, e);
                return self.scorer_result(&state);
            }
        };
        info!(
            "Oracle guess: {} (id {}, confidence {:.2})",
            candidate.name, candidate.id, identified.confidence
        );

        TurnOutcome::Result {
            candidate: Some(candidate),
            confidence: identified.confidence,
            questions_asked,
            source: GuessSource::Oracle,
        }
    }

    /// Best scorer match for the answers so far, or "could not determine"
    fn scorer_result(&self, state: &GameState) -> TurnOutcome {
        let store = self.read_store();
        let answers = state.trait_answers(&self.schema);
        let best = best_match(store.as_slice(), &answers, self.config.match_floor);
        TurnOutcome::Result {
            confidence: best.as_ref().map_or(0.0, |b| b.score),
            candidate: best.map(|b| b.candidate.clone()),
            questions_asked: state.asked_count(),
            source: GuessSource::Scorer,
        }
    }

    fn evaluate(&self, candidates: &[Candidate], state: GameState) -> Step {
        let answers = state.trait_answers(&self.schema);
        let remaining = remaining_candidates(candidates, &answers);
        debug!(
            "{} of {} candidates consistent after {} questions",
            remaining.len(),
            candidates.len(),
            state.asked_count()
        );

        let ctx = GameContext {
            candidates,
            schema: &self.schema,
            state: &state,
        };

        let estimate = self.oracle.is_available().then_some(|| {
            leader(candidates, &answers)
                .and_then(|top| self.oracle.estimate_confidence(top.candidate, &ctx))
        });
        let decision = self.policy.decide(state.asked_count(), estimate);

        if decision.guess {
            if let Some(identification) = self.oracle.identify_candidate(&ctx) {
                return Step::Identified(identification, state);
            }
            if let Some(best) = best_match(candidates, &answers, self.config.match_floor) {
                info!("Guessing {} after {} questions", best.candidate.name, state.asked_count());
                return Step::Done(TurnOutcome::Result {
                    candidate: Some(best.candidate.clone()),
                    confidence: decision.oracle_confidence.unwrap_or(best.score),
                    questions_asked: state.asked_count(),
                    source: GuessSource::Scorer,
                });
            }
            debug!("Ready to guess but nobody clears the match floor, asking more");
        }

        let next = next_question(
            candidates,
            &self.schema,
            &state,
            &self.oracle,
            &mut rand::thread_rng(),
        );

        match next {
            Some(question) => Step::Done(TurnOutcome::Question {
                question,
                progress: self.progress(&state),
                state,
            }),
            None => {
                let questions_asked = state.asked_count();
                let outcome = match best_match(candidates, &answers, self.config.match_floor) {
                    Some(best) => TurnOutcome::Result {
                        candidate: Some(best.candidate.clone()),
                        confidence: decision.oracle_confidence.unwrap_or(best.score),
                        questions_asked,
                        source: GuessSource::Scorer,
                    },
                    None => {
                        info!("Questions exhausted, could not determine the person");
                        TurnOutcome::Result {
                            candidate: None,
                            confidence: 0.0,
                            questions_asked,
                            source: GuessSource::Scorer,
                        }
                    }
                };
                Step::Done(outcome)
            }
        }
    }
}
