//! twentyq common - guessing engine core
//!
//! Narrows a candidate pool with yes/no/unknown answers, picks the next
//! question, and decides when to guess. An optional text-completion oracle
//! can propose questions, estimate confidence and name people outright.

pub mod answer;
pub mod candidate;
pub mod config;
pub mod database;
pub mod decision;
pub mod engine;
pub mod error;
pub mod filter;
pub mod oracle;
pub mod schema;
pub mod scorer;
pub mod selector;
pub mod state;

pub use answer::{AnswerValue, QuestionId};
pub use candidate::{Candidate, CandidateStore};
pub use config::TwentyqConfig;
pub use database::Database;
pub use decision::{Decision, GuessPolicy};
pub use engine::{GameEngine, GuessSource, StartOutcome, TurnOutcome};
pub use error::{OracleError, Result, TwentyqError};
pub use filter::remaining_candidates;
pub use oracle::{Oracle, OracleStatus};
pub use schema::{TraitDef, TraitSchema};
pub use scorer::{best_match, MatchScore};
pub use selector::{next_question, Question, QuestionSource};
pub use state::{GameState, TraitAnswer};
