//! Caller-held game state
//!
//! The engine keeps nothing between turns. The caller gets a [`GameState`]
//! back with every question and hands it in again with the next answer.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::answer::{AnswerValue, QuestionId};
use crate::schema::TraitSchema;

/// A resolved, non-unknown answer about one schema trait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraitAnswer<'a> {
    pub key: &'a str,
    pub value: bool,
}

/// Asked questions plus the answer record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    #[serde(default)]
    pub asked_questions: BTreeSet<QuestionId>,
    #[serde(default)]
    pub answers: BTreeMap<QuestionId, AnswerValue>,
}

impl GameState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a question asked and store its answer. Recording the same id
    /// twice keeps the last value.
    pub fn record_answer(&mut self, id: QuestionId, value: AnswerValue) {
        self.asked_questions.insert(id.clone());
        self.answers.insert(id, value);
    }

    pub fn asked_count(&self) -> usize {
        self.asked_questions.len()
    }

    pub fn was_asked(&self, id: &QuestionId) -> bool {
        self.asked_questions.contains(id)
    }

    /// Schema-resolvable, non-unknown answers, in question-id order.
    ///
    /// Oracle questions and ids missing from the schema are skipped.
    pub fn trait_answers<'s>(&self, schema: &'s TraitSchema) -> Vec<TraitAnswer<'s>> {
        self.answers
            .iter()
            .filter_map(|(id, value)| {
                let value = value.as_bool()?;
                let def = schema.get(id.schema_id()?)?;
                Some(TraitAnswer {
                    key: def.key.as_str(),
                    value,
                })
            })
            .collect()
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }

    pub fn from_json(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }
}
