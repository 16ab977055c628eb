//! Question selector
//!
//! The oracle gets the first attempt. Otherwise the unasked schema trait that
//! splits the candidate pool most evenly wins. Balance is measured over every
//! stored candidate, not only the ones still consistent with the answers.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::answer::QuestionId;
use crate::candidate::Candidate;
use crate::oracle::{GameContext, Oracle};
use crate::schema::{TraitDef, TraitSchema};
use crate::state::GameState;

/// Where a question came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionSource {
    Schema,
    Oracle,
}

/// A question ready to show to the player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub text: String,
    /// Schema trait this question resolves, `None` for oracle questions
    #[serde(rename = "trait", default, skip_serializing_if = "Option::is_none")]
    pub trait_key: Option<String>,
    pub source: QuestionSource,
}

impl Question {
    pub fn from_schema(def: &TraitDef) -> Self {
        Self {
            id: QuestionId::Schema(def.id),
            text: def.text.clone(),
            trait_key: Some(def.key.clone()),
            source: QuestionSource::Schema,
        }
    }

    pub fn from_oracle(text: String) -> Self {
        Self {
            id: QuestionId::for_oracle_text(&text),
            text,
            trait_key: None,
            source: QuestionSource::Oracle,
        }
    }
}

/// `1 - |yes - no| / (yes + no)` over the candidates defining `key`.
/// `None` when nobody defines it.
pub fn balance_score(candidates: &[Candidate], key: &str) -> Option<f64> {
    let (yes, no) = candidates
        .iter()
        .filter_map(|c| c.trait_value(key))
        .fold((0usize, 0usize), |(yes, no), value| {
            if value {
                (yes + 1, no)
            } else {
                (yes, no + 1)
            }
        });

    let total = yes + no;
    if total == 0 {
        return None;
    }
    Some(1.0 - yes.abs_diff(no) as f64 / total as f64)
}

/// Deterministic heuristic pick among unasked schema traits
pub fn fallback_question<R: Rng + ?Sized>(
    candidates: &[Candidate],
    schema: &TraitSchema,
    state: &GameState,
    rng: &mut R,
) -> Option<Question> {
    let available: Vec<&TraitDef> = schema
        .iter()
        .filter(|def| !state.was_asked(&QuestionId::Schema(def.id)))
        .collect();

    if available.is_empty() {
        return None;
    }

    // Schema iterates in id order, so strict improvement keeps the lowest id on ties
    let mut best: Option<(&TraitDef, f64)> = None;
    for &def in &available {
        let Some(balance) = balance_score(candidates, &def.key) else {
            continue;
        };
        if best.map_or(true, |(_, top)| balance > top) {
            best = Some((def, balance));
        }
    }

    match best {
        Some((def, balance)) => {
            debug!("Fallback question {} ({}) balance {:.2}", def.id, def.key, balance);
            Some(Question::from_schema(def))
        }
        None => {
            let def = available.choose(rng)?;
            debug!("No trait has a defined balance, picked {} at random", def.id);
            Some(Question::from_schema(def))
        }
    }
}

/// Next question for this game, or `None` once the schema is exhausted
pub fn next_question<R: Rng + ?Sized>(
    candidates: &[Candidate],
    schema: &TraitSchema,
    state: &GameState,
    oracle: &Oracle,
    rng: &mut R,
) -> Option<Question> {
    let schema_left = schema
        .iter()
        .any(|def| !state.was_asked(&QuestionId::Schema(def.id)));
    if !schema_left {
        return None;
    }

    if oracle.is_available() {
        let ctx = GameContext {
            candidates,
            schema,
            state,
        };
        if let Some(text) = oracle.generate_question(&ctx) {
            let question = Question::from_oracle(text);
            if !state.was_asked(&question.id) {
                return Some(question);
            }
            debug!("Oracle repeated question {}, using fallback", question.id);
        }
    }

    fallback_question(candidates, schema, state, rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::answer::AnswerValue;
    use crate::candidate::CandidateStore;
    use crate::error::OracleError;
    use crate::oracle::{Backend, ScriptedBackend};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn candidate(id: u32, traits: &[(&str, bool)]) -> Candidate {
        Candidate {
            id,
            name: format!("P{}", id),
            description: String::new(),
            image: None,
            traits: traits.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
        }
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn test_balance_score() {
        let people = vec![
            candidate(1, &[("x", true), ("y", true)]),
            candidate(2, &[("x", false), ("y", true)]),
            candidate(3, &[("y", true)]),
        ];
        assert_eq!(balance_score(&people, "x"), Some(1.0));
        assert_eq!(balance_score(&people, "y"), Some(0.0));
        assert_eq!(balance_score(&people, "z"), None);
    }

    #[test]
    fn test_builtin_first_question_is_american() {
        // is_american is the only trait splitting the seed 4/4
        let store = CandidateStore::builtin();
        let schema = TraitSchema::builtin();
        let question =
            fallback_question(store.as_slice(), &schema, &GameState::new(), &mut rng()).unwrap();
        assert_eq!(question.id, QuestionId::Schema(5));
        assert_eq!(question.trait_key.as_deref(), Some("is_american"));
        assert_eq!(question.source, QuestionSource::Schema);
    }

    #[test]
    fn test_asked_traits_are_skipped() {
        let store = CandidateStore::builtin();
        let schema = TraitSchema::builtin();
        let mut state = GameState::new();
        state.record_answer(QuestionId::Schema(5), AnswerValue::Yes);

        // Next best are the 5/3 splits at 0.75; id 1 wins the tie
        let question = fallback_question(store.as_slice(), &schema, &state, &mut rng()).unwrap();
        assert_eq!(question.id, QuestionId::Schema(1));
    }

    #[test]
    fn test_exhausted_schema_returns_none() {
        let store = CandidateStore::builtin();
        let schema = TraitSchema::builtin();
        let mut state = GameState::new();
        for def in schema.iter() {
            state.record_answer(QuestionId::Schema(def.id), AnswerValue::Unknown);
        }
        let oracle = Oracle::with_backend(Backend::Scripted(ScriptedBackend::always(
            "Is this person European?",
        )));

        assert!(next_question(store.as_slice(), &schema, &state, &oracle, &mut rng()).is_none());
        assert_eq!(oracle.backend().unwrap().as_scripted().unwrap().call_count(), 0);
    }

    #[test]
    fn test_undefined_balance_picks_randomly_among_available() {
        let people = vec![candidate(1, &[])];
        let schema = TraitSchema::from_traits(vec![
            TraitDef::new(1, "A?", "a"),
            TraitDef::new(2, "B?", "b"),
        ])
        .unwrap();
        let mut state = GameState::new();
        state.record_answer(QuestionId::Schema(1), AnswerValue::No);

        let question = fallback_question(&people, &schema, &state, &mut rng()).unwrap();
        assert_eq!(question.id, QuestionId::Schema(2));
    }

    #[test]
    fn test_oracle_question_preferred() {
        let store = CandidateStore::builtin();
        let schema = TraitSchema::builtin();
        let oracle = Oracle::with_backend(Backend::Scripted(ScriptedBackend::always(
            "Is this person European?",
        )));

        let question =
            next_question(store.as_slice(), &schema, &GameState::new(), &oracle, &mut rng())
                .unwrap();
        assert_eq!(question.source, QuestionSource::Oracle);
        assert_eq!(question.text, "Is this person European?");
        assert!(question.id.is_oracle());
        assert!(question.trait_key.is_none());
    }

    #[test]
    fn test_oracle_failure_falls_back() {
        let store = CandidateStore::builtin();
        let schema = TraitSchema::builtin();
        let oracle = Oracle::with_backend(Backend::Scripted(ScriptedBackend::failing(
            OracleError::Timeout(30),
        )));

        let question =
            next_question(store.as_slice(), &schema, &GameState::new(), &oracle, &mut rng())
                .unwrap();
        assert_eq!(question.id, QuestionId::Schema(5));
    }

    #[test]
    fn test_repeated_oracle_question_falls_back() {
        let store = CandidateStore::builtin();
        let schema = TraitSchema::builtin();
        let text = "Is this person European?";
        let mut state = GameState::new();
        state.record_answer(QuestionId::for_oracle_text(text), AnswerValue::Yes);
        let oracle = Oracle::with_backend(Backend::Scripted(ScriptedBackend::always(text)));

        let question =
            next_question(store.as_slice(), &schema, &state, &oracle, &mut rng()).unwrap();
        assert_eq!(question.source, QuestionSource::Schema);
    }

    #[test]
    fn test_question_json_uses_trait_field() {
        let def = TraitDef::new(3, "Is this person male?", "is_male");
        let json = serde_json::to_value(Question::from_schema(&def)).unwrap();
        assert_eq!(json["id"], "3");
        assert_eq!(json["trait"], "is_male");
        assert_eq!(json["source"], "schema");
    }
}
