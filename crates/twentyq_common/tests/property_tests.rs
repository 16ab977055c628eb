//! Property tests for the guessing core
//!
//! Randomized inputs from a seeded xorshift generator, so failures replay.

use std::collections::{BTreeMap, HashSet};

use rand::rngs::StdRng;
use rand::SeedableRng;
use twentyq_common::decision::GuessPolicy;
use twentyq_common::filter::remaining_candidates;
use twentyq_common::oracle::Oracle;
use twentyq_common::scorer::best_match;
use twentyq_common::selector::next_question;
use twentyq_common::{
    AnswerValue, Candidate, GameState, QuestionId, TraitAnswer, TraitDef, TraitSchema,
};

// ============================================================================
// TEST HELPERS
// ============================================================================

/// xorshift64
struct TestRng {
    state: u64,
}

impl TestRng {
    fn new(seed: u64) -> Self {
        Self {
            state: if seed == 0 { 1 } else { seed },
        }
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    fn next_range(&mut self, min: u64, max: u64) -> u64 {
        if max <= min {
            return min;
        }
        min + (self.next_u64() % (max - min))
    }

    fn next_bool(&mut self) -> bool {
        self.next_u64() % 2 == 0
    }

    fn next_answer(&mut self) -> AnswerValue {
        match self.next_range(0, 3) {
            0 => AnswerValue::Yes,
            1 => AnswerValue::No,
            _ => AnswerValue::Unknown,
        }
    }
}

const KEYS: [&str; 12] = [
    "k00", "k01", "k02", "k03", "k04", "k05", "k06", "k07", "k08", "k09", "k10", "k11",
];

fn random_schema() -> TraitSchema {
    TraitSchema::from_traits(
        KEYS.iter()
            .enumerate()
            .map(|(i, key)| TraitDef::new(i as u32 + 1, format!("Is {}?", key), *key)),
    )
    .unwrap()
}

/// Candidates with a random partial trait assignment each
fn random_candidates(rng: &mut TestRng) -> Vec<Candidate> {
    let count = rng.next_range(1, 20);
    (1..=count as u32)
        .map(|id| {
            let mut traits = BTreeMap::new();
            for key in KEYS {
                // About a third of traits left undefined
                if rng.next_range(0, 3) != 0 {
                    traits.insert(key.to_string(), rng.next_bool());
                }
            }
            Candidate {
                id,
                name: format!("Person {}", id),
                description: String::new(),
                image: None,
                traits,
            }
        })
        .collect()
}

fn random_answers<'a>(rng: &mut TestRng) -> Vec<TraitAnswer<'a>> {
    let count = rng.next_range(0, KEYS.len() as u64);
    (0..count)
        .map(|i| TraitAnswer {
            key: KEYS[i as usize],
            value: rng.next_bool(),
        })
        .collect()
}

fn ids(candidates: &[&Candidate]) -> Vec<u32> {
    candidates.iter().map(|c| c.id).collect()
}

// ============================================================================
// Consistency filter
// ============================================================================

mod filter_properties {
    use super::*;

    /// Only-unknown answer sets leave the candidate set untouched
    #[test]
    fn test_unknown_answers_keep_everyone() {
        let mut rng = TestRng::new(42);
        let schema = random_schema();

        for _ in 0..200 {
            let candidates = random_candidates(&mut rng);
            let mut state = GameState::new();
            for def in schema.iter() {
                if rng.next_bool() {
                    state.record_answer(QuestionId::Schema(def.id), AnswerValue::Unknown);
                }
            }

            let answers = state.trait_answers(&schema);
            assert!(answers.is_empty());

            let remaining = remaining_candidates(&candidates, &answers);
            assert_eq!(remaining.len(), candidates.len());
        }
    }

    /// Adding a non-unknown answer never grows the remaining set
    #[test]
    fn test_filter_is_monotone() {
        let mut rng = TestRng::new(7);

        for _ in 0..200 {
            let candidates = random_candidates(&mut rng);
            let mut answers = random_answers(&mut rng);
            if answers.len() == KEYS.len() {
                continue;
            }
            let before: HashSet<u32> = ids(&remaining_candidates(&candidates, &answers))
                .into_iter()
                .collect();

            // random_answers covers a prefix of KEYS, so this key is new
            let extra = KEYS[rng.next_range(answers.len() as u64, KEYS.len() as u64) as usize];
            answers.push(TraitAnswer {
                key: extra,
                value: rng.next_bool(),
            });
            let after: HashSet<u32> = ids(&remaining_candidates(&candidates, &answers))
                .into_iter()
                .collect();

            assert!(after.is_subset(&before));
        }
    }

    /// Same inputs, same output
    #[test]
    fn test_filter_is_pure() {
        let mut rng = TestRng::new(99);
        for _ in 0..100 {
            let candidates = random_candidates(&mut rng);
            let answers = random_answers(&mut rng);
            let first = ids(&remaining_candidates(&candidates, &answers));
            let second = ids(&remaining_candidates(&candidates, &answers));
            assert_eq!(first, second);
        }
    }
}

// ============================================================================
// Match scorer
// ============================================================================

mod scorer_properties {
    use super::*;

    #[test]
    fn test_empty_answers_never_match() {
        let mut rng = TestRng::new(1234);
        for _ in 0..200 {
            let candidates = random_candidates(&mut rng);
            assert!(best_match(&candidates, &[], 0.5).is_none());
            assert!(best_match(&candidates, &[], 0.0).is_none());
        }
    }

    #[test]
    fn test_best_match_clears_floor_and_is_maximal() {
        let mut rng = TestRng::new(555);
        for _ in 0..200 {
            let candidates = random_candidates(&mut rng);
            let answers = random_answers(&mut rng);

            if let Some(best) = best_match(&candidates, &answers, 0.5) {
                assert!(best.score > 0.5);
                assert!(best.score <= 1.0);
                for other in &candidates {
                    let scored = twentyq_common::scorer::score_candidate(other, &answers);
                    assert!(scored.score <= best.score);
                    if scored.score == best.score {
                        assert!(other.id >= best.candidate.id);
                    }
                }
            }
        }
    }
}

// ============================================================================
// Guess decision
// ============================================================================

mod decision_properties {
    use super::*;

    #[test]
    fn test_decision_is_idempotent() {
        let mut rng = TestRng::new(31337);
        let policy = GuessPolicy::default();

        for _ in 0..500 {
            let asked = rng.next_range(0, 30) as usize;
            let estimate = if rng.next_bool() {
                Some(rng.next_range(0, 101) as f64 / 100.0)
            } else {
                None
            };

            let offline_a = policy.decide(asked, None::<fn() -> Option<f64>>);
            let offline_b = policy.decide(asked, None::<fn() -> Option<f64>>);
            assert_eq!(offline_a, offline_b);

            let online_a = policy.decide(asked, Some(|| estimate));
            let online_b = policy.decide(asked, Some(|| estimate));
            assert_eq!(online_a, online_b);

            if asked < policy.oracle_min_questions {
                assert!(!online_a.guess);
            }
        }
    }
}

// ============================================================================
// Question selector
// ============================================================================

mod selector_properties {
    use super::*;

    /// 50 turns with the fallback selector never repeat a question
    #[test]
    fn test_no_question_asked_twice() {
        let mut rng = TestRng::new(2024);
        let schema = random_schema();
        let oracle = Oracle::disabled();

        for game in 0..20 {
            let candidates = random_candidates(&mut rng);
            let mut select_rng = StdRng::seed_from_u64(game);
            let mut state = GameState::new();
            let mut seen = HashSet::new();

            for _turn in 0..50 {
                let Some(question) =
                    next_question(&candidates, &schema, &state, &oracle, &mut select_rng)
                else {
                    break;
                };
                assert!(seen.insert(question.id.clone()), "repeated {}", question.id);
                assert!(!state.was_asked(&question.id));
                state.record_answer(question.id, rng.next_answer());
            }

            assert_eq!(seen.len(), schema.len());
            assert!(next_question(&candidates, &schema, &state, &oracle, &mut select_rng).is_none());
        }
    }
}
