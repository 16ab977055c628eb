//! Match scorer
//!
//! score = matches / total over the answered traits a candidate defines.
//! Candidates are scanned in id order and only a strictly higher score
//! replaces the current leader, so ties go to the lowest id.

use tracing::debug;

use crate::candidate::Candidate;
use crate::state::TraitAnswer;

/// Score of one candidate against the current answers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchScore<'a> {
    pub candidate: &'a Candidate,
    /// Answered traits where the candidate agrees
    pub matches: usize,
    /// Answered traits the candidate defines
    pub total: usize,
    /// matches / total, 0.0 when total is 0
    pub score: f64,
}

pub fn score_candidate<'a>(candidate: &'a Candidate, answers: &[TraitAnswer<'_>]) -> MatchScore<'a> {
    let mut matches = 0;
    let mut total = 0;

    for answer in answers {
        if let Some(value) = candidate.trait_value(answer.key) {
            total += 1;
            if value == answer.value {
                matches += 1;
            }
        }
    }

    let score = if total == 0 {
        0.0
    } else {
        matches as f64 / total as f64
    };

    MatchScore {
        candidate,
        matches,
        total,
        score,
    }
}

/// Highest-scoring candidate with a score above zero, ties to lowest id.
///
/// `None` when there are no answers or nobody matches anything.
pub fn leader<'a>(candidates: &'a [Candidate], answers: &[TraitAnswer<'_>]) -> Option<MatchScore<'a>> {
    if answers.is_empty() {
        return None;
    }

    let mut ordered: Vec<&Candidate> = candidates.iter().collect();
    ordered.sort_by_key(|c| c.id);

    let mut best: Option<MatchScore<'a>> = None;
    for candidate in ordered {
        let scored = score_candidate(candidate, answers);
        let better = match &best {
            Some(current) => scored.score > current.score,
            None => scored.score > 0.0,
        };
        if better {
            best = Some(scored);
        }
    }
    best
}

/// Leader whose score is strictly above `floor`
pub fn best_match<'a>(
    candidates: &'a [Candidate],
    answers: &[TraitAnswer<'_>],
    floor: f64,
) -> Option<MatchScore<'a>> {
    let best = leader(candidates, answers)?;
    if best.score > floor {
        debug!(
            "Best match {} ({}/{} = {:.2})",
            best.candidate.name, best.matches, best.total, best.score
        );
        Some(best)
    } else {
        debug!(
            "Leader {} at {:.2} does not clear floor {:.2}",
            best.candidate.name, best.score, floor
        );
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidate::CandidateStore;

    fn candidate(id: u32, name: &str, traits: &[(&str, bool)]) -> Candidate {
        Candidate {
            id,
            name: name.to_string(),
            description: String::new(),
            image: None,
            traits: traits.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
        }
    }

    fn a_and_b() -> Vec<Candidate> {
        vec![
            candidate(1, "A", &[("scientist", true), ("american", false)]),
            candidate(2, "B", &[("scientist", false), ("american", true)]),
        ]
    }

    #[test]
    fn test_empty_answers_have_no_match() {
        let store = CandidateStore::builtin();
        assert!(best_match(store.as_slice(), &[], 0.5).is_none());
        assert!(leader(store.as_slice(), &[]).is_none());
    }

    #[test]
    fn test_single_answer_picks_a() {
        let people = a_and_b();
        let answers = [TraitAnswer {
            key: "scientist",
            value: true,
        }];
        let best = best_match(&people, &answers, 0.5).unwrap();
        assert_eq!(best.candidate.name, "A");
        assert_eq!(best.score, 1.0);
        assert_eq!((best.matches, best.total), (1, 1));
    }

    #[test]
    fn test_half_score_does_not_clear_exclusive_floor() {
        let people = a_and_b();
        let answers = [
            TraitAnswer {
                key: "scientist",
                value: true,
            },
            TraitAnswer {
                key: "american",
                value: true,
            },
        ];

        assert_eq!(score_candidate(&people[0], &answers).score, 0.5);
        assert_eq!(score_candidate(&people[1], &answers).score, 0.5);
        assert!(best_match(&people, &answers, 0.5).is_none());

        // Leader still exists, tie goes to the lowest id
        assert_eq!(leader(&people, &answers).unwrap().candidate.id, 1);
    }

    #[test]
    fn test_tie_broken_by_lowest_id_regardless_of_order() {
        let people = vec![
            candidate(9, "Late", &[("x", true)]),
            candidate(3, "Early", &[("x", true)]),
        ];
        let answers = [TraitAnswer {
            key: "x",
            value: true,
        }];
        assert_eq!(best_match(&people, &answers, 0.5).unwrap().candidate.id, 3);
    }

    #[test]
    fn test_undefined_traits_do_not_count() {
        let people = vec![candidate(1, "Sparse", &[("x", true)])];
        let answers = [
            TraitAnswer {
                key: "x",
                value: true,
            },
            TraitAnswer {
                key: "y",
                value: false,
            },
        ];
        let scored = score_candidate(&people[0], &answers);
        assert_eq!((scored.matches, scored.total), (1, 1));
        assert_eq!(scored.score, 1.0);
    }

    #[test]
    fn test_nobody_defines_answered_traits() {
        let people = a_and_b();
        let answers = [TraitAnswer {
            key: "is_blonde",
            value: true,
        }];
        assert!(leader(&people, &answers).is_none());
        assert_eq!(score_candidate(&people[0], &answers).score, 0.0);
    }

    #[test]
    fn test_builtin_identifies_curie() {
        let store = CandidateStore::builtin();
        let answers = [
            TraitAnswer {
                key: "is_scientist",
                value: true,
            },
            TraitAnswer {
                key: "is_male",
                value: false,
            },
        ];
        let best = best_match(store.as_slice(), &answers, 0.5).unwrap();
        assert_eq!(best.candidate.name, "Marie Curie");
    }
}
