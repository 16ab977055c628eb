//! Consistency filter
//!
//! A candidate is dropped only when it defines an answered trait with the
//! opposite value. Undefined traits never exclude anyone.

use crate::candidate::Candidate;
use crate::state::TraitAnswer;

/// True when no answered trait contradicts the candidate
pub fn is_consistent(candidate: &Candidate, answers: &[TraitAnswer<'_>]) -> bool {
    answers.iter().all(|answer| {
        candidate
            .trait_value(answer.key)
            .map_or(true, |value| value == answer.value)
    })
}

/// Candidates still consistent with every answer, in store order
pub fn remaining_candidates<'a>(
    candidates: &'a [Candidate],
    answers: &[TraitAnswer<'_>],
) -> Vec<&'a Candidate> {
    candidates
        .iter()
        .filter(|c| is_consistent(c, answers))
        .collect()
}
