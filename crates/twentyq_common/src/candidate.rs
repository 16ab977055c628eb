//! Candidate store
//!
//! Candidates carry a partial trait assignment. A trait missing from the map
//! means "unknown / not applicable", which is not the same as `false`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{Result, TwentyqError};

/// A person the game may guess
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub traits: BTreeMap<String, bool>,
}

impl Candidate {
    /// Value of a trait, `None` when the candidate does not define it
    pub fn trait_value(&self, key: &str) -> Option<bool> {
        self.traits.get(key).copied()
    }

    /// Trait keys with a `true` value
    pub fn positive_traits(&self) -> impl Iterator<Item = &str> {
        self.traits
            .iter()
            .filter(|(_, v)| **v)
            .map(|(k, _)| k.as_str())
    }

    /// Trait keys with a `false` value
    pub fn negative_traits(&self) -> impl Iterator<Item = &str> {
        self.traits
            .iter()
            .filter(|(_, v)| !**v)
            .map(|(k, _)| k.as_str())
    }
}

/// Append-only collection of candidates, ordered by id
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CandidateStore {
    candidates: Vec<Candidate>,
}

impl CandidateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_candidates(candidates: impl IntoIterator<Item = Candidate>) -> Result<Self> {
        let mut store = Self::new();
        for candidate in candidates {
            store.append(candidate)?;
        }
        Ok(store)
    }

    /// Append a candidate. Never overwrites an existing id.
    pub fn append(&mut self, candidate: Candidate) -> Result<()> {
        if self.get(candidate.id).is_some() {
            return Err(TwentyqError::Database(format!(
                "duplicate candidate id {}",
                candidate.id
            )));
        }
        let pos = self.candidates.partition_point(|c| c.id < candidate.id);
        self.candidates.insert(pos, candidate);
        Ok(())
    }

    /// Store a candidate synthesized by the oracle, or return the existing
    /// one with the same name.
    pub fn append_synthesized(
        &mut self,
        name: &str,
        description: &str,
        image: Option<String>,
    ) -> Result<Candidate> {
        if let Some(existing) = self.find_by_name(name) {
            return Ok(existing.clone());
        }

        let id = self
            .next_id()
            .ok_or_else(|| TwentyqError::Database("no free candidate id left".to_string()))?;
        let candidate = Candidate {
            id,
            name: name.to_string(),
            description: description.to_string(),
            image,
            traits: BTreeMap::new(),
        };
        self.append(candidate.clone())?;
        Ok(candidate)
    }

    pub fn get(&self, id: u32) -> Option<&Candidate> {
        self.candidates.iter().find(|c| c.id == id)
    }

    /// Case-insensitive name lookup
    pub fn find_by_name(&self, name: &str) -> Option<&Candidate> {
        let wanted = name.trim().to_lowercase();
        self.candidates
            .iter()
            .find(|c| c.name.to_lowercase() == wanted)
    }

    pub fn as_slice(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// One past the highest id, or the lowest gap once `u32::MAX` is taken
    fn next_id(&self) -> Option<u32> {
        let Some(last) = self.candidates.last() else {
            return Some(1);
        };
        if let Some(id) = last.id.checked_add(1) {
            return Some(id);
        }

        // Candidates are sorted by id, so the first hole is the lowest free id
        let mut expected = 0u32;
        for candidate in &self.candidates {
            if candidate.id != expected {
                return Some(expected);
            }
            expected = expected.checked_add(1)?;
        }
        None
    }

    /// The reference sample of eight people
    pub fn builtin() -> Self {
        fn person(
            id: u32,
            name: &str,
            image: &str,
            description: &str,
            traits: &[(&str, bool)],
        ) -> Candidate {
            Candidate {
                id,
                name: name.to_string(),
                description: description.to_string(),
                image: Some(image.to_string()),
                traits: traits.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
            }
        }

        let candidates = vec![
            person(
                1,
                "Albert Einstein",
                "https://upload.wikimedia.org/wikipedia/commons/3/3e/Einstein_1921_by_F_Schmutzer_-_restoration.jpg",
                "Famous physicist who developed the theory of relativity",
                &[
                    ("is_scientist", true),
                    ("is_historical", true),
                    ("is_male", true),
                    ("is_dead", true),
                    ("is_american", false),
                    ("is_german", true),
                    ("has_beard", true),
                    ("is_physicist", true),
                    ("won_nobel_prize", true),
                    ("is_20th_century", true),
                ],
            ),
            person(
                2,
                "Marie Curie",
                "https://upload.wikimedia.org/wikipedia/commons/c/c8/Marie_Curie_c1920.jpg",
                "Pioneering physicist and chemist who conducted research on radioactivity",
                &[
                    ("is_scientist", true),
                    ("is_historical", true),
                    ("is_male", false),
                    ("is_dead", true),
                    ("is_american", false),
                    ("is_polish", true),
                    ("has_beard", false),
                    ("is_physicist", true),
                    ("won_nobel_prize", true),
                    ("is_20th_century", true),
                ],
            ),
            person(
                3,
                "Leonardo da Vinci",
                "https://upload.wikimedia.org/wikipedia/commons/c/c3/Leonardo_da_Vinci_-_presumed_self-portrait_-_WGA12798.jpg",
                "Italian polymath of the Renaissance who was a painter, sculptor, architect, and scientist",
                &[
                    ("is_scientist", true),
                    ("is_historical", true),
                    ("is_male", true),
                    ("is_dead", true),
                    ("is_american", false),
                    ("is_italian", true),
                    ("has_beard", true),
                    ("is_artist", true),
                    ("is_inventor", true),
                    ("is_renaissance", true),
                ],
            ),
            person(
                4,
                "William Shakespeare",
                "https://upload.wikimedia.org/wikipedia/commons/a/a2/Shakespeare.jpg",
                "English playwright and poet, widely regarded as the greatest writer in the English language",
                &[
                    ("is_scientist", false),
                    ("is_historical", true),
                    ("is_male", true),
                    ("is_dead", true),
                    ("is_american", false),
                    ("is_english", true),
                    ("has_beard", false),
                    ("is_writer", true),
                    ("is_playwright", true),
                    ("is_16th_century", true),
                ],
            ),
            person(
                5,
                "Marilyn Monroe",
                "https://upload.wikimedia.org/wikipedia/commons/thumb/5/5f/Marilyn_Monroe_in_The_Seven_Year_Itch_trailer.jpg/800px-Marilyn_Monroe_in_The_Seven_Year_Itch_trailer.jpg",
                "American actress, model, and singer who became a major sex symbol",
                &[
                    ("is_scientist", false),
                    ("is_historical", true),
                    ("is_male", false),
                    ("is_dead", true),
                    ("is_american", true),
                    ("is_actress", true),
                    ("has_beard", false),
                    ("is_20th_century", true),
                    ("is_blonde", true),
                    ("is_hollywood", true),
                ],
            ),
            person(
                6,
                "Elon Musk",
                "https://upload.wikimedia.org/wikipedia/commons/9/99/Elon_Musk_Colorado_2022_%28cropped%29.jpg",
                "Business magnate and investor who founded or co-founded several companies including Tesla and SpaceX",
                &[
                    ("is_scientist", false),
                    ("is_historical", false),
                    ("is_male", true),
                    ("is_dead", false),
                    ("is_american", true),
                    ("is_businessman", true),
                    ("has_beard", false),
                    ("is_entrepreneur", true),
                    ("is_tech", true),
                    ("is_21st_century", true),
                ],
            ),
            person(
                7,
                "Taylor Swift",
                "https://upload.wikimedia.org/wikipedia/commons/f/fc/Taylor_Swift_2_-_2019_by_Glenn_Francis_%28cropped%29.jpg",
                "American singer-songwriter whose narrative songwriting has received critical praise",
                &[
                    ("is_scientist", false),
                    ("is_historical", false),
                    ("is_male", false),
                    ("is_dead", false),
                    ("is_american", true),
                    ("is_singer", true),
                    ("has_beard", false),
                    ("is_musician", true),
                    ("is_pop", true),
                    ("is_21st_century", true),
                ],
            ),
            person(
                8,
                "Barack Obama",
                "https://upload.wikimedia.org/wikipedia/commons/8/8d/President_Barack_Obama.jpg",
                "American politician who served as the 44th president of the United States",
                &[
                    ("is_scientist", false),
                    ("is_historical", false),
                    ("is_male", true),
                    ("is_dead", false),
                    ("is_american", true),
                    ("is_politician", true),
                    ("has_beard", false),
                    ("is_president", true),
                    ("is_democrat", true),
                    ("is_21st_century", true),
                ],
            ),
        ];

        Self { candidates }
    }
}
