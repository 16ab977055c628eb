//! Trait schema and question bank.
//!
//! Every trait is a boolean attribute keyed by a string (`is_scientist`) and
//! probed by exactly one natural-language question. The schema only grows:
//! traits can be appended but never removed or rewritten.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TwentyqError};

/// A single schema question and the trait it probes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraitDef {
    /// Stable schema id, also used as the question id on the wire
    pub id: u32,

    /// Natural-language question text
    pub text: String,

    /// Trait key the answer is compared against
    #[serde(rename = "trait")]
    pub key: String,
}

impl TraitDef {
    pub fn new(id: u32, text: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            key: key.into(),
        }
    }
}

/// Ordered, append-only catalog of traits
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TraitSchema {
    traits: Vec<TraitDef>,
}

impl TraitSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a schema, rejecting duplicate ids or trait keys
    pub fn from_traits(traits: impl IntoIterator<Item = TraitDef>) -> Result<Self> {
        let mut schema = Self::new();
        for def in traits {
            schema.append(def)?;
        }
        Ok(schema)
    }

    /// Append a trait. Ids and keys must both be unused.
    pub fn append(&mut self, def: TraitDef) -> Result<()> {
        if self.get(def.id).is_some() {
            return Err(TwentyqError::Database(format!(
                "duplicate question id {}",
                def.id
            )));
        }
        if self.by_key(&def.key).is_some() {
            return Err(TwentyqError::Database(format!(
                "duplicate trait key '{}'",
                def.key
            )));
        }

        // Keep id order so tie-breaking by lowest id is a plain scan
        let pos = self.traits.partition_point(|t| t.id < def.id);
        self.traits.insert(pos, def);
        Ok(())
    }

    pub fn get(&self, id: u32) -> Option<&TraitDef> {
        self.traits
            .binary_search_by_key(&id, |t| t.id)
            .ok()
            .map(|idx| &self.traits[idx])
    }

    pub fn by_key(&self, key: &str) -> Option<&TraitDef> {
        self.traits.iter().find(|t| t.key == key)
    }

    /// Traits in ascending id order
    pub fn iter(&self) -> impl Iterator<Item = &TraitDef> {
        self.traits.iter()
    }

    pub fn len(&self) -> usize {
        self.traits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.traits.is_empty()
    }

    /// The reference question bank
    pub fn builtin() -> Self {
        let traits = [
            (1, "Is this person a scientist or researcher?", "is_scientist"),
            (2, "Is this person from history (no longer alive)?", "is_historical"),
            (3, "Is this person male?", "is_male"),
            (4, "Has this person passed away?", "is_dead"),
            (5, "Is this person American?", "is_american"),
            (6, "Does this person have a beard?", "has_beard"),
            (7, "Is this person a politician?", "is_politician"),
            (8, "Is this person an artist or creative?", "is_artist"),
            (9, "Is this person an entrepreneur or business person?", "is_entrepreneur"),
            (10, "Is this person a musician or singer?", "is_musician"),
            (11, "Is this person from the 20th century?", "is_20th_century"),
            (12, "Is this person from the 21st century?", "is_21st_century"),
            (13, "Is this person blonde?", "is_blonde"),
            (14, "Is this person associated with Hollywood?", "is_hollywood"),
            (15, "Is this person a writer or author?", "is_writer"),
        ];

        Self {
            traits: traits
                .into_iter()
                .map(|(id, text, key)| TraitDef::new(id, text, key))
                .collect(),
        }
    }
}
