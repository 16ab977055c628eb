//! Candidate database boundary
//!
//! The database file is a JSON document with `people` and `questions`
//! arrays. The engine only reads it; writing the seed is an explicit
//! operator action (`twentyq init`).

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::candidate::{Candidate, CandidateStore};
use crate::error::{Result, TwentyqError};
use crate::schema::{TraitDef, TraitSchema};

#[derive(Debug, Default, Serialize, Deserialize)]
struct DatabaseFile {
    #[serde(default)]
    people: Vec<Candidate>,
    #[serde(default)]
    questions: Vec<TraitDef>,
}

/// Loaded candidates and question schema
#[derive(Debug, Clone)]
pub struct Database {
    pub schema: TraitSchema,
    pub store: CandidateStore,
}

impl Database {
    /// Built-in seed data
    pub fn builtin() -> Self {
        Self {
            schema: TraitSchema::builtin(),
            store: CandidateStore::builtin(),
        }
    }

    /// Load the database from `path`.
    ///
    /// A missing file, or an empty `people` / `questions` section, is filled
    /// from the seed data. Duplicate ids or trait keys are rejected.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("No database at {}, using built-in seed", path.display());
            return Ok(Self::builtin());
        }

        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
            .map_err(|e| TwentyqError::Database(format!("{}: {}", path.display(), e)))
    }

    pub fn from_json_str(contents: &str) -> Result<Self> {
        let file: DatabaseFile = serde_json::from_str(contents)?;

        let store = if file.people.is_empty() {
            debug!("Database has no people, using seed people");
            CandidateStore::builtin()
        } else {
            CandidateStore::from_candidates(file.people)?
        };

        let schema = if file.questions.is_empty() {
            debug!("Database has no questions, using seed questions");
            TraitSchema::builtin()
        } else {
            TraitSchema::from_traits(file.questions)?
        };

        info!(
            "Loaded {} candidates and {} questions",
            store.len(),
            schema.len()
        );
        Ok(Self { schema, store })
    }

    pub fn to_json_string(&self) -> Result<String> {
        let file = DatabaseFile {
            people: self.store.as_slice().to_vec(),
            questions: self.schema.iter().cloned().collect(),
        };
        Ok(serde_json::to_string_pretty(&file)?)
    }

    /// Write the seed database to `path`, creating parent directories
    pub fn write_seed(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, Self::builtin().to_json_string()?)?;
        info!("Wrote seed database to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_uses_seed() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::load(&dir.path().join("absent.json")).unwrap();
        assert_eq!(db.store.len(), 8);
        assert_eq!(db.schema.len(), 15);
    }

    #[test]
    fn test_seed_round_trips_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("database.json");

        Database::write_seed(&path).unwrap();
        let db = Database::load(&path).unwrap();

        let seed = Database::builtin();
        assert_eq!(db.store, seed.store);
        assert_eq!(db.schema, seed.schema);
    }

    #[test]
    fn test_custom_database() {
        let json = r#"{
            "people": [
                {"id": 1, "name": "A", "description": "first", "traits": {"scientist": true, "american": false}},
                {"id": 2, "name": "B", "traits": {"scientist": false, "american": true}}
            ],
            "questions": [
                {"id": 1, "text": "Scientist?", "trait": "scientist"},
                {"id": 2, "text": "American?", "trait": "american"}
            ]
        }"#;

        let db = Database::from_json_str(json).unwrap();
        assert_eq!(db.store.len(), 2);
        assert_eq!(db.schema.len(), 2);
        assert_eq!(db.store.get(2).unwrap().description, "");
        assert!(db.store.get(2).unwrap().image.is_none());
    }

    #[test]
    fn test_empty_sections_filled_from_seed() {
        let db = Database::from_json_str(r#"{"people": [], "questions": []}"#).unwrap();
        assert_eq!(db.store.len(), 8);
        assert_eq!(db.schema.len(), 15);
    }

    #[test]
    fn test_duplicate_question_ids_rejected() {
        let json = r#"{
            "people": [{"id": 1, "name": "A", "traits": {}}],
            "questions": [
                {"id": 1, "text": "One?", "trait": "one"},
                {"id": 1, "text": "Also one?", "trait": "also_one"}
            ]
        }"#;
        assert!(matches!(
            Database::from_json_str(json),
            Err(TwentyqError::Database(_))
        ));
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(matches!(
            Database::from_json_str("{ not json"),
            Err(TwentyqError::Json(_))
        ));
    }
}
