//! Question identifiers and tri-state answers
//!
//! Question ids cross the caller boundary as strings: schema questions as
//! their decimal id (`"7"`), oracle questions as `oracle-<hash>`. Parsing
//! brings both back to the same [`QuestionId`] variant they left as.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

const ORACLE_PREFIX: &str = "oracle-";

/// Identifier of an asked question
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum QuestionId {
    /// A schema trait question
    Schema(u32),
    /// A one-off oracle question; the payload is the text hash
    Oracle(String),
}

impl QuestionId {
    /// Mint the id for an oracle question from its text
    pub fn for_oracle_text(text: &str) -> Self {
        use sha2::{Digest, Sha256};

        let digest = Sha256::digest(text.trim().as_bytes());
        QuestionId::Oracle(hex::encode(&digest[..4]))
    }

    pub fn schema_id(&self) -> Option<u32> {
        match self {
            QuestionId::Schema(id) => Some(*id),
            QuestionId::Oracle(_) => None,
        }
    }

    pub fn is_oracle(&self) -> bool {
        matches!(self, QuestionId::Oracle(_))
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionId::Schema(id) => write!(f, "{}", id),
            QuestionId::Oracle(hash) => write!(f, "{}{}", ORACLE_PREFIX, hash),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid question id: '{0}'")]
pub struct ParseQuestionIdError(String);

impl FromStr for QuestionId {
    type Err = ParseQuestionIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(hash) = s.strip_prefix(ORACLE_PREFIX) {
            if hash.is_empty() {
                return Err(ParseQuestionIdError(s.to_string()));
            }
            return Ok(QuestionId::Oracle(hash.to_string()));
        }
        s.parse::<u32>()
            .map(QuestionId::Schema)
            .map_err(|_| ParseQuestionIdError(s.to_string()))
    }
}

impl Serialize for QuestionId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for QuestionId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct QuestionIdVisitor;

        impl<'de> Visitor<'de> for QuestionIdVisitor {
            type Value = QuestionId;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a question id string or a non-negative integer")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<QuestionId, E> {
                v.parse().map_err(E::custom)
            }

            // Older callers send schema ids as bare JSON numbers
            fn visit_u64<E: de::Error>(self, v: u64) -> Result<QuestionId, E> {
                u32::try_from(v)
                    .map(QuestionId::Schema)
                    .map_err(|_| E::custom(format!("question id {} out of range", v)))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<QuestionId, E> {
                u32::try_from(v)
                    .map(QuestionId::Schema)
                    .map_err(|_| E::custom(format!("question id {} out of range", v)))
            }
        }

        deserializer.deserialize_any(QuestionIdVisitor)
    }
}

/// Player answer: yes, no, or "not sure"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Option<bool>", into = "Option<bool>")]
pub enum AnswerValue {
    Yes,
    No,
    Unknown,
}

impl AnswerValue {
    /// The boolean this answer asserts, `None` for [`AnswerValue::Unknown`]
    pub fn as_bool(self) -> Option<bool> {
        match self {
            AnswerValue::Yes => Some(true),
            AnswerValue::No => Some(false),
            AnswerValue::Unknown => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AnswerValue::Yes => "Yes",
            AnswerValue::No => "No",
            AnswerValue::Unknown => "Not sure",
        }
    }
}

impl From<Option<bool>> for AnswerValue {
    fn from(value: Option<bool>) -> Self {
        match value {
            Some(true) => AnswerValue::Yes,
            Some(false) => AnswerValue::No,
            None => AnswerValue::Unknown,
        }
    }
}

impl From<AnswerValue> for Option<bool> {
    fn from(value: AnswerValue) -> Self {
        value.as_bool()
    }
}

impl From<bool> for AnswerValue {
    fn from(value: bool) -> Self {
        Some(value).into()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized answer '{0}' (expected yes, no or unknown)")]
pub struct ParseAnswerError(String);

impl FromStr for AnswerValue {
    type Err = ParseAnswerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "y" | "yes" | "true" => Ok(AnswerValue::Yes),
            "n" | "no" | "false" => Ok(AnswerValue::No),
            "?" | "u" | "unknown" | "not sure" | "dont know" | "don't know" | "null" => {
                Ok(AnswerValue::Unknown)
            }
            other => Err(ParseAnswerError(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_question_id_display_and_parse() {
        assert_eq!(QuestionId::Schema(7).to_string(), "7");
        assert_eq!("7".parse::<QuestionId>().unwrap(), QuestionId::Schema(7));

        let oracle = QuestionId::Oracle("1a2b3c4d".to_string());
        assert_eq!(oracle.to_string(), "oracle-1a2b3c4d");
        assert_eq!("oracle-1a2b3c4d".parse::<QuestionId>().unwrap(), oracle);

        assert!("oracle-".parse::<QuestionId>().is_err());
        assert!("seven".parse::<QuestionId>().is_err());
        assert!("-3".parse::<QuestionId>().is_err());
    }

    #[test]
    fn test_oracle_id_is_deterministic() {
        let a = QuestionId::for_oracle_text("Did this person win an Oscar?");
        let b = QuestionId::for_oracle_text("  Did this person win an Oscar?  ");
        let c = QuestionId::for_oracle_text("Did this person win a Grammy?");

        assert_eq!(a, b);
        assert_ne!(a, c);
        match a {
            QuestionId::Oracle(hash) => assert_eq!(hash.len(), 8),
            QuestionId::Schema(_) => panic!("expected oracle id"),
        }
    }

    #[test]
    fn test_question_id_accepts_bare_numbers() {
        let id: QuestionId = serde_json::from_str("12").unwrap();
        assert_eq!(id, QuestionId::Schema(12));

        let id: QuestionId = serde_json::from_str("\"12\"").unwrap();
        assert_eq!(id, QuestionId::Schema(12));

        assert!(serde_json::from_str::<QuestionId>("-1").is_err());
    }

    #[test]
    fn test_answer_value_json_is_nullable_bool() {
        assert_eq!(serde_json::to_string(&AnswerValue::Yes).unwrap(), "true");
        assert_eq!(serde_json::to_string(&AnswerValue::No).unwrap(), "false");
        assert_eq!(serde_json::to_string(&AnswerValue::Unknown).unwrap(), "null");

        let v: AnswerValue = serde_json::from_str("null").unwrap();
        assert_eq!(v, AnswerValue::Unknown);
    }

    #[test]
    fn test_answer_value_from_str() {
        assert_eq!("Yes".parse::<AnswerValue>().unwrap(), AnswerValue::Yes);
        assert_eq!("n".parse::<AnswerValue>().unwrap(), AnswerValue::No);
        assert_eq!("?".parse::<AnswerValue>().unwrap(), AnswerValue::Unknown);
        assert!("maybe".parse::<AnswerValue>().is_err());
    }
}
