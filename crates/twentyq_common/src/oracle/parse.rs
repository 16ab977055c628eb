//! Normalization of raw oracle text
//!
//! Backends answer in free text. These helpers pull out the piece the engine
//! needs and return `None` for anything unusable.

use serde::{Deserialize, Serialize};

/// Candidate identified by the oracle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identification {
    pub name: String,
    pub description: String,
    pub image: String,
    /// Clamped to [0, 1]
    pub confidence: f64,
}

#[derive(Debug, Deserialize)]
struct RawIdentification {
    name: Option<String>,
    description: Option<String>,
    image: Option<String>,
    confidence: Option<serde_json::Value>,
}

const AVATAR_URL: &str = "https://ui-avatars.com/api/";

/// Image reference used when the oracle gives none
pub fn synthesize_image(name: &str) -> String {
    let name = name.split_whitespace().collect::<Vec<_>>().join(" ");
    match reqwest::Url::parse_with_params(AVATAR_URL, &[("name", name.as_str()), ("size", "300")]) {
        Ok(url) => url.into(),
        Err(_) => AVATAR_URL.to_string(),
    }
}

/// Clamp into [0, 1], rejecting NaN
pub fn clamp_confidence(value: f64) -> Option<f64> {
    if value.is_nan() {
        None
    } else {
        Some(value.clamp(0.0, 1.0))
    }
}

/// Clean a generated question: first non-empty line, surrounding quotes
/// removed. Empty output yields `None`.
pub fn clean_question(raw: &str) -> Option<String> {
    let line = raw.lines().map(str::trim).find(|l| !l.is_empty())?;

    let mut text = line;
    for quote in ['"', '\''] {
        if text.len() >= 2 && text.starts_with(quote) && text.ends_with(quote) {
            text = text[1..text.len() - 1].trim();
        }
    }

    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// Parse a confidence reply such as `0.8`, `"0.85."` or `85%`.
pub fn parse_confidence(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, '"' | '\'' | '\n' | '\r'))
        .collect();
    let cleaned = cleaned.trim();

    if let Ok(value) = cleaned.parse::<f64>() {
        return clamp_confidence(value);
    }

    // First number embedded in prose
    let start = cleaned.find(|c: char| c.is_ascii_digit() || c == '.')?;
    let tail = &cleaned[start..];
    let end = tail
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(tail.len());
    let number = tail[..end].trim_end_matches('.');
    let value: f64 = number.parse().ok()?;

    if tail[end..].starts_with('%') {
        clamp_confidence(value / 100.0)
    } else {
        clamp_confidence(value)
    }
}

/// The first balanced `{...}` block in `text`, honoring JSON strings
fn first_json_block(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

fn confidence_from_json(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64().and_then(clamp_confidence),
        serde_json::Value::String(s) => parse_confidence(s),
        _ => None,
    }
}

/// Parse an identification reply.
///
/// Finds the first `{`-delimited block, requires `name`, `description` and a
/// numeric `confidence`, and synthesizes `image` from the name when absent.
pub fn parse_identification(raw: &str) -> Option<Identification> {
    let block = first_json_block(raw).or_else(|| {
        let start = raw.find('{')?;
        let end = raw.rfind('}')?;
        (end > start).then(|| &raw[start..=end])
    })?;

    let parsed: RawIdentification = serde_json::from_str(block).ok()?;

    let name = parsed.name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty())?;
    let description = parsed.description?.trim().to_string();
    let confidence = confidence_from_json(&parsed.confidence?)?;
    let image = parsed
        .image
        .map(|i| i.trim().to_string())
        .filter(|i| !i.is_empty())
        .unwrap_or_else(|| synthesize_image(&name));

    Some(Identification {
        name,
        description,
        image,
        confidence,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthesized_image_is_query_encoded() {
        assert_eq!(
            synthesize_image("  Marie   Curie "),
            "https://ui-avatars.com/api/?name=Marie+Curie&size=300"
        );
        assert_eq!(
            synthesize_image("Tom & Jerry #1?"),
            "https://ui-avatars.com/api/?name=Tom+%26+Jerry+%231%3F&size=300"
        );
    }

    #[test]
    fn test_identification_inside_prose() {
        let raw = "Sure! {\"name\":\"X\",\"description\":\"Y\",\"confidence\":0.8} thanks";
        let ident = parse_identification(raw).unwrap();
        assert_eq!(ident.name, "X");
        assert_eq!(ident.description, "Y");
        assert_eq!(ident.confidence, 0.8);
        assert_eq!(ident.image, synthesize_image("X"));
    }

    #[test]
    fn test_identification_keeps_given_image() {
        let raw = r#"{"name": "Ada Lovelace", "description": "Mathematician", "image": "https://example.org/ada.jpg", "confidence": "0.9"}"#;
        let ident = parse_identification(raw).unwrap();
        assert_eq!(ident.image, "https://example.org/ada.jpg");
        assert_eq!(ident.confidence, 0.9);
    }

    #[test]
    fn test_identification_with_braces_in_strings() {
        let raw = r#"Answer: {"name": "A {B}", "description": "uses } inside", "confidence": 0.5} and {"junk": 1}"#;
        let ident = parse_identification(raw).unwrap();
        assert_eq!(ident.name, "A {B}");
        assert_eq!(ident.description, "uses } inside");
    }

    #[test]
    fn test_identification_missing_fields_discarded() {
        assert!(parse_identification(r#"{"name": "X", "confidence": 0.8}"#).is_none());
        assert!(parse_identification(r#"{"name": "X", "description": "Y"}"#).is_none());
        assert!(parse_identification(r#"{"name": " ", "description": "Y", "confidence": 0.4}"#).is_none());
        assert!(parse_identification(r#"{"name": "X", "description": "Y", "confidence": "high"}"#).is_none());
        assert!(parse_identification("I have no idea who that is.").is_none());
        assert!(parse_identification("{ broken").is_none());
    }

    #[test]
    fn test_identification_confidence_clamped() {
        let ident = parse_identification(r#"{"name": "X", "description": "Y", "confidence": 3}"#).unwrap();
        assert_eq!(ident.confidence, 1.0);
    }

    #[test]
    fn test_confidence_clamped() {
        assert_eq!(parse_confidence("1.4"), Some(1.0));
        assert_eq!(parse_confidence("-0.2"), Some(0.0));
        assert_eq!(parse_confidence("0.35"), Some(0.35));
    }

    #[test]
    fn test_confidence_cleanup() {
        assert_eq!(parse_confidence("\"0.8\"\n"), Some(0.8));
        assert_eq!(parse_confidence("Confidence: 0.65."), Some(0.65));
        assert_eq!(parse_confidence("85%"), Some(0.85));
        assert_eq!(parse_confidence("not a number"), None);
        assert_eq!(parse_confidence(""), None);
        assert_eq!(parse_confidence("NaN"), None);
    }

    #[test]
    fn test_clean_question() {
        assert_eq!(
            clean_question("\"Did this person win an Oscar?\""),
            Some("Did this person win an Oscar?".to_string())
        );
        assert_eq!(
            clean_question("\n\n  Is this person European?\nBecause it splits evenly."),
            Some("Is this person European?".to_string())
        );
        assert_eq!(clean_question("   \n  "), None);
        assert_eq!(clean_question("\"\""), None);
    }
}
