//! twentyq configuration
//!
//! Config file: `$TWENTYQ_CONFIG`, `~/.config/twentyq/config.toml` or
//! `/etc/twentyq/config.toml`, first one found wins. Every field has a
//! default so a partial file is fine.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::TwentyqError;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit config file
pub const ENV_CONFIG_PATH: &str = "TWENTYQ_CONFIG";

/// Reference match floor (strictly greater-than)
pub const DEFAULT_MATCH_FLOOR: f64 = 0.5;

/// Reference oracle confidence needed to stop asking
pub const DEFAULT_GUESS_THRESHOLD: f64 = 0.7;

/// Reference question count after which the oracle-free policy guesses
pub const DEFAULT_FALLBACK_QUESTION_CAP: usize = 7;

/// Reference minimum question count before the oracle may trigger a guess
pub const DEFAULT_ORACLE_MIN_QUESTIONS: usize = 3;

/// Thresholds used by the scorer and the guess policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Best match must score strictly above this to be reported
    pub match_floor: f64,

    /// Oracle confidence must exceed this before the game commits to a guess
    pub guess_threshold: f64,

    /// Without an oracle, guess once this many questions were asked
    pub fallback_question_cap: usize,

    /// With an oracle, never guess before this many questions
    pub oracle_min_questions: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            match_floor: DEFAULT_MATCH_FLOOR,
            guess_threshold: DEFAULT_GUESS_THRESHOLD,
            fallback_question_cap: DEFAULT_FALLBACK_QUESTION_CAP,
            oracle_min_questions: DEFAULT_ORACLE_MIN_QUESTIONS,
        }
    }
}

/// Oracle backend discovery and transport settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleConfig {
    /// Set to false to skip probing and always play with the fallback engine
    pub enabled: bool,

    /// Local Ollama server
    pub ollama_url: String,

    /// Model name used when the local server lists no models
    pub default_model: String,

    /// Reachability probe timeout
    pub probe_timeout_secs: u64,

    /// Timeout for generation, identification and confidence calls
    pub request_timeout_secs: u64,

    pub openai_url: String,
    pub openai_model: String,
    /// Environment variable holding the OpenAI key
    pub openai_key_env: String,

    pub anthropic_url: String,
    pub anthropic_model: String,
    /// Environment variable holding the Anthropic key
    pub anthropic_key_env: String,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ollama_url: "http://localhost:11434".to_string(),
            default_model: "llama2".to_string(),
            probe_timeout_secs: 2,
            request_timeout_secs: 30,
            openai_url: "https://api.openai.com".to_string(),
            openai_model: "gpt-4".to_string(),
            openai_key_env: "OPENAI_API_KEY".to_string(),
            anthropic_url: "https://api.anthropic.com".to_string(),
            anthropic_model: "claude-3-sonnet-20240229".to_string(),
            anthropic_key_env: "ANTHROPIC_API_KEY".to_string(),
        }
    }
}

impl OracleConfig {
    /// Config that never probes anything
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// JSON database with `people` and `questions`
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("database.json"),
        }
    }
}

/// Main twentyq configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TwentyqConfig {
    #[serde(default)]
    pub game: GameConfig,

    #[serde(default)]
    pub oracle: OracleConfig,

    #[serde(default)]
    pub database: DatabaseConfig,
}

impl TwentyqConfig {
    /// User config path: ~/.config/twentyq/config.toml
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("twentyq").join("config.toml"))
    }

    /// System config path: /etc/twentyq/config.toml
    pub fn system_config_path() -> PathBuf {
        PathBuf::from("/etc/twentyq/config.toml")
    }

    /// Load configuration
    ///
    /// Priority:
    /// 1. `$TWENTYQ_CONFIG`
    /// 2. User config
    /// 3. System config
    /// 4. Defaults
    pub fn load() -> Result<Self> {
        if let Ok(explicit) = std::env::var(ENV_CONFIG_PATH) {
            return Self::load_from(Path::new(&explicit));
        }

        if let Some(user_path) = Self::user_config_path() {
            if user_path.exists() {
                return Self::load_from(&user_path);
            }
        }

        let system_path = Self::system_config_path();
        if system_path.exists() {
            return Self::load_from(&system_path);
        }

        Ok(Self::default())
    }

    /// Load a specific config file
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config = Self::parse(&contents)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(config)
    }

    /// Parse and validate TOML config text
    pub fn parse(contents: &str) -> crate::error::Result<Self> {
        let config: TwentyqConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject thresholds outside [0, 1]
    pub fn validate(&self) -> crate::error::Result<()> {
        for (name, value) in [
            ("game.match_floor", self.game.match_floor),
            ("game.guess_threshold", self.game.guess_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(TwentyqError::Config(format!(
                    "{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_match_reference_constants() {
        let config = TwentyqConfig::default();
        assert_eq!(config.game.match_floor, 0.5);
        assert_eq!(config.game.guess_threshold, 0.7);
        assert_eq!(config.game.fallback_question_cap, 7);
        assert_eq!(config.game.oracle_min_questions, 3);
        assert_eq!(config.oracle.probe_timeout_secs, 2);
        assert_eq!(config.oracle.request_timeout_secs, 30);
        assert!(config.oracle.enabled);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[game]\nfallback_question_cap = 5\n\n[oracle]\nenabled = false\n"
        )
        .unwrap();

        let config = TwentyqConfig::load_from(file.path()).unwrap();
        assert_eq!(config.game.fallback_question_cap, 5);
        assert_eq!(config.game.match_floor, 0.5);
        assert!(!config.oracle.enabled);
        assert_eq!(config.oracle.ollama_url, "http://localhost:11434");
        assert_eq!(config.database.path, PathBuf::from("database.json"));
    }

    #[test]
    fn test_out_of_range_threshold_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[game]\nguess_threshold = 1.5\n").unwrap();

        let err = TwentyqConfig::load_from(file.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("guess_threshold"));
    }

    #[test]
    fn test_parse_error_kinds() {
        let err = TwentyqConfig::parse("[game]\nmatch_floor = -0.1\n").unwrap_err();
        assert!(matches!(err, TwentyqError::Config(ref msg) if msg.contains("match_floor")));

        let err = TwentyqConfig::parse("[game\nmatch_floor = ").unwrap_err();
        assert!(matches!(err, TwentyqError::Toml(_)));

        let err = TwentyqConfig::parse("[game]\nfallback_question_cap = \"seven\"\n").unwrap_err();
        assert!(matches!(err, TwentyqError::Toml(_)));

        assert_eq!(TwentyqConfig::parse("").unwrap(), TwentyqConfig::default());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = TwentyqConfig::load_from(Path::new("/nonexistent/twentyq.toml"));
        assert!(result.is_err());
    }
}
