//! Checker configuration.
//!
//! Loaded from `<config_dir>/outline-checker/config.json` when present, with
//! every field defaulted. Evaluator settings can be overridden from the
//! environment:
//! - `OUTLINE_CHECKER_URL` - Evaluator base URL (default: `http://127.0.0.1:8000`)
//! - `OUTLINE_CHECKER_API_KEY` - Bearer token for the evaluator (optional)
//! - `OUTLINE_CHECKER_TIMEOUT_SECS` - Request timeout in seconds (default: 120)

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use dirs::config_dir;
use serde::{Deserialize, Serialize};

const APP_NAME: &str = "outline-checker";
const CONFIG_FILE: &str = "config.json";

/// Default evaluator URL for local development.
pub const DEFAULT_EVALUATOR_URL: &str = "http://127.0.0.1:8000";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckerConfig {
    pub evaluator: EvaluatorConfig,
    pub normalizer: NormalizerConfig,
    pub locator: LocatorConfig,
    pub annotation: AnnotationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluatorConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_EVALUATOR_URL.to_string(),
            api_key: None,
            timeout_secs: 120,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerConfig {
    /// Left indent, in points, that makes one nesting level.
    pub unit_indent: f32,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self { unit_indent: 24.0 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocatorConfig {
    /// Targets longer than this many characters are truncated before searching.
    pub max_search_length: usize,
    /// Longest-word matching only considers words strictly longer than this.
    pub min_word_length: usize,
    /// Length of the prefix used by prefix matching.
    pub prefix_length: usize,
    /// Keywords shorter than this are ignored.
    pub min_keyword_length: usize,
    /// Lowercase function words never used as keywords.
    pub stop_words: Vec<String>,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            max_search_length: 255,
            min_word_length: 3,
            prefix_length: 10,
            min_keyword_length: 3,
            stop_words: DEFAULT_STOP_WORDS.iter().map(|w| w.to_string()).collect(),
        }
    }
}

const DEFAULT_STOP_WORDS: &[&str] = &[
    "the", "and", "for", "are", "but", "not", "you", "all", "any", "can", "had", "her", "was",
    "one", "our", "out", "has", "his", "how", "its", "may", "who", "did", "get", "him", "let",
    "she", "too", "use", "that", "with", "have", "this", "will", "your", "from", "they", "been",
    "were", "what", "when", "which", "their", "there", "then", "than", "them", "these", "those",
    "would", "could", "should", "about", "into", "also", "such", "more", "most", "some", "other",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotationConfig {
    pub highlight_color: String,
    /// Text colour applied when a comment cannot be attached.
    pub fallback_text_color: String,
    /// Comment bodies longer than this many characters are truncated.
    pub max_comment_length: usize,
}

impl Default for AnnotationConfig {
    fn default() -> Self {
        Self {
            highlight_color: "Yellow".to_string(),
            fallback_text_color: "Red".to_string(),
            max_comment_length: 1000,
        }
    }
}

impl CheckerConfig {
    /// Load configuration from the user's config directory, then apply
    /// environment overrides. Falls back to defaults if the file is missing
    /// or fails to parse.
    pub fn load() -> Self {
        let config = match get_config_path().and_then(|path| Self::load_from(&path)) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to load config, using defaults: {:#}", e);
                Self::default()
            }
        };
        config.with_env_overrides()
    }

    /// Defaults plus environment overrides, ignoring any config file.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Read a config file. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).context("Failed to read config file")?;

        let config = serde_json::from_str(&content).context("Failed to parse config file")?;

        Ok(config)
    }

    /// Write the configuration as pretty JSON, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, content).context("Failed to write config file")?;

        Ok(())
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var("OUTLINE_CHECKER_URL") {
            self.evaluator.base_url = url;
        }
        if let Ok(key) = std::env::var("OUTLINE_CHECKER_API_KEY") {
            self.evaluator.api_key = Some(key);
        }
        if let Some(secs) = std::env::var("OUTLINE_CHECKER_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
        {
            self.evaluator.timeout_secs = secs;
        }
        self
    }
}

fn get_config_path() -> Result<PathBuf> {
    let mut path =
        config_dir().ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
    path.push(APP_NAME);
    path.push(CONFIG_FILE);
    Ok(path)
}
