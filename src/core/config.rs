//! Pilot configuration with documented defaults
//!
//! Every section is optional in the TOML file; anything left out keeps the
//! default listed here.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::core::error::Result;
use crate::core::types::Language;

/// Top-level configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PilotConfig {
    pub executor: ExecutorConfig,
    pub llm: LlmConfig,
    pub search: SearchConfig,
    pub confirmation: ConfirmationConfig,
    /// Directory of `<language>.json` prompt overrides
    pub prompts_dir: Option<PathBuf>,
    /// Language used when a turn gives no script hint of its own
    pub default_language: Language,
}

impl Default for PilotConfig {
    fn default() -> Self {
        Self {
            executor: ExecutorConfig::default(),
            llm: LlmConfig::default(),
            search: SearchConfig::default(),
            confirmation: ConfirmationConfig::default(),
            prompts_dir: None,
            default_language: Language::English,
        }
    }
}

impl PilotConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string
    pub fn parse(content: &str) -> Result<Self> {
        let config: PilotConfig = toml::from_str(content)?;
        Ok(config)
    }

    /// Load from `path` if given, otherwise use defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }
}

/// Where the controlled application listens
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Base URL; each command is POSTed to `{base_url}/{commandId}`
    pub base_url: String,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000/api/app".into(),
        }
    }
}

/// Completion service settings
///
/// The API key is never read from the file; it comes from `LLM_API_KEY`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub api_url: String,
    pub model: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.openai.com/v1/chat/completions".into(),
            model: "gpt-4o-mini".into(),
        }
    }
}

/// Filesystem search tuning
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Known data-file extensions, most preferred first
    ///
    /// Order matters for the most-recent-file fallback: the first extension
    /// that has any file in the folder wins.
    pub extensions: Vec<String>,

    /// Candidates scoring below this are discarded
    ///
    /// At 0.3 a one-character overlap rarely passes, while a shared digit
    /// group (base 0.6) always does.
    pub min_score: f64,

    /// How deep recursive file tiers walk below each scope entry
    pub max_depth: usize,

    /// How deep directory searches walk below each scope entry
    pub directory_depth: usize,

    /// Add Desktop, Documents, home and the data folders to every scope
    pub include_profile_dirs: bool,

    /// Folder names on the Desktop that hold inspection data
    pub data_folders: Vec<String>,

    /// Extra roots searched after the reported current directory
    pub extra_roots: Vec<PathBuf>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["fpd".into(), "opd".into()],
            min_score: 0.3,
            max_depth: 4,
            directory_depth: 3,
            include_profile_dirs: true,
            data_folders: vec!["PAUT data".into()],
            extra_roots: Vec::new(),
        }
    }
}

/// Reply tokens for the pending-confirmation dialog, matched case-insensitively
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConfirmationConfig {
    pub affirmative: Vec<String>,
    pub negative: Vec<String>,
}

impl Default for ConfirmationConfig {
    fn default() -> Self {
        Self {
            affirmative: ["yes", "yeah", "yep", "sure", "ok", "okay", "y"]
                .into_iter()
                .map(String::from)
                .collect(),
            negative: ["no", "nope", "n"].into_iter().map(String::from).collect(),
        }
    }
}
