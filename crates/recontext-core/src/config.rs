use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{RecontextError, Result};

/// Top-level configuration for Recontext.
///
/// Loaded from `~/.recontext/config.toml` by default. Every section is
/// optional and falls back to its defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecontextConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
    #[serde(default)]
    pub dialogue: DialogueConfig,
    #[serde(default)]
    pub decay: DecayConfig,
    #[serde(default)]
    pub lexicon: LexiconConfig,
}

impl RecontextConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: RecontextConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| RecontextError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// What to use when no classifier artifact can be loaded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassifierFallback {
    /// Keyword lists for politics and sports.
    Keyword,
    /// Always answer `Unknown` with zero confidence.
    #[default]
    Unknown,
}

/// Topic classifier settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Path to a trained artifact (JSON). The bundled artifact is used when unset.
    pub artifact_path: Option<String>,
    /// Predictions below this probability are reported as `Unknown`.
    pub min_confidence: f32,
    /// Backend used when `artifact_path` is set but fails to load.
    pub fallback: ClassifierFallback,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            artifact_path: None,
            min_confidence: 0.5,
            fallback: ClassifierFallback::Unknown,
        }
    }
}

/// Turn pipeline and session settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogueConfig {
    /// Maximum utterance length in characters.
    pub max_utterance_chars: usize,
    /// Longest anchor-free utterance still treated as a follow-up.
    pub followup_max_tokens: usize,
    /// Idle minutes before a session is discarded.
    pub session_timeout_minutes: u32,
    /// Maximum history records kept per session.
    pub history_limit: usize,
}

impl Default for DialogueConfig {
    fn default() -> Self {
        Self {
            max_utterance_chars: 2000,
            followup_max_tokens: 6,
            session_timeout_minutes: 30,
            history_limit: 50,
        }
    }
}

/// Slot confidence decay applied on every committed turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecayConfig {
    pub enabled: bool,
    /// Multiplier applied to each slot confidence per committed turn.
    pub factor: f32,
    /// Slots whose confidence drops below this are forgotten.
    pub floor: f32,
}

impl Default for DecayConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            factor: 0.85,
            floor: 0.2,
        }
    }
}

/// Additions to the built-in slot vocabularies.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LexiconConfig {
    /// Extra subject names (countries, clubs, organisations).
    pub extra_subjects: Vec<String>,
    /// Extra role names (offices, positions).
    pub extra_roles: Vec<String>,
}
