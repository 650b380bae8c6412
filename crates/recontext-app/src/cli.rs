//! CLI argument definitions for the `recontext` console.
//!
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::Parser;
use std::path::PathBuf;

/// Recontext: rewrites elliptical follow-up questions into standalone queries.
#[derive(Parser, Debug)]
#[command(name = "recontext", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Topic classifier artifact (JSON). Overrides `classifier.artifact_path`.
    #[arg(short = 'a', long = "artifact")]
    pub artifact: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,

    /// Print each turn report as a JSON line.
    #[arg(long = "json")]
    pub json: bool,
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > RECONTEXT_CONFIG env var > ~/.recontext/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("RECONTEXT_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Resolve the classifier artifact path.
    ///
    /// Priority: --artifact flag > config file value. `None` keeps the config value.
    pub fn resolve_artifact(&self) -> Option<String> {
        self.artifact
            .as_ref()
            .map(|p| p.to_string_lossy().to_string())
    }
}

/// Default config file path for the current platform.
fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".recontext").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".recontext").join("config.toml");
    }
    PathBuf::from("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flags() {
        let args = CliArgs::parse_from([
            "recontext",
            "--config",
            "/tmp/r.toml",
            "--artifact",
            "/tmp/model.json",
            "-l",
            "debug",
            "--json",
        ]);
        assert_eq!(args.resolve_config_path(), PathBuf::from("/tmp/r.toml"));
        assert_eq!(args.resolve_artifact().as_deref(), Some("/tmp/model.json"));
        assert_eq!(args.log_level.as_deref(), Some("debug"));
        assert!(args.json);
    }

    #[test]
    fn test_defaults() {
        let args = CliArgs::parse_from(["recontext"]);
        assert!(args.resolve_artifact().is_none());
        assert!(!args.json);
    }
}
