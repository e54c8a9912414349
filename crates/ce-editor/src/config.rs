//! Editor configuration

use std::path::{Path, PathBuf};
use std::time::Duration;

use ce_api::ApiConfig;
use ce_challenge::DraftPlaceholders;
use serde::{Deserialize, Serialize};

use crate::error::EditorError;

/// Default config location, relative to the project root.
pub const DEFAULT_CONFIG_PATH: &str = ".ce/editor.toml";

/// Top-level editor configuration from .ce/editor.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Challenge API endpoint
    #[serde(default)]
    pub api: ApiConfig,

    /// Auto-save scheduling
    #[serde(default)]
    pub autosave: AutosaveConfig,

    /// Placeholder values used when creating a draft early
    #[serde(default)]
    pub draft: DraftPlaceholders,

    /// Append editor events as JSONL to this file
    pub events_log: Option<PathBuf>,
}

/// Auto-save configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutosaveConfig {
    /// Schedule a save after auto-savable edits
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Trailing-edge debounce window in milliseconds
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl AutosaveConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

// Serde default functions
fn default_enabled() -> bool {
    true
}

fn default_debounce_ms() -> u64 {
    1000
}

impl EditorConfig {
    /// Load editor config from a TOML file
    pub fn load(path: &Path) -> Result<Self, EditorError> {
        let content = std::fs::read_to_string(path).map_err(|source| EditorError::IoError {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&content).map_err(|e| EditorError::Config {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Try to load config, returning default if the file is missing or invalid
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(EditorError::IoError { .. }) => Self::default(),
            Err(e) => {
                tracing::warn!("ignoring editor config: {}", e);
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn defaults_apply_for_empty_file() {
        let config: EditorConfig = toml::from_str("").unwrap();
        assert!(config.autosave.enabled);
        assert_eq!(config.autosave.debounce(), Duration::from_secs(1));
        assert_eq!(config.draft.track, "DEVELOP");
        assert_eq!(config.api.base_url, "http://localhost:3000/v5");
        assert!(config.events_log.is_none());
    }

    #[test]
    fn sections_override_defaults() {
        let config: EditorConfig = toml::from_str(
            r#"
events_log = ".ce/events.jsonl"

[api]
base_url = "https://api.example.com/v5"
token = "t0k"
timeout_secs = 10

[autosave]
debounce_ms = 250

[draft]
tag = "rust"
"#,
        )
        .unwrap();
        assert_eq!(config.api.token.as_deref(), Some("t0k"));
        assert_eq!(config.api.timeout(), Some(Duration::from_secs(10)));
        assert_eq!(config.autosave.debounce_ms, 250);
        assert!(config.autosave.enabled);
        assert_eq!(config.draft.tag, "rust");
        assert_eq!(config.draft.name, "Draft");
        assert_eq!(config.events_log, Some(PathBuf::from(".ce/events.jsonl")));
    }

    #[test]
    fn load_reports_parse_errors() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("editor.toml");
        fs::write(&path, "[autosave]\ndebounce_ms = \"soon\"\n").unwrap();

        assert!(matches!(
            EditorConfig::load(&path),
            Err(EditorError::Config { .. })
        ));
        assert_eq!(EditorConfig::load_or_default(&path).autosave.debounce_ms, 1000);
    }

    #[test]
    fn missing_file_falls_back_to_default() {
        let dir = tempdir().unwrap();
        let config = EditorConfig::load_or_default(&dir.path().join("absent.toml"));
        assert!(config.autosave.enabled);
    }
}
