use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("unknown plugin '{0}' in disabled_plugins")]
    UnknownPlugin(String),
}

/// Settings for the `jxt` inspector. Loaded from an optional JSON file and
/// then overridden by command-line flags.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct InspectConfig {
    pub pretty: bool,
    pub disabled_plugins: Vec<String>,
    pub log_level: Option<String>,
}

impl Default for InspectConfig {
    fn default() -> Self {
        Self {
            pretty: true,
            disabled_plugins: Vec::new(),
            log_level: None,
        }
    }
}

/// Flag values that take precedence over the file.
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub compact: bool,
    pub disable: Vec<String>,
    pub log_level: Option<String>,
}

impl InspectConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn apply(mut self, overrides: Overrides) -> Self {
        if overrides.compact {
            self.pretty = false;
        }
        for name in overrides.disable {
            if !self.disabled_plugins.contains(&name) {
                self.disabled_plugins.push(name);
            }
        }
        if overrides.log_level.is_some() {
            self.log_level = overrides.log_level;
        }
        self
    }

    /// Rejects plugin names that no stock plugin carries.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let known = jxtcore::plugins::names();
        match self
            .disabled_plugins
            .iter()
            .find(|name| !known.contains(&name.as_str()))
        {
            Some(name) => Err(ConfigError::UnknownPlugin(name.clone())),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_win_over_file() {
        let file: InspectConfig =
            serde_json::from_str(r#"{"pretty": true, "disabled_plugins": ["muc"], "log_level": "warn"}"#)
                .unwrap();
        let merged = file.apply(Overrides {
            compact: true,
            disable: vec!["muc".to_string(), "jingle".to_string()],
            log_level: Some("debug".to_string()),
        });
        assert!(!merged.pretty);
        assert_eq!(merged.disabled_plugins, vec!["muc", "jingle"]);
        assert_eq!(merged.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_missing_keys_use_defaults() {
        let config: InspectConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, InspectConfig::default());
        assert!(serde_json::from_str::<InspectConfig>(r#"{"colour": true}"#).is_err());
    }

    #[test]
    fn test_unknown_plugin_is_rejected() {
        let config = InspectConfig {
            disabled_plugins: vec!["nope".to_string()],
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::UnknownPlugin(n)) if n == "nope"));
    }
}
