//! Conversion configuration (markup.toml)

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration loaded from markup.toml
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MarkupConfig {
    /// Fennec metadata section
    #[serde(default)]
    pub fennec: FennecMeta,

    /// Conversion behavior
    #[serde(default)]
    pub conversion: ConversionConfig,
}

/// Fennec metadata
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FennecMeta {
    /// Config version for compatibility
    #[serde(default = "default_version")]
    pub version: String,
}

impl Default for FennecMeta {
    fn default() -> Self {
        Self {
            version: default_version(),
        }
    }
}

fn default_version() -> String {
    "0.1".to_string()
}

/// Conversion behavior switches
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ConversionConfig {
    /// Fail with an explicit error when no conversion rule applies, instead
    /// of passing the raw string through unchanged
    #[serde(default)]
    pub strict_unsupported: bool,

    /// Marker attribute names recognized in addition to the built-in set
    #[serde(default)]
    pub marker_aliases: Vec<String>,
}

impl MarkupConfig {
    /// Find markup.toml in standard locations
    pub fn find_config_path() -> Option<PathBuf> {
        // Check in order: platform config dir, exe dir, cwd
        let candidates = [
            dirs::config_dir().map(|p| p.join("fennec").join("markup.toml")),
            std::env::current_exe()
                .ok()
                .and_then(|p| p.parent().map(|d| d.join("markup.toml"))),
            Some(PathBuf::from("markup.toml")),
        ];

        for candidate in candidates.into_iter().flatten() {
            if candidate.exists() {
                return Some(candidate);
            }
        }
        None
    }

    /// Load configuration from file, returning defaults if not found
    pub fn load() -> Self {
        if let Some(path) = Self::find_config_path() {
            Self::load_from_path(&path).unwrap_or_default()
        } else {
            Self::default()
        }
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: MarkupConfig = toml::from_str(&content)?;
        Ok(config)
    }
}

/// Configuration error
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
}
