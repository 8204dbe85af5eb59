//! Scan configuration, loaded from TOML:
//! ```toml
//! extension = "mon"
//! stop_on_error = true
//! ```

use crate::error::{CipError, Result};
use serde::Deserialize;
use std::path::Path;

/// Controls how a directory of CIP files is scanned.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ScanConfig {
    /// File extension to pick up, without the dot.
    pub extension: String,
    /// Abort the scan on the first file that fails to parse.
    pub stop_on_error: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            extension: "mon".to_string(),
            stop_on_error: false,
        }
    }
}

impl ScanConfig {
    /// Load scan configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CipError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read scan config from {:?}: {}", path, e),
            ))
        })?;

        Self::from_str(&content)
    }

    /// Parse scan configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| CipError::Config(format!("Failed to parse scan config TOML: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        assert_eq!(ScanConfig::from_str("").unwrap(), ScanConfig::default());
    }

    #[test]
    fn test_partial_config() {
        let config = ScanConfig::from_str("stop_on_error = true").unwrap();
        assert_eq!(config.extension, "mon");
        assert!(config.stop_on_error);
    }

    #[test]
    fn test_invalid_config() {
        let err = ScanConfig::from_str("extension = 5").unwrap_err();
        assert!(matches!(err, CipError::Config(_)));
    }

    #[test]
    fn test_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.toml");
        std::fs::write(&path, "extension = \"npc\"\n").unwrap();
        assert_eq!(ScanConfig::from_file(&path).unwrap().extension, "npc");

        let err = ScanConfig::from_file(&dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, CipError::Io(_)));
    }
}
