//! Codec configuration (`savewire.toml`)
//!
//! Tunables that do not change any record layout: the fill byte written into
//! don't-care regions, sanity limits applied to counts and block lengths read
//! from untrusted files, and per-record trace logging.
//!
//! ```toml
//! format = "ps2"
//!
//! [padding]
//! fill = 0
//!
//! [limits]
//! max_count = 65536
//! max_block_length = 1048576
//!
//! [logging]
//! trace_records = true
//! ```

use std::path::Path;

use anyhow::Context;
use savewire_shared::FileFormat;
use serde::{Deserialize, Serialize};

/// Codec configuration.
///
/// Every section is optional; missing values fall back to defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CodecConfig {
    /// Default format for embedders that do not detect one themselves
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<FileFormat>,
    /// Fill settings for skipped regions
    #[serde(default)]
    pub padding: PaddingConfig,
    /// Sanity limits for values read from files
    #[serde(default)]
    pub limits: LimitsConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Fill settings for don't-care regions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaddingConfig {
    /// Byte written by `ByteWriter::skip` (default: 0)
    #[serde(default)]
    pub fill: u8,
}

/// Upper bounds applied before allocating or decoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Largest count accepted by count-prefixed arrays without an explicit max (default: 65536)
    #[serde(default = "default_max_count")]
    pub max_count: usize,
    /// Largest payload length accepted in a block header (default: 1 MiB)
    #[serde(default = "default_max_block_length")]
    pub max_block_length: u32,
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct LoggingConfig {
    /// Emit a trace event for every decoded/encoded record (default: false)
    #[serde(default)]
    pub trace_records: bool,
}

fn default_max_count() -> usize {
    0x1_0000
}
fn default_max_block_length() -> u32 {
    0x0010_0000
}

impl Default for PaddingConfig {
    fn default() -> Self {
        Self { fill: 0 }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_count: default_max_count(),
            max_block_length: default_max_block_length(),
        }
    }
}

impl CodecConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        toml::from_str(content).context("Failed to parse codec config")
    }

    /// Load a configuration file from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read codec config {}", path.display()))?;
        let config = Self::from_toml_str(&content)
            .with_context(|| format!("Invalid codec config {}", path.display()))?;
        tracing::debug!(path = %path.display(), "Loaded codec config");
        Ok(config)
    }

    /// Serialize to pretty TOML.
    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize codec config")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_config_default() {
        let config = CodecConfig::default();
        assert_eq!(config.format, None);
        assert_eq!(config.padding.fill, 0);
        assert_eq!(config.limits.max_count, 65536);
        assert_eq!(config.limits.max_block_length, 0x0010_0000);
        assert!(!config.logging.trace_records);
    }

    #[test]
    fn test_config_deserialize_empty() {
        let config = CodecConfig::from_toml_str("").unwrap();
        assert_eq!(config, CodecConfig::default());
    }

    #[test]
    fn test_config_deserialize_partial_limits() {
        let toml_str = r#"
[limits]
max_count = 512
"#;
        let config = CodecConfig::from_toml_str(toml_str).unwrap();
        assert_eq!(config.limits.max_count, 512);
        assert_eq!(config.limits.max_block_length, 0x0010_0000); // default
        assert_eq!(config.padding.fill, 0); // default
    }

    #[test]
    fn test_config_serialize_roundtrip() {
        let config = CodecConfig {
            format: Some(FileFormat::Ps2Japan),
            padding: PaddingConfig { fill: 0xCD },
            limits: LimitsConfig {
                max_count: 10,
                max_block_length: 4096,
            },
            logging: LoggingConfig {
                trace_records: true,
            },
        };

        let text = config.to_toml_string().unwrap();
        let parsed = CodecConfig::from_toml_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_config_invalid_toml() {
        let result = CodecConfig::from_toml_str("[limits\nmax_count = ");
        assert!(result.is_err());
    }

    #[test]
    fn test_config_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "format = \"mobile\"\n[padding]\nfill = 255").unwrap();

        let config = CodecConfig::load(file.path()).unwrap();
        assert_eq!(config.format, Some(FileFormat::Mobile));
        assert_eq!(config.padding.fill, 0xFF);
    }

    #[test]
    fn test_config_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = CodecConfig::load(dir.path().join("missing.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read codec config"));
    }
}
