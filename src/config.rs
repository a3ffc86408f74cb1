use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub(crate) const READ_BUFFER_SIZE: usize = 8 * 1024 * 1024;

pub(crate) const DEFAULT_LOG_LEVEL: &str = "info";

/// Knobs of the detection itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LouvainConfig {
    /// Stop after this many coarsening levels, `None` runs until no vertex moves.
    pub max_levels: Option<usize>,
}

/// How the CLI prints the communities.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One community per line, labels separated by spaces.
    #[default]
    Text,
    /// A JSON document with the modularity and the communities.
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    /// Default filter when `RUST_LOG` is not set.
    pub level: String,
    /// Append logs to this file instead of stderr.
    pub file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            level: DEFAULT_LOG_LEVEL.to_owned(),
            file: None,
        }
    }
}

/// Everything the CLI can read from a YAML file. Missing keys take their defaults and command
/// line flags override the file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub louvain: LouvainConfig,
    pub log: LogConfig,
    pub output: OutputFormat,
    /// Report every coarsening level instead of the final partition only.
    pub levels: bool,
}

impl AppConfig {
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).context("failed to parse configuration")
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read configuration {}", path.display()))?;
        Self::from_yaml_str(&content)
            .with_context(|| format!("invalid configuration {}", path.display()))
    }
}

#[cfg(test)]
mod test_config {
    use std::io::Write;
    use std::path::PathBuf;

    use crate::config::{AppConfig, LouvainConfig, OutputFormat};

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.log.level, "info");
        assert_eq!(config.output, OutputFormat::Text);
        assert_eq!(config.louvain.max_levels, None);
    }

    #[test]
    fn test_parse_full() {
        let yaml = "
louvain:
  max_levels: 2
log:
  level: debug
  file: logs/louvain.log
output: json
levels: true
";
        let config = AppConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.louvain, LouvainConfig { max_levels: Some(2) });
        assert_eq!(config.log.level, "debug");
        assert_eq!(config.log.file, Some(PathBuf::from("logs/louvain.log")));
        assert_eq!(config.output, OutputFormat::Json);
        assert!(config.levels);
    }

    #[test]
    fn test_unknown_key() {
        assert!(AppConfig::from_yaml_str("resolution: 2.0").is_err());
        assert!(AppConfig::from_yaml_str("output: csv").is_err());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "output: json").unwrap();
        let config = AppConfig::from_yaml_file(file.path()).unwrap();
        assert_eq!(config.output, OutputFormat::Json);

        let missing = AppConfig::from_yaml_file("does/not/exist.yaml");
        assert!(missing.is_err());
    }
}
