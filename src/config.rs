use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

/// Top-level pipeline configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Model prefetch settings
    pub model: ModelConfig,
    /// Object store settings
    pub storage: StorageConfig,
}

/// Which model to prefetch and where to persist it
#[derive(Debug, Deserialize, Clone)]
pub struct ModelConfig {
    /// Hub identifier of the sentiment model
    pub name: String,
    /// Local root the artifact bundle is written under
    pub models_root: String,
}

/// Bucket addressing and error-journal fallback
#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// GCS bucket holding all run folders and journals
    pub bucket: String,
    /// Journal destination of last resort, used when a scaffolding failure
    /// leaves the run's own errored folder unreachable. Unset means such
    /// records are logged and dropped.
    pub fallback_error_folder: Option<String>,
}

impl Config {
    /// Load config from ~/.pipeline-bootstrap.toml
    ///
    /// # Errors
    /// Returns error if the file cannot be read, written, or parsed.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default(&config_path)
                .context("failed to create default config")?;
        }

        let contents = fs::read_to_string(&config_path)
            .context("failed to read config file")?;

        let config: Self = toml::from_str(&contents)
            .context("failed to parse config TOML")?;

        Ok(config)
    }

    fn config_path() -> Result<PathBuf> {
        let home = std::env::var("HOME")
            .context("HOME environment variable not set")?;
        Ok(PathBuf::from(home).join(".pipeline-bootstrap.toml"))
    }

    fn create_default(path: &PathBuf) -> Result<()> {
        let default_config = r#"[model]
name = "cardiffnlp/twitter-roberta-base-sentiment-latest"
models_root = "/app/models"

[storage]
bucket = "vai-transcripts"
# fallback_error_folder = "pipeline-fallback/Errored"
"#;
        fs::write(path, default_config)
            .context("failed to write default config")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let config: Config = toml::from_str(
            r#"
            [model]
            name = "cardiffnlp/twitter-roberta-base-sentiment-latest"
            models_root = "/app/models"

            [storage]
            bucket = "vai-transcripts"
            fallback_error_folder = "pipeline-fallback/Errored"
            "#,
        )
        .unwrap();

        assert_eq!(config.model.models_root, "/app/models");
        assert_eq!(config.storage.bucket, "vai-transcripts");
        assert_eq!(
            config.storage.fallback_error_folder.as_deref(),
            Some("pipeline-fallback/Errored")
        );
    }

    #[test]
    fn test_fallback_error_folder_is_optional() {
        let config: Config = toml::from_str(
            r#"
            [model]
            name = "m"
            models_root = "/tmp/models"

            [storage]
            bucket = "b"
            "#,
        )
        .unwrap();

        assert!(config.storage.fallback_error_folder.is_none());
    }
}
