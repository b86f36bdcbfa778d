use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{fmt, EnvFilter};

use crate::Dataset;

pub const DEFAULT_API_BASE: &str = "https://servicios.ine.es/wstempus/js/ES/DATOS_TABLA";

/// Runtime settings read from the environment (and `.env` when present)
#[derive(Debug, Clone)]
pub struct Config {
    pub api_base: String,
    pub extraction_dir: PathBuf,
    pub processed_dir: PathBuf,
    pub http_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let timeout_secs: u64 = match std::env::var("HTTP_TIMEOUT_SECS") {
            Ok(v) => v
                .trim()
                .parse()
                .with_context(|| format!("HTTP_TIMEOUT_SECS is not a number of seconds: '{}'", v))?,
            Err(_) => 30,
        };

        Ok(Self {
            api_base: std::env::var("INE_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.to_string()),
            extraction_dir: PathBuf::from(
                std::env::var("EXTRACTION_DIR").unwrap_or_else(|_| "./extraction_folder".to_string()),
            ),
            processed_dir: PathBuf::from(
                std::env::var("PROCESSED_DIR").unwrap_or_else(|_| "./processed_folder".to_string()),
            ),
            http_timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Where the collector writes, and the parser reads, a dataset's raw extract
    pub fn raw_path(&self, dataset: Dataset) -> PathBuf {
        self.extraction_dir.join(dataset.raw_file_name())
    }

    pub fn processed_path(&self, dataset: Dataset) -> PathBuf {
        self.processed_dir.join(dataset.processed_file_name())
    }
}

/// Install the `tracing` subscriber; `RUST_LOG` overrides the `info` default
pub fn init_logging() {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_target(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_paths() {
        let config = Config {
            api_base: DEFAULT_API_BASE.to_string(),
            extraction_dir: PathBuf::from("/data/extraction_folder"),
            processed_dir: PathBuf::from("/data/processed_folder"),
            http_timeout: Duration::from_secs(30),
        };
        assert_eq!(
            config.raw_path(Dataset::Salaries),
            PathBuf::from("/data/extraction_folder/ine_salarios_medias_percentiles.csv")
        );
        assert_eq!(
            config.processed_path(Dataset::Poverty),
            PathBuf::from("/data/processed_folder/ine_riesgo_pobreza_exclusion_social_processed.csv")
        );
    }
}
