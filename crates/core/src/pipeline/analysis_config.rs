use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::matching::similarity_config::SimilarityConfig;
use crate::scoring::quality_config::QualityConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Top-level analysis configuration.
///
/// Every field has a default, so a config file only needs to name the
/// values it overrides.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub quality: QualityConfig,
    pub similarity: SimilarityConfig,
    /// Similarity two observations must strictly exceed to be considered
    /// the same person.
    pub dedup_threshold: f64,
    /// Analyze every Nth frame.
    pub sample_interval: usize,
    /// Most people kept in the final report.
    pub max_people: usize,
    /// Detection worker threads. 0 picks a value from available
    /// parallelism; 1 forces the serial path.
    pub workers: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            quality: QualityConfig::default(),
            similarity: SimilarityConfig::default(),
            dedup_threshold: 0.7,
            sample_interval: 10,
            max_people: 10,
            workers: 0,
        }
    }
}

impl AnalysisConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}
