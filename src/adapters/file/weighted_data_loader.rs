//! Weighted data loader - reads entity/indicator matrices from JSON or YAML files.
//!
//! Both formats carry the same shape:
//!
//! ```text
//! region1:
//!   disasterPrepScore: 0.82
//!   shelterCapacity: null
//! region2: null
//! ```
//!
//! YAML additionally allows `.nan` / `.inf`, which JSON cannot express.

use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tracing::{debug, info};

use crate::domain::topsis::WeightedData;

/// Maximum accepted file size (16 MB).
const MAX_FILE_SIZE_BYTES: u64 = 16 * 1024 * 1024;

/// Serialization format of a data file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFormat {
    Json,
    Yaml,
}

impl DataFormat {
    /// Picks the format from the file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(DataFormat::Json),
            "yaml" | "yml" => Some(DataFormat::Yaml),
            _ => None,
        }
    }
}

/// Errors raised while loading weighted data.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("File {path} is {size} bytes, limit is {limit}")]
    TooLarge { path: PathBuf, size: u64, limit: u64 },

    #[error("Unsupported data file extension: {0} (expected .json, .yaml or .yml)")]
    UnsupportedFormat(PathBuf),

    #[error("Failed to parse {path}: {reason}")]
    Parse { path: PathBuf, reason: String },
}

/// Loads [`WeightedData`] from disk.
#[derive(Debug, Clone, Default)]
pub struct WeightedDataLoader;

impl WeightedDataLoader {
    pub fn new() -> Self {
        Self
    }

    /// Loads a file, inferring the format from its extension.
    pub async fn load(&self, path: impl AsRef<Path>) -> Result<WeightedData, LoadError> {
        let path = path.as_ref();
        let format =
            DataFormat::from_path(path).ok_or_else(|| LoadError::UnsupportedFormat(path.to_path_buf()))?;

        let io_err = |source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        };
        let size = fs::metadata(path).await.map_err(io_err)?.len();
        if size > MAX_FILE_SIZE_BYTES {
            return Err(LoadError::TooLarge {
                path: path.to_path_buf(),
                size,
                limit: MAX_FILE_SIZE_BYTES,
            });
        }

        let content = fs::read_to_string(path).await.map_err(io_err)?;
        debug!(path = %path.display(), bytes = size, ?format, "Read weighted data file");

        let data = Self::parse(&content, format).map_err(|reason| LoadError::Parse {
            path: path.to_path_buf(),
            reason,
        })?;
        info!(path = %path.display(), entities = data.len(), "Loaded weighted data");
        Ok(data)
    }

    /// Parses in-memory content.
    pub fn parse(content: &str, format: DataFormat) -> Result<WeightedData, String> {
        match format {
            DataFormat::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
            DataFormat::Yaml => serde_yaml::from_str(content).map_err(|e| e.to_string()),
        }
    }
}
