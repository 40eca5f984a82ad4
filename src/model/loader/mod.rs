//! Document loaders for the config and data files.
//!
//! Currently supports:
//! - **JSON** (.json)
//! - **YAML** (.yml, .yaml)
//!
//! Syntactic shape is enforced by typed deserialization: a document that
//! parses is structurally sound, and cross-reference consistency is the
//! validator's job.
//!
//! # Example
//!
//! ```rust,ignore
//! use vantage::model::loader::{load_config, load_datasets};
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config.json"))?;
//! let datasets = load_datasets(Path::new("data.yaml"))?;
//! ```

use std::path::Path;

use serde::de::DeserializeOwned;
use thiserror::Error;

use super::{Config, Dataset};

/// Errors that can occur when loading a document.
#[derive(Debug, Error)]
pub enum LoadError {
    /// File not found
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    /// Unsupported file extension
    #[error("Unsupported file extension: {extension}. Supported: .json, .yml, .yaml")]
    UnsupportedExtension { extension: String },

    /// IO error reading file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parse or shape error
    #[error("JSON error in {file}: {source}")]
    Json {
        file: String,
        source: serde_json::Error,
    },

    /// YAML parse or shape error
    #[error("YAML error in {file}: {source}")]
    Yaml {
        file: String,
        source: serde_yaml::Error,
    },
}

/// Result type for document loading operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// Load the config document (filter catalog, views, column overrides).
pub fn load_config(path: &Path) -> LoadResult<Config> {
    load_document(path)
}

/// Load the data document (dataset declarations).
pub fn load_datasets(path: &Path) -> LoadResult<Vec<Dataset>> {
    load_document(path)
}

/// Parse a config document from a JSON string (useful for testing).
pub fn config_from_json(content: &str, filename: &str) -> LoadResult<Config> {
    serde_json::from_str(content).map_err(|source| LoadError::Json {
        file: filename.to_string(),
        source,
    })
}

/// Parse a dataset list from a JSON string (useful for testing).
pub fn datasets_from_json(content: &str, filename: &str) -> LoadResult<Vec<Dataset>> {
    serde_json::from_str(content).map_err(|source| LoadError::Json {
        file: filename.to_string(),
        source,
    })
}

fn load_document<T: DeserializeOwned>(path: &Path) -> LoadResult<T> {
    if !path.exists() {
        return Err(LoadError::FileNotFound {
            path: path.display().to_string(),
        });
    }

    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    let content = std::fs::read_to_string(path)?;
    let file = path.display().to_string();

    match extension {
        "json" => serde_json::from_str(&content).map_err(|source| LoadError::Json { file, source }),
        "yml" | "yaml" => {
            serde_yaml::from_str(&content).map_err(|source| LoadError::Yaml { file, source })
        }
        _ => Err(LoadError::UnsupportedExtension {
            extension: extension.to_string(),
        }),
    }
}
