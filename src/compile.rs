//! End-to-end compilation from declarative documents to a release.
//!
//! This module provides the high-level API for compiling a view catalog:
//!
//! ```text
//! Config + Datasets → Validate → Introspect → Resolve → Write
//! ```
//!
//! # Example
//!
//! ```ignore
//! use vantage::compile::{compile_from_paths, CompileOptions};
//! use std::path::Path;
//!
//! let options = CompileOptions::new("2026-08").with_force(true);
//! let output = compile_from_paths(
//!     Path::new("config.json"),
//!     Path::new("data.json"),
//!     &options,
//! )?;
//! println!("release written to {}", output.database_path.display());
//! ```

use std::path::{Path, PathBuf};

use tracing::info;

use crate::model::loader::{load_config, load_datasets, LoadError};
use crate::model::{Config, Dataset, IntrospectedDataset, ResolvedView};
use crate::resolve::{
    introspect_dataset, resolve_view, write_dataset_artifact, write_view_artifact, DatasetError,
    FilterError,
};
use crate::resolve::views::DEFAULT_WARN_MAX;
use crate::source::{SourceError, SqliteSource};
use crate::validation::{validate_config, validate_datasets, validate_sources, ConfigError};
use crate::writer::{MetadataWriter, WriteError};

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur during compilation.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Dataset error: {0}")]
    Dataset(#[from] DatasetError),

    #[error("Filter error: {0}")]
    Filter(#[from] FilterError),

    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    #[error("Write error: {0}")]
    Write(#[from] WriteError),

    #[error("Release '{path}' already exists (use force to overwrite)")]
    ReleaseExists { path: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type CompileResult<T> = Result<T, CompileError>;

// ============================================================================
// Options
// ============================================================================

/// Options for compilation.
#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// Release name; doubles as the output directory and database stem.
    pub release: String,
    /// Wipe an existing release directory instead of refusing.
    pub force: bool,
    /// Soft cap on distinct values per enumerable filter before warning.
    pub warn_max: usize,
}

impl CompileOptions {
    pub fn new(release: impl Into<String>) -> Self {
        Self {
            release: release.into(),
            force: false,
            warn_max: DEFAULT_WARN_MAX,
        }
    }

    /// Overwrite an existing release directory.
    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Set the distinct-value warning threshold.
    pub fn with_warn_max(mut self, warn_max: usize) -> Self {
        self.warn_max = warn_max;
        self
    }

    /// The release output directory.
    pub fn release_path(&self) -> PathBuf {
        PathBuf::from(&self.release)
    }

    /// Path of the release database inside the release directory.
    pub fn database_path(&self) -> PathBuf {
        let stem = Path::new(&self.release)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(&self.release);
        self.release_path().join(format!("{stem}.sqlite"))
    }
}

// ============================================================================
// Result Types
// ============================================================================

/// Result of compiling a catalog into a release.
#[derive(Debug)]
pub struct CompileOutput {
    /// The release directory holding the JSON artifacts and the database.
    pub release_path: PathBuf,
    /// The release database.
    pub database_path: PathBuf,
    /// Introspected datasets, in declaration order.
    pub datasets: Vec<IntrospectedDataset>,
    /// Resolved views, in declaration order.
    pub views: Vec<ResolvedView>,
}

// ============================================================================
// Compilation Functions
// ============================================================================

/// Compile parsed documents into a release.
///
/// Stages run strictly in order; the first fatal error aborts the run
/// before anything is persisted to the release database.
pub fn compile(
    config: &Config,
    datasets: &[Dataset],
    options: &CompileOptions,
) -> CompileResult<CompileOutput> {
    info!("validating configurations");
    validate_config(config)?;
    validate_datasets(datasets)?;
    validate_sources(config, datasets)?;

    let release_path = create_release_dir(options)?;

    info!("introspecting datasets");
    let mut introspected = Vec::with_capacity(datasets.len());
    for dataset in datasets {
        let source = SqliteSource::open(&dataset.path)?;
        let result = introspect_dataset(dataset, &source, config)?;
        write_dataset_artifact(&result, &release_path)?;
        introspected.push(result);
    }

    info!("resolving views");
    let mut views = Vec::with_capacity(config.views.len());
    for view in &config.views {
        let dataset = introspected
            .iter()
            .find(|d| d.name == view.source)
            .ok_or_else(|| FilterError::UnknownDataset {
                source: view.source.clone(),
            })?;
        let source = SqliteSource::open(&dataset.path)?;
        let resolved = resolve_view(view, config, dataset, &source, options.warn_max)?;
        write_view_artifact(&resolved, &release_path)?;
        views.push(resolved);
    }

    info!("writing release database");
    let database_path = options.database_path();
    let mut writer = MetadataWriter::open(&database_path)?;
    writer.write_all(&introspected, &views)?;

    Ok(CompileOutput {
        release_path,
        database_path,
        datasets: introspected,
        views,
    })
}

/// Load the config and data documents from disk, then compile.
pub fn compile_from_paths(
    config_path: &Path,
    data_path: &Path,
    options: &CompileOptions,
) -> CompileResult<CompileOutput> {
    let config = load_config(config_path)?;
    let datasets = load_datasets(data_path)?;
    compile(&config, &datasets, options)
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Create the release directory fresh. An existing directory is an error
/// unless `force` is set, in which case it is wiped first so no stale
/// output survives into the new release.
fn create_release_dir(options: &CompileOptions) -> CompileResult<PathBuf> {
    let release_path = options.release_path();
    if release_path.exists() {
        if !options.force {
            return Err(CompileError::ReleaseExists {
                path: release_path.display().to_string(),
            });
        }
        std::fs::remove_dir_all(&release_path)?;
    }
    std::fs::create_dir_all(&release_path)?;
    Ok(release_path)
}
