//! Dataset introspection.
//!
//! Discovers the actual column schema of each dataset's snapshot, builds
//! default column metadata, and validates that every per-view column
//! override and every filter query-column reference names a real column —
//! all before any distinct-value query runs.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::model::{
    Config, Dataset, DatasetColumn, IntrospectedDataset, QueryColumns, View,
};
use crate::source::{ColumnarSource, SourceError};

/// A declared column reference that the introspected schema cannot satisfy.
/// Always fatal.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(
        "Column override '{column}' in view '{view}' does not exist in dataset '{dataset}'"
    )]
    UnknownOverrideColumn {
        view: String,
        column: String,
        dataset: String,
    },

    #[error(
        "Filter '{filter_id}' in view '{view}' references column '{column}' \
         which does not exist in dataset '{dataset}'"
    )]
    UnknownQueryColumn {
        view: String,
        filter_id: String,
        column: String,
        dataset: String,
    },

    #[error(
        "Filter '{filter_id}' in view '{view}' location role '{role}' references \
         column '{column}' which does not exist in dataset '{dataset}'"
    )]
    UnknownLocationColumn {
        view: String,
        filter_id: String,
        role: &'static str,
        column: String,
        dataset: String,
    },
}

/// Result type for dataset introspection.
pub type DatasetResult<T> = Result<T, DatasetError>;

/// Introspect one dataset and validate every column reference declared
/// against it.
///
/// The schema is taken from the source in column order; each discovered
/// column gets default presentation metadata (label derived from the
/// name). Then, for every view backed by this dataset, the per-view column
/// overrides and the filters' query columns are checked against the real
/// schema.
pub fn introspect_dataset(
    dataset: &Dataset,
    source: &dyn ColumnarSource,
    config: &Config,
) -> DatasetResult<IntrospectedDataset> {
    let columns: Vec<DatasetColumn> = source
        .schema()?
        .iter()
        .map(|col| DatasetColumn::with_defaults(&col.name))
        .collect();
    info!(
        dataset = %dataset.name,
        columns = columns.len(),
        "introspected dataset schema"
    );

    let introspected = IntrospectedDataset {
        name: dataset.name.clone(),
        path: dataset.path.clone(),
        create_columns: dataset.create_columns.clone(),
        columns,
    };

    for view in config.views.iter().filter(|v| v.source == dataset.name) {
        validate_overrides(view, config, &introspected)?;
        validate_query_columns(view, config, &introspected)?;
    }

    Ok(introspected)
}

/// Write the resolved column metadata as `dataset-{name}.json`.
pub fn write_dataset_artifact(
    dataset: &IntrospectedDataset,
    release_path: &Path,
) -> DatasetResult<PathBuf> {
    let save_path = release_path.join(format!("dataset-{}.json", dataset.name));
    let json = serde_json::to_string_pretty(dataset)?;
    std::fs::write(&save_path, json)?;
    Ok(save_path)
}

fn validate_overrides(
    view: &View,
    config: &Config,
    dataset: &IntrospectedDataset,
) -> DatasetResult<()> {
    let Some(overrides) = config.columns.get(&view.id) else {
        return Ok(());
    };
    for column_name in overrides.keys() {
        if !dataset.has_column(column_name) {
            return Err(DatasetError::UnknownOverrideColumn {
                view: view.id.clone(),
                column: column_name.clone(),
                dataset: dataset.name.clone(),
            });
        }
    }
    Ok(())
}

fn validate_query_columns(
    view: &View,
    config: &Config,
    dataset: &IntrospectedDataset,
) -> DatasetResult<()> {
    for reference in view.filter_refs() {
        // Unknown filter ids are the validator's concern, not ours.
        let Some(filter) = config.filter(&reference.filter_id) else {
            continue;
        };
        match &filter.query_columns {
            // No explicit query_columns: the filter id is the default
            // target, but only explicit declarations are validated.
            None => {}
            Some(QueryColumns::Single { column }) => {
                if !dataset.has_column(column) {
                    return Err(DatasetError::UnknownQueryColumn {
                        view: view.id.clone(),
                        filter_id: filter.id.clone(),
                        column: column.clone(),
                        dataset: dataset.name.clone(),
                    });
                }
            }
            Some(QueryColumns::Location(location)) => {
                for (role, column) in location.declared_roles() {
                    if !dataset.has_column(column) {
                        return Err(DatasetError::UnknownLocationColumn {
                            view: view.id.clone(),
                            filter_id: filter.id.clone(),
                            role,
                            column: column.to_string(),
                            dataset: dataset.name.clone(),
                        });
                    }
                }
            }
        }
    }
    Ok(())
}
