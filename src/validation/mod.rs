//! Cross-reference validation of the parsed documents.
//!
//! Runs before any data-dependent work: the catalog and view declarations
//! must be structurally consistent, and every dataset path must be
//! reachable, before a single source is opened. Checks fail fast, except
//! the unused-filter check which must observe every usage across every
//! view before judging non-use.

use std::collections::HashSet;

use thiserror::Error;

use crate::model::{Config, Dataset, FilterEntry};

/// Structural inconsistency in the catalog, views or dataset declarations.
/// Always fatal.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Filter id '{id}' is not unique. Filters must have a unique id")]
    DuplicateFilterId { id: String },

    #[error("Unknown filter: '{filter_id}' found for view '{view}'")]
    UnknownFilter { filter_id: String, view: String },

    #[error("Duplicate group_id '{group_id}' in view '{view}'")]
    DuplicateGroupId { group_id: String, view: String },

    #[error("Filter '{id}' is not used by any of the views")]
    UnusedFilter { id: String },

    #[error("Filter '{filter_id}' has an invalid regex: {source}")]
    InvalidRegex {
        filter_id: String,
        source: regex::Error,
    },

    #[error("View '{view}' names unknown dataset '{source}'")]
    UnknownDatasetSource { view: String, r#source: String },

    #[error("Duplicate dataset name: '{name}'")]
    DuplicateDataset { name: String },

    #[error("Unable to access '{path}' for dataset '{dataset}'")]
    MissingDatasetPath { dataset: String, path: String },
}

/// Result type for validation operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Validate the filter catalog and view declarations.
///
/// Fails on: a duplicate filter id, a filter reference (bare or grouped)
/// naming an id absent from the catalog, a `group_id` colliding within a
/// view, a filter `regex` that does not compile, and a catalog filter no
/// view ever references. Unsupported filter types cannot reach this point:
/// they are rejected at deserialization.
pub fn validate_config(config: &Config) -> ConfigResult<()> {
    let mut catalog_ids: HashSet<&str> = HashSet::new();
    for filter in &config.filters {
        if !catalog_ids.insert(&filter.id) {
            return Err(ConfigError::DuplicateFilterId {
                id: filter.id.clone(),
            });
        }
        if let Some(pattern) = &filter.regex {
            regex::Regex::new(pattern).map_err(|source| ConfigError::InvalidRegex {
                filter_id: filter.id.clone(),
                source,
            })?;
        }
    }

    // Walk every view marking usage. Unknown references fail immediately;
    // the unused verdict waits until every view has been seen.
    let mut used: HashSet<&str> = HashSet::new();
    for view in &config.views {
        let mut group_ids: HashSet<&str> = HashSet::new();
        for entry in &view.filters {
            match entry {
                FilterEntry::Group(group) => {
                    if !group_ids.insert(&group.group_id) {
                        return Err(ConfigError::DuplicateGroupId {
                            group_id: group.group_id.clone(),
                            view: view.name.clone(),
                        });
                    }
                    for member in &group.filters {
                        mark_used(&member.filter_id, &view.name, &catalog_ids, &mut used)?;
                    }
                }
                FilterEntry::Bare(reference) => {
                    mark_used(&reference.filter_id, &view.name, &catalog_ids, &mut used)?;
                }
            }
        }
    }

    for filter in &config.filters {
        if !used.contains(filter.id.as_str()) {
            return Err(ConfigError::UnusedFilter {
                id: filter.id.clone(),
            });
        }
    }

    Ok(())
}

/// Validate the dataset declarations: unique names, reachable paths.
pub fn validate_datasets(datasets: &[Dataset]) -> ConfigResult<()> {
    let mut names: HashSet<&str> = HashSet::new();
    for dataset in datasets {
        if !names.insert(&dataset.name) {
            return Err(ConfigError::DuplicateDataset {
                name: dataset.name.clone(),
            });
        }
        if !dataset.path.exists() {
            return Err(ConfigError::MissingDatasetPath {
                dataset: dataset.name.clone(),
                path: dataset.path.display().to_string(),
            });
        }
    }
    Ok(())
}

/// Validate the one cross-document reference: every view's `source` must
/// name a declared dataset.
pub fn validate_sources(config: &Config, datasets: &[Dataset]) -> ConfigResult<()> {
    let names: HashSet<&str> = datasets.iter().map(|d| d.name.as_str()).collect();
    for view in &config.views {
        if !names.contains(view.source.as_str()) {
            return Err(ConfigError::UnknownDatasetSource {
                view: view.id.clone(),
                source: view.source.clone(),
            });
        }
    }
    Ok(())
}

fn mark_used<'a>(
    filter_id: &'a str,
    view_name: &str,
    catalog_ids: &HashSet<&str>,
    used: &mut HashSet<&'a str>,
) -> ConfigResult<()> {
    if !catalog_ids.contains(filter_id) {
        return Err(ConfigError::UnknownFilter {
            filter_id: filter_id.to_string(),
            view: view_name.to_string(),
        });
    }
    used.insert(filter_id);
    Ok(())
}
