//! Per-view filter resolution and column enrichment.
//!
//! Normalizes a view's mixed filter entries into a uniform sequence of
//! groups, resolves each member against the catalog, enumerates distinct
//! values for `select_list` filters, and merges column presentation
//! metadata from the dataset defaults and per-view overrides.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::warn;

use crate::model::{
    Column, Config, DatasetColumn, Filter, FilterEntry, FilterType, FilterValue,
    IntrospectedDataset, ResolvedColumn, ResolvedFilter, ResolvedFilterGroup, ResolvedView, View,
    ViewFilterRef,
};
use crate::source::{quote_ident, ColumnarSource, SourceError};

/// Soft cap on distinct values per enumerable filter before a warning is
/// logged. Large enumerations are heavy to serve downstream.
pub const DEFAULT_WARN_MAX: usize = 60;

/// A view references something absent from the resolved universe. Fatal
/// for the whole run; partial output is not safe to persist.
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("Cannot find the filter '{filter_id}' in the view '{view}'")]
    UnknownFilter { filter_id: String, view: String },

    #[error("No dataset found for '{source}'")]
    UnknownDataset { r#source: String },

    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for view resolution.
pub type FilterResult<T> = Result<T, FilterError>;

/// Resolve one view against the catalog and its introspected dataset.
///
/// Groups receive 1-based ranks in declaration order, members likewise
/// within each group. A bare filter reference becomes a singleton group
/// seeded with the filter id as both group id and label; once its member
/// resolves to a non-empty label, any one-member group adopts that label.
pub fn resolve_view(
    view: &View,
    config: &Config,
    dataset: &IntrospectedDataset,
    source: &dyn ColumnarSource,
    warn_max: usize,
) -> FilterResult<ResolvedView> {
    let mut groups = Vec::with_capacity(view.filters.len());
    for (group_index, entry) in view.filters.iter().enumerate() {
        let (group_id, group_label, members) = match entry {
            FilterEntry::Group(group) => (
                group.group_id.clone(),
                group.group_label.clone(),
                group.filters.iter().collect::<Vec<_>>(),
            ),
            // Auto-wrap: the real label is adopted after resolution
            FilterEntry::Bare(reference) => (
                reference.filter_id.clone(),
                reference.filter_id.clone(),
                vec![reference],
            ),
        };

        let mut resolved_members = Vec::with_capacity(members.len());
        for (member_index, reference) in members.iter().enumerate() {
            resolved_members.push(resolve_filter(
                view,
                reference,
                config,
                source,
                member_index as u32 + 1,
                warn_max,
            )?);
        }

        let group_label = match resolved_members.as_slice() {
            [only] if !only.label.is_empty() => only.label.clone(),
            _ => group_label,
        };

        groups.push(ResolvedFilterGroup {
            group_id,
            group_label,
            rank: group_index as u32 + 1,
            filters: resolved_members,
        });
    }

    let columns = enrich_columns(view, config, dataset);

    Ok(ResolvedView {
        id: view.id.clone(),
        name: view.name.clone(),
        url_name: view.url_name.clone(),
        source: view.source.clone(),
        filters: groups,
        columns,
    })
}

/// Write the resolved view as `view-{id}.json`.
pub fn write_view_artifact(view: &ResolvedView, release_path: &Path) -> FilterResult<PathBuf> {
    let save_path = release_path.join(format!("view-{}.json", view.id));
    let json = serde_json::to_string_pretty(view)?;
    std::fs::write(&save_path, json)?;
    Ok(save_path)
}

/// Resolve a single view-filter reference against its catalog definition.
fn resolve_filter(
    view: &View,
    reference: &ViewFilterRef,
    config: &Config,
    source: &dyn ColumnarSource,
    rank: u32,
    warn_max: usize,
) -> FilterResult<ResolvedFilter> {
    let definition =
        config
            .filter(&reference.filter_id)
            .ok_or_else(|| FilterError::UnknownFilter {
                filter_id: reference.filter_id.clone(),
                view: view.name.clone(),
            })?;

    let filter_values = if definition.filter_type == FilterType::SelectList {
        enumerate_values(view, definition, source, warn_max)?
    } else {
        Vec::new()
    };

    // Explicit field-by-field merge: a present catalog field wins, the
    // reference's own value stands in where the catalog is silent.
    Ok(ResolvedFilter {
        filter_id: reference.filter_id.clone(),
        label: definition.label.clone(),
        filter_type: definition.filter_type,
        match_mode: definition.match_mode.or(reference.match_mode),
        min: definition.min.or(reference.min),
        max: definition.max.or(reference.max),
        rank,
        filter_values,
        query_columns: definition
            .query_columns
            .clone()
            .or_else(|| reference.query_columns.clone()),
        regex: definition
            .regex
            .clone()
            .or_else(|| reference.regex.clone()),
    })
}

/// Enumerate the distinct values of a `select_list` filter.
fn enumerate_values(
    view: &View,
    filter: &Filter,
    source: &dyn ColumnarSource,
    warn_max: usize,
) -> FilterResult<Vec<FilterValue>> {
    let target = filter.target_column();
    let label_expr = match &filter.filter_labels {
        Some(expr) => expr.clone(),
        None => quote_ident(target),
    };

    let values = source.distinct_values(target, &label_expr)?;
    if values.is_empty() {
        warn!(filter = %filter.id, "no values found");
    } else if values.len() > warn_max {
        warn!(
            dataset = %view.source,
            filter = %filter.id,
            count = values.len(),
            cap = warn_max,
            "filter has more distinct values than the soft cap"
        );
    }
    Ok(values)
}

/// Walk the view's declared columns assigning rank and presentation
/// metadata, then append unreferenced dataset columns when the view opts
/// in. Dataset columns never declared and not auto-included are dropped.
fn enrich_columns(view: &View, config: &Config, dataset: &IntrospectedDataset) -> Vec<ResolvedColumn> {
    let mut columns = Vec::with_capacity(view.columns.len());
    let mut seen: HashSet<&str> = HashSet::new();
    let mut rank = 1u32;

    for declared in &view.columns {
        seen.insert(declared.name.as_str());
        let over = config.column_override(&view.id, &declared.name);
        columns.push(enrich_column(
            &declared.name,
            declared.enabled,
            rank,
            dataset.column(&declared.name),
            over,
        ));
        rank += 1;
    }

    if view.include_remaining_columns {
        // Hidden dataset columns are appended too; they stay hidden
        for ds_column in &dataset.columns {
            if seen.contains(ds_column.name.as_str()) {
                continue;
            }
            let over = config.column_override(&view.id, &ds_column.name);
            columns.push(enrich_column(&ds_column.name, true, rank, Some(ds_column), over));
            rank += 1;
        }
    }

    columns
}

/// Merge presentation fields for one column: override fields win, the
/// override label falls back to the dataset label, and with no override
/// everything comes from the dataset column.
fn enrich_column(
    name: &str,
    enabled: bool,
    rank: u32,
    ds_column: Option<&DatasetColumn>,
    over: Option<&Column>,
) -> ResolvedColumn {
    let mut resolved = ResolvedColumn {
        name: name.to_string(),
        enabled,
        rank,
        label: None,
        column_type: Default::default(),
        sortable: true,
        hidden: false,
        url: None,
        delimiter: None,
    };

    let Some(ds_column) = ds_column else {
        // Declared but absent from the dataset: keep defaults
        return resolved;
    };

    match over {
        Some(over) => {
            resolved.label = Some(
                over.label
                    .clone()
                    .unwrap_or_else(|| ds_column.label.clone()),
            );
            resolved.column_type = over.column_type;
            resolved.sortable = over.sortable;
            resolved.hidden = over.hidden;
            resolved.url = over.url.clone();
            resolved.delimiter = over.delimiter.clone();
        }
        None => {
            resolved.label = Some(ds_column.label.clone());
            resolved.column_type = ds_column.column_type;
            resolved.sortable = ds_column.sortable;
            resolved.hidden = ds_column.hidden;
            resolved.url = ds_column.url.clone();
            resolved.delimiter = ds_column.delimiter.clone();
        }
    }

    resolved
}
