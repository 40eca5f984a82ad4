//! Immutable records produced by the resolution pipeline.
//!
//! Each stage consumes the previous stage's output by value:
//! declarations ([`super`]) → [`IntrospectedDataset`] → [`ResolvedView`].
//! Nothing here is mutated after construction; the writer takes these
//! records as-is.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::{ColumnType, CreateColumn, FilterType, MatchMode, QueryColumns};

/// Derive a display label from a column name: underscores become spaces and
/// the first letter is capitalized.
pub fn derive_label(name: &str) -> String {
    let spaced = name.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => spaced,
    }
}

/// A dataset column discovered by introspection, carrying default
/// presentation metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetColumn {
    pub name: String,
    pub label: String,
    pub sortable: bool,
    pub hidden: bool,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delimiter: Option<String>,
}

impl DatasetColumn {
    /// Default metadata for a discovered column name.
    pub fn with_defaults(name: &str) -> Self {
        Self {
            name: name.to_string(),
            label: derive_label(name),
            sortable: true,
            hidden: false,
            column_type: ColumnType::String,
            url: None,
            delimiter: None,
        }
    }
}

/// A dataset after schema introspection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntrospectedDataset {
    pub name: String,
    pub path: PathBuf,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub create_columns: Vec<CreateColumn>,
    pub columns: Vec<DatasetColumn>,
}

impl IntrospectedDataset {
    pub fn column(&self, name: &str) -> Option<&DatasetColumn> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }
}

/// One enumerated (value, label) pair of a `select_list` filter.
/// Both sides are canonical string renderings of the underlying cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterValue {
    pub value: String,
    pub label: String,
}

/// A view-filter resolved against its catalog definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedFilter {
    pub filter_id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub filter_type: FilterType,
    #[serde(rename = "match", default, skip_serializing_if = "Option::is_none")]
    pub match_mode: Option<MatchMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// 1-based position within the group.
    pub rank: u32,
    /// Populated only for `select_list` filters.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filter_values: Vec<FilterValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_columns: Option<QueryColumns>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regex: Option<String>,
}

/// A resolved filter group with ranked members.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedFilterGroup {
    pub group_id: String,
    pub group_label: String,
    /// 1-based position within the view.
    pub rank: u32,
    pub filters: Vec<ResolvedFilter>,
}

/// A view column enriched with presentation metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedColumn {
    pub name: String,
    pub enabled: bool,
    /// 1-based display position.
    pub rank: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    pub sortable: bool,
    pub hidden: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delimiter: Option<String>,
}

/// A fully resolved view: flat filter groups plus enriched, ranked columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedView {
    pub id: String,
    pub name: String,
    pub url_name: String,
    pub source: String,
    pub filters: Vec<ResolvedFilterGroup>,
    pub columns: Vec<ResolvedColumn>,
}
