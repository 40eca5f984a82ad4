//! Declarative catalog model: filters, views, columns and datasets.
//!
//! These types mirror the two input documents (the "config" document with
//! the filter catalog, views and column overrides, and the "data" document
//! with dataset declarations). They are parsed once by the loader and
//! consumed read-only by the resolution pipeline, which produces the
//! immutable records in [`resolved`].

pub mod loader;
pub mod resolved;
pub mod types;

pub use resolved::{
    DatasetColumn, FilterValue, IntrospectedDataset, ResolvedColumn, ResolvedFilter,
    ResolvedFilterGroup, ResolvedView,
};
pub use types::{ColumnType, FilterType, MatchMode};

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Column roles of a location (genomic interval) filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationColumns {
    pub region: String,
    pub start: String,
    pub end: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bin: Option<String>,
}

impl LocationColumns {
    /// The (role, column) pairs that must exist in the dataset. Optional
    /// roles are included only when declared.
    pub fn declared_roles(&self) -> Vec<(&'static str, &str)> {
        let mut roles = vec![
            ("region", self.region.as_str()),
            ("start", self.start.as_str()),
            ("end", self.end.as_str()),
        ];
        if let Some(strand) = &self.strand {
            roles.push(("strand", strand));
        }
        if let Some(bin) = &self.bin {
            roles.push(("bin", bin));
        }
        roles
    }
}

/// Target column(s) a filter queries against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryColumns {
    /// A single target column.
    Single { column: String },
    /// A multi-column location descriptor.
    Location(LocationColumns),
}

/// A reusable catalog filter definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub filter_type: FilterType,
    #[serde(rename = "match", default, skip_serializing_if = "Option::is_none")]
    pub match_mode: Option<MatchMode>,
    /// SQL expression deriving the display label for enumerated values.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_labels: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_columns: Option<QueryColumns>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regex: Option<String>,
}

impl Filter {
    /// The column to query for distinct values. An explicit single query
    /// column wins, otherwise the filter id doubles as the column name.
    pub fn target_column(&self) -> &str {
        match &self.query_columns {
            Some(QueryColumns::Single { column }) => column,
            _ => &self.id,
        }
    }
}

/// A view's reference to a catalog filter.
///
/// Only `filter_id` is required; the remaining fields may be pre-filled in
/// the config and are overwritten by any non-null catalog field at
/// resolution time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewFilterRef {
    pub filter_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub filter_type: Option<FilterType>,
    #[serde(rename = "match", default, skip_serializing_if = "Option::is_none")]
    pub match_mode: Option<MatchMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_columns: Option<QueryColumns>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regex: Option<String>,
}

impl ViewFilterRef {
    pub fn new(filter_id: impl Into<String>) -> Self {
        Self {
            filter_id: filter_id.into(),
            label: None,
            filter_type: None,
            match_mode: None,
            min: None,
            max: None,
            query_columns: None,
            regex: None,
        }
    }
}

/// A declared group of view-filters presented under one label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewFilterGroup {
    pub group_id: String,
    pub group_label: String,
    pub filters: Vec<ViewFilterRef>,
}

/// One entry in a view's filter list: either an explicit group or a bare
/// reference. Normalization wraps bare references into singleton groups,
/// so everything downstream of the resolver sees groups only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterEntry {
    Group(ViewFilterGroup),
    Bare(ViewFilterRef),
}

/// A declared view column. Presentation fields come from the dataset and
/// per-view overrides during enrichment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewColumn {
    pub name: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

/// A filterable, columnar view over one dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct View {
    pub id: String,
    pub name: String,
    pub url_name: String,
    /// Name of the backing dataset.
    pub source: String,
    #[serde(default)]
    pub include_remaining_columns: bool,
    pub filters: Vec<FilterEntry>,
    pub columns: Vec<ViewColumn>,
}

impl View {
    /// All filter references declared by this view, grouped or bare, in
    /// declaration order.
    pub fn filter_refs(&self) -> impl Iterator<Item = &ViewFilterRef> {
        self.filters.iter().flat_map(|entry| match entry {
            FilterEntry::Group(group) => group.filters.iter(),
            FilterEntry::Bare(reference) => std::slice::from_ref(reference).iter(),
        })
    }
}

/// Column presentation metadata, used for per-view overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default = "default_true")]
    pub sortable: bool,
    #[serde(default)]
    pub hidden: bool,
    #[serde(rename = "type", default)]
    pub column_type: ColumnType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delimiter: Option<String>,
}

impl Default for Column {
    fn default() -> Self {
        Self {
            label: None,
            sortable: true,
            hidden: false,
            column_type: ColumnType::String,
            url: None,
            delimiter: None,
        }
    }
}

/// The parsed config document: filter catalog, views and column overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub filters: Vec<Filter>,
    pub views: Vec<View>,
    /// Per-view column overrides, keyed by view id then column name.
    #[serde(default)]
    pub columns: HashMap<String, HashMap<String, Column>>,
}

impl Config {
    /// Look up a catalog filter by id.
    pub fn filter(&self, filter_id: &str) -> Option<&Filter> {
        self.filters.iter().find(|f| f.id == filter_id)
    }

    /// Look up the column override for (view id, column name).
    pub fn column_override(&self, view_id: &str, column_name: &str) -> Option<&Column> {
        self.columns.get(view_id)?.get(column_name)
    }
}

/// A derived-column declaration, applied by the out-of-scope transform step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateColumn {
    pub name: String,
    pub command: String,
}

/// A dataset declaration from the data document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub name: String,
    /// Path to the columnar snapshot the pipeline queries.
    pub path: PathBuf,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub create_columns: Vec<CreateColumn>,
}

fn default_true() -> bool {
    true
}
