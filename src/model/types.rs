//! Closed enumerations shared across the model.

use serde::{Deserialize, Serialize};

/// The supported filter types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterType {
    /// Single-choice select against one column.
    Select,
    /// Select matching any of several values.
    SelectIn,
    /// Select whose choices are enumerated from the dataset.
    SelectList,
    /// Numeric range with optional min/max bounds.
    Range,
    /// Genomic-interval filter over region/start/end columns.
    Location,
    /// Membership test against a delimited list column.
    ListContains,
}

impl FilterType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterType::Select => "select",
            FilterType::SelectIn => "select_in",
            FilterType::SelectList => "select_list",
            FilterType::Range => "range",
            FilterType::Location => "location",
            FilterType::ListContains => "list_contains",
        }
    }
}

impl std::fmt::Display for FilterType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a filter value is matched against cell contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    Exact,
    Prefix,
}

impl MatchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchMode::Exact => "exact",
            MatchMode::Prefix => "prefix",
        }
    }
}

/// Presentation type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ColumnType {
    #[default]
    #[serde(rename = "string")]
    String,
    #[serde(rename = "link")]
    Link,
    #[serde(rename = "array-link")]
    ArrayLink,
    #[serde(rename = "labelled-link")]
    LabelledLink,
}

impl ColumnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::String => "string",
            ColumnType::Link => "link",
            ColumnType::ArrayLink => "array-link",
            ColumnType::LabelledLink => "labelled-link",
        }
    }
}
