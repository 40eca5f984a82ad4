//! The columnar data source interface.
//!
//! The pipeline treats each dataset's canonical snapshot as an opaque
//! source it can ask two things of: the ordered column schema, and the
//! distinct values of one column with a caller-supplied label expression.
//! [`SqliteSource`] is the concrete implementation over the SQLite
//! snapshots the transform step produces; anything else (parquet, a remote
//! warehouse) slots in behind the same trait.
//!
//! Handles are opened, used and closed within a single pipeline stage and
//! are not assumed safe to share across threads.

pub mod sqlite;

pub use sqlite::SqliteSource;

use thiserror::Error;

use crate::model::FilterValue;

/// Errors raised by a columnar source.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Snapshot '{path}' has no '{table}' table")]
    MissingSnapshotTable { path: String, table: String },
}

/// Result type for source operations.
pub type SourceResult<T> = Result<T, SourceError>;

/// One column of a source schema, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceColumn {
    pub name: String,
    /// Storage type name as reported by the source.
    pub type_name: String,
}

/// Quote an identifier for inclusion in SQL text.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// A queryable columnar snapshot of one dataset.
pub trait ColumnarSource {
    /// The ordered (name, type) schema of the snapshot.
    fn schema(&self) -> SourceResult<Vec<SourceColumn>>;

    /// Distinct non-null values of `column`, labelled by `label_expr`
    /// (an SQL expression), ordered ascending by label. Values and labels
    /// are rendered as canonical strings.
    fn distinct_values(&self, column: &str, label_expr: &str) -> SourceResult<Vec<FilterValue>>;
}
