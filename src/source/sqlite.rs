//! SQLite-backed columnar snapshot source.
//!
//! The transform step materializes each dataset as a SQLite file holding a
//! single table named `dataset`. This source answers schema and
//! distinct-value queries against that table.

use std::path::Path;

use rusqlite::types::ValueRef;
use rusqlite::Connection;
use tracing::debug;

use super::{quote_ident, ColumnarSource, SourceColumn, SourceError, SourceResult};
use crate::model::FilterValue;

/// Name of the snapshot table inside every dataset file.
pub const SNAPSHOT_TABLE: &str = "dataset";

/// A columnar source over one SQLite snapshot file.
pub struct SqliteSource {
    conn: Connection,
}

impl SqliteSource {
    /// Open a snapshot file, verifying the snapshot table exists.
    pub fn open(path: &Path) -> SourceResult<Self> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn).map_err(|err| match err {
            SourceError::MissingSnapshotTable { table, .. } => SourceError::MissingSnapshotTable {
                path: path.display().to_string(),
                table,
            },
            other => other,
        })
    }

    /// Wrap an existing connection (useful for in-memory fixtures).
    pub fn from_connection(conn: Connection) -> SourceResult<Self> {
        let exists: bool = conn.query_row(
            "SELECT EXISTS (SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?)",
            [SNAPSHOT_TABLE],
            |row| row.get(0),
        )?;
        if !exists {
            return Err(SourceError::MissingSnapshotTable {
                path: String::from(":memory:"),
                table: SNAPSHOT_TABLE.to_string(),
            });
        }
        Ok(Self { conn })
    }
}

impl ColumnarSource for SqliteSource {
    fn schema(&self) -> SourceResult<Vec<SourceColumn>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name, type FROM pragma_table_info(?) ORDER BY cid")?;
        let columns = stmt
            .query_map([SNAPSHOT_TABLE], |row| {
                Ok(SourceColumn {
                    name: row.get(0)?,
                    type_name: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(columns)
    }

    fn distinct_values(&self, column: &str, label_expr: &str) -> SourceResult<Vec<FilterValue>> {
        let sql = format!(
            "SELECT DISTINCT {col} AS value, {label_expr} AS label \
             FROM {table} WHERE {col} IS NOT NULL ORDER BY label ASC",
            col = quote_ident(column),
            table = SNAPSHOT_TABLE,
        );
        debug!(%sql, "distinct-value query");

        let mut stmt = self.conn.prepare(&sql)?;
        let values = stmt
            .query_map([], |row| {
                Ok(FilterValue {
                    value: render_value(row.get_ref(0)?),
                    label: render_value(row.get_ref(1)?),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(values)
    }
}

/// Render a cell as canonical string text.
fn render_value(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => String::new(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            String::from_utf8_lossy(bytes).into_owned()
        }
    }
}
