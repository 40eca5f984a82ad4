//! Relational metadata writer.
//!
//! Emits the resolved model as relational rows in foreign-key order:
//! datasets, then per view its row, its filter groups, their view-filters
//! (plus enumerated values), its columns, and finally one release-marker
//! row. Surrogate ids come from an [`IdAllocator`] owned by the writer and
//! created fresh per run, so identical input order reproduces identical
//! ids against a fresh target.

use std::collections::HashMap;
use std::path::Path;

use rusqlite::{params, Connection};
use thiserror::Error;
use tracing::info;

use crate::model::{FilterType, IntrospectedDataset, ResolvedView};

/// Schema version stamped on the release marker.
pub const SCHEMA_VERSION: &str = "v2";

const SCHEMA_SQL: &str = include_str!("schema.v2.sql");

/// Errors that can occur while writing metadata rows.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("View '{view}' references unknown dataset '{source}'")]
    UnknownDataset { view: String, r#source: String },
}

/// Result type for writer operations.
pub type WriteResult<T> = Result<T, WriteError>;

/// Monotonic per-table surrogate-id allocation, starting at 1.
///
/// Process-local and reset per invocation; ids are never derived from or
/// reused across runs.
#[derive(Debug, Default)]
pub struct IdAllocator {
    counters: HashMap<&'static str, i64>,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next id for `table`.
    pub fn next_id(&mut self, table: &'static str) -> i64 {
        let counter = self.counters.entry(table).or_insert(1);
        let id = *counter;
        *counter += 1;
        id
    }
}

/// Writes the resolved model into a release database.
pub struct MetadataWriter {
    conn: Connection,
    ids: IdAllocator,
    dataset_ids: HashMap<String, i64>,
}

impl MetadataWriter {
    /// Open the release database and load the schema. The target is
    /// expected to be fresh; schema creation is idempotent regardless.
    pub fn open(path: &Path) -> WriteResult<Self> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    /// Open an in-memory writer (for testing).
    pub fn open_in_memory() -> WriteResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> WriteResult<Self> {
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self {
            conn,
            ids: IdAllocator::new(),
            dataset_ids: HashMap::new(),
        })
    }

    /// Write everything: datasets, views and the terminal release marker.
    pub fn write_all(
        &mut self,
        datasets: &[IntrospectedDataset],
        views: &[ResolvedView],
    ) -> WriteResult<()> {
        for dataset in datasets {
            self.write_dataset(dataset)?;
        }
        for view in views {
            info!(view = %view.id, "writing view metadata");
            self.write_view(view)?;
        }
        self.write_release_marker()?;
        Ok(())
    }

    /// Insert one dataset row and remember its surrogate id.
    pub fn write_dataset(&mut self, dataset: &IntrospectedDataset) -> WriteResult<i64> {
        let dataset_id = self.ids.next_id("dataset");
        self.conn.execute(
            "INSERT INTO dataset (dataset_id, name) VALUES (?, ?)",
            params![dataset_id, dataset.name],
        )?;
        self.dataset_ids.insert(dataset.name.clone(), dataset_id);
        Ok(dataset_id)
    }

    /// Insert one view with its groups, filters, values and columns.
    pub fn write_view(&mut self, view: &ResolvedView) -> WriteResult<i64> {
        let dataset_id =
            *self
                .dataset_ids
                .get(&view.source)
                .ok_or_else(|| WriteError::UnknownDataset {
                    view: view.id.clone(),
                    source: view.source.clone(),
                })?;

        let view_id = self.ids.next_id("view");
        self.conn.execute(
            "INSERT INTO view (view_id, id, name, url_name, dataset_id) VALUES (?, ?, ?, ?, ?)",
            params![view_id, view.id, view.name, view.url_name, dataset_id],
        )?;

        for group in &view.filters {
            let group_id = self.ids.next_id("view_filter_group");
            self.conn.execute(
                "INSERT INTO view_filter_group (view_filter_group_id, view_id, id, label, rank) \
                 VALUES (?, ?, ?, ?, ?)",
                params![group_id, view_id, group.group_id, group.group_label, group.rank],
            )?;

            for filter in &group.filters {
                let filter_id = self.ids.next_id("view_filter");
                let query_columns = filter
                    .query_columns
                    .as_ref()
                    .map(serde_json::to_string)
                    .transpose()?;
                self.conn.execute(
                    "INSERT INTO view_filter (view_filter_id, view_filter_group_id, id, label, \
                     filter_type, match_type, rank, min, max, query_columns, regex) \
                     VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                    params![
                        filter_id,
                        group_id,
                        filter.filter_id,
                        filter.label,
                        filter.filter_type.as_str(),
                        filter.match_mode.map(|m| m.as_str()),
                        filter.rank,
                        filter.min,
                        filter.max,
                        query_columns,
                        filter.regex,
                    ],
                )?;

                if filter.filter_type == FilterType::SelectList {
                    for value in &filter.filter_values {
                        let value_id = self.ids.next_id("view_filter_value");
                        self.conn.execute(
                            "INSERT INTO view_filter_value (view_filter_value_id, view_filter_id, \
                             value, label) VALUES (?, ?, ?, ?)",
                            params![value_id, filter_id, value.value, value.label],
                        )?;
                    }
                }
            }
        }

        for column in &view.columns {
            let column_id = self.ids.next_id("view_column");
            self.conn.execute(
                "INSERT INTO view_column (view_column_id, view_id, name, label, type, sortable, \
                 hidden, url, delimiter, rank, enabled) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                params![
                    column_id,
                    view_id,
                    column.name,
                    column.label,
                    column.column_type.as_str(),
                    column.sortable,
                    column.hidden,
                    column.url,
                    column.delimiter,
                    column.rank,
                    column.enabled,
                ],
            )?;
        }

        Ok(view_id)
    }

    /// Insert the terminal release marker: schema version plus a
    /// month-precision materialization label.
    pub fn write_release_marker(&mut self) -> WriteResult<()> {
        let label = chrono::Utc::now().format("%Y-%m").to_string();
        self.conn.execute(
            "INSERT INTO release (release_label, schema_version) VALUES (?, ?)",
            params![label, SCHEMA_VERSION],
        )?;
        Ok(())
    }

    /// Borrow the underlying connection (used by tests to assert rows).
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}
