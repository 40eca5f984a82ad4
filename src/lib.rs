//! # Vantage
//!
//! Compiles a declarative description of filterable, columnar views over
//! tabular datasets into a fully resolved relational metadata model.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │        Config + Data documents (JSON / YAML)             │
//! │   (filter catalog, views, column overrides, datasets)    │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [validation]
//! ┌─────────────────────────────────────────────────────────┐
//! │          Cross-reference-checked declarations             │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [resolve::dataset]
//! ┌─────────────────────────────────────────────────────────┐
//! │     IntrospectedDataset (real columns + defaults)         │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [resolve::views]
//! ┌─────────────────────────────────────────────────────────┐
//! │   ResolvedView (ranked groups, values, enriched columns)  │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [writer]
//! ┌─────────────────────────────────────────────────────────┐
//! │     Release database (surrogate ids, FK order, marker)    │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod compile;
pub mod model;
pub mod resolve;
pub mod source;
pub mod validation;
pub mod writer;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::compile::{compile, compile_from_paths, CompileOptions, CompileOutput};
    pub use crate::model::{
        Column, Config, Dataset, Filter, FilterEntry, FilterType, FilterValue,
        IntrospectedDataset, MatchMode, QueryColumns, ResolvedView, View, ViewColumn,
        ViewFilterGroup, ViewFilterRef,
    };
    pub use crate::source::{ColumnarSource, SqliteSource};
    pub use crate::validation::{validate_config, validate_datasets, validate_sources};
    pub use crate::writer::MetadataWriter;
}
