//! The resolution pipeline: dataset introspection, then per-view filter
//! resolution and column enrichment.
//!
//! Stages run strictly in order and hand each other immutable records:
//!
//! ```text
//! Config + Vec<Dataset>
//!        │
//!        ▼ [dataset] introspect schema, validate column references
//! Vec<IntrospectedDataset>
//!        │
//!        ▼ [views] normalize groups, resolve filters, enumerate values,
//!        │         enrich columns
//! Vec<ResolvedView>
//! ```

pub mod dataset;
pub mod views;

pub use dataset::{introspect_dataset, write_dataset_artifact, DatasetError, DatasetResult};
pub use views::{resolve_view, write_view_artifact, FilterError, FilterResult};
