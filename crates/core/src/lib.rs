//! # pulseboard-core
//!
//! Synchronous engine behind the pulseboard dashboard: the survey record
//! model, equality filters, an in-memory record store with snapshot
//! persistence and JSON import, the shared aggregation pipeline, and the
//! dashboard view-model.
//!
//! This crate has no async dependencies; the server and client crates wrap it.

/// Aggregation pipeline and store-level statistics.
pub mod aggregate;
/// Global configuration constants: limits, defaults, and chart sizes.
pub mod config;
/// Chart derivation, view-model, and session types for the dashboard.
pub mod dashboard;
/// Error types for storage and filter parsing.
pub mod error;
/// Filter types shared by the store, the HTTP layer, and the view.
pub mod filter_types;
/// Equality filtering and paginated scans.
pub mod query;
/// Core record types: `Record`, `Field`, and `FieldValue`.
pub mod record;
/// Storage layer: record store, import, and disk persistence.
pub mod storage;

pub use error::{FilterError, StoreError};
pub use filter_types::{FilterKey, FilterParams, FilterSet, Page};
pub use record::{Field, FieldValue, Record};
pub use storage::RecordStore;
