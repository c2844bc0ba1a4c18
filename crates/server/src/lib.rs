//! pulseboard-server — HTTP API for the pulseboard dashboard.
//!
//! Provides the REST API over the record store. Storage, filtering and
//! aggregation live in `pulseboard-core`.

/// REST API layer: Axum router, HTTP handlers, models, auth, metrics.
pub mod api;
/// Offline `seed` and `check` maintenance commands.
pub mod commands;
