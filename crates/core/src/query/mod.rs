//! Query primitives: equality filtering and paginated scans over records.

/// Equality filter evaluation against records.
pub mod filter;

pub use filter::{matches_filter, paginate};
