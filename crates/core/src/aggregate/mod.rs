//! Aggregation: the shared grouping pipeline and the store-level statistics built on it.

/// Generic group, accumulate, finalize, sort and truncate utilities.
pub mod group;
/// Global statistics, grouped statistics, and distinct-value vocabularies.
pub mod stats;

pub use group::{group_by, rank, round2, Group, Order};
pub use stats::{
    distinct_values, filter_options, global_stats, grouped_stats, FilterOptions, GlobalStats,
    GroupStats,
};
