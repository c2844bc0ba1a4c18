//! The in-memory record store.
//!
//! A [`RecordStore`] keeps every imported record in insertion order behind a
//! `RwLock`. Queries are full scans; aggregation reuses the pipeline in
//! [`crate::aggregate`].

use crate::aggregate::{
    distinct_values, filter_options, global_stats, grouped_stats, FilterOptions, GlobalStats,
    GroupStats,
};
use crate::config;
use crate::filter_types::{FilterSet, Page};
use crate::query::{matches_filter, paginate};
use crate::record::{Field, FieldValue, Record};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Records held by a store, in insertion order. This is what snapshots serialize.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct StoreData {
    pub records: Vec<Arc<Record>>,
}

/// One page of a filtered scan.
#[derive(Debug, Clone, Default)]
pub struct QueryResult {
    /// Matching records inside the requested window.
    pub records: Vec<Arc<Record>>,
    /// Total matches, independent of the window.
    pub total: usize,
}

/// A thread-safe, in-memory record store.
///
/// Cloning a `RecordStore` produces a new handle to the same shared data.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    pub data: Arc<RwLock<StoreData>>,
}

impl RecordStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps already-loaded data.
    pub fn from_data(data: StoreData) -> Self {
        Self {
            data: Arc::new(RwLock::new(data)),
        }
    }

    /// Appends records in order and returns how many were inserted.
    pub fn insert_many(&self, records: impl IntoIterator<Item = Record>) -> usize {
        let mut data = self.data.write();
        let before = data.records.len();
        data.records.extend(records.into_iter().map(Arc::new));
        data.records.len() - before
    }

    /// Removes every record and returns how many were removed.
    pub fn clear(&self) -> usize {
        let mut data = self.data.write();
        let removed = data.records.len();
        data.records.clear();
        removed
    }

    pub fn len(&self) -> usize {
        self.data.read().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.read().records.is_empty()
    }

    /// First record in insertion order, if any.
    pub fn first(&self) -> Option<Arc<Record>> {
        self.data.read().records.first().cloned()
    }

    /// Returns the `page` window of records matching `filter` plus the total match count.
    pub fn find(&self, filter: &FilterSet, page: Page) -> QueryResult {
        let data = self.data.read();
        let (window, total) = paginate(&data.records, filter, page);
        QueryResult {
            records: window.into_iter().cloned().collect(),
            total,
        }
    }

    /// Number of records matching `filter`.
    pub fn count(&self, filter: &FilterSet) -> usize {
        let data = self.data.read();
        data.records
            .iter()
            .filter(|r| matches_filter(r, filter))
            .count()
    }

    /// Distinct non-empty values of `field`, first-seen order.
    pub fn distinct(&self, field: Field) -> Vec<FieldValue> {
        let data = self.data.read();
        distinct_values(data.records.iter().map(|r| &**r), field)
    }

    /// Filter vocabularies over the whole store.
    pub fn filter_options(&self) -> FilterOptions {
        let data = self.data.read();
        filter_options(data.records.iter().map(|r| &**r))
    }

    /// Whole-store statistics, or `None` when the store is empty.
    pub fn stats(&self) -> Option<GlobalStats> {
        let data = self.data.read();
        global_stats(data.records.iter().map(|r| &**r))
    }

    /// Per-value statistics for the column named `group_by`, top
    /// [`config::GROUPED_RESULT_LIMIT`] by count. Unknown names yield no groups.
    pub fn grouped(&self, group_by: &str) -> Vec<GroupStats> {
        let Some(field) = Field::from_name(group_by) else {
            tracing::debug!(group_by, "grouping by unknown field");
            return Vec::new();
        };
        let data = self.data.read();
        grouped_stats(
            data.records.iter().map(|r| &**r),
            field,
            config::GROUPED_RESULT_LIMIT,
        )
    }
}
