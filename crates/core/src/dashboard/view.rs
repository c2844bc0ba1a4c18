//! Dashboard view-model.
//!
//! Holds the active filters, the filter vocabularies, the last fetched page,
//! and the charts derived from it. Every refresh is tagged with a
//! [`RequestTicket`]; responses carrying an older ticket than the latest one
//! issued are discarded, so a slow response can never overwrite newer state.

use crate::aggregate::{FilterOptions, GlobalStats};
use crate::dashboard::charts::DashboardCharts;
use crate::filter_types::{FilterKey, FilterParams};
use crate::record::Record;
use std::fmt::Display;

/// Whether a refresh is outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    Ready,
}

/// Sequence number identifying one refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestTicket(u64);

impl RequestTicket {
    pub fn sequence(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone)]
pub struct DashboardView {
    filters: FilterParams,
    options: FilterOptions,
    records: Vec<Record>,
    stats: Option<GlobalStats>,
    charts: DashboardCharts,
    state: LoadState,
    latest: u64,
}

impl Default for DashboardView {
    fn default() -> Self {
        Self::new()
    }
}

impl DashboardView {
    /// A fresh view: no data yet, loading.
    pub fn new() -> Self {
        Self {
            filters: FilterParams::default(),
            options: FilterOptions::default(),
            records: Vec::new(),
            stats: None,
            charts: DashboardCharts::default(),
            state: LoadState::Loading,
            latest: 0,
        }
    }

    pub fn filters(&self) -> &FilterParams {
        &self.filters
    }

    pub fn options(&self) -> &FilterOptions {
        &self.options
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn stats(&self) -> Option<&GlobalStats> {
        self.stats.as_ref()
    }

    pub fn charts(&self) -> &DashboardCharts {
        &self.charts
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    /// The spinner is shown only while loading and nothing has been fetched yet.
    /// Later refreshes keep the previous data on screen.
    pub fn shows_spinner(&self) -> bool {
        self.state == LoadState::Loading && self.records.is_empty()
    }

    /// Starts a refresh with the current filters and returns its ticket.
    /// Any ticket issued earlier becomes stale.
    pub fn begin_refresh(&mut self) -> RequestTicket {
        self.latest += 1;
        self.state = LoadState::Loading;
        RequestTicket(self.latest)
    }

    /// Sets one filter (an empty value clears it) and starts a refresh.
    pub fn set_filter(&mut self, key: FilterKey, value: impl Into<String>) -> RequestTicket {
        self.filters.set(key, value);
        self.begin_refresh()
    }

    /// Clears every filter and starts a refresh.
    pub fn clear_filters(&mut self) -> RequestTicket {
        self.filters = FilterParams::default();
        self.begin_refresh()
    }

    /// `true` if `ticket` belongs to the most recent refresh.
    pub fn is_current(&self, ticket: RequestTicket) -> bool {
        ticket.0 == self.latest
    }

    /// Installs the filter vocabularies.
    pub fn apply_options(&mut self, options: FilterOptions) {
        self.options = options;
    }

    /// Applies a fetched page and its statistics, recomputing the charts.
    ///
    /// Returns `false`, leaving the view untouched, when `ticket` is stale.
    pub fn apply_page(
        &mut self,
        ticket: RequestTicket,
        records: Vec<Record>,
        stats: Option<GlobalStats>,
    ) -> bool {
        if !self.is_current(ticket) {
            tracing::debug!(
                ticket = ticket.0,
                latest = self.latest,
                "Dropping stale dashboard response"
            );
            return false;
        }
        self.charts = DashboardCharts::from_records(&records);
        self.records = records;
        self.stats = stats;
        self.state = LoadState::Ready;
        true
    }

    /// Records a failed refresh. Existing data is kept; the loading flag is
    /// cleared only when the failure belongs to the latest refresh.
    pub fn apply_failure(&mut self, ticket: RequestTicket, error: &dyn Display) -> bool {
        tracing::warn!(ticket = ticket.0, "Dashboard refresh failed: {}", error);
        if !self.is_current(ticket) {
            return false;
        }
        self.state = LoadState::Ready;
        true
    }
}
