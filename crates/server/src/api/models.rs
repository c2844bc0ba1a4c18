//! Request and response data transfer objects for the REST API.
//!
//! All types derive `Serialize` and/or `Deserialize` for JSON marshalling via Axum.

use pulseboard_core::aggregate::{FilterOptions, GlobalStats, GroupStats};
use pulseboard_core::dashboard::UserProfile;
use pulseboard_core::{Field, FilterParams, Record};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Query string for `GET /api/data`.
///
/// Pagination values stay strings here so malformed input can be reported
/// with the offending parameter named.
#[derive(Debug, Default, Deserialize)]
pub struct DataQuery {
    #[serde(flatten)]
    pub filters: FilterParams,
    pub limit: Option<String>,
    pub skip: Option<String>,
}

/// Query string for `GET /api/data/grouped`.
#[derive(Debug, Default, Deserialize)]
pub struct GroupedQuery {
    #[serde(rename = "groupBy")]
    pub group_by: Option<String>,
}

/// Response for `GET /api/data`.
#[derive(Debug, Serialize)]
pub struct DataResponse {
    pub success: bool,
    /// Records in this page.
    pub count: usize,
    /// Matches across all pages.
    pub total: usize,
    pub data: Vec<RecordBody>,
}

/// JSON form of a stored record: `_id` plus only the columns that are present.
///
/// Snapshots keep the derived `Record` encoding; absent columns are dropped
/// here so API payloads match what was imported.
#[derive(Debug, Clone)]
pub struct RecordBody(pub Arc<Record>);

impl Serialize for RecordBody {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let record = &self.0;
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("_id", &record.id)?;
        for field in Field::ALL {
            if let Some(value) = record.field(field) {
                map.serialize_entry(field.as_str(), &value)?;
            }
        }
        map.end()
    }
}

/// Statistics payload. An empty store serializes as `{}`.
#[derive(Debug, Serialize)]
pub struct StatsBody {
    #[serde(flatten)]
    pub stats: Option<GlobalStats>,
}

/// Response for `GET /api/data/stats`.
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub success: bool,
    pub stats: StatsBody,
}

/// Response for `GET /api/data/filters`.
#[derive(Debug, Serialize)]
pub struct FiltersResponse {
    pub success: bool,
    pub filters: FilterOptions,
}

/// Response for `GET /api/data/grouped`.
#[derive(Debug, Serialize)]
pub struct GroupedResponse {
    pub success: bool,
    #[serde(rename = "groupBy")]
    pub group_by: String,
    pub data: Vec<GroupStats>,
}

/// Response for `GET /api/auth/me`.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub success: bool,
    pub user: UserProfile,
}

/// Response for `GET /api/health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub message: String,
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub total_records: usize,
}
