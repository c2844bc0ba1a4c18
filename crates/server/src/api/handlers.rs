//! HTTP request handlers and shared application state.
//!
//! Store scans run on the blocking pool so large aggregations never stall
//! the async workers.

use crate::api::auth::AuthConfig;
use crate::api::errors::ApiError;
use crate::api::metrics;
use crate::api::models::*;
use axum::extract::{Query, State};
use axum::{Extension, Json};
use metrics_exporter_prometheus::PrometheusHandle;
use pulseboard_core::config;
use pulseboard_core::dashboard::UserProfile;
use pulseboard_core::{Page, RecordStore};
use std::sync::Arc;
use std::time::Instant;

/// Shared application state passed to every handler via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    pub store: RecordStore,
    pub auth: Arc<AuthConfig>,
    pub prometheus_handle: PrometheusHandle,
    /// Browser origins allowed by CORS.
    pub allowed_origins: Vec<String>,
    pub start_time: Instant,
}

/// Runs `job` against the store on the blocking pool and records its timing.
async fn run_query<T, F>(state: &AppState, kind: &'static str, job: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&RecordStore) -> T + Send + 'static,
{
    let store = state.store.clone();
    let start = Instant::now();
    let out = tokio::task::spawn_blocking(move || job(&store)).await?;
    metrics::record_query(kind, start.elapsed());
    Ok(out)
}

/// `GET /api/health`
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        message: "Server is running".to_string(),
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        total_records: state.store.len(),
    })
}

/// `GET /metrics`
pub async fn metrics_endpoint(State(state): State<AppState>) -> String {
    state.prometheus_handle.render()
}

/// `GET /api/auth/me`
pub async fn me(Extension(user): Extension<UserProfile>) -> Json<MeResponse> {
    Json(MeResponse {
        success: true,
        user,
    })
}

/// `GET /api/data`
pub async fn get_data(
    State(state): State<AppState>,
    Query(query): Query<DataQuery>,
) -> Result<Json<DataResponse>, ApiError> {
    let filter = query.filters.to_filter_set()?;
    let page = Page::parse(query.limit.as_deref(), query.skip.as_deref())?;
    let result = run_query(&state, "data", move |store| store.find(&filter, page)).await?;
    tracing::debug!(
        returned = result.records.len(),
        total = result.total,
        "Served data page"
    );
    Ok(Json(DataResponse {
        success: true,
        count: result.records.len(),
        total: result.total,
        data: result.records.into_iter().map(RecordBody).collect(),
    }))
}

/// `GET /api/data/stats`
///
/// Always whole-store; filter parameters are ignored.
pub async fn get_stats(State(state): State<AppState>) -> Result<Json<StatsResponse>, ApiError> {
    let stats = run_query(&state, "stats", |store| store.stats()).await?;
    Ok(Json(StatsResponse {
        success: true,
        stats: StatsBody { stats },
    }))
}

/// `GET /api/data/filters`
pub async fn get_filters(State(state): State<AppState>) -> Result<Json<FiltersResponse>, ApiError> {
    let filters = run_query(&state, "filters", |store| store.filter_options()).await?;
    Ok(Json(FiltersResponse {
        success: true,
        filters,
    }))
}

/// `GET /api/data/grouped`
pub async fn get_grouped(
    State(state): State<AppState>,
    Query(query): Query<GroupedQuery>,
) -> Result<Json<GroupedResponse>, ApiError> {
    let group_by = query
        .group_by
        .filter(|g| !g.is_empty())
        .unwrap_or_else(|| config::DEFAULT_GROUP_BY.to_string());
    let field = group_by.clone();
    let data = run_query(&state, "grouped", move |store| store.grouped(&field)).await?;
    Ok(Json(GroupedResponse {
        success: true,
        group_by,
        data,
    }))
}
