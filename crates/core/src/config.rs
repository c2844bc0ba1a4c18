//! Global configuration constants for pulseboard.
//!
//! Query limits, chart sizes, and server defaults are defined here.
//! These are compile-time constants; runtime configuration is handled via CLI arguments
//! and environment variables in the server's `main.rs`.

/// Default page size for `GET /api/data` when `limit` is not supplied.
pub const DEFAULT_PAGE_LIMIT: usize = 1_000;

/// Largest accepted `limit` for a single page of records.
pub const MAX_PAGE_LIMIT: usize = 100_000;

/// Maximum number of groups returned by the grouped-aggregation endpoint.
pub const GROUPED_RESULT_LIMIT: usize = 20;

/// Field grouped on when `groupBy` is absent or empty.
pub const DEFAULT_GROUP_BY: &str = "country";

/// Bars shown in the intensity-by-country chart.
pub const INTENSITY_CHART_TOP: usize = 10;

/// Slices shown in the likelihood-by-topic chart.
pub const LIKELIHOOD_CHART_TOP: usize = 8;

/// Slices shown in the sector distribution chart.
pub const SECTOR_CHART_TOP: usize = 10;

/// Bars shown in the city distribution chart.
pub const CITY_CHART_TOP: usize = 8;

/// Chart labels longer than this many characters are cut and suffixed with `...`.
pub const CHART_LABEL_MAX_CHARS: usize = 15;

/// Default HTTP server port.
pub const DEFAULT_PORT: u16 = 5000;

/// Default directory for the record snapshot.
pub const DEFAULT_DATA_DIR: &str = "./data";

/// File name of the record snapshot inside the data directory.
pub const SNAPSHOT_FILE_NAME: &str = "records.pbs";

/// Browser origin allowed by CORS when `PULSEBOARD_CORS_ORIGINS` is unset.
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5173";

/// Per-request timeout in seconds.
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Rate limit per route, in requests per second.
pub const RATE_LIMIT_RPS: u64 = 200;

/// Maximum HTTP request body size in bytes (1 MB). The API is read-only.
pub const MAX_REQUEST_BODY_BYTES: usize = 1024 * 1024;

/// Maximum number of concurrent in-flight requests.
pub const MAX_CONCURRENT_REQUESTS: usize = 512;

/// Requests allowed to wait for a rate-limit or concurrency slot before
/// further ones are shed with 429.
pub const MAX_QUEUED_REQUESTS: usize = 32;

/// Default graceful shutdown timeout in seconds.
pub const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 30;

/// Interval between refreshes of the store gauges, in seconds.
pub const METRICS_REFRESH_SECS: u64 = 15;
