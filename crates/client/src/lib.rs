//! # pulseboard-client
//!
//! Async HTTP client for the pulseboard API. [`DashboardClient`] owns an
//! explicit [`Session`](pulseboard_core::dashboard::Session) and feeds
//! responses into a [`DashboardView`](pulseboard_core::dashboard::DashboardView),
//! discarding responses that arrive after a newer refresh was started.

/// The HTTP client and its typed endpoint calls.
pub mod client;
/// Client error type.
pub mod error;

pub use client::{DashboardClient, DataPage, GroupedPage, Health};
pub use error::ClientError;
