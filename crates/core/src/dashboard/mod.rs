//! Client-side dashboard model: chart derivation, the ticketed view-model, and sessions.

/// Chart aggregates computed from a fetched page.
pub mod charts;
/// Authenticated session and user profile.
pub mod session;
/// View-model with stale-response protection.
pub mod view;

pub use charts::{ChartPoint, DashboardCharts, YearPoint};
pub use session::{Session, UserProfile};
pub use view::{DashboardView, LoadState, RequestTicket};
