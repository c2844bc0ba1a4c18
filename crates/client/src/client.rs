//! Typed calls against the pulseboard API and the view-model refresh flow.

use crate::error::ClientError;
use parking_lot::Mutex;
use pulseboard_core::aggregate::{FilterOptions, GlobalStats, GroupStats};
use pulseboard_core::dashboard::{DashboardView, RequestTicket, Session, UserProfile};
use pulseboard_core::{FilterKey, FilterParams, Page, Record};
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};

/// One page of `GET /api/data`.
#[derive(Debug, Clone, Deserialize)]
pub struct DataPage {
    pub count: usize,
    pub total: usize,
    #[serde(rename = "data")]
    pub records: Vec<Record>,
}

/// Result of `GET /api/data/grouped`.
#[derive(Debug, Clone, Deserialize)]
pub struct GroupedPage {
    #[serde(rename = "groupBy")]
    pub group_by: String,
    #[serde(rename = "data")]
    pub groups: Vec<GroupStats>,
}

/// Body of `GET /api/health`.
#[derive(Debug, Clone, Deserialize)]
pub struct Health {
    pub message: String,
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub total_records: usize,
}

#[derive(Deserialize)]
struct MeEnvelope {
    user: UserProfile,
}

#[derive(Deserialize)]
struct StatsEnvelope {
    stats: Map<String, Value>,
}

#[derive(Deserialize)]
struct FiltersEnvelope {
    filters: FilterOptions,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Client bound to one server and one authenticated session.
#[derive(Debug, Clone)]
pub struct DashboardClient {
    http: reqwest::Client,
    base_url: String,
    session: Session,
}

impl DashboardClient {
    /// Validates `token` against `GET /api/auth/me` and returns a client
    /// holding the resulting session.
    pub async fn connect(base_url: &str, token: &str) -> Result<Self, ClientError> {
        Self::connect_with(reqwest::Client::new(), base_url, token).await
    }

    /// Like [`DashboardClient::connect`], reusing an existing `reqwest::Client`.
    pub async fn connect_with(
        http: reqwest::Client,
        base_url: &str,
        token: &str,
    ) -> Result<Self, ClientError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        let req = http
            .get(format!("{}/api/auth/me", base_url))
            .bearer_auth(token);
        let me: MeEnvelope = send(req).await?;
        tracing::info!(user = %me.user.name, "Signed in");
        Ok(Self {
            http,
            base_url,
            session: Session::new(token, me.user),
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.http
            .get(format!("{}{}", self.base_url, path))
            .bearer_auth(self.session.token())
    }

    /// `GET /api/health` (unauthenticated).
    pub async fn health(&self) -> Result<Health, ClientError> {
        send(self.http.get(format!("{}/api/health", self.base_url))).await
    }

    /// `GET /api/data/filters`
    pub async fn filters(&self) -> Result<FilterOptions, ClientError> {
        let body: FiltersEnvelope = send(self.get("/api/data/filters")).await?;
        Ok(body.filters)
    }

    /// `GET /api/data` with the given filters and window.
    pub async fn data(&self, filters: &FilterParams, page: Page) -> Result<DataPage, ClientError> {
        let window = [
            ("limit", page.limit.to_string()),
            ("skip", page.skip.to_string()),
        ];
        send(self.get("/api/data").query(filters).query(&window)).await
    }

    /// `GET /api/data/stats`. `None` when the store is empty.
    pub async fn stats(&self) -> Result<Option<GlobalStats>, ClientError> {
        let body: StatsEnvelope = send(self.get("/api/data/stats")).await?;
        if body.stats.is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_value(Value::Object(body.stats))?))
    }

    /// `GET /api/data/grouped?groupBy=<field>`
    pub async fn grouped(&self, group_by: &str) -> Result<GroupedPage, ClientError> {
        send(self.get("/api/data/grouped").query(&[("groupBy", group_by)])).await
    }

    /// Fetches one default-sized page for `filters` together with the
    /// whole-store statistics, concurrently.
    pub async fn fetch_page(
        &self,
        filters: &FilterParams,
    ) -> Result<(DataPage, Option<GlobalStats>), ClientError> {
        tokio::try_join!(self.data(filters, Page::default()), self.stats())
    }

    /// Loads the filter vocabularies into `view`.
    pub async fn load_options(&self, view: &Mutex<DashboardView>) -> Result<(), ClientError> {
        let options = self.filters().await?;
        view.lock().apply_options(options);
        Ok(())
    }

    /// Refreshes `view` with its current filters.
    ///
    /// Returns `Ok(false)` when a newer refresh was started while this one was
    /// in flight; its response is then discarded.
    pub async fn refresh(&self, view: &Mutex<DashboardView>) -> Result<bool, ClientError> {
        let (ticket, filters) = {
            let mut view = view.lock();
            let ticket = view.begin_refresh();
            (ticket, view.filters().clone())
        };
        self.complete(view, ticket, &filters).await
    }

    /// Changes one filter on `view` and refreshes it.
    pub async fn set_filter(
        &self,
        view: &Mutex<DashboardView>,
        key: FilterKey,
        value: &str,
    ) -> Result<bool, ClientError> {
        let (ticket, filters) = {
            let mut view = view.lock();
            let ticket = view.set_filter(key, value);
            (ticket, view.filters().clone())
        };
        self.complete(view, ticket, &filters).await
    }

    /// Initial load: vocabularies and the first page, concurrently.
    pub async fn mount(&self, view: &Mutex<DashboardView>) -> Result<(), ClientError> {
        tokio::try_join!(self.load_options(view), self.refresh(view))?;
        Ok(())
    }

    async fn complete(
        &self,
        view: &Mutex<DashboardView>,
        ticket: RequestTicket,
        filters: &FilterParams,
    ) -> Result<bool, ClientError> {
        match self.fetch_page(filters).await {
            Ok((page, stats)) => Ok(view.lock().apply_page(ticket, page.records, stats)),
            Err(e) => {
                view.lock().apply_failure(ticket, &e);
                Err(e)
            }
        }
    }
}

async fn send<T: DeserializeOwned>(req: RequestBuilder) -> Result<T, ClientError> {
    let resp = req.send().await?;
    let status = resp.status();
    if status.is_success() {
        return Ok(resp.json().await?);
    }
    let message = resp
        .json::<ErrorBody>()
        .await
        .ok()
        .and_then(|b| b.message)
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown").to_string());
    tracing::debug!(status = status.as_u16(), %message, "Request rejected");
    if status == StatusCode::UNAUTHORIZED {
        return Err(ClientError::Unauthorized(message));
    }
    Err(ClientError::Status {
        status: status.as_u16(),
        message,
    })
}
