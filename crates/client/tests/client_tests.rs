use parking_lot::Mutex;
use pulseboard_client::{ClientError, DashboardClient};
use pulseboard_core::dashboard::{DashboardView, LoadState};
use pulseboard_core::storage::parse_records;
use pulseboard_core::{FilterKey, FilterParams, Page, RecordStore};
use pulseboard_server::api::auth::{ApiKeyEntry, AuthConfig};
use pulseboard_server::api::create_router;
use pulseboard_server::api::handlers::AppState;
use serde_json::json;
use std::sync::Arc;

const TOKEN: &str = "client-token";

async fn spawn_app(store: RecordStore) -> String {
    let auth = AuthConfig::from_entries(vec![ApiKeyEntry {
        key: TOKEN.to_string(),
        name: "Dashboard".to_string(),
        email: None,
    }]);
    let prometheus_handle =
        match metrics_exporter_prometheus::PrometheusBuilder::new().install_recorder() {
            Ok(handle) => handle,
            Err(_) => metrics_exporter_prometheus::PrometheusBuilder::new()
                .build_recorder()
                .handle(),
        };
    let state = AppState {
        store,
        auth: Arc::new(auth),
        prometheus_handle,
        allowed_origins: vec!["http://localhost:5173".to_string()],
        start_time: std::time::Instant::now(),
    };

    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn sample_store() -> RecordStore {
    let json = json!([
        {"end_year": 2030, "intensity": 40, "likelihood": 3, "relevance": 2,
         "country": "USA", "sector": "Energy", "topic": "oil", "region": "Americas", "city": "Austin"},
        {"end_year": 2030, "intensity": 60, "likelihood": 1, "relevance": 4,
         "country": "USA", "sector": "Energy", "topic": "gas", "region": "Americas"},
        {"end_year": 2020, "intensity": 50, "likelihood": 2, "relevance": 3,
         "country": "UK", "sector": "Retail", "topic": "oil", "region": "Europe", "city": "Leeds"}
    ]);
    let store = RecordStore::new();
    store.insert_many(parse_records(&json.to_string()).unwrap());
    store
}

#[tokio::test]
async fn test_connect_establishes_session() {
    let base_url = spawn_app(sample_store()).await;
    let client = DashboardClient::connect(&base_url, TOKEN).await.unwrap();
    assert_eq!(client.session().user().name, "Dashboard");
    assert_eq!(client.session().token(), TOKEN);
}

#[tokio::test]
async fn test_connect_with_bad_token_fails() {
    let base_url = spawn_app(sample_store()).await;
    let err = DashboardClient::connect(&base_url, "wrong").await.unwrap_err();
    assert!(matches!(err, ClientError::Unauthorized(_)), "{err}");
}

#[tokio::test]
async fn test_typed_endpoints() {
    let base_url = spawn_app(sample_store()).await;
    let client = DashboardClient::connect(&base_url, TOKEN).await.unwrap();

    let health = client.health().await.unwrap();
    assert_eq!(health.total_records, 3);

    let filters = client.filters().await.unwrap();
    assert_eq!(filters.end_years, vec![2030, 2020]);
    assert_eq!(filters.countries, vec!["USA", "UK"]);

    let mut params = FilterParams::default();
    params.set(FilterKey::Country, "USA");
    let page = client
        .data(&params, Page { limit: 1, skip: 0 })
        .await
        .unwrap();
    assert_eq!(page.count, 1);
    assert_eq!(page.total, 2);

    let stats = client.stats().await.unwrap().unwrap();
    assert_eq!(stats.total_records, 3);
    assert_eq!(stats.avg_intensity, Some(50.0));

    let grouped = client.grouped("sector").await.unwrap();
    assert_eq!(grouped.group_by, "sector");
    assert_eq!(grouped.groups[0].count, 2);
}

#[tokio::test]
async fn test_stats_none_for_empty_store() {
    let base_url = spawn_app(RecordStore::new()).await;
    let client = DashboardClient::connect(&base_url, TOKEN).await.unwrap();
    assert_eq!(client.stats().await.unwrap(), None);
}

#[tokio::test]
async fn test_bad_filter_reports_server_message() {
    let base_url = spawn_app(sample_store()).await;
    let client = DashboardClient::connect(&base_url, TOKEN).await.unwrap();
    let mut params = FilterParams::default();
    params.set(FilterKey::EndYear, "someday");
    match client.data(&params, Page::default()).await.unwrap_err() {
        ClientError::Status { status, message } => {
            assert_eq!(status, 400);
            assert!(message.contains("end_year"), "{message}");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_mount_populates_view() {
    let base_url = spawn_app(sample_store()).await;
    let client = DashboardClient::connect(&base_url, TOKEN).await.unwrap();
    let view = Mutex::new(DashboardView::new());
    assert!(view.lock().shows_spinner());

    client.mount(&view).await.unwrap();

    let view = view.lock();
    assert_eq!(view.state(), LoadState::Ready);
    assert!(!view.shows_spinner());
    assert_eq!(view.records().len(), 3);
    assert_eq!(view.options().sectors, vec!["Energy", "Retail"]);
    let chart: Vec<(&str, f64)> = view
        .charts()
        .intensity_by_country
        .iter()
        .map(|p| (p.name.as_str(), p.value))
        .collect();
    assert_eq!(chart, vec![("USA", 50.0), ("UK", 50.0)]);
    assert_eq!(view.stats().unwrap().total_records, 3);
}

#[tokio::test]
async fn test_set_filter_refetches() {
    let base_url = spawn_app(sample_store()).await;
    let client = DashboardClient::connect(&base_url, TOKEN).await.unwrap();
    let view = Mutex::new(DashboardView::new());
    client.mount(&view).await.unwrap();

    assert!(client
        .set_filter(&view, FilterKey::Country, "UK")
        .await
        .unwrap());
    let view = view.lock();
    assert_eq!(view.records().len(), 1);
    assert_eq!(view.charts().city_distribution[0].name, "Leeds");
    // Stats stay whole-store.
    assert_eq!(view.stats().unwrap().total_records, 3);
}

#[tokio::test]
async fn test_stale_response_is_discarded() {
    let base_url = spawn_app(sample_store()).await;
    let client = DashboardClient::connect(&base_url, TOKEN).await.unwrap();
    let view = Mutex::new(DashboardView::new());

    let (stale_ticket, stale_filters) = {
        let mut v = view.lock();
        let ticket = v.set_filter(FilterKey::Country, "UK");
        (ticket, v.filters().clone())
    };
    assert!(client
        .set_filter(&view, FilterKey::Country, "USA")
        .await
        .unwrap());

    let (page, stats) = client.fetch_page(&stale_filters).await.unwrap();
    assert!(!view.lock().apply_page(stale_ticket, page.records, stats));

    let view = view.lock();
    assert_eq!(view.records().len(), 2);
    assert!(view
        .records()
        .iter()
        .all(|r| r.country.as_deref() == Some("USA")));
}

#[tokio::test]
async fn test_failed_refresh_keeps_previous_data() {
    let base_url = spawn_app(sample_store()).await;
    let client = DashboardClient::connect(&base_url, TOKEN).await.unwrap();
    let view = Mutex::new(DashboardView::new());
    client.mount(&view).await.unwrap();

    assert!(client
        .set_filter(&view, FilterKey::EndYear, "not-a-year")
        .await
        .is_err());
    let view = view.lock();
    assert_eq!(view.state(), LoadState::Ready);
    assert_eq!(view.records().len(), 3);
}
