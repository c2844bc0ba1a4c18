use pulseboard_core::storage::{load_store, parse_records, save_store};
use pulseboard_core::{Record, RecordStore};
use pulseboard_server::api::auth::{ApiKeyEntry, AuthConfig};
use pulseboard_server::api::create_router;
use pulseboard_server::api::handlers::AppState;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;

const TOKEN: &str = "test-token";

async fn spawn_app(store: RecordStore) -> String {
    let auth = AuthConfig::from_entries(vec![ApiKeyEntry {
        key: TOKEN.to_string(),
        name: "Analyst".to_string(),
        email: Some("analyst@example.com".to_string()),
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
    let base_url = format!("http://{}", addr);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    base_url
}

fn client() -> Client {
    Client::new()
}

fn store_from(json: Value) -> RecordStore {
    let store = RecordStore::new();
    store.insert_many(parse_records(&json.to_string()).unwrap());
    store
}

fn sample_store() -> RecordStore {
    store_from(json!([
        {"end_year": 2027, "intensity": 6, "likelihood": 3, "relevance": 2,
         "sector": "Energy", "topic": "oil", "region": "Northern America",
         "country": "United States of America", "pestle": "Industries",
         "source": "EIA", "city": ""},
        {"end_year": "", "intensity": 16, "likelihood": 2, "relevance": 4,
         "sector": "Energy", "topic": "gas", "region": "Asia",
         "country": "India", "pestle": "Economic", "source": "EIA"},
        {"end_year": 2018, "intensity": "", "likelihood": 4, "relevance": 3,
         "sector": "", "topic": "oil", "region": "Asia",
         "country": "India", "pestle": "Economic", "source": "Reuters"},
        {"end_year": 2040, "intensity": 2, "likelihood": 1,
         "sector": "Retail", "topic": "market", "region": "Europe",
         "country": "", "pestle": "Political", "source": "", "city": "Paris"}
    ]))
}

async fn get(base_url: &str, path: &str) -> reqwest::Response {
    client()
        .get(format!("{}{}", base_url, path))
        .header("Authorization", format!("Bearer {}", TOKEN))
        .send()
        .await
        .unwrap()
}

async fn get_json(base_url: &str, path: &str) -> Value {
    let resp = get(base_url, path).await;
    assert_eq!(resp.status(), StatusCode::OK, "GET {path}");
    resp.json().await.unwrap()
}

// ── Public endpoints ───────────────────────────────────────────────────

#[tokio::test]
async fn test_health_is_public() {
    let base_url = spawn_app(sample_store()).await;
    let resp = client()
        .get(format!("{}/api/health", base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key("x-request-id"));
    assert_eq!(resp.headers()["x-content-type-options"], "nosniff");
    assert_eq!(resp.headers()["x-frame-options"], "DENY");

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Server is running");
    assert_eq!(body["status"], "ok");
    assert_eq!(body["total_records"], 4);
}

#[tokio::test]
async fn test_metrics_is_public() {
    let base_url = spawn_app(sample_store()).await;
    let resp = client()
        .get(format!("{}/metrics", base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_cors_preflight_allows_dashboard_origin() {
    let base_url = spawn_app(sample_store()).await;
    let resp = client()
        .request(reqwest::Method::OPTIONS, format!("{}/api/data", base_url))
        .header("Origin", "http://localhost:5173")
        .header("Access-Control-Request-Method", "GET")
        .header("Access-Control-Request-Headers", "authorization")
        .send()
        .await
        .unwrap();
    assert_eq!(
        resp.headers()["access-control-allow-origin"],
        "http://localhost:5173"
    );
    assert_eq!(resp.headers()["access-control-allow-credentials"], "true");
}

// ── Auth guard ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_missing_token_rejected() {
    let base_url = spawn_app(sample_store()).await;
    for path in [
        "/api/data",
        "/api/data/stats",
        "/api/data/filters",
        "/api/data/grouped",
        "/api/auth/me",
    ] {
        let resp = client()
            .get(format!("{}{}", base_url, path))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "GET {path}");
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["success"], false);
    }
}

#[tokio::test]
async fn test_wrong_token_rejected() {
    let base_url = spawn_app(sample_store()).await;
    let resp = client()
        .get(format!("{}/api/data", base_url))
        .header("Authorization", "Bearer nope")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Not authorized, token failed");
}

#[tokio::test]
async fn test_non_bearer_scheme_rejected() {
    let base_url = spawn_app(sample_store()).await;
    let resp = client()
        .get(format!("{}/api/data", base_url))
        .header("Authorization", format!("Basic {}", TOKEN))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_me_returns_profile() {
    let base_url = spawn_app(sample_store()).await;
    let body = get_json(&base_url, "/api/auth/me").await;
    assert_eq!(body["success"], true);
    assert_eq!(body["user"]["name"], "Analyst");
    assert_eq!(body["user"]["email"], "analyst@example.com");
}

// ── /api/data ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_data_unfiltered() {
    let base_url = spawn_app(sample_store()).await;
    let body = get_json(&base_url, "/api/data").await;
    assert_eq!(body["success"], true);
    assert_eq!(body["count"], 4);
    assert_eq!(body["total"], 4);
    let data = body["data"].as_array().unwrap();
    assert!(data[0]["_id"].is_string());
    assert_eq!(data[0]["country"], "United States of America");
    assert!(data[1].get("end_year").is_none());
    assert!(data[1].get("url").is_none());
}

#[tokio::test]
async fn test_data_filter_returns_only_matches() {
    let base_url = spawn_app(sample_store()).await;
    let body = get_json(&base_url, "/api/data?country=India&topics=oil").await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["total"], 1);
    assert_eq!(body["data"][0]["end_year"], 2018);
}

#[tokio::test]
async fn test_data_end_year_filter() {
    let base_url = spawn_app(sample_store()).await;
    let body = get_json(&base_url, "/api/data?end_year=2040").await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["data"][0]["city"], "Paris");
}

#[tokio::test]
async fn test_data_empty_params_ignored() {
    let base_url = spawn_app(sample_store()).await;
    let body = get_json(&base_url, "/api/data?sector=&country=&end_year=").await;
    assert_eq!(body["total"], 4);
}

#[tokio::test]
async fn test_data_total_ignores_pagination() {
    let base_url = spawn_app(sample_store()).await;
    let body = get_json(&base_url, "/api/data?sector=Energy&limit=1&skip=1").await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["total"], 2);
    assert_eq!(body["data"][0]["country"], "India");
}

#[tokio::test]
async fn test_data_zero_match() {
    let base_url = spawn_app(sample_store()).await;
    let body = get_json(&base_url, "/api/data?country=Atlantis").await;
    assert_eq!(
        body,
        json!({"success": true, "count": 0, "total": 0, "data": []})
    );
}

#[tokio::test]
async fn test_data_bad_parameters_rejected() {
    let base_url = spawn_app(sample_store()).await;
    for path in [
        "/api/data?end_year=soon",
        "/api/data?limit=abc",
        "/api/data?limit=0",
        "/api/data?skip=-1",
    ] {
        let resp = get(&base_url, path).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "GET {path}");
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["success"], false);
        assert!(body["message"].is_string());
    }
}

// ── /api/data/stats ────────────────────────────────────────────────────

#[tokio::test]
async fn test_stats_whole_store() {
    let base_url = spawn_app(sample_store()).await;
    let body = get_json(&base_url, "/api/data/stats?country=India").await;
    let stats = &body["stats"];
    assert_eq!(stats["totalRecords"], 4);
    assert_eq!(stats["avgIntensity"], 8.0);
    assert_eq!(stats["avgLikelihood"], 2.5);
    assert_eq!(stats["avgRelevance"], 3.0);
    assert_eq!(stats["minYear"], 2018);
    assert_eq!(stats["maxYear"], 2040);
}

#[tokio::test]
async fn test_stats_empty_store() {
    let base_url = spawn_app(RecordStore::new()).await;
    let body = get_json(&base_url, "/api/data/stats").await;
    assert_eq!(body, json!({"success": true, "stats": {}}));
}

// ── /api/data/filters ──────────────────────────────────────────────────

#[tokio::test]
async fn test_filters_clean_and_sorted() {
    let base_url = spawn_app(sample_store()).await;
    let body = get_json(&base_url, "/api/data/filters").await;
    let filters = &body["filters"];
    assert_eq!(filters["endYears"], json!([2040, 2027, 2018]));
    assert_eq!(filters["sectors"], json!(["Energy", "Retail"]));
    assert_eq!(filters["cities"], json!(["Paris"]));
    assert_eq!(filters["sources"], json!(["EIA", "Reuters"]));
    for key in [
        "sectors", "regions", "pestles", "sources", "countries", "cities", "topics",
    ] {
        for value in filters[key].as_array().unwrap() {
            assert!(value.as_str().is_some_and(|s| !s.is_empty()), "{key}");
        }
    }
}

// ── /api/data/grouped ──────────────────────────────────────────────────

#[tokio::test]
async fn test_grouped_by_sector() {
    let base_url = spawn_app(sample_store()).await;
    let body = get_json(&base_url, "/api/data/grouped?groupBy=sector").await;
    assert_eq!(body["groupBy"], "sector");
    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 2);
    assert_eq!(data[0]["_id"], "Energy");
    assert_eq!(data[0]["count"], 2);
    assert_eq!(data[0]["avgIntensity"], 11.0);
    assert_eq!(data[1]["_id"], "Retail");
    assert!(data[1]["avgRelevance"].is_null());
}

#[tokio::test]
async fn test_grouped_defaults_to_country() {
    let base_url = spawn_app(sample_store()).await;
    let body = get_json(&base_url, "/api/data/grouped").await;
    assert_eq!(body["groupBy"], "country");
    assert_eq!(body["data"][0]["_id"], "India");
    assert_eq!(body["data"][0]["count"], 2);
}

#[tokio::test]
async fn test_grouped_capped_at_twenty() {
    let records: Vec<Value> = (0..45)
        .map(|i| json!({"sector": format!("S{}", i % 30), "intensity": i}))
        .collect();
    let base_url = spawn_app(store_from(Value::Array(records))).await;
    let body = get_json(&base_url, "/api/data/grouped?groupBy=sector").await;
    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 20);
    let counts: Vec<u64> = data.iter().map(|g| g["count"].as_u64().unwrap()).collect();
    assert!(counts.windows(2).all(|w| w[0] >= w[1]));
}

#[tokio::test]
async fn test_grouped_unknown_field_is_empty() {
    let base_url = spawn_app(sample_store()).await;
    let body = get_json(&base_url, "/api/data/grouped?groupBy=planet").await;
    assert_eq!(body["data"], json!([]));
}

// ── Import round trip ──────────────────────────────────────────────────

#[tokio::test]
async fn test_imported_snapshot_served_in_full() {
    let tmp_dir = TempDir::new().unwrap();
    let records: Vec<Record> = (0..137)
        .map(|i| Record {
            end_year: Some(2016 + i % 10),
            ..Record::default()
        })
        .collect();
    let store = RecordStore::new();
    store.insert_many(records);
    save_store(&store, tmp_dir.path()).unwrap();

    let base_url = spawn_app(load_store(tmp_dir.path()).unwrap()).await;
    let body = get_json(&base_url, "/api/data?limit=10").await;
    assert_eq!(body["total"], 137);
    assert_eq!(body["count"], 10);
}

// ── Overload ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_burst_over_rate_limit_is_shed_with_429() {
    use pulseboard_core::config::{MAX_QUEUED_REQUESTS, RATE_LIMIT_RPS};

    let base_url = spawn_app(sample_store()).await;
    let http = client();
    let burst = RATE_LIMIT_RPS as usize + 4 * MAX_QUEUED_REQUESTS;

    let handles: Vec<_> = (0..burst)
        .map(|_| {
            let http = http.clone();
            let url = format!("{}/api/health", base_url);
            tokio::spawn(async move { http.get(url).send().await.unwrap().status() })
        })
        .collect();

    let (mut ok, mut shed) = (0, 0);
    for handle in handles {
        match handle.await.unwrap() {
            StatusCode::OK => ok += 1,
            StatusCode::TOO_MANY_REQUESTS => shed += 1,
            other => panic!("unexpected status {other}"),
        }
    }
    assert!(ok >= 1, "ok={ok} shed={shed}");
    assert!(shed >= 1, "ok={ok} shed={shed}");
}
