//! End-to-end tests against an in-process mock of the scan service

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use caselink_common::{
    CaseLinkError, ConfigUpdate, PanelState, ScanClient, StartScanRequest,
};
use caselinkctl::actions::{shared_tracker, Controller, PanelEvent};
use caselinkctl::errors::{exit_code, EXIT_SCAN_BUSY};
use caselinkctl::poller::StatusPoller;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

#[derive(Default)]
struct MockService {
    stage: String,
    config: Map<String, Value>,
    results: Option<Value>,
    starts: Vec<Value>,
}

type Shared = Arc<Mutex<MockService>>;
type Reply = (StatusCode, Json<Value>);

fn ok(body: Value) -> Reply {
    (StatusCode::OK, Json(body))
}

fn detail(status: StatusCode, message: &str) -> Reply {
    (status, Json(json!({ "detail": message })))
}

async fn status(State(svc): State<Shared>) -> Reply {
    let svc = svc.lock().unwrap();
    ok(json!({ "stage": svc.stage }))
}

async fn start(State(svc): State<Shared>, Json(body): Json<Value>) -> Reply {
    let mut svc = svc.lock().unwrap();
    if svc.stage != "Idle" {
        return detail(StatusCode::CONFLICT, "Scan already running");
    }
    svc.stage = "Scanning".into();
    svc.starts.push(body);
    ok(json!({ "status": "started" }))
}

async fn results(State(svc): State<Shared>) -> Reply {
    let svc = svc.lock().unwrap();
    match &svc.results {
        Some(results) => ok(results.clone()),
        None => detail(StatusCode::NOT_FOUND, "No results yet"),
    }
}

async fn get_config(State(svc): State<Shared>) -> Reply {
    ok(Value::Object(svc.lock().unwrap().config.clone()))
}

async fn set_config(State(svc): State<Shared>, Json(body): Json<Map<String, Value>>) -> Reply {
    let mut svc = svc.lock().unwrap();
    // null leaves the stored value alone
    for (key, value) in body {
        if !value.is_null() {
            svc.config.insert(key, value);
        }
    }
    ok(Value::Object(svc.config.clone()))
}

async fn procedure(Query(params): Query<HashMap<String, String>>) -> Reply {
    let csv = params.get("csv_path").cloned().unwrap_or_default();
    if csv == "missing.csv" {
        return ok(json!({ "ok": false, "error": "CSV not found" }));
    }
    ok(json!({
        "ok": true,
        "coverage": { "Year": [10, 10], "MSA": [9, 10] },
        "notes": [format!("checked {}", csv)],
        "total_sampled": params.get("sample_limit").and_then(|s| s.parse::<u64>().ok()).unwrap_or(10)
    }))
}

async fn case(Path(id): Path<String>) -> Reply {
    if id == "case 1" {
        ok(json!({ "ID": "case 1", "Year": 1999, "Solved": "No" }))
    } else {
        detail(StatusCode::NOT_FOUND, "Case not found")
    }
}

async fn spawn_service(svc: Shared) -> ScanClient {
    let app = Router::new()
        .route("/scan/status", get(status))
        .route("/scan/start", axum::routing::post(start))
        .route("/scan/results", get(results))
        .route("/config", get(get_config).post(set_config))
        .route("/test/procedure", get(procedure))
        .route("/case/:id", get(case))
        .with_state(svc);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    ScanClient::new(&format!("http://{}", addr), Duration::from_secs(5)).unwrap()
}

fn idle_service() -> Shared {
    let mut config = Map::new();
    config.insert("csv_path".into(), json!("data/SHR65_23.csv"));
    config.insert("similarity_threshold".into(), json!(0.7));
    config.insert("year_window".into(), json!(5));
    config.insert("geo_window".into(), Value::Null);
    config.insert("sample_limit".into(), json!(64));
    Arc::new(Mutex::new(MockService {
        stage: "Idle".into(),
        config,
        ..Default::default()
    }))
}

async fn next_event(rx: &mut mpsc::Receiver<PanelEvent>) -> PanelEvent {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("no event within 5s")
        .expect("channel closed")
}

#[tokio::test]
async fn config_save_is_echoed_back() {
    let client = spawn_service(idle_service()).await;

    let stored = client
        .set_config(&ConfigUpdate {
            csv_path: Some("other.csv".into()),
            similarity_threshold: Some(0.85),
            year_window: Some(3),
            geo_window: None,
            sample_limit: None,
        })
        .await
        .unwrap();

    assert_eq!(stored.csv_path.as_deref(), Some("other.csv"));
    assert_eq!(stored.similarity_threshold, Some(0.85));
    assert_eq!(stored.year_window, Some(3));
    assert_eq!(stored.sample_limit, Some(64));
    assert_eq!(client.get_config().await.unwrap(), stored);
}

#[tokio::test]
async fn second_start_is_busy() {
    let svc = idle_service();
    let client = spawn_service(svc.clone()).await;

    let ack = client.start_scan(&StartScanRequest::default()).await.unwrap();
    assert_eq!(ack.status.as_deref(), Some("started"));
    assert_eq!(svc.lock().unwrap().starts[0]["geo_window"], Value::Null);

    let err = client
        .start_scan(&StartScanRequest::default())
        .await
        .unwrap_err();
    assert!(matches!(&err, CaseLinkError::Busy(msg) if msg == "Scan already running"));
    assert_eq!(exit_code(&anyhow::Error::new(err)), EXIT_SCAN_BUSY);

    assert_eq!(client.status().await.unwrap().stage, "Scanning");
}

#[tokio::test]
async fn missing_results_and_cases_are_not_found() {
    let client = spawn_service(idle_service()).await;

    assert!(matches!(
        client.results(None).await,
        Err(CaseLinkError::NotFound(_))
    ));
    assert!(matches!(
        client.case("nope").await,
        Err(CaseLinkError::NotFound(_))
    ));

    let record = client.case("case 1").await.unwrap();
    assert_eq!(record["Year"], json!(1999));
}

#[tokio::test]
async fn procedure_query_reaches_service() {
    let client = spawn_service(idle_service()).await;

    let report = client
        .test_procedure(Some("cases.csv"), Some(25))
        .await
        .unwrap();
    assert!(report.ok);
    assert_eq!(report.total_sampled, Some(25));
    assert_eq!(report.notes, Some(vec!["checked cases.csv".to_string()]));

    let failed = client.test_procedure(Some("missing.csv"), None).await.unwrap();
    assert!(!failed.ok);
    assert_eq!(failed.error.as_deref(), Some("CSV not found"));
}

#[tokio::test]
async fn panel_loads_config_and_saves_edits() {
    let client = spawn_service(idle_service()).await;
    let tracker = shared_tracker();
    let (tx, mut rx) = mpsc::channel(8);
    let mut controller = Controller::new(client, tracker, tx, 0.02);
    let mut state = PanelState::default();

    controller.load_config();
    let event = next_event(&mut rx).await;
    assert!(controller.apply(&mut state, event));
    assert_eq!(state.csv_path, "data/SHR65_23.csv");
    assert_eq!(state.geo_window, "");

    state.threshold = "0.9".into();
    state.geo_window = "2".into();
    controller.save_config(&mut state);
    let event = next_event(&mut rx).await;
    assert!(controller.apply(&mut state, event));
    assert_eq!(state.threshold, "0.9");
    assert_eq!(state.geo_window, "2");
    assert_eq!(state.notice.as_deref(), Some("Config saved"));
    assert!(state.last_error.is_none());
}

#[tokio::test]
async fn start_clears_results_then_fetch_fills_heatmap() {
    let svc = idle_service();
    svc.lock().unwrap().results = Some(json!({
        "matrix": [[1.0, 0.8], [0.8, 1.0]],
        "labels": ["a", "b"],
        "top_clusters": [{ "size": 2, "nodes": ["a", "b"] }],
        "threshold": 0.7,
        "year_window": 5,
        "geo_window": null
    }));
    let client = spawn_service(svc).await;
    let (tx, mut rx) = mpsc::channel(8);
    let mut controller = Controller::new(client, shared_tracker(), tx, 0.02);
    let mut state = PanelState::default();

    controller.fetch_results();
    let event = next_event(&mut rx).await;
    assert!(controller.apply(&mut state, event));
    assert_eq!(state.heatmap().dimension(), 2);
    assert_eq!(state.cluster_list().header(), "Clusters: 1");

    controller.start_scan(&mut state);
    let event = next_event(&mut rx).await;
    assert!(controller.apply(&mut state, event));
    assert!(state.results.is_none());
    assert_eq!(state.notice.as_deref(), Some("Scan started"));

    // Already scanning
    controller.start_scan(&mut state);
    let event = next_event(&mut rx).await;
    assert!(controller.apply(&mut state, event));
    assert!(state
        .last_error
        .as_deref()
        .is_some_and(|e| e.contains("Scan already running")));
}

#[tokio::test]
async fn older_status_refresh_is_dropped() {
    let client = spawn_service(idle_service()).await;
    let (tx, mut rx) = mpsc::channel(8);
    let mut controller = Controller::new(client, shared_tracker(), tx, 0.02);
    let mut state = PanelState::default();

    controller.refresh_status();
    controller.refresh_status();

    let first = next_event(&mut rx).await;
    let second = next_event(&mut rx).await;
    let (older, newer) = if first.ticket().seq < second.ticket().seq {
        (first, second)
    } else {
        (second, first)
    };

    assert!(controller.apply(&mut state, newer));
    assert!(!controller.apply(&mut state, older));
}

#[tokio::test]
async fn poller_reports_service_stage() {
    let svc = idle_service();
    svc.lock().unwrap().stage = "Scanning".into();
    let client = spawn_service(svc.clone()).await;
    let tracker = shared_tracker();
    let (tx, mut rx) = mpsc::channel(8);
    let mut state = PanelState::default();

    let poller = StatusPoller::spawn(client, Duration::from_millis(100), tracker.clone(), tx);
    let event = next_event(&mut rx).await;
    assert!(caselinkctl::actions::apply_event(&tracker, &mut state, event));
    assert_eq!(state.status.stage, "Scanning");

    svc.lock().unwrap().stage = "Idle".into();
    loop {
        let event = next_event(&mut rx).await;
        caselinkctl::actions::apply_event(&tracker, &mut state, event);
        if state.status.is_idle() {
            break;
        }
    }
    assert!(poller.is_running());
}

#[tokio::test]
async fn invalid_form_never_reaches_service() {
    let svc = idle_service();
    let client = spawn_service(svc.clone()).await;
    let (tx, _rx) = mpsc::channel(8);
    let mut controller = Controller::new(client, shared_tracker(), tx, 0.02);
    let mut state = PanelState::default();
    state.year_window = "".into();

    controller.start_scan(&mut state);
    assert_eq!(controller.pending(), 0);
    assert!(state.last_error.is_some());
    assert!(svc.lock().unwrap().starts.is_empty());
}
