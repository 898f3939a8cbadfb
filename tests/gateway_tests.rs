//! Integration tests for the telemetry gateway.
//!
//! Each test runs the real router against mock backing stores listening on
//! ephemeral local ports, so the full path - parameter validation, outbound
//! call, response normalization - is exercised end to end.

use axum::body::Body;
use axum::extract::Query;
use axum::http::{Request, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use telegate::{create_router, AppState, Config};

/// Starts a mock backing store and returns its base URL.
async fn spawn_backend(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

/// Returns a base URL pointing at a port nothing listens on.
async fn unreachable_backend() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

/// Builds a gateway router wired to the given store URLs.
fn gateway(prometheus: &str, jaeger: &str, elasticsearch: &str) -> Router {
    let config = Config {
        prometheus_url: prometheus.to_string(),
        jaeger_url: jaeger.to_string(),
        elasticsearch_url: elasticsearch.to_string(),
        upstream_timeout: Duration::from_secs(2),
        ..Config::default()
    };
    create_router(AppState::from_config(&config).unwrap())
}

/// Sends a GET request through the router and returns status + JSON body.
async fn request(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = tower::ServiceExt::oneshot(
        app,
        Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap();

    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

// ============================================================================
// HEALTH
// ============================================================================

#[tokio::test]
async fn health_reports_up_without_backends() {
    let app = gateway("http://127.0.0.1:1", "http://127.0.0.1:1", "http://127.0.0.1:1");
    let (status, body) = request(app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "UP"}));
}

// ============================================================================
// METRICS
// ============================================================================

fn prometheus_mock(response: Value, hits: Arc<AtomicUsize>) -> Router {
    Router::new().route(
        "/api/v1/query_range",
        get(move || {
            let hits = hits.clone();
            let response = response.clone();
            async move {
                hits.fetch_add(1, Ordering::SeqCst);
                Json(response)
            }
        }),
    )
}

#[tokio::test]
async fn metrics_flattens_first_series() {
    let response = json!({
        "status": "success",
        "data": {
            "resultType": "matrix",
            "result": [
                {
                    "metric": {"__name__": "http_requests_total"},
                    "values": [[1_700_000_000, "0.5"], [1_700_000_015, "0.75"], [1_700_000_030, "2"]]
                },
                {
                    "metric": {"__name__": "ignored_second_series"},
                    "values": [[1_700_000_000, "99"]]
                }
            ]
        }
    });
    let prom = spawn_backend(prometheus_mock(response, Arc::new(AtomicUsize::new(0)))).await;
    let app = gateway(&prom, "http://127.0.0.1:1", "http://127.0.0.1:1");

    let (status, body) = request(app, "/api/metrics?query=http_requests_total").await;

    assert_eq!(status, StatusCode::OK);
    let points = body.as_array().unwrap();
    assert_eq!(points.len(), 3);
    assert_eq!(points[0]["value"], 0.5);
    assert_eq!(points[2]["value"], 2.0);
    // Ordered ascending by time, one point per sample.
    let times: Vec<&str> = points.iter().map(|p| p["time"].as_str().unwrap()).collect();
    assert!(times.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(times[0], "2023-11-14T22:13:20.000Z");
}

#[tokio::test]
async fn metrics_empty_result_is_empty_array() {
    let response = json!({"status": "success", "data": {"resultType": "matrix", "result": []}});
    let prom = spawn_backend(prometheus_mock(response, Arc::new(AtomicUsize::new(0)))).await;
    let app = gateway(&prom, "http://127.0.0.1:1", "http://127.0.0.1:1");

    let (status, body) = request(app, "/api/metrics?query=up").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn metrics_without_query_is_400_and_makes_no_upstream_call() {
    let hits = Arc::new(AtomicUsize::new(0));
    let response = json!({"status": "success", "data": {"result": []}});
    let prom = spawn_backend(prometheus_mock(response, hits.clone())).await;
    let app = gateway(&prom, "http://127.0.0.1:1", "http://127.0.0.1:1");

    let (status, body) = request(app, "/api/metrics").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "missing_parameter");
    assert_eq!(body["message"], "Query parameter is required");
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn metrics_upstream_failure_is_500_with_generic_message() {
    let upstream = Router::new().route(
        "/api/v1/query_range",
        get(|| async {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "secret upstream stack trace",
            )
        }),
    );
    let prom = spawn_backend(upstream).await;
    let app = gateway(&prom, "http://127.0.0.1:1", "http://127.0.0.1:1");

    let (status, body) = request(app, "/api/metrics?query=up").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "upstream_error");
    assert_eq!(body["message"], "Failed to fetch data from prometheus");
    assert!(!body.to_string().contains("secret"));
}

#[tokio::test]
async fn metrics_non_numeric_sample_is_500() {
    let response = json!({
        "status": "success",
        "data": {"result": [{"metric": {}, "values": [[1_700_000_000, "not-a-number"]]}]}
    });
    let prom = spawn_backend(prometheus_mock(response, Arc::new(AtomicUsize::new(0)))).await;
    let app = gateway(&prom, "http://127.0.0.1:1", "http://127.0.0.1:1");

    let (status, body) = request(app, "/api/metrics?query=up").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "upstream_error");
}

// ============================================================================
// TRACES
// ============================================================================

type CapturedParams = Arc<Mutex<Option<HashMap<String, String>>>>;

fn jaeger_mock(response: Value, captured: CapturedParams) -> Router {
    Router::new().route(
        "/api/traces",
        get(move |Query(params): Query<HashMap<String, String>>| {
            let captured = captured.clone();
            let response = response.clone();
            async move {
                *captured.lock().unwrap() = Some(params);
                Json(response)
            }
        }),
    )
}

#[tokio::test]
async fn traces_summarize_root_spans() {
    let response = json!({
        "data": [
            {
                "traceID": "trace-err",
                "spans": [
                    {
                        "traceID": "trace-err",
                        "spanID": "s1",
                        "operationName": "POST /charge",
                        "references": [],
                        "startTime": 1_700_000_000_000_000_i64,
                        "duration": 4_000_000,
                        "tags": [{"key": "error", "type": "bool", "value": true}]
                    },
                    {
                        "traceID": "trace-err",
                        "spanID": "s2",
                        "operationName": "db.insert",
                        "references": [{"refType": "CHILD_OF", "traceID": "trace-err", "spanID": "s1"}],
                        "startTime": 1_700_000_000_100_000_i64,
                        "duration": 900_000,
                        "tags": []
                    }
                ]
            },
            {
                "traceID": "trace-ok",
                "spans": [{
                    "traceID": "trace-ok",
                    "spanID": "s1",
                    "operationName": "GET /balance",
                    "references": [],
                    "startTime": 1_700_000_060_000_000_i64,
                    "duration": 1_499,
                    "tags": [{"key": "http.status_code", "type": "int64", "value": 200}]
                }]
            }
        ]
    });
    let captured: CapturedParams = Arc::new(Mutex::new(None));
    let jaeger = spawn_backend(jaeger_mock(response, captured.clone())).await;
    let app = gateway("http://127.0.0.1:1", &jaeger, "http://127.0.0.1:1");

    let (status, body) = request(app, "/api/traces?service=Payment%20Service&limit=5").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([
            {
                "traceId": "trace-err",
                "name": "POST /charge",
                "status": "error",
                "durationMs": 4000,
                "timestamp": "2023-11-14T22:13:20.000Z"
            },
            {
                "traceId": "trace-ok",
                "name": "GET /balance",
                "status": "success",
                "durationMs": 1,
                "timestamp": "2023-11-14T22:14:20.000Z"
            }
        ])
    );

    let params = captured.lock().unwrap().clone().unwrap();
    assert_eq!(params.get("service").map(String::as_str), Some("Payment Service"));
    assert_eq!(params.get("limit").map(String::as_str), Some("5"));
    assert!(!params.contains_key("operation"));
}

#[tokio::test]
async fn traces_forward_operation_filter_and_default_limit() {
    let captured: CapturedParams = Arc::new(Mutex::new(None));
    let jaeger = spawn_backend(jaeger_mock(json!({"data": []}), captured.clone())).await;
    let app = gateway("http://127.0.0.1:1", &jaeger, "http://127.0.0.1:1");

    let (status, body) = request(app, "/api/traces?service=payment&operation=checkout").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let params = captured.lock().unwrap().clone().unwrap();
    assert_eq!(params.get("operation").map(String::as_str), Some("checkout"));
    assert_eq!(params.get("limit").map(String::as_str), Some("10"));
}

#[tokio::test]
async fn traces_without_service_is_400() {
    let app = gateway("http://127.0.0.1:1", "http://127.0.0.1:1", "http://127.0.0.1:1");

    let (status, body) = request(app, "/api/traces?limit=5").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Service parameter is required");
}

#[tokio::test]
async fn traces_without_root_span_are_rejected() {
    let response = json!({
        "data": [{
            "traceID": "orphan",
            "spans": [{
                "traceID": "orphan",
                "spanID": "s1",
                "operationName": "child-only",
                "references": [{"refType": "CHILD_OF", "traceID": "other", "spanID": "s0"}],
                "startTime": 0,
                "duration": 1_000,
                "tags": []
            }]
        }]
    });
    let jaeger = spawn_backend(jaeger_mock(response, Arc::new(Mutex::new(None)))).await;
    let app = gateway("http://127.0.0.1:1", &jaeger, "http://127.0.0.1:1");

    let (status, body) = request(app, "/api/traces?service=payment").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "malformed_trace");
}

// ============================================================================
// LOGS
// ============================================================================

type CapturedBody = Arc<Mutex<Option<Value>>>;

fn elasticsearch_mock(response: Value, captured: CapturedBody) -> Router {
    Router::new().route(
        "/logs/_search",
        post(move |Json(body): Json<Value>| {
            let captured = captured.clone();
            let response = response.clone();
            async move {
                *captured.lock().unwrap() = Some(body);
                Json(response)
            }
        }),
    )
}

#[tokio::test]
async fn logs_map_hits_and_default_level() {
    let response = json!({
        "hits": {
            "total": {"value": 2},
            "hits": [
                {
                    "_id": "1",
                    "_source": {
                        "@timestamp": "2024-01-01T00:00:02Z",
                        "log": {"level": "ERROR"},
                        "message": "charge declined",
                        "service": {"name": "payment"},
                        "trace": {"id": "trace-err"}
                    }
                },
                {
                    "_id": "2",
                    "_source": {
                        "@timestamp": "2024-01-01T00:00:01Z",
                        "message": "started"
                    }
                }
            ]
        }
    });
    let captured: CapturedBody = Arc::new(Mutex::new(None));
    let es = spawn_backend(elasticsearch_mock(response, captured.clone())).await;
    let app = gateway("http://127.0.0.1:1", "http://127.0.0.1:1", &es);

    let (status, body) = request(app, "/api/logs").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([
            {
                "timestamp": "2024-01-01T00:00:02Z",
                "level": "ERROR",
                "message": "charge declined",
                "service": "payment",
                "traceId": "trace-err"
            },
            {
                "timestamp": "2024-01-01T00:00:01Z",
                "level": "INFO",
                "message": "started"
            }
        ])
    );

    // No filters given: the upstream query carries an empty must-list and the
    // default size, sorted newest first.
    let sent = captured.lock().unwrap().clone().unwrap();
    assert_eq!(sent["size"], 100);
    assert_eq!(sent["sort"][0]["@timestamp"]["order"], "desc");
    assert_eq!(sent["query"]["bool"]["must"], json!([]));
}

#[tokio::test]
async fn logs_send_one_match_clause_per_filter() {
    let response = json!({"hits": {"hits": []}});
    let captured: CapturedBody = Arc::new(Mutex::new(None));
    let es = spawn_backend(elasticsearch_mock(response, captured.clone())).await;
    let app = gateway("http://127.0.0.1:1", "http://127.0.0.1:1", &es);

    let (status, body) =
        request(app, "/api/logs?service=payment&level=ERROR&traceId=abc123&limit=25").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let sent = captured.lock().unwrap().clone().unwrap();
    assert_eq!(sent["size"], 25);
    let must = sent["query"]["bool"]["must"].as_array().unwrap();
    assert_eq!(must.len(), 3);
    assert_eq!(must[0]["match"]["service.name"], "payment");
    assert_eq!(must[1]["match"]["log.level"], "ERROR");
    assert_eq!(must[2]["match"]["trace.id"], "abc123");
}

#[tokio::test]
async fn logs_upstream_failure_is_500() {
    let es = unreachable_backend().await;
    let app = gateway("http://127.0.0.1:1", "http://127.0.0.1:1", &es);

    let (status, body) = request(app, "/api/logs").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Failed to fetch data from elasticsearch");
}

// ============================================================================
// STATUS
// ============================================================================

fn probe_mock(path: &str) -> Router {
    Router::new().route(path, get(|| async { Json(json!({})) }))
}

#[tokio::test]
async fn status_reports_all_stores_up() {
    let prom = spawn_backend(probe_mock("/-/ready")).await;
    let jaeger = spawn_backend(probe_mock("/api/services")).await;
    let es = spawn_backend(probe_mock("/_cluster/health")).await;
    let app = gateway(&prom, &jaeger, &es);

    let (status, body) = request(app, "/api/status").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "prometheus": {"status": "up"},
            "jaeger": {"status": "up"},
            "elasticsearch": {"status": "up"}
        })
    );
}

#[tokio::test]
async fn status_reports_partial_failure_per_store() {
    let prom = unreachable_backend().await;
    let jaeger = spawn_backend(probe_mock("/api/services")).await;
    let es = spawn_backend(probe_mock("/_cluster/health")).await;
    let app = gateway(&prom, &jaeger, &es);

    let (status, body) = request(app, "/api/status").await;

    // One store down never fails the operation or hides the others.
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["prometheus"]["status"], "down");
    assert!(body["prometheus"]["error"].is_string());
    assert_eq!(body["jaeger"], json!({"status": "up"}));
    assert_eq!(body["elasticsearch"], json!({"status": "up"}));
}

#[tokio::test]
async fn status_marks_non_2xx_probe_as_down() {
    let prom = spawn_backend(Router::new().route(
        "/-/ready",
        get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "not ready") }),
    ))
    .await;
    let jaeger = spawn_backend(probe_mock("/api/services")).await;
    let es = spawn_backend(probe_mock("/_cluster/health")).await;
    let app = gateway(&prom, &jaeger, &es);

    let (status, body) = request(app, "/api/status").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["prometheus"]["status"], "down");
    assert_eq!(body["jaeger"]["status"], "up");
}
