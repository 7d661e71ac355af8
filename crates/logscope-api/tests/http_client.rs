use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Duration;

use axum::extract::Query;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};

use logscope_api::{ApiError, FilterParams, HttpLogApi, LogApi, LogsQuery};

async fn spawn_backend(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

fn backend() -> Router {
    Router::new()
        .route(
            "/api/logs/files",
            get(|| async {
                Json(json!({
                    "log_files": [
                        {"filename": "access.log", "size": 2048},
                        {"bogus": true}
                    ]
                }))
            }),
        )
        .route(
            "/api/logs",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                if params.get("search").is_some_and(|s| s == "crash") {
                    return (StatusCode::BAD_GATEWAY, "upstream went away\n".to_string())
                        .into_response();
                }
                Json(json!({
                    "success": true,
                    "logs": [{"ip": "10.0.0.1", "url": "/", "status_code": 200}],
                    "total_pages": 3,
                    "echo": params,
                }))
                .into_response()
            }),
        )
        .route(
            "/api/stats",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                if params.contains_key("filename") {
                    (
                        StatusCode::OK,
                        Json(json!({"total_requests": 4, "top_urls": {"/b": 1, "/a": 3}})),
                    )
                } else {
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(json!({"error": "no file"})),
                    )
                }
            }),
        )
        .route(
            "/api/analyze",
            post(|Json(body): Json<Value>| async move {
                if body.get("filename").is_some() {
                    Json(json!({"success": true}))
                } else {
                    Json(json!({"success": false, "error": "missing filename"}))
                }
            }),
        )
}

async fn client() -> HttpLogApi {
    let addr = spawn_backend(backend()).await;
    HttpLogApi::new(&format!("http://{addr}"), Duration::from_secs(5)).unwrap()
}

fn filters(filename: Option<&str>) -> FilterParams {
    FilterParams::new(filename.map(str::to_string), Default::default())
}

#[tokio::test]
async fn lists_readable_files_only() {
    let api = client().await;
    let files = api.list_files().await.unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].filename, "access.log");
    assert_eq!(files[0].size, 2048);
}

#[tokio::test]
async fn fetch_logs_sends_paging_parameters() {
    let api = client().await;
    let query = LogsQuery {
        filters: filters(Some("access.log")),
        search: "error".to_string(),
        page: 2,
        page_size: 20,
    };
    let payload = api.fetch_logs(&query).await.unwrap();
    assert!(payload.success);
    assert_eq!(payload.total_pages, json!(3));
    assert_eq!(payload.logs.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn fetch_stats_preserves_mapping_order() {
    let api = client().await;
    let payload = api.fetch_stats(&filters(Some("access.log"))).await.unwrap();
    let keys: Vec<&String> = payload.top_urls.as_object().unwrap().keys().collect();
    assert_eq!(keys, ["/b", "/a"]);
}

#[tokio::test]
async fn http_errors_surface_the_backend_message_verbatim() {
    let api = client().await;
    let err = api.fetch_stats(&filters(None)).await.unwrap_err();
    assert!(matches!(&err, ApiError::Backend(message) if message == "no file"));
    assert_eq!(err.to_string(), "no file");
}

#[tokio::test]
async fn http_errors_without_json_keep_the_status() {
    let api = client().await;
    let query = LogsQuery {
        filters: filters(Some("access.log")),
        search: "crash".to_string(),
        page: 1,
        page_size: 10,
    };
    match api.fetch_logs(&query).await.unwrap_err() {
        ApiError::Status { status, message } => {
            assert_eq!(status, 502);
            assert_eq!(message, "upstream went away");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn analyze_returns_payload_even_when_unsuccessful() {
    let api = client().await;
    assert!(api.analyze(&filters(Some("access.log"))).await.unwrap().success);

    let failed = api.analyze(&filters(None)).await.unwrap();
    assert!(!failed.success);
    assert_eq!(failed.error.as_deref(), Some("missing filename"));
}

#[tokio::test]
async fn unreachable_backend_is_a_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let api = HttpLogApi::new(&format!("http://{addr}"), Duration::from_secs(2)).unwrap();
    let err = api.list_files().await.unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));
}
