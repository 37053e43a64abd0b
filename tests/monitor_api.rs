//! End-to-end tests for the monitoring API.

use reqwest::StatusCode;
use serde_json::Value;
use site_monitor::observability::{LogLevel, RequestOutcome};

mod common;

use common::{start_monitor, test_config, RESET_TOKEN};

async fn get(url: &str) -> (StatusCode, reqwest::header::HeaderMap, Value) {
    let res = reqwest::get(url).await.unwrap();
    let status = res.status();
    let headers = res.headers().clone();
    let body = res.json().await.unwrap_or(Value::Null);
    (status, headers, body)
}

#[tokio::test]
async fn test_health_reports_healthy_with_request_id() {
    let monitor = start_monitor(test_config(), 10).await;

    let (status, headers, body) = get(&monitor.url("/api/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(headers.contains_key("x-request-id"));
    assert_eq!(body["status"], "healthy");
    assert!(body["reasons"].as_array().unwrap().is_empty());
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_request_id_is_propagated_when_supplied() {
    let monitor = start_monitor(test_config(), 10).await;

    let res = reqwest::Client::new()
        .get(monitor.url("/api/health"))
        .header("x-request-id", "client-chosen-id")
        .send()
        .await
        .unwrap();
    assert_eq!(res.headers()["x-request-id"], "client-chosen-id");
}

#[tokio::test]
async fn test_health_degrades_on_memory_pressure() {
    let monitor = start_monitor(test_config(), 95).await;

    let (status, _, body) = get(&monitor.url("/api/health")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["reasons"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_health_degrades_after_many_failures() {
    let monitor = start_monitor(test_config(), 10).await;
    for _ in 0..100 {
        monitor.state.metrics().record(RequestOutcome::new("/api/lead", "POST", 502, 3));
    }

    let (status, _, body) = get(&monitor.url("/api/health")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "degraded");
}

#[tokio::test]
async fn test_health_polls_are_not_recorded() {
    let monitor = start_monitor(test_config(), 95).await;

    for _ in 0..120 {
        let (status, _, _) = get(&monitor.url("/api/health")).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    assert!(monitor.state.metrics().is_empty());
    let system = monitor.state.metrics().system_metrics().unwrap();
    assert_eq!(system.errors.total, 0);
    assert!(system.errors.by_code.is_empty());
}

#[tokio::test]
async fn test_log_query_validation() {
    let monitor = start_monitor(test_config(), 10).await;

    for query in ["limit=0", "limit=1001", "limit=abc", "level=verbose"] {
        let (status, _, body) = get(&monitor.url(&format!("/api/monitor?action=logs&{query}"))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{query}");
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert_eq!(body["path"], "/api/monitor");
        assert!(body["message"].is_string());
        assert!(body["timestamp"].is_string());
    }

    let (status, _, _) = get(&monitor.url("/api/monitor?action=requests&limit=501")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_log_query_filters_by_level() {
    let monitor = start_monitor(test_config(), 10).await;
    monitor.state.logs().error("payment webhook rejected", None, None);
    get(&monitor.url("/api/monitor")).await;

    let (status, _, body) = get(&monitor.url("/api/monitor?action=logs&level=error")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["logs"][0]["level"], "ERROR");
    assert_eq!(body["logs"][0]["message"], "payment webhook rejected");
}

#[tokio::test]
async fn test_recent_requests_newest_first() {
    let monitor = start_monitor(test_config(), 10).await;
    get(&monitor.url("/api/monitor?action=metrics")).await;
    get(&monitor.url("/missing")).await;

    let (_, _, body) = get(&monitor.url("/api/monitor?action=requests&limit=2")).await;
    assert_eq!(body["count"], 2);
    assert_eq!(body["requests"][0]["path"], "/missing");
    assert_eq!(body["requests"][0]["statusCode"], 404);
    assert_eq!(body["requests"][1]["path"], "/api/monitor");
}

#[tokio::test]
async fn test_unmatched_routes_are_recorded() {
    let monitor = start_monitor(test_config(), 10).await;

    let (status, _, body) = get(&monitor.url("/nowhere")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");

    let res = reqwest::Client::new()
        .delete(monitor.url("/api/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);

    let recent = monitor.state.metrics().recent(10);
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].status_code, 405);
    assert_eq!(recent[1].status_code, 404);
    assert_eq!(monitor.state.logs().query(Some(LogLevel::Warn), 10).len(), 2);
}

#[tokio::test]
async fn test_reset_requires_token() {
    let monitor = start_monitor(test_config(), 10).await;
    get(&monitor.url("/nowhere")).await;

    let (status, _, body) = get(&monitor.url("/api/monitor?action=reset")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");

    let (status, _, _) = get(&monitor.url("/api/monitor?action=reset&token=wrong")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let res = reqwest::Client::new()
        .get(monitor.url(&format!("/api/monitor?action=reset&token={RESET_TOKEN}")))
        .header("x-forwarded-for", "192.0.2.10")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Monitor and logs reset successfully");

    // Only the reset request itself has been recorded since.
    let (_, _, body) = get(&monitor.url("/api/monitor?action=metrics")).await;
    assert_eq!(body["system"]["requests"]["total"], 1);
    assert_eq!(body["system"]["errors"]["total"], 0);

    let (_, _, body) = get(&monitor.url("/api/monitor?action=logs&level=info&limit=1000")).await;
    let logs = body["logs"].as_array().unwrap();
    assert_eq!(logs[0]["message"], "Monitor reset");
    assert_eq!(logs[0]["metadata"]["resetBy"], "192.0.2.10");
}

#[tokio::test]
async fn test_summary_is_default_action() {
    let monitor = start_monitor(test_config(), 25).await;

    let (status, _, body) = get(&monitor.url("/api/monitor")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Monitoring endpoint");
    assert_eq!(body["summary"]["system"]["memoryUsage"], "25.00%");
    assert!(body["summary"]["system"]["uptime"].as_str().unwrap().ends_with('s'));
}

#[tokio::test]
async fn test_graceful_shutdown_stops_serving() {
    let monitor = start_monitor(test_config(), 10).await;
    let url = monitor.url("/api/health");
    assert_eq!(get(&url).await.0, StatusCode::OK);

    monitor.shutdown.trigger();
    tokio::time::sleep(std::time::Duration::from_millis(200)).await;

    let result = reqwest::Client::new()
        .get(&url)
        .header("connection", "close")
        .send()
        .await;
    assert!(result.is_err());
}
