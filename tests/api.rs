//! Slot API behaviour through the full middleware stack.

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    routing::get,
    Router,
};
use bluegreen_probe::{api, config::Config, slot::AppState};
use serde_json::Value;
use tower::ServiceExt;

fn app(identity: &str) -> (Router, AppState) {
    let mut cfg = Config::default();
    cfg.server.identity = identity.to_string();
    let state = AppState::new(&cfg);
    (api::router(state.clone(), &cfg.server), state)
}

async fn call(app: &Router, method: Method, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

#[tokio::test]
async fn fresh_blue_slot_scenario() {
    let (app, _) = app("BLUE");

    let (status, body) = call(&app, Method::GET, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].as_str().unwrap().contains("BLUE"));
    assert_eq!(body["identity"], "BLUE");
    assert_eq!(body["endpoints"]["reset"], "/reset (POST)");

    let (_, first) = call(&app, Method::GET, "/stress").await;
    let (_, second) = call(&app, Method::GET, "/stress").await;
    assert_eq!(first["requestNumber"], 1);
    assert_eq!(second["requestNumber"], 2);
    assert_eq!(second["identity"], "BLUE");

    let (status, reset) = call(&app, Method::POST, "/reset").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reset["message"], "Statistics reset");

    let (status, snapshot) = call(&app, Method::GET, "/status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(snapshot["status"], "OK");
    assert_eq!(snapshot["totalRequests"], 1);
    assert_eq!(snapshot["loadRequests"], 0);
    assert_eq!(snapshot["uptimeSeconds"], 0);
}

#[tokio::test]
async fn status_counts_only_requests_after_reset() {
    let (app, _) = app("GREEN");
    for _ in 0..5 {
        call(&app, Method::GET, "/stress").await;
    }
    call(&app, Method::POST, "/reset").await;

    for _ in 0..3 {
        call(&app, Method::GET, "/stress").await;
    }
    call(&app, Method::GET, "/health").await;

    let (_, snapshot) = call(&app, Method::GET, "/status").await;
    assert_eq!(snapshot["totalRequests"], 5);
    assert_eq!(snapshot["loadRequests"], 3);
    assert_eq!(snapshot["identity"], "GREEN");
    assert!(snapshot["processInfo"]["pid"].as_u64().unwrap() > 0);
}

#[tokio::test]
async fn health_is_always_ok() {
    let (app, _) = app("DEV");
    let noise = [
        (Method::GET, "/stress"),
        (Method::GET, "/nope"),
        (Method::POST, "/reset"),
        (Method::DELETE, "/status"),
        (Method::GET, "/"),
    ];
    for (method, uri) in noise {
        call(&app, method, uri).await;
        let (status, body) = call(&app, Method::GET, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["identity"], "DEV");
    }
}

#[tokio::test]
async fn unknown_routes_are_404_and_still_counted() {
    let (app, state) = app("BLUE");

    for (method, uri) in [
        (Method::GET, "/missing"),
        (Method::GET, "/reset"),
        (Method::POST, "/status"),
        (Method::PUT, "/stress"),
    ] {
        let (status, body) = call(&app, method, uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Route not found");
        assert_eq!(body["identity"], "BLUE");
        assert!(body["timestamp"].is_string());
    }

    let snap = state.slot.snapshot();
    assert_eq!(snap.total_requests, 4);
    assert_eq!(snap.load_requests, 0);
}

#[tokio::test]
async fn paths_match_regardless_of_case_and_trailing_slash() {
    let (app, state) = app("GREEN");

    for uri in ["/status/", "/STATUS", "/Health/", "/stress/"] {
        let (status, body) = call(&app, Method::GET, uri).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
        assert_eq!(body["identity"], "GREEN", "{uri}");
    }
    let (status, _) = call(&app, Method::POST, "/RESET/").await;
    assert_eq!(status, StatusCode::OK);

    let snap = state.slot.snapshot();
    assert_eq!(snap.total_requests, 0);
    assert_eq!(snap.load_requests, 0);
}

#[tokio::test]
async fn processing_time_stays_below_fifty_ms() {
    let (app, _) = app("BLUE");
    for _ in 0..30 {
        let (status, body) = call(&app, Method::GET, "/stress").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["processingTimeMs"].as_u64().unwrap() < 50);
    }
}

#[tokio::test]
async fn handler_panic_becomes_generic_500() {
    async fn boom() -> &'static str {
        panic!("db password=hunter2")
    }

    let cfg = Config::default();
    let state = AppState::new(&cfg);
    let app = api::with_layers(
        api::routes(state.clone()).route("/boom", get(boom)),
        state.clone(),
        &cfg.server,
    );

    let (status, body) = call(&app, Method::GET, "/boom").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Internal Server Error");
    assert_eq!(body["identity"], "BLUE");
    assert!(!body.to_string().contains("hunter2"));

    let (status, _) = call(&app, Method::GET, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(state.slot.snapshot().total_requests, 2);
}

#[tokio::test]
async fn cors_is_permissive() {
    let (app, _) = app("BLUE");
    let request = Request::builder()
        .uri("/status")
        .header(header::ORIGIN, "http://localhost:8080")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn counters_stay_monotonic_under_concurrent_load() {
    let (app, _) = app("BLUE");

    let mut load = tokio::task::JoinSet::new();
    for _ in 0..100 {
        let app = app.clone();
        load.spawn(async move { call(&app, Method::GET, "/stress").await });
    }

    let mut last_load = 0;
    let mut last_total = 0;
    while !load.is_empty() {
        let (_, snapshot) = call(&app, Method::GET, "/status").await;
        let load_now = snapshot["loadRequests"].as_u64().unwrap();
        let total_now = snapshot["totalRequests"].as_u64().unwrap();
        assert!(load_now >= last_load);
        assert!(total_now > last_total);
        assert!(load_now <= total_now);
        last_load = load_now;
        last_total = total_now;

        if let Some(joined) = load.try_join_next() {
            assert_eq!(joined.unwrap().0, StatusCode::OK);
        }
    }

    let (_, snapshot) = call(&app, Method::GET, "/status").await;
    assert_eq!(snapshot["loadRequests"], 100);
}
