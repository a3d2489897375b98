//! End-to-end tests against an in-process mock server.
//!
//! Each test binds its own server on an ephemeral port. Record and proxy
//! tests also start a small hyper upstream.

use assert_json_diff::{assert_json_eq, assert_json_include};
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use mockwire_server::config::{Config, ServerMode};
use mockwire_server::mapping::load_mappings_dir;
use mockwire_server::server::{MockServer, ServerState};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use std::convert::Infallible;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;

fn test_config(mode: ServerMode, upstream: Option<&str>) -> Config {
    Config {
        mode,
        host: "127.0.0.1".to_string(),
        port: 0,
        proxy_host: upstream.map(str::to_string),
        ..Config::default()
    }
}

/// Start a server and return its base URL along with its state.
async fn start_server(config: Config) -> (String, Arc<ServerState>) {
    let state = Arc::new(ServerState::new(config).expect("server state"));
    let server = MockServer::bind(Arc::clone(&state)).await.expect("bind");
    let addr = server.local_addr().expect("local addr");
    tokio::spawn(server.run());
    (format!("http://{addr}"), state)
}

/// Upstream that answers a few fixed JSON endpoints.
async fn start_upstream() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let counter = Arc::new(AtomicUsize::new(0));

    tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                return;
            };
            let counter = Arc::clone(&counter);
            tokio::spawn(async move {
                let service = service_fn(move |req| {
                    let counter = Arc::clone(&counter);
                    async move { Ok::<_, Infallible>(upstream_response(req, &counter).await) }
                });
                let _ = http1::Builder::new()
                    .serve_connection(TokioIo::new(stream), service)
                    .await;
            });
        }
    });
    format!("http://{addr}")
}

async fn upstream_response(req: Request<Incoming>, counter: &AtomicUsize) -> Response<Full<Bytes>> {
    let path = req.uri().path().to_string();
    let header = |name: &str| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string()
    };
    let origin = header("origin");
    let referer = header("referer");
    let body = req.into_body().collect().await.unwrap().to_bytes();

    let (status, payload) = match path.as_str() {
        "/api/users" => (
            200,
            json!({"zeta": 1, "users": [{"name": "bob"}, {"name": "alice"}], "alpha": 2}),
        ),
        "/api/counter" => {
            let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
            (200, json!({"count": n}))
        }
        "/api/headers" => (200, json!({"origin": origin, "referer": referer})),
        "/api/echo" => {
            let echoed: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
            (201, json!({"received": echoed}))
        }
        _ => (404, json!({"missing": path})),
    };

    Response::builder()
        .status(status)
        .header("content-type", "application/json")
        .header("x-gdc-trace-id", "trace-123")
        .header("x-request-id", "req-1")
        .body(Full::new(Bytes::from(payload.to_string())))
        .unwrap()
}

async fn snapshot(client: &Client, base: &str, body: Value) -> Value {
    let response = client
        .post(format!("{base}/__admin/recordings/snapshot"))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    response.json().await.unwrap()
}

// =============================================================================
// Replay
// =============================================================================

#[tokio::test]
async fn test_replay_serves_mappings_from_directory() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("users.json"),
        json!({"mappings": [
            {
                "name": "users",
                "request": {"method": "GET", "urlPath": "/api/users",
                            "queryParameters": {"page": {"hasExactly": [{"equalTo": "1"}]}}},
                "response": {"status": 200, "jsonBody": {"users": ["alice"]},
                             "headers": {"Content-Type": "application/json", "X-GDC-Trace": "t"}}
            },
            {
                "request": {"method": "ANY", "urlPattern": "/api/.*"},
                "response": {"status": 418, "body": "fallback"}
            }
        ]})
        .to_string(),
    )
    .unwrap();
    std::fs::write(dir.path().join("broken.json"), "{not json").unwrap();

    let (base, state) = start_server(test_config(ServerMode::Replay, None)).await;
    state.stubs.import(load_mappings_dir(dir.path()).unwrap());
    assert_eq!(state.stubs.len(), 2);

    let client = Client::new();
    let response = client
        .get(format!("{base}/api/users?page=1"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get("x-gdc-trace").is_none());
    let body: Value = response.json().await.unwrap();
    assert_json_eq!(body, json!({"users": ["alice"]}));

    let fallback = client
        .delete(format!("{base}/api/other"))
        .send()
        .await
        .unwrap();
    assert_eq!(fallback.status().as_u16(), 418);
    assert_eq!(fallback.text().await.unwrap(), "fallback");
}

#[tokio::test]
async fn test_replay_unmatched_request_is_404() {
    let (base, _state) = start_server(test_config(ServerMode::Replay, None)).await;

    let response = Client::new()
        .get(format!("{base}/nothing/here"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await.unwrap();
    assert_json_eq!(body, json!({"error": "No matching stub found"}));
}

#[tokio::test]
async fn test_replay_matches_json_body_ignoring_whitespace() {
    let (base, _state) = start_server(test_config(ServerMode::Replay, None)).await;
    let client = Client::new();

    let mapping = json!({
        "request": {
            "method": "POST",
            "url": "/api/orders",
            "bodyPatterns": [{"equalToJson": "{\"item\":\"book\",\"qty\":2}"}]
        },
        "response": {"status": 201, "jsonBody": {"ok": true}}
    });
    let created = client
        .post(format!("{base}/__admin/mappings"))
        .json(&mapping)
        .send()
        .await
        .unwrap();
    assert_eq!(created.status(), StatusCode::CREATED);

    let matched = client
        .post(format!("{base}/api/orders"))
        .body("{ \"qty\": 2,\n  \"item\": \"book\" }")
        .send()
        .await
        .unwrap();
    assert_eq!(matched.status(), StatusCode::CREATED);

    let unmatched = client
        .post(format!("{base}/api/orders"))
        .body(r#"{"item":"book","qty":3}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(unmatched.status(), StatusCode::NOT_FOUND);
}

// =============================================================================
// Admin API
// =============================================================================

#[tokio::test]
async fn test_admin_mapping_lifecycle() {
    let (base, _state) = start_server(test_config(ServerMode::Replay, None)).await;
    let client = Client::new();

    let health: Value = client
        .get(format!("{base}/__admin/health"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_json_eq!(health, json!({"status": "ok"}));

    let import = json!({"mappings": [
        {"request": {"method": "GET", "url": "/a"}, "response": {"status": 200, "body": "a"}},
        {"request": {"method": "GET", "url": "/b"}, "response": {"status": 200, "body": "b"}}
    ]});
    let imported = client
        .post(format!("{base}/__admin/mappings/import"))
        .json(&import)
        .send()
        .await
        .unwrap();
    assert_eq!(imported.status(), StatusCode::OK);

    let listed: Value = client
        .get(format!("{base}/__admin/mappings"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_json_include!(
        actual: listed,
        expected: json!({"mappings": [{"request": {"url": "/a"}}, {"request": {"url": "/b"}}]})
    );

    let served = client.get(format!("{base}/b")).send().await.unwrap();
    assert_eq!(served.text().await.unwrap(), "b");

    let reset = client
        .post(format!("{base}/__admin/reset"))
        .send()
        .await
        .unwrap();
    assert_eq!(reset.status(), StatusCode::OK);

    let gone = client.get(format!("{base}/b")).send().await.unwrap();
    assert_eq!(gone.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_rejects_bad_json_and_unknown_routes() {
    let (base, _state) = start_server(test_config(ServerMode::Replay, None)).await;
    let client = Client::new();

    let bad = client
        .post(format!("{base}/__admin/mappings/import"))
        .body("{oops")
        .send()
        .await
        .unwrap();
    assert_eq!(bad.status(), StatusCode::BAD_REQUEST);

    let unknown = client
        .get(format!("{base}/__admin/requests/unmatched"))
        .send()
        .await
        .unwrap();
    assert_eq!(unknown.status(), StatusCode::NOT_FOUND);

    let settings = client
        .post(format!("{base}/__admin/settings"))
        .json(&json!({"fixedDelay": 0}))
        .send()
        .await
        .unwrap();
    assert_eq!(settings.status(), StatusCode::OK);

    let snapshot = snapshot(&client, &base, json!({})).await;
    assert_json_eq!(snapshot, json!({"mappings": []}));
}

#[tokio::test]
async fn test_admin_metrics_exposed() {
    let (base, _state) = start_server(test_config(ServerMode::Replay, None)).await;
    let client = Client::new();

    client.get(format!("{base}/missing")).send().await.unwrap();

    let response = client
        .get(format!("{base}/__admin/metrics"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let text = response.text().await.unwrap();
    assert!(text.contains("mockwire_requests_total"));
}

// =============================================================================
// Record and proxy
// =============================================================================

#[tokio::test]
async fn test_record_then_snapshot_then_replay() {
    let upstream = start_upstream().await;
    let (record_base, record_state) =
        start_server(test_config(ServerMode::Record, Some(&upstream))).await;
    let client = Client::new();

    let proxied = client
        .get(format!("{record_base}/api/users?page=1"))
        .send()
        .await
        .unwrap();
    assert_eq!(proxied.status(), StatusCode::OK);
    assert!(proxied.headers().get("x-gdc-trace-id").is_none());
    assert_eq!(proxied.headers()["x-request-id"], "req-1");
    let proxied_body: Value = proxied.json().await.unwrap();
    assert_eq!(record_state.recorder.len(), 1);

    let document = snapshot(&client, &record_base, json!({})).await;
    assert!(record_state.recorder.is_empty());
    let mappings = document["mappings"].as_array().unwrap();
    assert_eq!(mappings.len(), 1);
    assert_json_include!(
        actual: mappings[0].clone(),
        expected: json!({
            "name": "api_users",
            "request": {
                "method": "GET",
                "urlPath": "/api/users",
                "queryParameters": {"page": {"hasExactly": [{"equalTo": "1"}]}}
            },
            "response": {
                "status": 200,
                "headers": {"Content-Type": "application/json", "X-Request-ID": "req-1"}
            }
        })
    );
    let headers = mappings[0]["response"]["headers"].as_object().unwrap();
    assert!(!headers.keys().any(|k| k.to_ascii_lowercase().starts_with("x-gdc")));
    assert!(!headers.contains_key("Date"));
    assert!(!headers.contains_key("Content-Length"));

    // Keys are sorted unless key order is preserved
    let keys: Vec<&String> = mappings[0]["response"]["jsonBody"]
        .as_object()
        .unwrap()
        .keys()
        .collect();
    assert_eq!(keys, vec!["alpha", "users", "zeta"]);

    let (replay_base, replay_state) = start_server(test_config(ServerMode::Replay, None)).await;
    let imported = client
        .post(format!("{replay_base}/__admin/mappings/import"))
        .json(&document)
        .send()
        .await
        .unwrap();
    assert_eq!(imported.status(), StatusCode::OK);
    assert_eq!(replay_state.stubs.len(), 1);

    let replayed: Value = client
        .get(format!("{replay_base}/api/users?page=1"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_json_eq!(replayed, proxied_body);
}

#[tokio::test]
async fn test_snapshot_dedup_and_scenarios() {
    let upstream = start_upstream().await;
    let (base, _state) = start_server(test_config(ServerMode::Record, Some(&upstream))).await;
    let client = Client::new();

    for _ in 0..3 {
        client
            .get(format!("{base}/api/counter"))
            .send()
            .await
            .unwrap();
    }
    let deduped = snapshot(&client, &base, json!({})).await;
    let mappings = deduped["mappings"].as_array().unwrap();
    assert_eq!(mappings.len(), 1);
    assert_json_eq!(mappings[0]["response"]["jsonBody"], json!({"count": 3}));

    for _ in 0..3 {
        client
            .get(format!("{base}/api/counter"))
            .send()
            .await
            .unwrap();
    }
    let chained = snapshot(&client, &base, json!({"repeatsAsScenarios": true})).await;
    let mappings = chained["mappings"].as_array().unwrap();
    assert_eq!(mappings.len(), 3);

    let states: Vec<(Value, Value, Value)> = mappings
        .iter()
        .map(|m| {
            (
                m["requiredScenarioState"].clone(),
                m["newScenarioState"].clone(),
                m["response"]["jsonBody"]["count"].clone(),
            )
        })
        .collect();
    assert!(states.contains(&(json!("Started"), json!("state_1"), json!(4))));
    assert!(states.contains(&(json!("state_1"), json!("state_2"), json!(5))));
    assert!(states.contains(&(json!("state_2"), Value::Null, json!(6))));
    assert!(mappings.iter().all(|m| m["scenarioName"] == "api_counter"));
}

#[tokio::test]
async fn test_snapshot_filter_and_request_body() {
    let upstream = start_upstream().await;
    let (base, state) = start_server(Config {
        recording: mockwire_server::config::RecordingConfig {
            sort_array_members: true,
            ..Default::default()
        },
        ..test_config(ServerMode::Record, Some(&upstream))
    })
    .await;
    let client = Client::new();

    client
        .post(format!("{base}/api/echo"))
        .body(r#"{"b": [3, 1, 2], "a": "x"}"#)
        .send()
        .await
        .unwrap();
    client.get(format!("{base}/api/users")).send().await.unwrap();

    let filtered = snapshot(
        &client,
        &base,
        json!({"filters": {"urlPattern": "/api/echo.*"}}),
    )
    .await;
    let mappings = filtered["mappings"].as_array().unwrap();
    assert_eq!(mappings.len(), 1);
    assert_eq!(state.recorder.len(), 1);

    let echo = &mappings[0];
    assert_eq!(echo["request"]["method"], "POST");
    assert_eq!(
        echo["request"]["bodyPatterns"][0]["equalToJson"],
        r#"{"a":"x","b":[1,2,3]}"#
    );
    assert_eq!(echo["response"]["status"], 201);

    let rest = snapshot(&client, &base, json!({})).await;
    assert_json_eq!(
        rest["mappings"][0]["response"]["jsonBody"]["users"],
        json!([{"name": "alice"}, {"name": "bob"}])
    );
}

#[tokio::test]
async fn test_record_rewrites_origin_and_referer() {
    let upstream = start_upstream().await;
    let (base, _state) = start_server(Config {
        referer_path: "/app/".to_string(),
        ..test_config(ServerMode::Record, Some(&upstream))
    })
    .await;

    let body: Value = Client::new()
        .get(format!("{base}/api/headers"))
        .header("Origin", "http://localhost:3000")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_json_eq!(
        body,
        json!({"origin": upstream.clone(), "referer": format!("{upstream}/app/")})
    );
}

#[tokio::test]
async fn test_proxy_mode_forwards_without_recording() {
    let upstream = start_upstream().await;
    let (base, state) = start_server(test_config(ServerMode::Proxy, Some(&upstream))).await;
    let client = Client::new();

    let response = client
        .get(format!("{base}/api/users"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(state.recorder.is_empty());

    let document = snapshot(&client, &base, json!({})).await;
    assert_json_eq!(document, json!({"mappings": []}));
}

#[tokio::test]
async fn test_record_upstream_unreachable_is_502() {
    let closed = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let upstream = format!("http://{}", closed.local_addr().unwrap());
    drop(closed);

    let (base, state) = start_server(test_config(ServerMode::Record, Some(&upstream))).await;
    let response = Client::new()
        .get(format!("{base}/api/users"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().starts_with("proxy error:"));
    assert!(state.recorder.is_empty());
}
