// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Integration tests for the WebFinger middleware.

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use webfinger_middleware::{
    build_router, Config, ConfigError, Link, ResourceDescriptor, StartupError, WebFingerConfig,
    WebFingerLayer,
};

fn alice() -> ResourceDescriptor {
    ResourceDescriptor::new("acct:alice@example.com")
        .with_alias("https://example.com/alice")
        .with_alias("https://example.com/users/alice")
        .with_link(
            Link::new("http://webfinger.net/rel/profile-page")
                .with_type("text/html")
                .with_href("https://example.com/alice"),
        )
        .with_link(
            Link::new("self")
                .with_type("application/activity+json")
                .with_href("https://example.com/users/alice"),
        )
}

fn webfinger_config() -> WebFingerConfig {
    WebFingerConfig::new("example.com").with_resource("acct:alice@example.com", alice())
}

/// Backend that should only be reached by passthrough.
fn teapot_app(config: WebFingerConfig) -> Router {
    Router::new()
        .fallback(|| async { StatusCode::IM_A_TEAPOT })
        .layer(WebFingerLayer::new(config).unwrap())
}

fn backend_app(config: WebFingerConfig) -> Router {
    Router::new()
        .fallback(|| async { Json(json!({ "message": "backend response" })).into_response() })
        .layer(WebFingerLayer::new(config).unwrap())
}

async fn send(app: Router, method: Method, uri: &str) -> Response {
    app.oneshot(
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

async fn body_bytes(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

#[tokio::test]
async fn test_configured_resource_served() {
    let response = send(
        teapot_app(webfinger_config()),
        Method::GET,
        "/.well-known/webfinger?resource=acct:alice@example.com",
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/jrd+json"
    );

    let body: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(body["subject"], "acct:alice@example.com");
    assert_eq!(
        body["aliases"],
        json!(["https://example.com/alice", "https://example.com/users/alice"])
    );

    let links = body["links"].as_array().unwrap();
    assert_eq!(links.len(), 2);
    assert_eq!(links[0]["rel"], "http://webfinger.net/rel/profile-page");
    assert_eq!(links[1]["rel"], "self");
}

#[tokio::test]
async fn test_missing_resource_parameter() {
    let response = send(
        teapot_app(webfinger_config()),
        Method::GET,
        "/.well-known/webfinger",
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unconfigured_resource_not_found() {
    let response = send(
        teapot_app(webfinger_config()),
        Method::GET,
        "/.well-known/webfinger?resource=acct:bob@example.com",
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_bytes(response).await, b"Resource not found");
}

#[tokio::test]
async fn test_foreign_domain_not_found() {
    let response = send(
        teapot_app(webfinger_config()),
        Method::GET,
        "/.well-known/webfinger?resource=acct:alice@otherdomain.com",
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_post_not_allowed() {
    for passthrough in [false, true] {
        let response = send(
            teapot_app(webfinger_config().with_passthrough(passthrough)),
            Method::POST,
            "/.well-known/webfinger?resource=acct:alice@example.com",
        )
        .await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}

#[tokio::test]
async fn test_other_paths_reach_backend() {
    let response = send(
        teapot_app(webfinger_config()),
        Method::GET,
        "/some/other/path?resource=acct:alice@example.com",
    )
    .await;
    assert_eq!(response.status(), StatusCode::IM_A_TEAPOT);
}

#[tokio::test]
async fn test_passthrough_unconfigured_resource() {
    let response = send(
        backend_app(WebFingerConfig::new("example.com").with_passthrough(true)),
        Method::GET,
        "/.well-known/webfinger?resource=acct:unknown@example.com",
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_bytes(response).await,
        br#"{"message":"backend response"}"#
    );
}

#[tokio::test]
async fn test_passthrough_foreign_resource() {
    let response = send(
        backend_app(webfinger_config().with_passthrough(true)),
        Method::GET,
        "/.well-known/webfinger?resource=acct:alice@otherdomain.com",
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_bytes(response).await,
        br#"{"message":"backend response"}"#
    );
}

#[tokio::test]
async fn test_passthrough_still_serves_configured_resource() {
    let response = send(
        backend_app(webfinger_config().with_passthrough(true)),
        Method::GET,
        "/.well-known/webfinger?resource=acct:alice@example.com",
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/jrd+json"
    );
}

#[tokio::test]
async fn test_backend_routes_unaffected() {
    let app = Router::new()
        .route("/users/alice", get(|| async { "alice" }))
        .layer(WebFingerLayer::new(webfinger_config()).unwrap());

    let response = send(app, Method::GET, "/users/alice").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, b"alice");
}

#[test]
fn test_invalid_configs_rejected() {
    assert_eq!(
        WebFingerLayer::new(WebFingerConfig::new("")).err(),
        Some(ConfigError::MissingDomain)
    );
    assert!(matches!(
        WebFingerLayer::new(WebFingerConfig::new("example.com").with_resource(
            "acct:a@other.com",
            ResourceDescriptor::new("acct:a@other.com")
        ))
        .err(),
        Some(ConfigError::ResourceDomainMismatch { .. })
    ));
}

#[tokio::test]
async fn test_service_router() {
    let mut config = Config::default();
    config.webfinger = webfinger_config();

    let app = build_router(config).unwrap();

    let response = send(
        app.clone(),
        Method::GET,
        "/.well-known/webfinger?resource=acct%3Aalice%40example.com",
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "*"
    );

    let response = send(app.clone(), Method::GET, "/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(app.clone(), Method::GET, "/metrics").await;
    assert_eq!(response.status(), StatusCode::OK);
    let text = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(text.contains(r#"webfinger_requests_total{outcome="served"} 1"#));

    let response = send(app, Method::GET, "/unknown").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_service_router_without_metrics() {
    let mut config = Config::default();
    config.webfinger = webfinger_config();
    config.metrics.enabled = false;

    let app = build_router(config).unwrap();
    let response = send(app, Method::GET, "/metrics").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[test]
fn test_service_router_refuses_invalid_config() {
    let err = build_router(Config::default()).unwrap_err();
    assert!(matches!(err, StartupError::Invalid(ConfigError::MissingDomain)));
}

#[tokio::test]
async fn test_service_router_preflight_not_allowed() {
    let mut config = Config::default();
    config.webfinger = webfinger_config();
    let app = build_router(config).unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/.well-known/webfinger?resource=acct:alice@example.com")
                .header(header::ORIGIN, "https://client.example.org")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "*"
    );
}

#[tokio::test]
async fn test_service_router_backend_keeps_cors() {
    let mut config = Config::default();
    config.webfinger = webfinger_config();
    let app = build_router(config).unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .header(header::ORIGIN, "https://client.example.org")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "*"
    );
}

#[test]
fn test_service_router_rejects_bad_metrics_path() {
    for path in ["metrics", "/health"] {
        let mut config = Config::default();
        config.webfinger = webfinger_config();
        config.metrics.path = path.to_string();

        let err = build_router(config).unwrap_err();
        assert!(
            matches!(&err, StartupError::MetricsPath(p) if p == path),
            "{path}: {err}"
        );
    }
}
