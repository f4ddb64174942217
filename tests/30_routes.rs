mod common;

use anyhow::Result;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use httpmock::prelude::*;
use serde_json::{json, Value};
use tower::ServiceExt;

use casting_api::{router, AppState};

/// Router wired to a mock server standing in for both the auth service and
/// DMAPI. The auth service rejects everything unless a test mocks otherwise.
async fn app(server: &MockServer, extra: &[(&str, &str)]) -> Result<Router> {
    server
        .mock_async(|when, then| {
            when.method(GET).path("/validate");
            then.status(401);
        })
        .await;

    let config = common::config(&server.url("/validate"), &server.base_url(), extra);
    Ok(router(AppState::from_config(&config)?))
}

fn request(method: Method, uri: &str, token: Option<&str>) -> Result<Request<Body>> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    Ok(builder.body(Body::empty())?)
}

async fn json_body(response: Response) -> Result<Value> {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[tokio::test]
async fn health_reports_limiter_occupancy() -> Result<()> {
    let server = MockServer::start_async().await;
    let app = app(&server, &[("RATE_LIMIT_CAPACITY", "25")]).await?;

    let response = app.oneshot(request(Method::GET, "/health", None)?).await?;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await?;
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["status"], json!("ok"));
    assert_eq!(body["data"]["rate_limit"]["capacity"], json!(25));
    assert_eq!(body["data"]["rate_limit"]["tracked_keys"], json!(0));
    Ok(())
}

#[tokio::test]
async fn whoami_without_credentials_is_unauthorized() -> Result<()> {
    let server = MockServer::start_async().await;
    let app = app(&server, &[]).await?;

    let response = app.oneshot(request(Method::GET, "/api/auth/whoami", None)?).await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.headers().get(header::WWW_AUTHENTICATE).and_then(|v| v.to_str().ok()),
        Some("Bearer")
    );

    let body = json_body(response).await?;
    assert_eq!(body["code"], json!("UNAUTHORIZED"));
    Ok(())
}

#[tokio::test]
async fn whoami_returns_legacy_identity_with_quota_headers() -> Result<()> {
    let server = MockServer::start_async().await;
    let app = app(&server, &[("RATE_LIMIT_WHOAMI", "5")]).await?;
    let token = common::valid_legacy_token(json!(314));

    let response = app
        .oneshot(request(Method::GET, "/api/auth/whoami", Some(&token))?)
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-ratelimit-limit"], "5");
    assert_eq!(response.headers()["x-ratelimit-remaining"], "4");

    let body = json_body(response).await?;
    assert_eq!(body["data"]["id"], json!("314"));
    assert_eq!(body["data"]["role"], json!("talent"));
    Ok(())
}

#[tokio::test]
async fn whoami_is_throttled_per_identity() -> Result<()> {
    let server = MockServer::start_async().await;
    let app = app(&server, &[("RATE_LIMIT_WHOAMI", "2")]).await?;
    let first = common::valid_legacy_token(json!("caller-a"));
    let second = common::valid_legacy_token(json!("caller-b"));

    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(request(Method::GET, "/api/auth/whoami", Some(&first))?)
            .await?;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let throttled = app
        .clone()
        .oneshot(request(Method::GET, "/api/auth/whoami", Some(&first))?)
        .await?;
    assert_eq!(throttled.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(throttled.headers()["x-ratelimit-remaining"], "0");

    let other = app
        .oneshot(request(Method::GET, "/api/auth/whoami", Some(&second))?)
        .await?;
    assert_eq!(other.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn media_delete_forwards_to_dmapi_with_service_token() -> Result<()> {
    let server = MockServer::start_async().await;
    let dmapi = server
        .mock_async(|when, then| {
            when.method(DELETE)
                .path("/media/headshot-1")
                .header("x-service-token", common::SERVICE_TOKEN);
            then.status(200);
        })
        .await;
    let app = app(&server, &[]).await?;
    let token = common::valid_legacy_token(json!(8));

    let response = app
        .oneshot(request(Method::DELETE, "/api/media/headshot-1", Some(&token))?)
        .await?;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    dmapi.assert_calls_async(1).await;
    Ok(())
}

#[tokio::test]
async fn media_delete_maps_missing_media_to_not_found() -> Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(DELETE).path("/media/gone");
            then.status(404);
        })
        .await;
    let app = app(&server, &[]).await?;
    let token = common::valid_legacy_token(json!(8));

    let response = app
        .oneshot(request(Method::DELETE, "/api/media/gone", Some(&token))?)
        .await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn media_delete_maps_upstream_failure_to_bad_gateway() -> Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(DELETE).path("/media/broken");
            then.status(503);
        })
        .await;
    let app = app(&server, &[]).await?;
    let token = common::valid_legacy_token(json!(8));

    let response = app
        .oneshot(request(Method::DELETE, "/api/media/broken", Some(&token))?)
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    Ok(())
}

#[tokio::test]
async fn media_delete_rejects_unsafe_ids_before_calling_dmapi() -> Result<()> {
    let server = MockServer::start_async().await;
    let dmapi = server
        .mock_async(|when, then| {
            when.method(DELETE);
            then.status(200);
        })
        .await;
    let app = app(&server, &[]).await?;
    let token = common::valid_legacy_token(json!(8));

    let response = app
        .oneshot(request(Method::DELETE, "/api/media/a.b", Some(&token))?)
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    dmapi.assert_calls_async(0).await;
    Ok(())
}

#[tokio::test]
async fn media_delete_requires_identity() -> Result<()> {
    let server = MockServer::start_async().await;
    let app = app(&server, &[]).await?;

    let response = app
        .oneshot(request(Method::DELETE, "/api/media/headshot-1", Some("forged"))?)
        .await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

fn from_address(method: Method, uri: &str, token: &str, address: &str) -> Result<Request<Body>> {
    Ok(Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header("x-forwarded-for", address)
        .body(Body::empty())?)
}

#[tokio::test]
async fn failed_authentication_is_throttled_per_address() -> Result<()> {
    let server = MockServer::start_async().await;
    let app = app(&server, &[("RATE_LIMIT_AUTH_FAILURE", "2")]).await?;

    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(from_address(Method::GET, "/api/auth/whoami", "forged", "203.0.113.7")?)
            .await?;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    let throttled = app
        .clone()
        .oneshot(from_address(Method::GET, "/api/auth/whoami", "forged", "203.0.113.7")?)
        .await?;
    assert_eq!(throttled.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(throttled.headers()["x-ratelimit-limit"], "2");

    let elsewhere = app
        .clone()
        .oneshot(from_address(Method::GET, "/api/auth/whoami", "forged", "198.51.100.20")?)
        .await?;
    assert_eq!(elsewhere.status(), StatusCode::UNAUTHORIZED);

    // A valid credential from the throttled address still gets through.
    let token = common::valid_legacy_token(json!("caller-c"));
    let response = app
        .oneshot(from_address(Method::GET, "/api/auth/whoami", &token, "203.0.113.7")?)
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn legacy_token_with_audience_is_accepted() -> Result<()> {
    let server = MockServer::start_async().await;
    let app = app(&server, &[]).await?;
    let exp = (chrono::Utc::now() + chrono::Duration::hours(1)).timestamp();
    let token = common::legacy_token(json!({"id": 1, "exp": exp, "aud": "casting"}));

    let response = app
        .oneshot(request(Method::GET, "/api/auth/whoami", Some(&token))?)
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await?;
    assert_eq!(body["data"]["id"], json!("1"));
    Ok(())
}
