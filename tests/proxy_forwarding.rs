//! Integration tests for upstream forwarding: prefix stripping, forwarded
//! headers, body relay and response rewriting.

mod common;

use common::{
    gateway_config, http_client, start_echo_upstream, start_gateway, start_mock_upstream,
    start_self_redirecting_upstream, unreachable_addr, MockResponse,
};

#[tokio::test]
async fn strips_the_prefix_and_rewrites_host() {
    let upstream = start_echo_upstream().await;
    let frontend = unreachable_addr().await;

    let config = gateway_config(&[("lagos", upstream)], frontend);
    let (base, shutdown) = start_gateway(config).await;

    let response = http_client()
        .get(format!("{base}/state/lagos/dashboard?tab=bills"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let seen = response.text().await.unwrap();
    assert!(seen.starts_with("GET /dashboard?tab=bills HTTP/1.1"), "got: {seen}");
    assert!(seen.contains(&format!("host: {upstream}")), "got: {seen}");
    assert!(seen.contains("x-forwarded-for: 127.0.0.1"), "got: {seen}");
    assert!(seen.contains("x-real-ip: 127.0.0.1"), "got: {seen}");
    assert!(seen.contains("x-forwarded-proto: http"), "got: {seen}");
    assert!(seen.contains("x-forwarded-host: "), "got: {seen}");

    shutdown.trigger();
}

#[tokio::test]
async fn bare_tenant_prefix_maps_to_upstream_root() {
    let upstream = start_echo_upstream().await;
    let frontend = unreachable_addr().await;

    let config = gateway_config(&[("lagos", upstream)], frontend);
    let (base, shutdown) = start_gateway(config).await;

    let response = http_client()
        .get(format!("{base}/state/lagos"))
        .send()
        .await
        .unwrap();
    let seen = response.text().await.unwrap();
    assert!(seen.starts_with("GET / HTTP/1.1"), "got: {seen}");

    shutdown.trigger();
}

#[tokio::test]
async fn request_bodies_relay_upstream() {
    let upstream = start_echo_upstream().await;
    let frontend = unreachable_addr().await;

    let config = gateway_config(&[("lagos", upstream)], frontend);
    let (base, shutdown) = start_gateway(config).await;

    let response = http_client()
        .post(format!("{base}/state/lagos/submit"))
        .body("name=ayo&lga=ikeja")
        .send()
        .await
        .unwrap();
    let seen = response.text().await.unwrap();
    assert!(seen.starts_with("POST /submit HTTP/1.1"), "got: {seen}");
    assert!(seen.ends_with("name=ayo&lga=ikeja"), "got: {seen}");

    shutdown.trigger();
}

#[tokio::test]
async fn relative_redirects_gain_the_tenant_prefix() {
    let upstream = start_mock_upstream(MockResponse::redirect(302, "/login")).await;
    let frontend = unreachable_addr().await;

    let config = gateway_config(&[("lagos", upstream)], frontend);
    let (base, shutdown) = start_gateway(config).await;

    let response = http_client()
        .get(format!("{base}/state/lagos/account"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 302);
    assert_eq!(response.headers()["location"], "/state/lagos/login");

    shutdown.trigger();
}

#[tokio::test]
async fn absolute_own_origin_redirects_fold_onto_the_prefix() {
    let upstream = start_self_redirecting_upstream(301, "/portal/home").await;
    let frontend = unreachable_addr().await;

    let config = gateway_config(&[("kano", upstream)], frontend);
    let (base, shutdown) = start_gateway(config).await;

    let response = http_client()
        .get(format!("{base}/state/kano/old"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 301);
    assert_eq!(response.headers()["location"], "/state/kano/portal/home");

    shutdown.trigger();
}

#[tokio::test]
async fn third_party_redirects_pass_through() {
    let upstream = start_mock_upstream(MockResponse::redirect(
        302,
        "https://pay.example.com/checkout",
    ))
    .await;
    let frontend = unreachable_addr().await;

    let config = gateway_config(&[("lagos", upstream)], frontend);
    let (base, shutdown) = start_gateway(config).await;

    let response = http_client()
        .get(format!("{base}/state/lagos/pay"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 302);
    assert_eq!(
        response.headers()["location"],
        "https://pay.example.com/checkout"
    );

    shutdown.trigger();
}

#[tokio::test]
async fn cookies_rebind_to_the_gateway_host() {
    let upstream = start_mock_upstream(
        MockResponse::ok("ok").with_header(
            "Set-Cookie",
            "session=abc123; Domain=.lagos.example.org; HttpOnly",
        ),
    )
    .await;
    let frontend = unreachable_addr().await;

    let config = gateway_config(&[("lagos", upstream)], frontend);
    let (base, shutdown) = start_gateway(config).await;

    let response = http_client()
        .get(format!("{base}/state/lagos/"))
        .send()
        .await
        .unwrap();
    let cookie = response.headers()["set-cookie"].to_str().unwrap();
    assert!(!cookie.to_ascii_lowercase().contains("domain="), "got: {cookie}");
    assert!(cookie.contains("Path=/"), "got: {cookie}");
    assert!(cookie.contains("HttpOnly"), "got: {cookie}");

    shutdown.trigger();
}

#[tokio::test]
async fn framing_headers_follow_the_embedding_policy() {
    let upstream = start_mock_upstream(
        MockResponse::ok("ok").with_header("X-Frame-Options", "DENY"),
    )
    .await;
    let frontend = unreachable_addr().await;

    let mut config = gateway_config(&[("lagos", upstream)], frontend);
    config.embedding.allow_framing = true;
    let (base, shutdown) = start_gateway(config).await;

    let response = http_client()
        .get(format!("{base}/state/lagos/"))
        .send()
        .await
        .unwrap();
    assert!(response.headers().get("x-frame-options").is_none());

    shutdown.trigger();

    let upstream = start_mock_upstream(
        MockResponse::ok("ok").with_header("X-Frame-Options", "DENY"),
    )
    .await;
    let config = gateway_config(&[("lagos", upstream)], frontend);
    let (base, shutdown) = start_gateway(config).await;

    let response = http_client()
        .get(format!("{base}/state/lagos/"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.headers()["x-frame-options"], "DENY");

    shutdown.trigger();
}
