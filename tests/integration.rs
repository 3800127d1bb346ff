//! Router assembled from environment configuration, as `main` does it.

use serde_json::Value;

mod common;

#[tokio::test]
#[serial_test::serial]
async fn health_endpoint_works() {
    // ---
    common::setup_test_env();
    let server = common::server_from_env().await;

    let response = server
        .client
        .get(server.url("/health"))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to read response body");
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
#[serial_test::serial]
async fn root_endpoint_lists_routes() {
    // ---
    common::setup_test_env();
    let server = common::server_from_env().await;

    let response = server
        .client
        .get(server.url("/"))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 200);

    let body = response.text().await.expect("Failed to read response body");
    assert!(body.contains("/api/attendance"));
}

#[tokio::test]
#[serial_test::serial]
async fn api_requires_session() {
    // ---
    common::setup_test_env();
    let server = common::server_from_env().await;

    for path in ["/api/attendance", "/api/storage/consent"] {
        let response = server
            .client
            .get(server.url(path))
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), 401, "path: {path}");
    }
}

#[tokio::test]
#[serial_test::serial]
async fn invalid_routes_return_404() {
    // ---
    common::setup_test_env();
    let server = common::server_from_env().await;

    let response = server
        .client
        .get(server.url("/nonexistent"))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[serial_test::serial]
async fn server_handles_concurrent_requests() {
    // ---
    common::setup_test_env();
    let server = common::server_from_env().await;

    // Make multiple concurrent requests
    let futures = (0..10).map(|_| server.client.get(server.url("/health")).send());

    let responses = futures::future::join_all(futures).await;

    for response in responses {
        let response = response.expect("Request should succeed");
        assert_eq!(response.status(), 200);
    }
}

#[tokio::test]
#[serial_test::serial]
async fn unknown_repository_backend_fails_startup() {
    // ---
    common::setup_test_env();
    std::env::set_var("ATTENDANCE_REPOSITORY", "mongo");

    let result = attendance_capture::AppConfig::from_env();

    std::env::set_var("ATTENDANCE_REPOSITORY", "memory");
    assert!(result.is_err());
}
