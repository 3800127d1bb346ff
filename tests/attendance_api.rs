use attendance_capture::domain::{Role, StorageError};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::Duration;
use serde_json::{json, Value};

mod common;
use common::{local, Harness, TestServer};

fn claim(descriptor_len: usize) -> Value {
    json!({ "faceData": { "descriptor": vec![0.12_f32; descriptor_len] } })
}

#[tokio::test]
async fn anonymous_caller_is_rejected_before_body_parsing() {
    // ---
    let harness = Harness::at(local(2026, 10, 16, 8, 30));
    let server = TestServer::new(harness.state.clone()).await;

    let res = server
        .client
        .post(server.url("/api/attendance"))
        .header("content-type", "application/json")
        .body("{ not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 401);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Unauthorized");

    let res = server
        .client
        .get(server.url("/api/attendance"))
        .bearer_auth("no-such-token")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 401);
}

#[tokio::test]
async fn first_check_in_is_present_then_duplicate_then_late_next_day() {
    // ---
    let harness = Harness::at(local(2026, 10, 16, 8, 30));
    let (_, token) = harness.login("john", Role::User).await;
    let server = TestServer::new(harness.state.clone()).await;

    let res = server
        .client
        .post(server.url("/api/attendance"))
        .bearer_auth(&token)
        .json(&claim(128))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["attendance"]["status"], "PRESENT");
    assert_eq!(body["attendance"]["user"]["username"], "john");
    assert_eq!(body["attendance"]["hasPhoto"], false);

    harness.clock.advance(Duration::hours(3));
    let res = server
        .client
        .post(server.url("/api/attendance"))
        .bearer_auth(&token)
        .json(&claim(128))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);
    let body: Value = res.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("already been recorded"));

    harness.clock.set(local(2026, 10, 17, 9, 5));
    let res = server
        .client
        .post(server.url("/api/attendance"))
        .bearer_auth(&token)
        .json(&claim(128))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["attendance"]["status"], "LATE");
}

#[tokio::test]
async fn invalid_face_data_is_bad_request() {
    // ---
    let harness = Harness::at(local(2026, 10, 16, 8, 0));
    let (_, token) = harness.login("jane", Role::User).await;
    let server = TestServer::new(harness.state.clone()).await;

    for body in [json!({}), json!({ "faceData": {} }), claim(0)] {
        let res = server
            .client
            .post(server.url("/api/attendance"))
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 400, "body: {body}");
    }

    let res = server
        .client
        .post(server.url("/api/attendance"))
        .bearer_auth(&token)
        .header("content-type", "application/json")
        .body("{ not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);

    // Nothing was stored by the rejected attempts.
    let res = server
        .client
        .get(server.url("/api/attendance"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let entries: Vec<Value> = res.json().await.unwrap();
    assert!(entries.is_empty());
}

#[tokio::test]
async fn photo_upload_then_claim_then_view() {
    // ---
    let harness = Harness::at(local(2026, 10, 16, 8, 45));
    let (_, token) = harness.login("bob", Role::User).await;
    let (_, other) = harness.login("alice", Role::User).await;
    let (_, admin) = harness.login("admin", Role::Admin).await;
    let server = TestServer::new(harness.state.clone()).await;

    let jpeg = [0xFF_u8, 0xD8, 0xFF, 0xE0, 0x00, 0x10];
    let res = server
        .client
        .post(server.url("/api/attendance/photo"))
        .bearer_auth(&token)
        .json(&json!({ "photo": format!("data:image/jpeg;base64,{}", BASE64.encode(jpeg)) }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let body: Value = res.json().await.unwrap();
    let photo = body["photoMetadata"].clone();
    assert_eq!(photo["fileSize"], 6);

    let names = harness.storage.uploaded_names();
    assert_eq!(names.len(), 1);
    assert!(names[0].starts_with("attendance-bob-"));

    let res = server
        .client
        .post(server.url("/api/attendance"))
        .bearer_auth(&token)
        .json(&json!({ "faceData": { "descriptor": [0.1, 0.2], "photoMetadata": photo } }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["attendance"]["hasPhoto"], true);
    assert!(body["attendance"].get("photoUrl").is_none());
    let id = body["attendance"]["id"].as_str().unwrap().to_string();

    let view = server.url(&format!("/api/attendance/{id}/photo"));

    let res = server.client.get(&view).bearer_auth(&token).send().await.unwrap();
    assert_eq!(res.status(), 200);
    let html = res.text().await.unwrap();
    assert!(html.contains(&format!("data:image/jpeg;base64,{}", BASE64.encode(jpeg))));

    let res = server.client.get(&view).bearer_auth(&other).send().await.unwrap();
    assert_eq!(res.status(), 403);

    let res = server.client.get(&view).bearer_auth(&admin).send().await.unwrap();
    assert_eq!(res.status(), 200);

    let res = server
        .client
        .get(server.url(&format!("/api/attendance/{}/photo", uuid::Uuid::new_v4())))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 404);

    let res = server
        .client
        .get(server.url("/api/attendance/not-a-uuid/photo"))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);
}

#[tokio::test]
async fn event_without_photo_has_no_photo_to_view() {
    // ---
    let harness = Harness::at(local(2026, 10, 16, 8, 45));
    let (_, token) = harness.login("bob", Role::User).await;
    let server = TestServer::new(harness.state.clone()).await;

    let res = server
        .client
        .post(server.url("/api/attendance"))
        .bearer_auth(&token)
        .json(&claim(8))
        .send()
        .await
        .unwrap();
    let body: Value = res.json().await.unwrap();
    let id = body["attendance"]["id"].as_str().unwrap().to_string();

    let res = server
        .client
        .get(server.url(&format!("/api/attendance/{id}/photo")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 404);
}

#[tokio::test]
async fn storage_failures_surface_as_bad_gateway_with_kind() {
    // ---
    let harness = Harness::at(local(2026, 10, 16, 8, 45));
    let (_, token) = harness.login("bob", Role::User).await;
    let server = TestServer::new(harness.state.clone()).await;

    for (err, kind) in [
        (StorageError::CredentialRejected, "credential_rejected"),
        (StorageError::QuotaExceeded, "quota_exceeded"),
        (StorageError::Unknown("HTTP 500".to_string()), "unknown"),
    ] {
        harness.storage.fail_with(err);
        let res = server
            .client
            .post(server.url("/api/attendance/photo"))
            .bearer_auth(&token)
            .json(&json!({ "photo": BASE64.encode([1, 2, 3]) }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 502);
        let body: Value = res.json().await.unwrap();
        assert_eq!(body["kind"], kind);
    }
}

#[tokio::test]
async fn storage_error_body_does_not_leak_provider_response() {
    // ---
    let harness = Harness::at(local(2026, 10, 16, 8, 45));
    let (_, token) = harness.login("bob", Role::User).await;
    let server = TestServer::new(harness.state.clone()).await;

    harness.storage.fail_with(StorageError::Unknown(
        r#"HTTP 500 Internal Server Error: {"error":"Backend shard drive-prod-7 at 10.2.3.4 unavailable"}"#
            .to_string(),
    ));
    let res = server
        .client
        .post(server.url("/api/attendance/photo"))
        .bearer_auth(&token)
        .json(&json!({ "photo": BASE64.encode([1, 2, 3]) }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 502);

    let text = res.text().await.unwrap();
    assert!(!text.contains("drive-prod-7"), "{text}");
    assert!(!text.contains("10.2.3.4"), "{text}");
    assert!(!text.contains("HTTP 500"), "{text}");

    let body: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(body["error"], "Storage request failed");
    assert_eq!(body["kind"], "unknown");
}

#[tokio::test]
async fn malformed_photo_reference_is_rejected_and_not_stored() {
    // ---
    let harness = Harness::at(local(2026, 10, 16, 8, 0));
    let (_, token) = harness.login("jane", Role::User).await;
    let server = TestServer::new(harness.state.clone()).await;

    let bad_refs = [
        json!({ "fileId": "file-1", "url": "https://drive.test/file-1", "fileSize": -1 }),
        json!({ "fileId": "../other", "url": "https://drive.test/x", "fileSize": 10 }),
        json!({ "fileId": "a/b?x", "url": "https://drive.test/x", "fileSize": 10 }),
        json!({ "fileId": "", "url": "https://drive.test/x", "fileSize": 10 }),
    ];
    for photo in bad_refs {
        let res = server
            .client
            .post(server.url("/api/attendance"))
            .bearer_auth(&token)
            .json(&json!({ "faceData": { "descriptor": [0.1, 0.2], "photoMetadata": photo } }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 400, "photo: {photo}");
    }

    let res = server
        .client
        .get(server.url("/api/attendance"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let entries: Vec<Value> = res.json().await.unwrap();
    assert!(entries.is_empty());
}

#[tokio::test]
async fn user_id_filter_is_parsed_only_for_admins() {
    // ---
    let harness = Harness::at(local(2026, 10, 16, 8, 0));
    let (john, john_token) = harness.login("john", Role::User).await;
    let (_, admin) = harness.login("admin", Role::Admin).await;
    let server = TestServer::new(harness.state.clone()).await;

    let res = server
        .client
        .post(server.url("/api/attendance"))
        .bearer_auth(&john_token)
        .json(&claim(4))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);

    // A regular user's userId is ignored, whatever its shape.
    for user_id in ["someone-else", "not-a-uuid"] {
        let res = server
            .client
            .get(server.url(&format!("/api/attendance?userId={user_id}")))
            .bearer_auth(&john_token)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 200);
        let entries: Vec<Value> = res.json().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["userId"], john.id.to_string());
    }

    let res = server
        .client
        .get(server.url("/api/attendance?userId=not-a-uuid"))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);
}

#[tokio::test]
async fn upload_requires_photo_data() {
    // ---
    let harness = Harness::at(local(2026, 10, 16, 8, 45));
    let (_, token) = harness.login("bob", Role::User).await;
    let server = TestServer::new(harness.state.clone()).await;

    for body in [json!({}), json!({ "photo": "" }), json!({ "photo": "%%%" })] {
        let res = server
            .client
            .post(server.url("/api/attendance/photo"))
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 400, "body: {body}");
    }
    assert!(harness.storage.uploaded_names().is_empty());
}

#[tokio::test]
async fn history_is_scoped_to_caller_unless_admin() {
    // ---
    let harness = Harness::at(local(2026, 10, 16, 8, 0));
    let (john, john_token) = harness.login("john", Role::User).await;
    let (jane, jane_token) = harness.login("jane", Role::User).await;
    let (_, admin) = harness.login("admin", Role::Admin).await;
    let server = TestServer::new(harness.state.clone()).await;

    for token in [&john_token, &jane_token] {
        let res = server
            .client
            .post(server.url("/api/attendance"))
            .bearer_auth(token)
            .json(&claim(4))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 200);
    }

    // A regular user asking for someone else still gets only their own rows.
    let res = server
        .client
        .get(server.url(&format!("/api/attendance?userId={}", jane.id)))
        .bearer_auth(&john_token)
        .send()
        .await
        .unwrap();
    let entries: Vec<Value> = res.json().await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["userId"], john.id.to_string());

    let res = server
        .client
        .get(server.url("/api/attendance"))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    let entries: Vec<Value> = res.json().await.unwrap();
    assert_eq!(entries.len(), 2);

    let res = server
        .client
        .get(server.url(&format!("/api/attendance?userId={}", jane.id)))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    let entries: Vec<Value> = res.json().await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["user"]["username"], "jane");

    // Outside the window nothing matches.
    let res = server
        .client
        .get(server.url("/api/attendance?startDate=2026-09-01&endDate=2026-09-30"))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    let entries: Vec<Value> = res.json().await.unwrap();
    assert!(entries.is_empty());

    let res = server
        .client
        .get(server.url("/api/attendance?startDate=yesterday"))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);
}

#[tokio::test]
async fn consent_url_is_admin_only() {
    // ---
    let harness = Harness::at(local(2026, 10, 16, 8, 0));
    let (_, user) = harness.login("john", Role::User).await;
    let (_, admin) = harness.login("admin", Role::Admin).await;
    let server = TestServer::new(harness.state.clone()).await;

    let res = server
        .client
        .get(server.url("/api/storage/consent"))
        .bearer_auth(&user)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 403);

    let res = server
        .client
        .get(server.url("/api/storage/consent"))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let body: Value = res.json().await.unwrap();
    let auth_url = body["authUrl"].as_str().unwrap();
    assert!(auth_url.contains("access_type=offline"));
    assert!(auth_url.contains("prompt=consent"));

    let res = server
        .client
        .get(server.url("/api/oauth2callback"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);
}

#[tokio::test]
async fn health_and_root_respond() {
    // ---
    let harness = Harness::at(local(2026, 10, 16, 8, 0));
    let server = TestServer::new(harness.state.clone()).await;

    let res = server.client.get(server.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), 200);

    let res = server
        .client
        .get(server.url("/health?mode=full"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], "ok");

    let res = server.client.get(server.url("/")).send().await.unwrap();
    assert_eq!(res.status(), 200);
    assert!(!res.text().await.unwrap().is_empty());
}
