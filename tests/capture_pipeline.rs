//! Detection loop, capture client and server wired end to end.

use async_trait::async_trait;
use attendance_capture::capture::{
    AttendanceClient, CaptureError, DetectedFace, DetectionConfig, DetectionEvent, DetectionLoop,
    FaceModel, Frame, VideoSource,
};
use attendance_capture::domain::{AttendanceStatus, HistoryQuery, Role};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

mod common;
use common::{local, Harness, TestServer};

struct Camera {
    released: AtomicUsize,
    width: u32,
}

#[async_trait]
impl VideoSource for Camera {
    async fn open(&self) -> Result<(), CaptureError> {
        Ok(())
    }

    async fn current_frame(&self) -> Result<Frame, CaptureError> {
        // ---
        Ok(Frame {
            rgb: vec![200; (self.width * 24 * 3) as usize],
            width: self.width,
            height: 24,
        })
    }

    fn release(&self) {
        self.released.fetch_add(1, Ordering::SeqCst);
    }
}

/// Finds a face from the third frame on.
struct ThirdFrameModel {
    calls: AtomicUsize,
}

#[async_trait]
impl FaceModel for ThirdFrameModel {
    async fn detect(&self, _frame: &Frame) -> anyhow::Result<Vec<DetectedFace>> {
        // ---
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < 2 {
            return Ok(Vec::new());
        }
        Ok(vec![DetectedFace {
            descriptor: vec![0.05; 128],
            confidence: 0.97,
        }])
    }
}

async fn run_detection(
    camera: Arc<Camera>,
    client: &AttendanceClient,
) -> Vec<DetectionEvent> {
    // ---
    let model = Arc::new(ThirdFrameModel {
        calls: AtomicUsize::new(0),
    });
    let mut detection = DetectionLoop::new(
        DetectionConfig {
            interval: Duration::from_millis(10),
        },
        model,
        camera,
    )
    .with_uploader(Arc::new(client.clone()));

    let (tx, mut rx) = mpsc::channel(16);
    detection.start(tx).await.unwrap();
    detection.wait().await;
    drop(detection);

    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }
    events
}

#[tokio::test]
async fn detection_uploads_photo_and_records_attendance() {
    // ---
    let harness = Harness::at(local(2026, 10, 16, 8, 55));
    let (_, token) = harness.login("user1", Role::User).await;
    let server = TestServer::new(harness.state.clone()).await;
    let client = AttendanceClient::new(server.base_url(), &token);

    let camera = Arc::new(Camera {
        released: AtomicUsize::new(0),
        width: 32,
    });
    let events = run_detection(camera.clone(), &client).await;

    assert_eq!(events.len(), 3);
    assert_eq!(events[0], DetectionEvent::NoFace);
    assert_eq!(events[1], DetectionEvent::NoFace);
    assert_eq!(camera.released.load(Ordering::SeqCst), 1);

    let photo = match &events[2] {
        DetectionEvent::FaceDetected { photo, .. } => photo.clone(),
        DetectionEvent::NoFace => None,
    };
    let photo = photo.expect("photo should have been uploaded");
    assert!(photo.file_size > 0);

    let names = harness.storage.uploaded_names();
    assert_eq!(names.len(), 1);
    assert!(names[0].starts_with("attendance-user1-"));

    let response = client
        .submit_event(events[2].clone())
        .await
        .expect("a detection carries a claim")
        .unwrap();
    assert_eq!(response.attendance.status, AttendanceStatus::Present);
    assert!(response.attendance.has_photo);

    // A second detection the same day is a duplicate.
    let events = run_detection(camera.clone(), &client).await;
    let err = client
        .submit_event(events.last().cloned().unwrap())
        .await
        .unwrap()
        .unwrap_err();
    assert_eq!(err.status(), Some(400));

    let history = client.history(&HistoryQuery::default()).await.unwrap();
    assert_eq!(history.len(), 1);
    assert!(history[0].has_photo);
}

#[tokio::test]
async fn failed_capture_falls_back_to_descriptor_only() {
    // ---
    let harness = Harness::at(local(2026, 10, 16, 9, 20));
    let (_, token) = harness.login("user2", Role::User).await;
    let server = TestServer::new(harness.state.clone()).await;
    let client = AttendanceClient::new(server.base_url(), &token);

    // A camera that has not negotiated dimensions yet cannot produce a still.
    let camera = Arc::new(Camera {
        released: AtomicUsize::new(0),
        width: 0,
    });
    let events = run_detection(camera, &client).await;

    let detection = events.last().cloned().unwrap();
    assert!(matches!(
        detection,
        DetectionEvent::FaceDetected { photo: None, .. }
    ));
    assert!(harness.storage.uploaded_names().is_empty());

    let response = client.submit_event(detection).await.unwrap().unwrap();
    assert_eq!(response.attendance.status, AttendanceStatus::Late);
    assert!(!response.attendance.has_photo);
}

#[tokio::test]
async fn client_reports_rejections() {
    // ---
    let harness = Harness::at(local(2026, 10, 16, 8, 0));
    let server = TestServer::new(harness.state.clone()).await;
    let client = AttendanceClient::new(server.base_url(), "expired-token");

    let err = client
        .submit_claim(vec![0.1; 4], chrono::Utc::now(), None)
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(401));
    assert!(err.to_string().contains("Unauthorized"));
}
