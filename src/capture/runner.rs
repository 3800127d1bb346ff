//! The periodic detection loop.
//!
//! Samples the video source on a fixed interval, feeds every sample through a
//! [`DetectionMachine`] and, on the first face, captures a still from the same
//! frame, uploads it, and emits exactly one [`DetectionEvent::FaceDetected`].

use super::detection::{DetectedFace, DetectionMachine, Sample, TickAction};
use super::photo::{encode_still, CaptureError, Frame};
use crate::domain::PhotoReference;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// A live camera or a replayed recording.
#[async_trait]
pub trait VideoSource: Send + Sync {
    // ---
    /// Acquires the device. Called once per [`DetectionLoop::start`].
    async fn open(&self) -> Result<(), CaptureError>;

    async fn current_frame(&self) -> Result<Frame, CaptureError>;

    /// Releases the device. Called exactly once per successful `open`.
    fn release(&self);
}

/// Face detection plus descriptor extraction.
#[async_trait]
pub trait FaceModel: Send + Sync {
    async fn detect(&self, frame: &Frame) -> anyhow::Result<Vec<DetectedFace>>;
}

/// Where captured stills go before the claim is submitted.
#[async_trait]
pub trait PhotoUploader: Send + Sync {
    async fn upload_still(&self, jpeg: Vec<u8>) -> anyhow::Result<PhotoReference>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum DetectionEvent {
    // ---
    FaceDetected {
        descriptor: Vec<f32>,
        captured_at: DateTime<Utc>,
        /// `None` when encoding or upload failed; the claim goes out without a photo.
        photo: Option<PhotoReference>,
    },
    NoFace,
}

#[derive(Debug, Clone)]
pub struct DetectionConfig {
    // ---
    pub interval: Duration,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
        }
    }
}

/// Releases the video source when the loop task ends, however it ends.
struct ReleaseGuard(Arc<dyn VideoSource>);

impl Drop for ReleaseGuard {
    fn drop(&mut self) {
        debug!("Releasing video source");
        self.0.release();
    }
}

pub struct DetectionLoop {
    // ---
    config: DetectionConfig,
    model: Arc<dyn FaceModel>,
    source: Arc<dyn VideoSource>,
    uploader: Option<Arc<dyn PhotoUploader>>,
    stop_tx: Option<watch::Sender<bool>>,
    task: Option<JoinHandle<()>>,
}

impl DetectionLoop {
    // ---
    pub fn new(
        config: DetectionConfig,
        model: Arc<dyn FaceModel>,
        source: Arc<dyn VideoSource>,
    ) -> Self {
        Self {
            config,
            model,
            source,
            uploader: None,
            stop_tx: None,
            task: None,
        }
    }

    /// Without an uploader every detection is reported descriptor-only.
    pub fn with_uploader(mut self, uploader: Arc<dyn PhotoUploader>) -> Self {
        self.uploader = Some(uploader);
        self
    }

    /// Opens the source and starts sampling. A running loop is stopped first,
    /// so each start is a fresh activation with a reset latch.
    pub async fn start(&mut self, events: mpsc::Sender<DetectionEvent>) -> Result<(), CaptureError> {
        // ---
        self.stop();
        self.wait().await;

        self.source.open().await?;
        let guard = ReleaseGuard(self.source.clone());

        let (stop_tx, stop_rx) = watch::channel(false);
        let mut machine = DetectionMachine::new();
        machine.activate();

        let worker = Worker {
            machine,
            model: self.model.clone(),
            source: self.source.clone(),
            uploader: self.uploader.clone(),
            events,
        };

        info!(interval_ms = self.config.interval.as_millis() as u64, "Detection started");
        self.stop_tx = Some(stop_tx);
        self.task = Some(tokio::spawn(worker.run(self.config.interval, stop_rx, guard)));
        Ok(())
    }

    /// Cancels sampling and any capture in flight. Safe to call repeatedly,
    /// and before `start`.
    pub fn stop(&mut self) {
        // ---
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(true);
        }
    }

    /// Waits for the loop task to finish, after a detection or a `stop`.
    pub async fn wait(&mut self) {
        // ---
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!("Detection task ended abnormally: {e}");
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }
}

impl Drop for DetectionLoop {
    fn drop(&mut self) {
        self.stop();
    }
}

struct Worker {
    // ---
    machine: DetectionMachine,
    model: Arc<dyn FaceModel>,
    source: Arc<dyn VideoSource>,
    uploader: Option<Arc<dyn PhotoUploader>>,
    events: mpsc::Sender<DetectionEvent>,
}

impl Worker {
    // ---
    async fn run(
        mut self,
        interval: Duration,
        mut stop_rx: watch::Receiver<bool>,
        _guard: ReleaseGuard,
    ) {
        // ---
        let (done_tx, mut done_rx) = mpsc::channel::<()>(1);
        let mut capture: Option<JoinHandle<()>> = None;

        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;

                _ = stop_rx.changed() => {
                    self.machine.stop();
                    if let Some(task) = capture.take() {
                        task.abort();
                    }
                    info!("Detection stopped");
                    break;
                }

                Some(()) = done_rx.recv() => {
                    self.machine.complete();
                    info!("Detection complete");
                    break;
                }

                _ = ticker.tick() => {
                    let (sample, frame) = self.sample().await;
                    match self.machine.on_sample(sample) {
                        TickAction::Ignore => {}
                        TickAction::ReportNoFace => {
                            if self.events.send(DetectionEvent::NoFace).await.is_err() {
                                debug!("Event receiver dropped, stopping detection");
                                break;
                            }
                        }
                        TickAction::Capture(descriptor) => {
                            let captured_at = Utc::now();
                            info!(captured_at = %captured_at, "Face detected");
                            capture = Some(tokio::spawn(capture_and_report(
                                descriptor,
                                captured_at,
                                frame,
                                self.uploader.clone(),
                                self.events.clone(),
                                done_tx.clone(),
                            )));
                        }
                    }
                }
            }
        }
    }

    /// One tick's worth of work: grab a frame and run the model on it.
    async fn sample(&self) -> (Sample, Option<Frame>) {
        // ---
        let frame = match self.source.current_frame().await {
            Ok(frame) => frame,
            Err(e) => return (Sample::Failed(e.to_string()), None),
        };

        match self.model.detect(&frame).await {
            Ok(faces) if faces.is_empty() => (Sample::NoFace, Some(frame)),
            Ok(faces) => (Sample::Faces(faces), Some(frame)),
            Err(e) => (Sample::Failed(e.to_string()), Some(frame)),
        }
    }
}

async fn capture_and_report(
    descriptor: Vec<f32>,
    captured_at: DateTime<Utc>,
    frame: Option<Frame>,
    uploader: Option<Arc<dyn PhotoUploader>>,
    events: mpsc::Sender<DetectionEvent>,
    done: mpsc::Sender<()>,
) {
    // ---
    let photo = match (frame, uploader) {
        (Some(frame), Some(uploader)) => capture_photo(&frame, uploader.as_ref()).await,
        _ => None,
    };

    let event = DetectionEvent::FaceDetected {
        descriptor,
        captured_at,
        photo,
    };
    if events.send(event).await.is_err() {
        debug!("Event receiver dropped before detection was delivered");
    }
    let _ = done.send(()).await;
}

/// Best effort: any failure downgrades the detection to descriptor-only.
async fn capture_photo(frame: &Frame, uploader: &dyn PhotoUploader) -> Option<PhotoReference> {
    // ---
    let jpeg = match encode_still(frame) {
        Ok(jpeg) => jpeg,
        Err(e) => {
            warn!("Still capture failed, continuing without photo: {e}");
            return None;
        }
    };

    match uploader.upload_still(jpeg).await {
        Ok(reference) => {
            info!(file_id = %reference.file_id, "Photo uploaded");
            Some(reference)
        }
        Err(e) => {
            warn!("Photo upload failed, continuing without photo: {e:#}");
            None
        }
    }
}
