//! Client-side capture pipeline.
//!
//! A [`DetectionLoop`] samples a [`VideoSource`] through a [`FaceModel`] and
//! emits at most one [`DetectionEvent::FaceDetected`] per activation. An
//! [`AttendanceClient`] uploads the still and submits the claim.

mod client;
mod detection;
mod photo;
mod runner;

pub use client::{AttendanceClient, ClientError};
pub use detection::{DetectedFace, DetectionMachine, DetectionState, Sample, TickAction};
pub use photo::{encode_still, CaptureError, Frame, JPEG_QUALITY};
pub use runner::{
    DetectionConfig, DetectionEvent, DetectionLoop, FaceModel, PhotoUploader, VideoSource,
};
