//! Face-presence claims submitted by the capture client.
//!
//! A claim is transient: it is validated, turned into an attendance event,
//! and discarded. Only the derived event and photo reference are stored.

use super::errors::AttendanceError;
use super::models::PhotoReference;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

// Drive file identifiers are URL-safe base64-ish tokens.
static FILE_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]{1,256}$").expect("static file id pattern"));

/// Non-empty, finite feature vector of a detected face.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceDescriptor(Vec<f32>);

impl FaceDescriptor {
    // ---
    pub fn new(values: Vec<f32>) -> Result<Self, AttendanceError> {
        // ---
        if values.is_empty() {
            return Err(AttendanceError::InvalidFaceData(
                "face descriptor is empty".to_string(),
            ));
        }

        if let Some(index) = values.iter().position(|v| !v.is_finite()) {
            return Err(AttendanceError::InvalidFaceData(format!(
                "face descriptor value at index {index} is not a finite number"
            )));
        }

        Ok(Self(values))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }
}

/// The face part of a claim: what the detector saw and when.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceSample {
    // ---
    pub descriptor: FaceDescriptor,

    /// Client-side capture time. Informational only; the stored timestamp comes from the server.
    pub captured_at: Option<DateTime<Utc>>,
}

/// An attendance claim, with or without an uploaded photo.
#[derive(Debug, Clone, PartialEq)]
pub enum FaceClaim {
    // ---
    DescriptorOnly(FaceSample),
    WithPhoto(FaceSample, PhotoReference),
}

impl FaceClaim {
    // ---
    pub fn new(sample: FaceSample, photo: Option<PhotoReference>) -> Self {
        // ---
        match photo {
            Some(photo) => FaceClaim::WithPhoto(sample, photo),
            None => FaceClaim::DescriptorOnly(sample),
        }
    }

    pub fn sample(&self) -> &FaceSample {
        // ---
        match self {
            FaceClaim::DescriptorOnly(sample) | FaceClaim::WithPhoto(sample, _) => sample,
        }
    }

    pub fn photo(&self) -> Option<&PhotoReference> {
        // ---
        match self {
            FaceClaim::DescriptorOnly(_) => None,
            FaceClaim::WithPhoto(_, photo) => Some(photo),
        }
    }
}
/// Rejects photo references that could not have come from an upload: a file
/// id outside the storage identifier alphabet or a negative size.
pub fn check_photo_reference(photo: &PhotoReference) -> Result<(), AttendanceError> {
    // ---
    if !FILE_ID.is_match(&photo.file_id) {
        return Err(AttendanceError::InvalidFaceData(
            "photo fileId is not a valid storage identifier".to_string(),
        ));
    }

    if photo.file_size < 0 {
        return Err(AttendanceError::InvalidFaceData(format!(
            "photo fileSize must not be negative, got {}",
            photo.file_size
        )));
    }

    Ok(())
}
