//! Still capture: one RGB frame in, JPEG bytes out.

use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageEncoder};
use thiserror::Error;

/// JPEG quality factor for attendance stills (0.8 on a 0..1 scale).
pub const JPEG_QUALITY: u8 = 80;

/// A packed RGB8 video frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    // ---
    /// `width * height * 3` bytes, row-major.
    pub rgb: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Error)]
pub enum CaptureError {
    // ---
    #[error("capture unavailable: {0}")]
    CaptureUnavailable(String),

    #[error("invalid frame buffer: expected {expected} bytes, got {actual}")]
    InvalidBuffer { expected: usize, actual: usize },

    #[error("JPEG encoding failed: {0}")]
    Encode(String),
}

/// Encodes a frame as JPEG at [`JPEG_QUALITY`]. The frame is only read.
pub fn encode_still(frame: &Frame) -> Result<Vec<u8>, CaptureError> {
    // ---
    if frame.width == 0 || frame.height == 0 {
        return Err(CaptureError::CaptureUnavailable(
            "video source has no dimensions yet".to_string(),
        ));
    }

    let expected = frame.width as usize * frame.height as usize * 3;
    if frame.rgb.len() < expected {
        return Err(CaptureError::InvalidBuffer {
            expected,
            actual: frame.rgb.len(),
        });
    }

    let mut buffer = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buffer, JPEG_QUALITY);
    encoder
        .write_image(
            &frame.rgb[..expected],
            frame.width,
            frame.height,
            ExtendedColorType::Rgb8,
        )
        .map_err(|e| CaptureError::Encode(e.to_string()))?;

    Ok(buffer)
}
