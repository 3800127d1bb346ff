//! HTTP client for the attendance API, used by capture stations.

use super::runner::{DetectionEvent, PhotoUploader};
use crate::domain::{AttendanceEntry, HistoryQuery, PhotoReference};
use crate::dto::{
    ErrorResponse, FaceDataPayload, SubmitAttendanceRequest, SubmitAttendanceResponse,
    UploadPhotoRequest, UploadPhotoResponse,
};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    // ---
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server rejected request ({status}): {message}")]
    Rejected {
        status: u16,
        message: String,
        kind: Option<String>,
    },
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        // ---
        match self {
            ClientError::Rejected { status, .. } => Some(*status),
            ClientError::Transport(e) => e.status().map(|s| s.as_u16()),
        }
    }
}

/// Authenticated client bound to one session token.
#[derive(Debug, Clone)]
pub struct AttendanceClient {
    // ---
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl AttendanceClient {
    // ---
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url, token)
    }

    pub fn with_client(
        http: reqwest::Client,
        base_url: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Uploads a JPEG still. The server names the file when `file_name` is `None`.
    pub async fn upload_jpeg(
        &self,
        jpeg: &[u8],
        file_name: Option<&str>,
    ) -> Result<PhotoReference, ClientError> {
        // ---
        let body = UploadPhotoRequest {
            photo: Some(format!("data:image/jpeg;base64,{}", BASE64.encode(jpeg))),
            file_name: file_name.map(str::to_string),
        };

        let response = self
            .http
            .post(self.url("/api/attendance/photo"))
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await?;

        let uploaded: UploadPhotoResponse = decode(response).await?;
        Ok(uploaded.photo_metadata)
    }

    pub async fn submit_claim(
        &self,
        descriptor: Vec<f32>,
        captured_at: DateTime<Utc>,
        photo: Option<PhotoReference>,
    ) -> Result<SubmitAttendanceResponse, ClientError> {
        // ---
        let body = SubmitAttendanceRequest {
            face_data: Some(FaceDataPayload {
                descriptor: Some(descriptor),
                timestamp: Some(captured_at),
                photo_metadata: photo,
            }),
        };

        let response = self
            .http
            .post(self.url("/api/attendance"))
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await?;

        decode(response).await
    }

    /// Submits a detection. `NoFace` events carry nothing to submit.
    pub async fn submit_event(
        &self,
        event: DetectionEvent,
    ) -> Option<Result<SubmitAttendanceResponse, ClientError>> {
        // ---
        match event {
            DetectionEvent::FaceDetected {
                descriptor,
                captured_at,
                photo,
            } => Some(self.submit_claim(descriptor, captured_at, photo).await),
            DetectionEvent::NoFace => None,
        }
    }

    pub async fn history(&self, query: &HistoryQuery) -> Result<Vec<AttendanceEntry>, ClientError> {
        // ---
        let response = self
            .http
            .get(self.url("/api/attendance"))
            .bearer_auth(&self.token)
            .query(query)
            .send()
            .await?;

        decode(response).await
    }
}

#[async_trait]
impl PhotoUploader for AttendanceClient {
    async fn upload_still(&self, jpeg: Vec<u8>) -> anyhow::Result<PhotoReference> {
        Ok(self.upload_jpeg(&jpeg, None).await?)
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
    // ---
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    let text = response.text().await.unwrap_or_default();
    let (message, kind) = match serde_json::from_str::<ErrorResponse>(&text) {
        Ok(body) => (body.error, body.kind),
        Err(_) => (text, None),
    };

    Err(ClientError::Rejected {
        status: status.as_u16(),
        message,
        kind,
    })
}
