use super::errors::{classify_failure, transport};
use crate::config::DriveConfig;
use crate::domain::{PhotoStorage, StorageError, StoredFile};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

const UPLOAD_FIELDS: &str = "id,webViewLink,webContentLink";

#[derive(Debug, Deserialize)]
struct AccessTokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DriveFile {
    id: String,
    web_view_link: Option<String>,
    web_content_link: Option<String>,
}

/// Drive v3 client authenticated with a long-lived refresh token.
///
/// Every call performs its own refresh → access token exchange; access tokens
/// are never cached between requests.
pub struct GoogleDriveStorage {
    // ---
    config: DriveConfig,
    http: reqwest::Client,
}

impl GoogleDriveStorage {
    // ---
    /// `{files_url}/{file_id}`, with the id percent-encoded as a single path segment.
    fn file_url(&self, file_id: &str) -> Result<reqwest::Url, StorageError> {
        // ---
        let invalid =
            || StorageError::Unknown(format!("invalid files URL: {}", self.config.files_url));

        let mut url = reqwest::Url::parse(&self.config.files_url).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|_| invalid())?
            .pop_if_empty()
            .push(file_id);
        Ok(url)
    }

    pub fn new(config: DriveConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    async fn access_token(&self) -> Result<String, StorageError> {
        // ---
        let refresh_token = self
            .config
            .refresh_token
            .as_deref()
            .ok_or(StorageError::CredentialRejected)?;

        let form = [
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ];

        let response = self
            .http
            .post(&self.config.token_url)
            .form(&form)
            .send()
            .await
            .map_err(transport)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!("Google token refresh failed: HTTP {status}");
            return Err(classify_failure(status, &body));
        }

        let token: AccessTokenResponse = response.json().await.map_err(transport)?;
        tracing::debug!(expires_in = ?token.expires_in, "Access token refreshed");

        Ok(token.access_token)
    }

    /// Builds a `multipart/related` body: JSON metadata part then media part.
    fn multipart_body(
        &self,
        boundary: &str,
        bytes: &[u8],
        file_name: &str,
        mime_type: &str,
    ) -> Vec<u8> {
        // ---
        let mut metadata = json!({ "name": file_name, "mimeType": mime_type });
        if let Some(folder) = &self.config.folder_id {
            metadata["parents"] = json!([folder]);
        }

        let mut body = Vec::with_capacity(bytes.len() + 512);
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n{metadata}\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(
            format!("--{boundary}\r\nContent-Type: {mime_type}\r\n\r\n").as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
        body
    }
}

#[async_trait::async_trait]
impl PhotoStorage for GoogleDriveStorage {
    // ---
    async fn upload(
        &self,
        bytes: Vec<u8>,
        file_name: &str,
        mime_type: &str,
    ) -> Result<StoredFile, StorageError> {
        // ---
        let access_token = self.access_token().await?;

        let boundary = format!("attendance-{}", Uuid::new_v4().simple());
        let body = self.multipart_body(&boundary, &bytes, file_name, mime_type);

        let response = self
            .http
            .post(&self.config.upload_url)
            .query(&[("uploadType", "multipart"), ("fields", UPLOAD_FIELDS)])
            .bearer_auth(&access_token)
            .header(
                reqwest::header::CONTENT_TYPE,
                format!("multipart/related; boundary={boundary}"),
            )
            .body(body)
            .send()
            .await
            .map_err(transport)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!("Drive upload of {file_name} failed: HTTP {status}");
            return Err(classify_failure(status, &body));
        }

        let file: DriveFile = response.json().await.map_err(transport)?;
        let web_view_link = file.web_view_link.ok_or_else(|| {
            StorageError::Unknown(format!("Drive response for {} has no webViewLink", file.id))
        })?;

        tracing::info!(file_id = %file.id, size = bytes.len(), "Photo uploaded to Drive");

        Ok(StoredFile {
            file_id: file.id,
            web_view_link,
            web_content_link: file.web_content_link,
        })
    }

    async fn download(&self, file_id: &str) -> Result<Vec<u8>, StorageError> {
        // ---
        let url = self.file_url(file_id)?;
        let access_token = self.access_token().await?;

        let response = self
            .http
            .get(url)
            .query(&[("alt", "media")])
            .bearer_auth(&access_token)
            .send()
            .await
            .map_err(transport)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!("Drive download of {file_id} failed: HTTP {status}");
            return Err(classify_failure(status, &body));
        }

        let bytes = response.bytes().await.map_err(transport)?;
        Ok(bytes.to_vec())
    }
}
