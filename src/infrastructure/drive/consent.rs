use super::errors::{classify_failure, transport};
use crate::config::DriveConfig;
use crate::domain::StorageError;
use anyhow::{Context, Result};
use serde::Deserialize;

/// Drive scope limited to files this application creates.
pub const DRIVE_FILE_SCOPE: &str = "https://www.googleapis.com/auth/drive.file";

/// Tokens returned by the authorization-code exchange.
#[derive(Debug, Clone, Deserialize)]
pub struct ConsentTokens {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
}

/// Administrative OAuth consent: build the authorization URL and trade the
/// returned code for a refresh token to put into `GOOGLE_REFRESH_TOKEN`.
pub struct ConsentFlow {
    // ---
    config: DriveConfig,
    http: reqwest::Client,
}

impl ConsentFlow {
    // ---
    pub fn new(config: DriveConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    /// Authorization URL requesting offline access with forced consent, so
    /// Google always issues a refresh token.
    pub fn authorization_url(&self) -> Result<String> {
        // ---
        let url = reqwest::Url::parse_with_params(
            &self.config.auth_url,
            &[
                ("client_id", self.config.client_id.as_str()),
                ("redirect_uri", self.config.redirect_uri.as_str()),
                ("response_type", "code"),
                ("access_type", "offline"),
                ("prompt", "consent"),
                ("scope", DRIVE_FILE_SCOPE),
            ],
        )
        .with_context(|| format!("Invalid OAuth authorization URL: {}", self.config.auth_url))?;

        Ok(url.into())
    }

    pub async fn exchange_code(&self, code: &str) -> Result<ConsentTokens, StorageError> {
        // ---
        let form = [
            ("code", code),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("grant_type", "authorization_code"),
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
            tracing::warn!("Authorization code exchange failed: HTTP {status}");
            return Err(classify_failure(status, &body));
        }

        let tokens: ConsentTokens = response.json().await.map_err(transport)?;
        tracing::info!(
            refresh_token_present = tokens.refresh_token.is_some(),
            "Authorization code exchanged"
        );

        Ok(tokens)
    }
}
