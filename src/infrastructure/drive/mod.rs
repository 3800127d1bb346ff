//! Google Drive photo storage and the OAuth consent exchange that feeds it.

mod client;
mod consent;
mod errors;

pub use client::GoogleDriveStorage;
pub use consent::ConsentFlow;

use crate::config::DriveConfig;
use crate::domain::PhotoStoragePtr;
use std::sync::Arc;

/// Creates the Drive-backed photo storage.
pub fn create_drive_storage(config: &DriveConfig) -> PhotoStoragePtr {
    // ---
    if config.refresh_token.is_none() {
        tracing::warn!("GOOGLE_REFRESH_TOKEN is not set; photo uploads will be rejected");
    }
    Arc::new(GoogleDriveStorage::new(config.clone()))
}

/// Creates the consent flow used to mint a new refresh token.
pub fn create_consent_flow(config: &DriveConfig) -> Arc<ConsentFlow> {
    Arc::new(ConsentFlow::new(config.clone()))
}
