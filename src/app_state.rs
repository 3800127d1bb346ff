//! Application state management.
//!
//! `AppState` is the dependency-injection container handed to every Axum
//! handler through the `State` extractor. Each field is an `Arc`-backed
//! abstraction, so cloning per request is cheap and handlers never see
//! concrete backends.

use crate::domain::{AttendanceService, MetricsPtr, PhotoStoragePtr, SessionStorePtr};
use crate::infrastructure::ConsentFlow;
use std::sync::Arc;

/// Shared application state passed to all Axum handlers.
///
/// Built once at startup (or by tests with fakes) and never mutated.
#[derive(Clone)]
pub struct AppState {
    /// Ingestion and query rules over the repository, clock and punctuality policy.
    service: AttendanceService,

    /// Resolves bearer tokens to caller identities.
    sessions: SessionStorePtr,

    /// Remote photo storage (Google Drive in production).
    storage: PhotoStoragePtr,

    /// Administrative OAuth consent exchange for the storage credential.
    consent: Arc<ConsentFlow>,

    /// Either Prometheus-backed or no-op.
    metrics: MetricsPtr,
}

impl AppState {
    // ---

    pub fn new(
        service: AttendanceService,
        sessions: SessionStorePtr,
        storage: PhotoStoragePtr,
        consent: Arc<ConsentFlow>,
        metrics: MetricsPtr,
    ) -> Self {
        // ---
        AppState {
            service,
            sessions,
            storage,
            consent,
            metrics,
        }
    }

    pub(crate) fn service(&self) -> &AttendanceService {
        &self.service
    }

    pub(crate) fn sessions(&self) -> &SessionStorePtr {
        &self.sessions
    }

    pub(crate) fn storage(&self) -> &PhotoStoragePtr {
        &self.storage
    }

    pub(crate) fn consent(&self) -> &ConsentFlow {
        &self.consent
    }

    pub(crate) fn metrics(&self) -> &MetricsPtr {
        &self.metrics
    }
}
