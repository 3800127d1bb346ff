use crate::domain::StorageError;
use reqwest::StatusCode;

const MAX_DETAIL_LEN: usize = 200;

/// Maps a failed Google response to a [`StorageError`].
///
/// The token endpoint reports revoked or expired refresh tokens as
/// `400 invalid_grant`; Drive reports exhausted storage as `403` with a
/// `storageQuotaExceeded` reason and throttling as `429` or `403 rateLimitExceeded`.
pub(super) fn classify_failure(status: StatusCode, body: &str) -> StorageError {
    // ---
    let credential_markers = ["invalid_grant", "invalid_client", "unauthorized_client"];
    let quota_markers = [
        "storageQuotaExceeded",
        "quotaExceeded",
        "rateLimitExceeded",
        "userRateLimitExceeded",
    ];

    if status == StatusCode::UNAUTHORIZED
        || credential_markers.iter().any(|m| body.contains(m))
    {
        return StorageError::CredentialRejected;
    }

    if status == StatusCode::TOO_MANY_REQUESTS || quota_markers.iter().any(|m| body.contains(m)) {
        return StorageError::QuotaExceeded;
    }

    let mut detail: String = body.chars().take(MAX_DETAIL_LEN).collect();
    if detail.len() < body.len() {
        detail.push_str("...");
    }
    StorageError::Unknown(format!("HTTP {status}: {detail}"))
}

/// Network-level failure (DNS, refused connection, malformed response).
pub(super) fn transport(err: reqwest::Error) -> StorageError {
    StorageError::Unknown(format!("request to Google failed: {err}"))
}
