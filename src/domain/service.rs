//! Attendance ingestion and query.
//!
//! `AttendanceService` owns every server-side decision about a check-in:
//! who the caller is, which day it counts for, whether it is on time, and who
//! may read it back afterwards.

use super::calendar::resolve_window;
use super::claim::FaceClaim;
use super::clock::ClockPtr;
use super::errors::{AttendanceError, InsertAttendanceError};
use super::metrics::MetricsPtr;
use super::models::{
    AttendanceEntry, AttendanceEvent, AttendanceFilter, AttendancePhoto, HistoryQuery,
    NewAttendance, UserSummary,
};
use super::policy::PunctualityPolicy;
use super::repository::RepositoryPtr;
use super::session::SessionInfo;
use tracing::{info, warn};
use uuid::Uuid;

/// A committed check-in together with its owner's identity.
#[derive(Debug, Clone)]
pub struct RecordedAttendance {
    // ---
    pub event: AttendanceEvent,
    pub user: UserSummary,
}

#[derive(Clone)]
pub struct AttendanceService {
    // ---
    repository: RepositoryPtr,
    clock: ClockPtr,
    policy: PunctualityPolicy,
    metrics: MetricsPtr,
}

impl AttendanceService {
    // ---
    pub fn new(
        repository: RepositoryPtr,
        clock: ClockPtr,
        policy: PunctualityPolicy,
        metrics: MetricsPtr,
    ) -> Self {
        Self {
            repository,
            clock,
            policy,
            metrics,
        }
    }

    pub fn repository(&self) -> &RepositoryPtr {
        &self.repository
    }

    pub fn policy(&self) -> PunctualityPolicy {
        self.policy
    }

    /// Record today's check-in for the caller.
    pub async fn record(
        &self,
        caller: &SessionInfo,
        claim: FaceClaim,
    ) -> Result<RecordedAttendance, AttendanceError> {
        // ---
        let user = self
            .repository
            .get_user_by_id(caller.user_id)
            .await?
            .ok_or(AttendanceError::Unauthorized)?;

        let now = self.clock.now();
        let day = now.date_naive();

        if self
            .repository
            .find_attendance_on(user.id, day)
            .await?
            .is_some()
        {
            warn!(username = %user.username, %day, "Attendance already recorded");
            self.metrics.record_duplicate_rejected();
            return Err(AttendanceError::DuplicateAttendance);
        }

        let status = self.policy.classify(now.time());
        let new = NewAttendance {
            user_id: user.id,
            day,
            status,
            photo: claim.photo().cloned(),
        };

        let event = match self.repository.insert_attendance(new).await {
            Ok(event) => event,
            Err(InsertAttendanceError::AlreadyRecorded { .. }) => {
                warn!(username = %user.username, %day, "Concurrent attendance rejected by constraint");
                self.metrics.record_duplicate_rejected();
                return Err(AttendanceError::DuplicateAttendance);
            }
            Err(InsertAttendanceError::Backend(e)) => return Err(AttendanceError::Internal(e)),
        };

        self.metrics.record_attendance(event.status);
        info!(
            username = %user.username,
            attendance_id = %event.id,
            status = %event.status,
            has_photo = event.has_photo,
            descriptor_len = claim.sample().descriptor.len(),
            "Attendance recorded"
        );

        Ok(RecordedAttendance {
            event,
            user: UserSummary::from(&user),
        })
    }

    /// Attendance history visible to the caller.
    ///
    /// Non-admin callers only ever see their own events, whatever `userId` they pass.
    pub async fn history(
        &self,
        caller: &SessionInfo,
        query: HistoryQuery,
    ) -> Result<Vec<AttendanceEntry>, AttendanceError> {
        // ---
        let user_id = if caller.role.is_admin() {
            query.user_id
        } else {
            Some(caller.user_id)
        };

        let today = self.clock.now().date_naive();
        let (from, to) = resolve_window(today, query.start_date, query.end_date);

        let filter = AttendanceFilter { user_id, from, to };
        let entries = self.repository.list_attendance(&filter).await?;

        Ok(entries)
    }

    /// Photo metadata of an event, for its owner or an admin.
    pub async fn photo(
        &self,
        caller: &SessionInfo,
        attendance_id: Uuid,
    ) -> Result<AttendancePhoto, AttendanceError> {
        // ---
        let event = self
            .repository
            .get_attendance(attendance_id)
            .await?
            .ok_or(AttendanceError::PhotoNotFound)?;

        if event.user_id != caller.user_id && !caller.role.is_admin() {
            return Err(AttendanceError::Forbidden(
                "photo belongs to another user".to_string(),
            ));
        }

        self.repository
            .get_photo(attendance_id)
            .await?
            .ok_or(AttendanceError::PhotoNotFound)
    }
}
