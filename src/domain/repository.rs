use super::errors::InsertAttendanceError;
use super::models::{
    AttendanceEntry, AttendanceEvent, AttendanceFilter, AttendancePhoto, NewAttendance, User,
};
use anyhow::Result;
use chrono::NaiveDate;
use std::sync::Arc;
use uuid::Uuid;

/// Abstraction for user and attendance persistence.
#[async_trait::async_trait]
pub trait Repository: Send + Sync {
    // ---
    /// Store a new user account.
    async fn create_user(&self, user: User) -> Result<User>;

    /// Get user by username.
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Get user by ID.
    async fn get_user_by_id(&self, user_id: Uuid) -> Result<Option<User>>;

    /// Find the event a user already has for a given day, if any.
    async fn find_attendance_on(&self, user_id: Uuid, day: NaiveDate)
        -> Result<Option<AttendanceEvent>>;

    /// Insert an event and its optional photo atomically.
    ///
    /// The event timestamp is assigned here. A second event for the same
    /// (user, day) fails with [`InsertAttendanceError::AlreadyRecorded`] and
    /// leaves no partial state behind.
    async fn insert_attendance(
        &self,
        new: NewAttendance,
    ) -> std::result::Result<AttendanceEvent, InsertAttendanceError>;

    /// Get a single event by ID.
    async fn get_attendance(&self, id: Uuid) -> Result<Option<AttendanceEvent>>;

    /// Events matching the filter, newest first, each joined with its owner.
    async fn list_attendance(&self, filter: &AttendanceFilter) -> Result<Vec<AttendanceEntry>>;

    /// Photo metadata attached to an event, if any.
    async fn get_photo(&self, attendance_id: Uuid) -> Result<Option<AttendancePhoto>>;

    /// Cheap liveness check of the backing store.
    async fn ping(&self) -> Result<()>;
}

/// Type alias for any backend that implements Repository.
pub type RepositoryPtr = Arc<dyn Repository>;
