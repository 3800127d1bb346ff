//! In-process repository backend.
//!
//! Holds everything behind one `RwLock` and applies the same constraints as the
//! PostgreSQL schema: unique usernames, one event per (user, day) and
//! non-negative photo sizes. Checks run before any mutation, so a rejected
//! insert leaves no partial state.

use crate::domain::{
    AttendanceEntry, AttendanceEvent, AttendanceFilter, AttendancePhoto, ClockPtr,
    InsertAttendanceError, NewAttendance, Repository, RepositoryPtr, User, UserSummary,
    DEFAULT_PHOTO_MIME,
};
use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct Tables {
    // ---
    users: HashMap<Uuid, User>,
    events: HashMap<Uuid, AttendanceEvent>,
    photos: HashMap<Uuid, AttendancePhoto>,
}

pub struct MemoryRepository {
    // ---
    clock: ClockPtr,
    tables: RwLock<Tables>,
}

impl MemoryRepository {
    // ---
    /// `clock` stamps inserted events, standing in for the database's `now()`.
    pub fn new(clock: ClockPtr) -> Self {
        Self {
            clock,
            tables: RwLock::new(Tables::default()),
        }
    }
}

/// Creates an empty in-memory repository.
pub fn create_memory_repository(clock: ClockPtr) -> RepositoryPtr {
    // ---
    tracing::info!("Using in-memory repository");
    Arc::new(MemoryRepository::new(clock))
}

#[async_trait::async_trait]
impl Repository for MemoryRepository {
    // ---
    async fn create_user(&self, user: User) -> Result<User> {
        // ---
        let mut tables = self.tables.write().await;

        if tables.users.values().any(|u| u.username == user.username) {
            return Err(anyhow!("username already exists: {}", user.username));
        }

        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        // ---
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.username == username).cloned())
    }

    async fn get_user_by_id(&self, user_id: Uuid) -> Result<Option<User>> {
        // ---
        let tables = self.tables.read().await;
        Ok(tables.users.get(&user_id).cloned())
    }

    async fn find_attendance_on(
        &self,
        user_id: Uuid,
        day: NaiveDate,
    ) -> Result<Option<AttendanceEvent>> {
        // ---
        let tables = self.tables.read().await;
        Ok(tables
            .events
            .values()
            .find(|e| e.user_id == user_id && e.day == day)
            .cloned())
    }

    async fn insert_attendance(
        &self,
        new: NewAttendance,
    ) -> std::result::Result<AttendanceEvent, InsertAttendanceError> {
        // ---
        let mut tables = self.tables.write().await;

        if !tables.users.contains_key(&new.user_id) {
            return Err(anyhow!("attendance references unknown user {}", new.user_id).into());
        }

        if tables
            .events
            .values()
            .any(|e| e.user_id == new.user_id && e.day == new.day)
        {
            return Err(InsertAttendanceError::AlreadyRecorded {
                user_id: new.user_id,
                day: new.day,
            });
        }

        if let Some(photo) = &new.photo {
            if photo.file_size < 0 {
                return Err(anyhow!(
                    "Failed to store attendance photo: negative file size {}",
                    photo.file_size
                )
                .into());
            }
        }

        let event = AttendanceEvent {
            id: Uuid::new_v4(),
            user_id: new.user_id,
            timestamp: self.clock.now().to_utc(),
            day: new.day,
            status: new.status,
            has_photo: new.photo.is_some(),
        };

        if let Some(photo) = new.photo {
            tables.photos.insert(
                event.id,
                AttendancePhoto {
                    attendance_id: event.id,
                    file_id: photo.file_id,
                    url: photo.url,
                    mime_type: DEFAULT_PHOTO_MIME.to_string(),
                    file_size: photo.file_size,
                },
            );
        }
        tables.events.insert(event.id, event.clone());

        Ok(event)
    }

    async fn get_attendance(&self, id: Uuid) -> Result<Option<AttendanceEvent>> {
        // ---
        let tables = self.tables.read().await;
        Ok(tables.events.get(&id).cloned())
    }

    async fn list_attendance(&self, filter: &AttendanceFilter) -> Result<Vec<AttendanceEntry>> {
        // ---
        let tables = self.tables.read().await;

        let mut entries = tables
            .events
            .values()
            .filter(|e| filter.user_id.map_or(true, |id| e.user_id == id))
            .filter(|e| filter.from.map_or(true, |from| e.day >= from))
            .filter(|e| filter.to.map_or(true, |to| e.day <= to))
            .map(|e| {
                let user = tables
                    .users
                    .get(&e.user_id)
                    .ok_or_else(|| anyhow!("attendance {} has no owner", e.id))?;
                Ok(AttendanceEntry {
                    id: e.id,
                    user_id: e.user_id,
                    timestamp: e.timestamp,
                    day: e.day,
                    status: e.status,
                    has_photo: e.has_photo,
                    user: UserSummary::from(user),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
        Ok(entries)
    }

    async fn get_photo(&self, attendance_id: Uuid) -> Result<Option<AttendancePhoto>> {
        // ---
        let tables = self.tables.read().await;
        Ok(tables.photos.get(&attendance_id).cloned())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
