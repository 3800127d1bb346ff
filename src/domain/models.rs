use anyhow::anyhow;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// MIME type recorded for every attendance photo.
pub const DEFAULT_PHOTO_MIME: &str = "image/jpeg";

/// Access level of a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    // ---
    Admin,
    User,
}

impl Role {
    // ---
    pub fn as_str(&self) -> &'static str {
        // ---
        match self {
            Role::Admin => "ADMIN",
            Role::User => "USER",
        }
    }

    pub fn is_admin(&self) -> bool {
        // ---
        matches!(self, Role::Admin)
    }
}

impl FromStr for Role {
    // ---
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // ---
        match s {
            "ADMIN" => Ok(Role::Admin),
            "USER" => Ok(Role::User),
            other => Err(anyhow!("unknown role: {other}")),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An employee account. Every attendance event references one.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    // ---
    pub id: Uuid,
    pub username: String,
    pub full_name: String,

    /// Argon2 PHC string. Never serialized.
    #[serde(skip)]
    pub password_hash: String,

    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl User {
    // ---
    pub fn new(username: String, full_name: String, password_hash: String, role: Role) -> Self {
        // ---
        Self {
            id: Uuid::new_v4(),
            username,
            full_name,
            password_hash,
            role,
            created_at: Utc::now(),
        }
    }
}

/// Persisted punctuality status of a check-in.
///
/// Reports treat a day without any event as absent; that state is never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AttendanceStatus {
    // ---
    Present,
    Late,
}

impl AttendanceStatus {
    // ---
    pub fn as_str(&self) -> &'static str {
        // ---
        match self {
            AttendanceStatus::Present => "PRESENT",
            AttendanceStatus::Late => "LATE",
        }
    }
}

impl FromStr for AttendanceStatus {
    // ---
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // ---
        match s {
            "PRESENT" => Ok(AttendanceStatus::Present),
            "LATE" => Ok(AttendanceStatus::Late),
            other => Err(anyhow!("unknown attendance status: {other}")),
        }
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Durable reference to a photo held in remote storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoReference {
    // ---
    pub file_id: String,
    pub url: String,
    pub file_size: i64,
}

/// One recorded check-in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceEvent {
    // ---
    pub id: Uuid,
    pub user_id: Uuid,

    /// Assigned by the storage layer at insert time.
    pub timestamp: DateTime<Utc>,

    /// Server-local calendar day the event counts for.
    pub day: NaiveDate,

    pub status: AttendanceStatus,
    pub has_photo: bool,
}

/// Photo metadata attached to exactly one attendance event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendancePhoto {
    // ---
    pub attendance_id: Uuid,
    pub file_id: String,
    pub url: String,
    pub mime_type: String,
    pub file_size: i64,
}

/// Insert request handed to the repository; event and photo are written together.
#[derive(Debug, Clone)]
pub struct NewAttendance {
    // ---
    pub user_id: Uuid,
    pub day: NaiveDate,
    pub status: AttendanceStatus,
    pub photo: Option<PhotoReference>,
}

/// Minimal user identity embedded in attendance responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    // ---
    pub username: String,
    pub full_name: String,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            username: user.username.clone(),
            full_name: user.full_name.clone(),
        }
    }
}

/// History row: an event joined with its owner's identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceEntry {
    // ---
    pub id: Uuid,
    pub user_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub day: NaiveDate,
    pub status: AttendanceStatus,
    pub has_photo: bool,
    pub user: UserSummary,
}

/// Repository-level history filter. Date bounds are inclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttendanceFilter {
    // ---
    pub user_id: Option<Uuid>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

/// Caller-supplied history parameters (`?userId=&startDate=&endDate=`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryQuery {
    // ---
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}
