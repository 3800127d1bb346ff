use anyhow::{anyhow, Result};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::domain::{
    AttendanceEntry, AttendanceEvent, AttendanceFilter, AttendancePhoto, InsertAttendanceError,
    NewAttendance, Repository, User, UserSummary, DEFAULT_PHOTO_MIME,
};

/// Name of the (user_id, attendance_day) uniqueness constraint in the migration.
const USER_DAY_CONSTRAINT: &str = "attendance_events_user_day_key";

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    username: String,
    full_name: String,
    password_hash: String,
    role: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = anyhow::Error;

    fn try_from(r: UserRow) -> Result<Self> {
        // ---
        Ok(User {
            id: r.id,
            username: r.username,
            full_name: r.full_name,
            password_hash: r.password_hash,
            role: r.role.parse()?,
            created_at: r.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct EventRow {
    id: Uuid,
    user_id: Uuid,
    recorded_at: DateTime<Utc>,
    attendance_day: NaiveDate,
    status: String,
    has_photo: bool,
}

impl TryFrom<EventRow> for AttendanceEvent {
    type Error = anyhow::Error;

    fn try_from(r: EventRow) -> Result<Self> {
        // ---
        Ok(AttendanceEvent {
            id: r.id,
            user_id: r.user_id,
            timestamp: r.recorded_at,
            day: r.attendance_day,
            status: r.status.parse()?,
            has_photo: r.has_photo,
        })
    }
}

#[derive(sqlx::FromRow)]
struct EntryRow {
    id: Uuid,
    user_id: Uuid,
    recorded_at: DateTime<Utc>,
    attendance_day: NaiveDate,
    status: String,
    has_photo: bool,
    username: String,
    full_name: String,
}

impl TryFrom<EntryRow> for AttendanceEntry {
    type Error = anyhow::Error;

    fn try_from(r: EntryRow) -> Result<Self> {
        // ---
        Ok(AttendanceEntry {
            id: r.id,
            user_id: r.user_id,
            timestamp: r.recorded_at,
            day: r.attendance_day,
            status: r.status.parse()?,
            has_photo: r.has_photo,
            user: UserSummary {
                username: r.username,
                full_name: r.full_name,
            },
        })
    }
}

#[derive(sqlx::FromRow)]
struct PhotoRow {
    attendance_id: Uuid,
    file_id: String,
    url: String,
    mime_type: String,
    file_size: i64,
}

const USER_COLUMNS: &str = "id, username, full_name, password_hash, role, created_at";

const EVENT_SELECT: &str = "SELECT e.id, e.user_id, e.recorded_at, e.attendance_day, e.status,
            (p.attendance_id IS NOT NULL) AS has_photo
     FROM attendance_events e
     LEFT JOIN attendance_photos p ON p.attendance_id = e.id";

pub struct PostgresRepository {
    // ---
    pool: PgPool,
}

impl PostgresRepository {
    // ---
    pub fn new(pool: PgPool) -> Self {
        // ---
        Self { pool }
    }
}

/// True when the error is the (user, day) unique violation.
fn is_user_day_violation(err: &sqlx::Error) -> bool {
    // ---
    match err {
        sqlx::Error::Database(db_err) => {
            db_err.is_unique_violation() && db_err.constraint() == Some(USER_DAY_CONSTRAINT)
        }
        _ => false,
    }
}

#[async_trait::async_trait]
impl Repository for PostgresRepository {
    // ---
    async fn create_user(&self, user: User) -> Result<User> {
        // ---
        sqlx::query(
            "INSERT INTO users (id, username, full_name, password_hash, role, created_at)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.full_name)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.created_at)
        .execute(&self.pool)
        .await?;

        Ok(user)
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        // ---
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    async fn get_user_by_id(&self, user_id: Uuid) -> Result<Option<User>> {
        // ---
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    async fn find_attendance_on(
        &self,
        user_id: Uuid,
        day: NaiveDate,
    ) -> Result<Option<AttendanceEvent>> {
        // ---
        let row = sqlx::query_as::<_, EventRow>(&format!(
            "{EVENT_SELECT} WHERE e.user_id = $1 AND e.attendance_day = $2"
        ))
        .bind(user_id)
        .bind(day)
        .fetch_optional(&self.pool)
        .await?;

        row.map(AttendanceEvent::try_from).transpose()
    }

    async fn insert_attendance(
        &self,
        new: NewAttendance,
    ) -> std::result::Result<AttendanceEvent, InsertAttendanceError> {
        // ---
        let id = Uuid::new_v4();
        let mut tx = self.pool.begin().await.map_err(anyhow::Error::from)?;

        let inserted = sqlx::query_scalar::<_, DateTime<Utc>>(
            "INSERT INTO attendance_events (id, user_id, attendance_day, status)
             VALUES ($1, $2, $3, $4)
             RETURNING recorded_at",
        )
        .bind(id)
        .bind(new.user_id)
        .bind(new.day)
        .bind(new.status.as_str())
        .fetch_one(&mut *tx)
        .await;

        let recorded_at = match inserted {
            Ok(ts) => ts,
            Err(e) if is_user_day_violation(&e) => {
                return Err(InsertAttendanceError::AlreadyRecorded {
                    user_id: new.user_id,
                    day: new.day,
                });
            }
            Err(e) => return Err(anyhow::Error::from(e).into()),
        };

        if let Some(photo) = &new.photo {
            // ---
            sqlx::query(
                "INSERT INTO attendance_photos (attendance_id, file_id, url, mime_type, file_size)
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(id)
            .bind(&photo.file_id)
            .bind(&photo.url)
            .bind(DEFAULT_PHOTO_MIME)
            .bind(photo.file_size)
            .execute(&mut *tx)
            .await
            .map_err(|e| anyhow!("Failed to store attendance photo: {e}"))?;
        }

        tx.commit().await.map_err(anyhow::Error::from)?;

        Ok(AttendanceEvent {
            id,
            user_id: new.user_id,
            timestamp: recorded_at,
            day: new.day,
            status: new.status,
            has_photo: new.photo.is_some(),
        })
    }

    async fn get_attendance(&self, id: Uuid) -> Result<Option<AttendanceEvent>> {
        // ---
        let row = sqlx::query_as::<_, EventRow>(&format!("{EVENT_SELECT} WHERE e.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(AttendanceEvent::try_from).transpose()
    }

    async fn list_attendance(&self, filter: &AttendanceFilter) -> Result<Vec<AttendanceEntry>> {
        // ---
        let mut query: QueryBuilder<Postgres> = QueryBuilder::new(
            "SELECT e.id, e.user_id, e.recorded_at, e.attendance_day, e.status,
                    (p.attendance_id IS NOT NULL) AS has_photo,
                    u.username, u.full_name
             FROM attendance_events e
             JOIN users u ON u.id = e.user_id
             LEFT JOIN attendance_photos p ON p.attendance_id = e.id
             WHERE TRUE",
        );

        if let Some(user_id) = filter.user_id {
            query.push(" AND e.user_id = ").push_bind(user_id);
        }
        if let Some(from) = filter.from {
            query.push(" AND e.attendance_day >= ").push_bind(from);
        }
        if let Some(to) = filter.to {
            query.push(" AND e.attendance_day <= ").push_bind(to);
        }
        query.push(" ORDER BY e.recorded_at DESC, e.id DESC");

        let rows = query
            .build_query_as::<EntryRow>()
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(AttendanceEntry::try_from).collect()
    }

    async fn get_photo(&self, attendance_id: Uuid) -> Result<Option<AttendancePhoto>> {
        // ---
        let row = sqlx::query_as::<_, PhotoRow>(
            "SELECT attendance_id, file_id, url, mime_type, file_size
             FROM attendance_photos WHERE attendance_id = $1",
        )
        .bind(attendance_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| AttendancePhoto {
            attendance_id: r.attendance_id,
            file_id: r.file_id,
            url: r.url,
            mime_type: r.mime_type,
            file_size: r.file_size,
        }))
    }

    async fn ping(&self) -> Result<()> {
        // ---
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
