//! PostgreSQL implementation of the repository ports.

mod events;
mod memberships;
mod photos;

use chrono::{DateTime, Utc};
use sqlx::{postgres::PgRow, PgPool, Row};
use uuid::Uuid;

use crate::domain::{
    errors::{StorageError, StorageResult},
    models::{Event, EventType, Membership, Photo, PhotoType},
};

const MIGRATIONS: [&str; 6] = [
    r#"
    CREATE TABLE IF NOT EXISTS event (
        id UUID PRIMARY KEY,
        title VARCHAR NOT NULL,
        info TEXT NOT NULL DEFAULT '',
        type VARCHAR NOT NULL,
        location VARCHAR NOT NULL DEFAULT '',
        start_time TIMESTAMPTZ NOT NULL,
        end_time TIMESTAMPTZ NOT NULL,
        created_by UUID NOT NULL,
        main_photo_id UUID,
        invitation_link UUID NOT NULL UNIQUE,
        version INTEGER NOT NULL DEFAULT 0,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS event_photo (
        id UUID PRIMARY KEY,
        event_id UUID NOT NULL,
        object_id UUID NOT NULL,
        type VARCHAR NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_event_photo_event ON event_photo(event_id, created_at, id)",
    r#"
    CREATE TABLE IF NOT EXISTS event_alcoholic (
        id UUID PRIMARY KEY,
        event_id UUID NOT NULL REFERENCES event(id) ON DELETE CASCADE,
        alcoholic_id UUID NOT NULL,
        is_banned BOOLEAN NOT NULL DEFAULT FALSE,
        UNIQUE (event_id, alcoholic_id)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_event_alcoholic_alcoholic ON event_alcoholic(alcoholic_id)",
    "CREATE INDEX IF NOT EXISTS idx_event_created_at ON event(created_at DESC, id)",
];

const EVENT_COLUMNS: &str = "id, title, info, type, location, start_time, end_time, created_by, \
     main_photo_id, invitation_link, version, created_at";

const PHOTO_COLUMNS: &str = "id, event_id, object_id, type, created_at";

const MEMBERSHIP_COLUMNS: &str = "id, event_id, alcoholic_id, is_banned";

/// SQL-based implementation of the event, photo and membership repositories
#[derive(Clone)]
pub struct SqlRepository {
    pool: PgPool,
}

impl SqlRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Initialize database tables
    pub async fn migrate(&self) -> Result<(), sqlx::Error> {
        for statement in MIGRATIONS {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }
}

fn db_error(context: &'static str) -> impl FnOnce(sqlx::Error) -> StorageError {
    move |e| StorageError::InfrastructureError {
        message: format!("Database error {}: {}", context, e),
        source: Some(e.to_string()),
    }
}

/// Like [`db_error`], but reports unique violations as `DuplicateRow`
fn write_error(table: &'static str, context: &'static str) -> impl FnOnce(sqlx::Error) -> StorageError {
    move |e| match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => StorageError::DuplicateRow {
            table,
            message: db.message().to_string(),
        },
        _ => db_error(context)(e),
    }
}

fn column<'r, T>(row: &'r PgRow, name: &str) -> StorageResult<T>
where
    T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
{
    row.try_get(name).map_err(|e| StorageError::InternalError {
        message: format!("Failed to read column '{}': {}", name, e),
    })
}

fn event_from_row(row: &PgRow) -> StorageResult<Event> {
    let event_type: String = column(row, "type")?;
    let event_type: EventType = event_type.parse().map_err(|e| StorageError::InternalError {
        message: format!("Invalid event row: {}", e),
    })?;

    Ok(Event {
        id: column::<Uuid>(row, "id")?.into(),
        title: column(row, "title")?,
        info: column(row, "info")?,
        event_type,
        location: column(row, "location")?,
        start_time: column::<DateTime<Utc>>(row, "start_time")?,
        end_time: column::<DateTime<Utc>>(row, "end_time")?,
        created_by: column::<Uuid>(row, "created_by")?.into(),
        main_photo_id: column::<Option<Uuid>>(row, "main_photo_id")?.map(Into::into),
        invitation_link: column::<Uuid>(row, "invitation_link")?.into(),
        version: column(row, "version")?,
        created_at: column::<DateTime<Utc>>(row, "created_at")?,
    })
}

fn photo_type_from_str(value: &str) -> StorageResult<PhotoType> {
    value.parse().map_err(|e| StorageError::InternalError {
        message: format!("Invalid photo row: {}", e),
    })
}

fn photo_from_row(row: &PgRow) -> StorageResult<Photo> {
    let photo_type: String = column(row, "type")?;
    Ok(Photo {
        id: column::<Uuid>(row, "id")?.into(),
        event_id: column::<Uuid>(row, "event_id")?.into(),
        object_id: column::<Uuid>(row, "object_id")?.into(),
        photo_type: photo_type_from_str(&photo_type)?,
        created_at: column::<DateTime<Utc>>(row, "created_at")?,
    })
}

fn membership_from_row(row: &PgRow) -> StorageResult<Membership> {
    Ok(Membership {
        id: column::<Uuid>(row, "id")?.into(),
        event_id: column::<Uuid>(row, "event_id")?.into(),
        alcoholic_id: column::<Uuid>(row, "alcoholic_id")?.into(),
        banned: column(row, "is_banned")?,
    })
}
