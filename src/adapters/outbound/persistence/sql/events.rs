use async_trait::async_trait;

use super::{db_error, event_from_row, write_error, SqlRepository, EVENT_COLUMNS};
use crate::{
    domain::{
        errors::{StorageError, StorageResult},
        models::{Event, PageRequest},
        value_objects::{AlcoholicId, EventId, InvitationLink},
    },
    ports::repositories::EventRepository,
};

const NOT_BANNED: &str = "NOT EXISTS (SELECT 1 FROM event_alcoholic ea \
     WHERE ea.event_id = e.id AND ea.alcoholic_id = $1 AND ea.is_banned)";

const JOINED: &str = "EXISTS (SELECT 1 FROM event_alcoholic ea \
     WHERE ea.event_id = e.id AND ea.alcoholic_id = $1 AND NOT ea.is_banned)";

impl SqlRepository {
    async fn list_events_where(
        &self,
        condition: &str,
        alcoholic_id: &AlcoholicId,
        page: &PageRequest,
    ) -> StorageResult<Vec<Event>> {
        let query = format!(
            "SELECT e.* FROM event e WHERE {} ORDER BY e.created_at DESC, e.id LIMIT $2 OFFSET $3",
            condition
        );
        let rows = sqlx::query(&query)
            .bind(alcoholic_id.as_uuid())
            .bind(i64::from(page.limit()))
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("listing events"))?;

        rows.iter().map(event_from_row).collect()
    }

    async fn count_events_where(
        &self,
        condition: &str,
        alcoholic_id: &AlcoholicId,
    ) -> StorageResult<u64> {
        let query = format!("SELECT COUNT(*) FROM event e WHERE {}", condition);
        let total: i64 = sqlx::query_scalar(&query)
            .bind(alcoholic_id.as_uuid())
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("counting events"))?;
        Ok(total.max(0) as u64)
    }
}

#[async_trait]
impl EventRepository for SqlRepository {
    async fn insert_event(&self, event: &Event) -> StorageResult<()> {
        sqlx::query(&format!(
            "INSERT INTO event ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
            EVENT_COLUMNS
        ))
        .bind(event.id.as_uuid())
        .bind(&event.title)
        .bind(&event.info)
        .bind(event.event_type.as_str())
        .bind(&event.location)
        .bind(event.start_time)
        .bind(event.end_time)
        .bind(event.created_by.as_uuid())
        .bind(event.main_photo_id.map(|id| id.as_uuid()))
        .bind(event.invitation_link.as_uuid())
        .bind(event.version)
        .bind(event.created_at)
        .execute(&self.pool)
        .await
        .map_err(write_error("event", "inserting event"))?;

        Ok(())
    }

    async fn get_event(&self, id: &EventId) -> StorageResult<Option<Event>> {
        let row = sqlx::query(&format!("SELECT {} FROM event WHERE id = $1", EVENT_COLUMNS))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("retrieving event"))?;

        row.as_ref().map(event_from_row).transpose()
    }

    async fn save_event(&self, event: &Event) -> StorageResult<Event> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE event
            SET title = $3, info = $4, location = $5, start_time = $6, end_time = $7,
                main_photo_id = $8, version = version + 1
            WHERE id = $1 AND version = $2
            RETURNING {}
            "#,
            EVENT_COLUMNS
        ))
        .bind(event.id.as_uuid())
        .bind(event.version)
        .bind(&event.title)
        .bind(&event.info)
        .bind(&event.location)
        .bind(event.start_time)
        .bind(event.end_time)
        .bind(event.main_photo_id.map(|id| id.as_uuid()))
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("updating event"))?;

        if let Some(row) = row {
            return event_from_row(&row);
        }

        // Nothing matched: tell a missing row apart from a stale version
        let actual: Option<i32> = sqlx::query_scalar("SELECT version FROM event WHERE id = $1")
            .bind(event.id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("reading event version"))?;

        match actual {
            Some(actual) => Err(StorageError::VersionConflict {
                event_id: event.id,
                expected: event.version,
                actual: Some(actual),
            }),
            None => Err(StorageError::RowNotFound {
                table: "event",
                id: event.id.to_string(),
            }),
        }
    }

    async fn delete_event(&self, id: &EventId) -> StorageResult<bool> {
        // Memberships follow through ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM event WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(db_error("deleting event"))?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_event_by_invitation(
        &self,
        link: &InvitationLink,
    ) -> StorageResult<Option<Event>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM event WHERE invitation_link = $1",
            EVENT_COLUMNS
        ))
        .bind(link.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("resolving invitation link"))?;

        row.as_ref().map(event_from_row).transpose()
    }

    async fn list_events_visible_to(
        &self,
        alcoholic_id: &AlcoholicId,
        page: &PageRequest,
    ) -> StorageResult<Vec<Event>> {
        self.list_events_where(NOT_BANNED, alcoholic_id, page).await
    }

    async fn count_events_visible_to(&self, alcoholic_id: &AlcoholicId) -> StorageResult<u64> {
        self.count_events_where(NOT_BANNED, alcoholic_id).await
    }

    async fn list_events_joined_by(
        &self,
        alcoholic_id: &AlcoholicId,
        page: &PageRequest,
    ) -> StorageResult<Vec<Event>> {
        self.list_events_where(JOINED, alcoholic_id, page).await
    }

    async fn count_events_joined_by(&self, alcoholic_id: &AlcoholicId) -> StorageResult<u64> {
        self.count_events_where(JOINED, alcoholic_id).await
    }
}
