use async_trait::async_trait;

use super::{db_error, photo_from_row, photo_type_from_str, SqlRepository, PHOTO_COLUMNS};
use crate::{
    domain::{
        errors::{StorageError, StorageResult},
        models::{Photo, PhotoType},
        value_objects::{EventId, PhotoId},
    },
    ports::repositories::PhotoRepository,
};

fn type_names(types: &[PhotoType]) -> Vec<&'static str> {
    types.iter().map(PhotoType::as_str).collect()
}

fn upsert_sql() -> String {
    format!(
        r#"
        INSERT INTO event_photo ({})
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (id)
        DO UPDATE SET type = EXCLUDED.type
        "#,
        PHOTO_COLUMNS
    )
}

#[async_trait]
impl PhotoRepository for SqlRepository {
    async fn save_photo(&self, photo: &Photo) -> StorageResult<()> {
        sqlx::query(&upsert_sql())
            .bind(photo.id.as_uuid())
            .bind(photo.event_id.as_uuid())
            .bind(photo.object_id.as_uuid())
            .bind(photo.photo_type.as_str())
            .bind(photo.created_at)
            .execute(&self.pool)
            .await
            .map_err(db_error("storing photo"))?;

        Ok(())
    }

    async fn save_photos(&self, photos: &[Photo]) -> StorageResult<()> {
        let sql = upsert_sql();
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("starting transaction"))?;

        for photo in photos {
            sqlx::query(&sql)
                .bind(photo.id.as_uuid())
                .bind(photo.event_id.as_uuid())
                .bind(photo.object_id.as_uuid())
                .bind(photo.photo_type.as_str())
                .bind(photo.created_at)
                .execute(&mut *tx)
                .await
                .map_err(db_error("storing photos"))?;
        }

        tx.commit().await.map_err(db_error("committing photos"))?;
        Ok(())
    }

    async fn get_photo(&self, id: &PhotoId) -> StorageResult<Option<Photo>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM event_photo WHERE id = $1",
            PHOTO_COLUMNS
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("retrieving photo"))?;

        row.as_ref().map(photo_from_row).transpose()
    }

    async fn find_photos_by_event(
        &self,
        event_id: &EventId,
        exclude: &[PhotoType],
    ) -> StorageResult<Vec<Photo>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {} FROM event_photo
            WHERE event_id = $1 AND NOT (type = ANY($2))
            ORDER BY created_at ASC, id ASC
            "#,
            PHOTO_COLUMNS
        ))
        .bind(event_id.as_uuid())
        .bind(type_names(exclude))
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("listing photos"))?;

        rows.iter().map(photo_from_row).collect()
    }

    async fn find_oldest_photo_by_event(
        &self,
        event_id: &EventId,
        exclude: &[PhotoType],
    ) -> StorageResult<Option<Photo>> {
        let row = sqlx::query(&format!(
            r#"
            SELECT {} FROM event_photo
            WHERE event_id = $1 AND NOT (type = ANY($2))
            ORDER BY created_at ASC, id ASC
            LIMIT 1
            "#,
            PHOTO_COLUMNS
        ))
        .bind(event_id.as_uuid())
        .bind(type_names(exclude))
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("finding oldest photo"))?;

        row.as_ref().map(photo_from_row).transpose()
    }

    async fn transition_photo_type(
        &self,
        id: &PhotoId,
        from: PhotoType,
        to: PhotoType,
    ) -> StorageResult<Photo> {
        let row = sqlx::query(&format!(
            "UPDATE event_photo SET type = $3 WHERE id = $1 AND type = $2 RETURNING {}",
            PHOTO_COLUMNS
        ))
        .bind(id.as_uuid())
        .bind(from.as_str())
        .bind(to.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("updating photo type"))?;

        if let Some(row) = row {
            return photo_from_row(&row);
        }

        let actual: Option<String> = sqlx::query_scalar("SELECT type FROM event_photo WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("reading photo type"))?;

        match actual {
            Some(actual) => Err(StorageError::PhotoTypeConflict {
                photo_id: *id,
                expected: from,
                actual: photo_type_from_str(&actual)?,
                attempted: to,
            }),
            None => Err(StorageError::RowNotFound {
                table: "event_photo",
                id: id.to_string(),
            }),
        }
    }
}
