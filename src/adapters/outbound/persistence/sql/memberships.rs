use async_trait::async_trait;

use super::{db_error, membership_from_row, write_error, SqlRepository, MEMBERSHIP_COLUMNS};
use crate::{
    domain::{
        errors::StorageResult,
        models::Membership,
        value_objects::{AlcoholicId, EventId, MembershipId},
    },
    ports::repositories::MembershipRepository,
};

fn insert_sql() -> String {
    format!(
        "INSERT INTO event_alcoholic ({}) VALUES ($1, $2, $3, $4)",
        MEMBERSHIP_COLUMNS
    )
}

#[async_trait]
impl MembershipRepository for SqlRepository {
    async fn find_membership(
        &self,
        event_id: &EventId,
        alcoholic_id: &AlcoholicId,
    ) -> StorageResult<Option<Membership>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM event_alcoholic WHERE event_id = $1 AND alcoholic_id = $2",
            MEMBERSHIP_COLUMNS
        ))
        .bind(event_id.as_uuid())
        .bind(alcoholic_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("retrieving membership"))?;

        row.as_ref().map(membership_from_row).transpose()
    }

    async fn save_membership(&self, membership: &Membership) -> StorageResult<()> {
        sqlx::query(&insert_sql())
            .bind(membership.id.as_uuid())
            .bind(membership.event_id.as_uuid())
            .bind(membership.alcoholic_id.as_uuid())
            .bind(membership.banned)
            .execute(&self.pool)
            .await
            .map_err(write_error("event_alcoholic", "storing membership"))?;

        Ok(())
    }

    async fn save_memberships(&self, memberships: &[Membership]) -> StorageResult<()> {
        let sql = insert_sql();
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("starting transaction"))?;

        for membership in memberships {
            sqlx::query(&sql)
                .bind(membership.id.as_uuid())
                .bind(membership.event_id.as_uuid())
                .bind(membership.alcoholic_id.as_uuid())
                .bind(membership.banned)
                .execute(&mut *tx)
                .await
                .map_err(write_error("event_alcoholic", "storing memberships"))?;
        }

        tx.commit()
            .await
            .map_err(db_error("committing memberships"))?;
        Ok(())
    }

    async fn delete_membership(&self, id: &MembershipId) -> StorageResult<bool> {
        let result = sqlx::query("DELETE FROM event_alcoholic WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(db_error("deleting membership"))?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_memberships_by_event(
        &self,
        event_id: &EventId,
    ) -> StorageResult<Vec<Membership>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM event_alcoholic WHERE event_id = $1 ORDER BY alcoholic_id",
            MEMBERSHIP_COLUMNS
        ))
        .bind(event_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("listing memberships"))?;

        rows.iter().map(membership_from_row).collect()
    }
}
