use crate::entities::{job_cache, prelude::*};
use sea_orm::{DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set};

use super::earlier_than;

pub struct LegacyCacheRepository {
    conn: DatabaseConnection,
}

impl LegacyCacheRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn add(&self, query: &str, results_json: &str, expires_at: &str) -> Result<(), DbErr> {
        let active_model = job_cache::ActiveModel {
            query: Set(query.to_string()),
            results_json: Set(results_json.to_string()),
            created_at: Set(crate::db::format_timestamp(chrono::Utc::now())),
            expires_at: Set(expires_at.to_string()),
            ..Default::default()
        };

        JobCache::insert(active_model).exec(&self.conn).await?;
        Ok(())
    }

    pub async fn delete_expired(&self, before: &str) -> Result<u64, DbErr> {
        let result = JobCache::delete_many()
            .filter(earlier_than(job_cache::Column::ExpiresAt, before))
            .exec(&self.conn)
            .await?;

        Ok(result.rows_affected)
    }
}
