use crate::entities::{jobs, prelude::*};
use sea_orm::{DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryFilter, Set};

use super::earlier_than;

pub struct JobRepository {
    conn: DatabaseConnection,
}

impl JobRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn add(
        &self,
        title: &str,
        company: Option<&str>,
        url: &str,
        expires_at: &str,
    ) -> Result<i32, DbErr> {
        let active_model = jobs::ActiveModel {
            title: Set(title.to_string()),
            company: Set(company.map(str::to_string)),
            url: Set(url.to_string()),
            created_at: Set(crate::db::format_timestamp(chrono::Utc::now())),
            expires_at: Set(expires_at.to_string()),
            ..Default::default()
        };

        let result = Jobs::insert(active_model).exec(&self.conn).await?;
        Ok(result.last_insert_id)
    }

    pub async fn exists(&self, id: i32) -> Result<bool, DbErr> {
        Ok(Jobs::find_by_id(id).one(&self.conn).await?.is_some())
    }

    /// Removes postings that expired strictly before `before`.
    ///
    /// Their `search_term_jobs` rows go with them through the foreign key cascade.
    pub async fn delete_expired(&self, before: &str) -> Result<u64, DbErr> {
        let result = Jobs::delete_many()
            .filter(earlier_than(jobs::Column::ExpiresAt, before))
            .exec(&self.conn)
            .await?;

        Ok(result.rows_affected)
    }

    pub async fn count(&self) -> Result<u64, DbErr> {
        Jobs::find().count(&self.conn).await
    }
}
