use anyhow::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, Statement};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub mod migrator;
pub mod repositories;

pub use crate::entities::search_terms::Model as SearchTerm;

/// Canonical text form of every timestamp column.
///
/// Fixed precision with a `Z` suffix, so string comparison in SQL matches
/// chronological order.
#[must_use]
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url
                .trim_start_matches("sqlite:")
                .trim_start_matches("//")
                .split('?')
                .next()
                .unwrap_or_default();
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        // Cascading deletes depend on sqlx enabling `foreign_keys` per SQLite connection.
        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn job_repo(&self) -> repositories::jobs::JobRepository {
        repositories::jobs::JobRepository::new(self.conn.clone())
    }

    fn search_term_repo(&self) -> repositories::search_terms::SearchTermRepository {
        repositories::search_terms::SearchTermRepository::new(self.conn.clone())
    }

    fn link_repo(&self) -> repositories::links::LinkRepository {
        repositories::links::LinkRepository::new(self.conn.clone())
    }

    fn legacy_cache_repo(&self) -> repositories::legacy_cache::LegacyCacheRepository {
        repositories::legacy_cache::LegacyCacheRepository::new(self.conn.clone())
    }

    pub async fn add_job(
        &self,
        title: &str,
        company: Option<&str>,
        url: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<i32, DbErr> {
        self.job_repo()
            .add(title, company, url, &format_timestamp(expires_at))
            .await
    }

    pub async fn job_exists(&self, id: i32) -> Result<bool, DbErr> {
        self.job_repo().exists(id).await
    }

    pub async fn delete_expired_jobs(&self, before: DateTime<Utc>) -> Result<u64, DbErr> {
        self.job_repo()
            .delete_expired(&format_timestamp(before))
            .await
    }

    pub async fn count_jobs(&self) -> Result<u64, DbErr> {
        self.job_repo().count().await
    }

    pub async fn add_search_term(
        &self,
        term: &str,
        search_count: i32,
        last_searched_at: DateTime<Utc>,
    ) -> Result<i32, DbErr> {
        self.search_term_repo()
            .add(term, search_count, &format_timestamp(last_searched_at))
            .await
    }

    pub async fn get_search_term(&self, id: i32) -> Result<Option<SearchTerm>, DbErr> {
        self.search_term_repo().get(id).await
    }

    pub async fn reset_search_counts(
        &self,
        last_searched_before: DateTime<Utc>,
        floor: i32,
    ) -> Result<u64, DbErr> {
        self.search_term_repo()
            .reset_counts(&format_timestamp(last_searched_before), floor)
            .await
    }

    pub async fn search_term_ids_last_searched_before(
        &self,
        before: DateTime<Utc>,
    ) -> Result<Vec<i32>, DbErr> {
        self.search_term_repo()
            .ids_last_searched_before(&format_timestamp(before))
            .await
    }

    pub async fn delete_search_term(&self, id: i32) -> Result<u64, DbErr> {
        self.search_term_repo().delete(id).await
    }

    pub async fn delete_search_terms(&self, ids: &[i32]) -> Result<u64, DbErr> {
        self.search_term_repo().delete_many(ids).await
    }

    pub async fn count_search_terms(&self) -> Result<u64, DbErr> {
        self.search_term_repo().count().await
    }

    pub async fn link_search_term(&self, search_term_id: i32, job_id: i32) -> Result<(), DbErr> {
        self.link_repo().add(search_term_id, job_id).await
    }

    pub async fn count_links_for_term(&self, search_term_id: i32) -> Result<u64, DbErr> {
        self.link_repo().count_for_term(search_term_id).await
    }

    pub async fn count_links_by_term(
        &self,
        search_term_ids: &[i32],
    ) -> Result<HashMap<i32, u64>, DbErr> {
        self.link_repo().count_grouped_by_term(search_term_ids).await
    }

    pub async fn count_links(&self) -> Result<u64, DbErr> {
        self.link_repo().count().await
    }

    pub async fn add_legacy_cache_entry(
        &self,
        query: &str,
        results_json: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), DbErr> {
        self.legacy_cache_repo()
            .add(query, results_json, &format_timestamp(expires_at))
            .await
    }

    pub async fn delete_expired_legacy_cache(&self, before: DateTime<Utc>) -> Result<u64, DbErr> {
        self.legacy_cache_repo()
            .delete_expired(&format_timestamp(before))
            .await
    }
}
