//! `SeaORM` implementation of the `SweepStore` trait.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::DbErr;

use crate::db::Store;
use crate::services::sweep_store::{ExpiringTable, StoreError, SweepStore, Table};

pub struct SeaOrmSweepStore {
    store: Store,
}

impl SeaOrmSweepStore {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    /// Maps a driver error on `table`, telling a missing relation apart from
    /// every other failure.
    fn classify(table: &'static str, err: DbErr) -> StoreError {
        if err.to_string().contains("no such table") {
            StoreError::MissingTable(table)
        } else {
            StoreError::from(err)
        }
    }
}

#[async_trait]
impl SweepStore for SeaOrmSweepStore {
    async fn delete_expired(
        &self,
        table: ExpiringTable,
        before: DateTime<Utc>,
    ) -> Result<u64, StoreError> {
        let result = match table {
            ExpiringTable::Jobs => self.store.delete_expired_jobs(before).await,
            ExpiringTable::LegacyJobCache => self.store.delete_expired_legacy_cache(before).await,
        };

        result.map_err(|e| Self::classify(table.name(), e))
    }

    async fn reset_search_counts(
        &self,
        last_searched_before: DateTime<Utc>,
        floor: i32,
    ) -> Result<u64, StoreError> {
        self.store
            .reset_search_counts(last_searched_before, floor)
            .await
            .map_err(|e| Self::classify(Table::SearchTerms.name(), e))
    }

    async fn search_terms_last_searched_before(
        &self,
        before: DateTime<Utc>,
    ) -> Result<Vec<i32>, StoreError> {
        self.store
            .search_term_ids_last_searched_before(before)
            .await
            .map_err(|e| Self::classify(Table::SearchTerms.name(), e))
    }

    async fn count_links_for_term(&self, search_term_id: i32) -> Result<u64, StoreError> {
        self.store
            .count_links_for_term(search_term_id)
            .await
            .map_err(|e| Self::classify(Table::SearchTermJobs.name(), e))
    }

    async fn count_links_by_term(
        &self,
        search_term_ids: &[i32],
    ) -> Result<HashMap<i32, u64>, StoreError> {
        self.store
            .count_links_by_term(search_term_ids)
            .await
            .map_err(|e| Self::classify(Table::SearchTermJobs.name(), e))
    }

    async fn delete_search_terms(&self, search_term_ids: &[i32]) -> Result<u64, StoreError> {
        let result = match search_term_ids {
            [] => Ok(0),
            [id] => self.store.delete_search_term(*id).await,
            ids => self.store.delete_search_terms(ids).await,
        };

        result.map_err(|e| Self::classify(Table::SearchTerms.name(), e))
    }

    async fn count_rows(&self, table: Table) -> Result<u64, StoreError> {
        let result = match table {
            Table::Jobs => self.store.count_jobs().await,
            Table::SearchTerms => self.store.count_search_terms().await,
            Table::SearchTermJobs => self.store.count_links().await,
        };

        result.map_err(|e| Self::classify(table.name(), e))
    }
}
