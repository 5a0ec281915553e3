//! Store primitives the sweep is written against.
//!
//! The sweep never reaches for a connection directly; it is handed an
//! implementation of [`SweepStore`] at construction time.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors surfaced by store primitives.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Table {0} does not exist")]
    MissingTable(&'static str),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sea_orm::DbErr> for StoreError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

/// Relations the sweep can count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Jobs,
    SearchTerms,
    SearchTermJobs,
}

impl Table {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Jobs => "jobs",
            Self::SearchTerms => "search_terms",
            Self::SearchTermJobs => "search_term_jobs",
        }
    }
}

/// Relations carrying an `expires_at` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiringTable {
    Jobs,
    LegacyJobCache,
}

impl ExpiringTable {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Jobs => Table::Jobs.name(),
            Self::LegacyJobCache => "job_cache",
        }
    }
}

#[async_trait::async_trait]
pub trait SweepStore: Send + Sync {
    /// Deletes rows whose `expires_at` is strictly before `before`.
    async fn delete_expired(
        &self,
        table: ExpiringTable,
        before: DateTime<Utc>,
    ) -> Result<u64, StoreError>;

    /// Sets `search_count` to `floor` on terms last searched before
    /// `last_searched_before` whose count is greater than `floor`.
    async fn reset_search_counts(
        &self,
        last_searched_before: DateTime<Utc>,
        floor: i32,
    ) -> Result<u64, StoreError>;

    /// Identifiers of terms last searched before `before`.
    async fn search_terms_last_searched_before(
        &self,
        before: DateTime<Utc>,
    ) -> Result<Vec<i32>, StoreError>;

    /// Number of `search_term_jobs` rows for one term.
    async fn count_links_for_term(&self, search_term_id: i32) -> Result<u64, StoreError>;

    /// Link counts for a set of terms in one round-trip.
    ///
    /// Terms with no links may be absent from the result.
    async fn count_links_by_term(
        &self,
        search_term_ids: &[i32],
    ) -> Result<HashMap<i32, u64>, StoreError>;

    async fn delete_search_terms(&self, search_term_ids: &[i32]) -> Result<u64, StoreError>;

    async fn count_rows(&self, table: Table) -> Result<u64, StoreError>;
}
