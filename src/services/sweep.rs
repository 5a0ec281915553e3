//! Garbage-collection sweep over cached job postings and their search terms.
//!
//! A sweep runs five stages in a fixed order against one [`SweepStore`]:
//!
//! 1. delete expired postings (their links cascade away with them)
//! 2. decay the popularity of search terms not searched recently
//! 3. delete stale search terms nothing links to any more
//! 4. count what is left
//! 5. delete expired rows from the legacy `job_cache` table
//!
//! Only the first stage can fail the sweep. Every later stage logs its failure
//! and reports zero so the rest of the sweep still runs.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::config::{OrphanStrategy, SweepConfig};
use crate::constants::sweep::SEARCH_COUNT_FLOOR;
use crate::services::sweep_store::{ExpiringTable, StoreError, SweepStore, Table};

#[derive(Debug, Error)]
pub enum SweepError {
    #[error("Failed to delete expired jobs: {0}")]
    ExpiredJobs(#[source] StoreError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ExpiredJobs,
    StaleSearchTerms,
    OrphanedTerms,
    Stats,
    LegacyCache,
}

impl Stage {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ExpiredJobs => "expired_jobs",
            Self::StaleSearchTerms => "stale_search_terms",
            Self::OrphanedTerms => "orphaned_terms",
            Self::Stats => "stats",
            Self::LegacyCache => "legacy_cache",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentStats {
    pub total_jobs: u64,
    pub total_search_terms: u64,
    pub total_links: u64,
}

/// What one sweep changed, plus the totals left afterwards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepSummary {
    pub deleted_expired_jobs: u64,
    pub reset_stale_search_terms: u64,
    pub deleted_orphaned_terms: u64,
    pub old_cache_deleted: u64,
    pub current_stats: CurrentStats,
}

pub struct Sweeper {
    store: Arc<dyn SweepStore>,
    config: SweepConfig,
    // Serializes sweeps started from the HTTP trigger and the scheduler.
    running: Mutex<()>,
}

impl Sweeper {
    #[must_use]
    pub fn new(store: Arc<dyn SweepStore>, config: SweepConfig) -> Self {
        Self {
            store,
            config,
            running: Mutex::new(()),
        }
    }

    pub async fn run(&self) -> Result<SweepSummary, SweepError> {
        self.run_at(Utc::now()).await
    }

    /// Runs every stage against a single fixed `now`.
    pub async fn run_at(&self, now: DateTime<Utc>) -> Result<SweepSummary, SweepError> {
        let _guard = self.running.lock().await;
        let started = Instant::now();

        info!(now = %now, "Starting cache sweep");

        let deleted_expired_jobs = match self.reap_expired_jobs(now).await {
            Ok(rows) => record(Stage::ExpiredJobs, rows),
            Err(e) => {
                error!(stage = Stage::ExpiredJobs.as_str(), error = %e, "Sweep aborted");
                metrics::counter!("sweep_stage_failures_total", "stage" => Stage::ExpiredJobs.as_str())
                    .increment(1);
                metrics::counter!("sweep_runs_total", "outcome" => "failed").increment(1);
                return Err(SweepError::ExpiredJobs(e));
            }
        };

        let reset_stale_search_terms =
            settle(Stage::StaleSearchTerms, self.decay_stale_terms(now).await);
        let deleted_orphaned_terms = settle(Stage::OrphanedTerms, self.reclaim_orphans(now).await);
        let current_stats = self.collect_stats().await;
        let old_cache_deleted = self.sweep_legacy_cache(now).await;

        let summary = SweepSummary {
            deleted_expired_jobs,
            reset_stale_search_terms,
            deleted_orphaned_terms,
            old_cache_deleted,
            current_stats,
        };

        metrics::counter!("sweep_runs_total", "outcome" => "success").increment(1);
        metrics::histogram!("sweep_duration_seconds").record(started.elapsed().as_secs_f64());

        info!(
            event = "sweep_finished",
            deleted_expired_jobs,
            reset_stale_search_terms,
            deleted_orphaned_terms,
            old_cache_deleted,
            total_jobs = current_stats.total_jobs,
            total_search_terms = current_stats.total_search_terms,
            total_links = current_stats.total_links,
            duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "Cache sweep finished"
        );

        Ok(summary)
    }

    async fn reap_expired_jobs(&self, now: DateTime<Utc>) -> Result<u64, StoreError> {
        self.store.delete_expired(ExpiringTable::Jobs, now).await
    }

    async fn decay_stale_terms(&self, now: DateTime<Utc>) -> Result<u64, StoreError> {
        let cutoff = days_before(now, self.config.stale_after_days);
        self.store
            .reset_search_counts(cutoff, SEARCH_COUNT_FLOOR)
            .await
    }

    /// Must run after [`Self::reap_expired_jobs`] so links to expired postings
    /// are already gone.
    async fn reclaim_orphans(&self, now: DateTime<Utc>) -> Result<u64, StoreError> {
        let cutoff = days_before(now, self.config.orphan_after_days);
        let candidates = self.store.search_terms_last_searched_before(cutoff).await?;

        if candidates.is_empty() {
            return Ok(0);
        }

        debug!(candidates = candidates.len(), "Checking stale search terms for links");

        match self.config.orphan_strategy {
            OrphanStrategy::Batched => self.reclaim_orphans_batched(candidates).await,
            OrphanStrategy::PerCandidate => Ok(self.reclaim_orphans_one_by_one(candidates).await),
        }
    }

    async fn reclaim_orphans_batched(&self, candidates: Vec<i32>) -> Result<u64, StoreError> {
        let links = self.store.count_links_by_term(&candidates).await?;
        let orphans = unlinked(candidates, &links);

        if orphans.is_empty() {
            return Ok(0);
        }

        self.store.delete_search_terms(&orphans).await
    }

    async fn reclaim_orphans_one_by_one(&self, candidates: Vec<i32>) -> u64 {
        let mut deleted = 0;

        for search_term_id in candidates {
            match self.store.count_links_for_term(search_term_id).await {
                Ok(0) => match self.store.delete_search_terms(&[search_term_id]).await {
                    Ok(rows) => deleted += rows,
                    Err(e) => {
                        warn!(search_term_id, error = %e, "Failed to delete orphaned search term");
                    }
                },
                Ok(_) => {}
                Err(e) => {
                    warn!(search_term_id, error = %e, "Skipping search term, link count failed");
                }
            }
        }

        deleted
    }

    async fn collect_stats(&self) -> CurrentStats {
        CurrentStats {
            total_jobs: self.count_or_zero(Table::Jobs).await,
            total_search_terms: self.count_or_zero(Table::SearchTerms).await,
            total_links: self.count_or_zero(Table::SearchTermJobs).await,
        }
    }

    async fn count_or_zero(&self, table: Table) -> u64 {
        self.store.count_rows(table).await.unwrap_or_else(|e| {
            warn!(stage = Stage::Stats.as_str(), table = table.name(), error = %e, "Count failed");
            metrics::counter!("sweep_stage_failures_total", "stage" => Stage::Stats.as_str())
                .increment(1);
            0
        })
    }

    async fn sweep_legacy_cache(&self, now: DateTime<Utc>) -> u64 {
        if !self.config.legacy_cache_enabled {
            debug!("Legacy cache sweep disabled");
            return 0;
        }

        match self
            .store
            .delete_expired(ExpiringTable::LegacyJobCache, now)
            .await
        {
            Err(StoreError::MissingTable(table)) => {
                debug!(table, "Legacy cache table absent, nothing to sweep");
                0
            }
            result => settle(Stage::LegacyCache, result),
        }
    }
}

/// Candidates with no links. Missing entries count as zero.
fn unlinked(candidates: Vec<i32>, links: &HashMap<i32, u64>) -> Vec<i32> {
    candidates
        .into_iter()
        .filter(|id| links.get(id).copied().unwrap_or(0) == 0)
        .collect()
}

/// Saturates at the Unix epoch. `Config::validate` keeps real thresholds far
/// from that bound.
fn days_before(now: DateTime<Utc>, days: u32) -> DateTime<Utc> {
    now.checked_sub_signed(Duration::days(i64::from(days)))
        .map_or(DateTime::<Utc>::UNIX_EPOCH, |at| at.max(DateTime::<Utc>::UNIX_EPOCH))
}

fn record(stage: Stage, rows: u64) -> u64 {
    info!(stage = stage.as_str(), rows, "Sweep stage finished");
    metrics::counter!("sweep_rows_total", "stage" => stage.as_str()).increment(rows);
    rows
}

/// Resolves a best-effort stage: failures are logged and reported as zero.
fn settle(stage: Stage, result: Result<u64, StoreError>) -> u64 {
    match result {
        Ok(rows) => record(stage, rows),
        Err(e) => {
            warn!(stage = stage.as_str(), error = %e, "Sweep stage failed, continuing");
            metrics::counter!("sweep_stage_failures_total", "stage" => stage.as_str())
                .increment(1);
            0
        }
    }
}
