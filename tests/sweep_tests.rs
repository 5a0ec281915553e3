//! Integration tests for the cache sweep against a real SQLite store.
//!
//! These rely on the store's foreign keys to cascade link deletion.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use jobsweep::config::{OrphanStrategy, SweepConfig};
use jobsweep::db::Store;
use jobsweep::services::{SeaOrmSweepStore, Sweeper};
use sea_orm::ConnectionTrait;

fn at(rfc3339: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(rfc3339).unwrap().with_timezone(&Utc)
}

async fn store() -> Store {
    Store::with_pool_options("sqlite::memory:", 1, 1)
        .await
        .expect("Failed to open in-memory store")
}

fn sweeper(store: &Store, orphan_strategy: OrphanStrategy) -> Sweeper {
    let config = SweepConfig {
        orphan_strategy,
        ..SweepConfig::default()
    };
    Sweeper::new(Arc::new(SeaOrmSweepStore::new(store.clone())), config)
}

async fn add_job(store: &Store, name: &str, expires_at: DateTime<Utc>) -> i32 {
    store
        .add_job(
            name,
            Some("Acme"),
            &format!("https://jobs.example/{name}"),
            expires_at,
        )
        .await
        .unwrap()
}

#[tokio::test]
async fn test_expired_jobs_and_orphaned_terms_are_removed() {
    let store = store().await;
    let now = Utc::now();

    let expired = add_job(&store, "expired", now - Duration::days(1)).await;
    let tomorrow = add_job(&store, "tomorrow", now + Duration::days(1)).await;
    let later = add_job(&store, "later", now + Duration::days(10)).await;

    let orphan = store
        .add_search_term("rust developer", 1, now - Duration::days(70))
        .await
        .unwrap();
    let linked = store
        .add_search_term("backend engineer", 1, now - Duration::days(70))
        .await
        .unwrap();
    store.link_search_term(linked, tomorrow).await.unwrap();

    let summary = sweeper(&store, OrphanStrategy::Batched)
        .run_at(now)
        .await
        .unwrap();

    assert_eq!(summary.deleted_expired_jobs, 1);
    assert_eq!(summary.deleted_orphaned_terms, 1);
    assert_eq!(summary.current_stats.total_jobs, 2);
    assert_eq!(summary.current_stats.total_search_terms, 1);
    assert_eq!(summary.current_stats.total_links, 1);

    assert!(!store.job_exists(expired).await.unwrap());
    assert!(store.job_exists(tomorrow).await.unwrap());
    assert!(store.job_exists(later).await.unwrap());
    assert!(store.get_search_term(orphan).await.unwrap().is_none());
    assert!(store.get_search_term(linked).await.unwrap().is_some());
}

#[tokio::test]
async fn test_job_expiring_at_sweep_time_is_kept() {
    let store = store().await;
    let now = Utc::now();

    let boundary = add_job(&store, "boundary", now).await;

    let summary = sweeper(&store, OrphanStrategy::Batched)
        .run_at(now)
        .await
        .unwrap();

    assert_eq!(summary.deleted_expired_jobs, 0);
    assert!(store.job_exists(boundary).await.unwrap());
}

#[tokio::test]
async fn test_stale_search_counts_decay_to_one() {
    let store = store().await;
    let now = Utc::now();

    let popular = store
        .add_search_term("data engineer", 5, now - Duration::days(31))
        .await
        .unwrap();
    let quiet = store
        .add_search_term("cobol", 1, now - Duration::days(31))
        .await
        .unwrap();
    let fresh = store
        .add_search_term("platform engineer", 7, now - Duration::days(2))
        .await
        .unwrap();

    let summary = sweeper(&store, OrphanStrategy::Batched)
        .run_at(now)
        .await
        .unwrap();

    assert_eq!(summary.reset_stale_search_terms, 1);

    let count = |term: Option<jobsweep::db::SearchTerm>| term.unwrap().search_count;
    assert_eq!(count(store.get_search_term(popular).await.unwrap()), 1);
    assert_eq!(count(store.get_search_term(quiet).await.unwrap()), 1);
    assert_eq!(count(store.get_search_term(fresh).await.unwrap()), 7);
}

#[tokio::test]
async fn test_deleting_a_job_cascades_to_its_links() {
    let store = store().await;
    let now = Utc::now();

    let expired = add_job(&store, "expired", now - Duration::hours(3)).await;
    let live = add_job(&store, "live", now + Duration::days(3)).await;

    for (i, term) in ["sre", "devops", "kubernetes"].iter().enumerate() {
        let id = store
            .add_search_term(term, 2, now - Duration::days(i64::try_from(i).unwrap()))
            .await
            .unwrap();
        store.link_search_term(id, expired).await.unwrap();
        store.link_search_term(id, live).await.unwrap();
    }

    assert_eq!(store.count_links().await.unwrap(), 6);

    let summary = sweeper(&store, OrphanStrategy::Batched)
        .run_at(now)
        .await
        .unwrap();

    assert_eq!(summary.deleted_expired_jobs, 1);
    assert_eq!(summary.current_stats.total_links, 3);
    assert_eq!(summary.deleted_orphaned_terms, 0);
}

#[tokio::test]
async fn test_term_whose_jobs_all_expired_is_reclaimed_in_the_same_sweep() {
    let store = store().await;
    let now = Utc::now();

    let expired = add_job(&store, "expired", now - Duration::days(5)).await;
    let term = store
        .add_search_term("golang", 3, now - Duration::days(90))
        .await
        .unwrap();
    store.link_search_term(term, expired).await.unwrap();

    let summary = sweeper(&store, OrphanStrategy::PerCandidate)
        .run_at(now)
        .await
        .unwrap();

    assert_eq!(summary.deleted_orphaned_terms, 1);
    assert!(store.get_search_term(term).await.unwrap().is_none());
}

#[tokio::test]
async fn test_second_sweep_changes_nothing() {
    let store = store().await;
    let now = Utc::now();

    let live = add_job(&store, "live", now + Duration::days(1)).await;
    add_job(&store, "expired", now - Duration::days(1)).await;
    let linked = store
        .add_search_term("frontend", 9, now - Duration::days(80))
        .await
        .unwrap();
    store.link_search_term(linked, live).await.unwrap();
    store
        .add_search_term("unused", 4, now - Duration::days(65))
        .await
        .unwrap();
    store
        .add_legacy_cache_entry("frontend", "[]", now - Duration::minutes(5))
        .await
        .unwrap();

    let sweeper = sweeper(&store, OrphanStrategy::Batched);
    let first = sweeper.run_at(now).await.unwrap();
    let second = sweeper.run_at(now).await.unwrap();

    assert_eq!(first.deleted_expired_jobs, 1);
    assert_eq!(first.reset_stale_search_terms, 2);
    assert_eq!(first.deleted_orphaned_terms, 1);
    assert_eq!(first.old_cache_deleted, 1);

    assert_eq!(second.deleted_expired_jobs, 0);
    assert_eq!(second.reset_stale_search_terms, 0);
    assert_eq!(second.deleted_orphaned_terms, 0);
    assert_eq!(second.old_cache_deleted, 0);
    assert_eq!(second.current_stats, first.current_stats);
}

#[tokio::test]
async fn test_legacy_cache_expiry() {
    let store = store().await;
    let now = Utc::now();

    store
        .add_legacy_cache_entry("old", "[]", now - Duration::hours(1))
        .await
        .unwrap();
    store
        .add_legacy_cache_entry("current", "[]", now + Duration::hours(1))
        .await
        .unwrap();

    let summary = sweeper(&store, OrphanStrategy::Batched)
        .run_at(now)
        .await
        .unwrap();

    assert_eq!(summary.old_cache_deleted, 1);

    let later = sweeper(&store, OrphanStrategy::Batched)
        .run_at(now + Duration::hours(2))
        .await
        .unwrap();
    assert_eq!(later.old_cache_deleted, 1);
}

#[tokio::test]
async fn test_missing_legacy_table_is_ignored() {
    let store = store().await;
    let now = Utc::now();

    store
        .conn
        .execute_unprepared("DROP TABLE job_cache")
        .await
        .unwrap();
    add_job(&store, "expired", now - Duration::days(1)).await;

    let summary = sweeper(&store, OrphanStrategy::Batched)
        .run_at(now)
        .await
        .unwrap();

    assert_eq!(summary.old_cache_deleted, 0);
    assert_eq!(summary.deleted_expired_jobs, 1);
}

#[tokio::test]
async fn test_orphan_strategies_agree_across_large_candidate_sets() {
    async fn seed(store: &Store, now: DateTime<Utc>) {
        let live = add_job(store, "live", now + Duration::days(1)).await;
        let expired = add_job(store, "expired", now - Duration::days(1)).await;

        // More candidates than fit in one bound parameter list.
        for i in 0..1_200 {
            let id = store
                .add_search_term(&format!("term {i}"), 1, now - Duration::days(61))
                .await
                .unwrap();
            match i % 3 {
                0 => store.link_search_term(id, live).await.unwrap(),
                1 => store.link_search_term(id, expired).await.unwrap(),
                _ => {}
            }
        }
    }

    let now = Utc::now();
    let batched = store().await;
    let one_by_one = store().await;
    seed(&batched, now).await;
    seed(&one_by_one, now).await;

    let a = sweeper(&batched, OrphanStrategy::Batched)
        .run_at(now)
        .await
        .unwrap();
    let b = sweeper(&one_by_one, OrphanStrategy::PerCandidate)
        .run_at(now)
        .await
        .unwrap();

    assert_eq!(a.deleted_orphaned_terms, 800);
    assert_eq!(a, b);
    assert_eq!(a.current_stats.total_search_terms, 400);
}

#[tokio::test]
async fn test_expiry_compares_instants_not_text() {
    let store = store().await;
    let now = at("2026-10-17T12:00:00Z");

    // Same instant as `now`, six hours ahead, and one second behind.
    store
        .conn
        .execute_unprepared(
            "INSERT INTO jobs (title, url, expires_at) VALUES \
             ('offset', 'https://jobs.example/a', '2026-10-17T12:00:00+00:00'), \
             ('spaced', 'https://jobs.example/b', '2026-10-17 18:00:00'), \
             ('local', 'https://jobs.example/c', '2026-10-17T13:59:59+02:00')",
        )
        .await
        .unwrap();

    let summary = sweeper(&store, OrphanStrategy::Batched)
        .run_at(now)
        .await
        .unwrap();

    assert_eq!(summary.deleted_expired_jobs, 1);
    assert_eq!(summary.current_stats.total_jobs, 2);
}

#[tokio::test]
async fn test_term_staleness_accepts_sqlite_timestamps() {
    let store = store().await;
    let now = at("2026-10-17T12:00:00Z");

    store
        .conn
        .execute_unprepared(
            "INSERT INTO search_terms (term, search_count, last_searched_at) VALUES \
             ('stale', 4, '2026-07-01 08:30:00'), \
             ('recent', 4, '2026-10-16 08:30:00')",
        )
        .await
        .unwrap();

    let summary = sweeper(&store, OrphanStrategy::Batched)
        .run_at(now)
        .await
        .unwrap();

    assert_eq!(summary.reset_stale_search_terms, 1);
    assert_eq!(summary.deleted_orphaned_terms, 1);
    assert_eq!(summary.current_stats.total_search_terms, 1);
}

#[tokio::test]
async fn test_unparseable_expiry_is_never_deleted() {
    let store = store().await;

    store
        .conn
        .execute_unprepared(
            "INSERT INTO jobs (title, url, expires_at) VALUES ('odd', 'https://jobs.example/x', 'soon')",
        )
        .await
        .unwrap();

    let summary = sweeper(&store, OrphanStrategy::Batched)
        .run_at(Utc::now())
        .await
        .unwrap();

    assert_eq!(summary.deleted_expired_jobs, 0);
    assert_eq!(summary.current_stats.total_jobs, 1);
}

#[tokio::test]
async fn test_failed_orphan_chunk_rolls_back_the_whole_delete() {
    let store = store().await;
    let now = Utc::now();

    for i in 0..600 {
        store
            .add_search_term(&format!("term {i}"), 1, now - Duration::days(70))
            .await
            .unwrap();
    }
    store
        .conn
        .execute_unprepared(
            "CREATE TRIGGER pin_term BEFORE DELETE ON search_terms \
             WHEN OLD.id = 550 BEGIN SELECT RAISE(ABORT, 'pinned'); END",
        )
        .await
        .unwrap();

    let summary = sweeper(&store, OrphanStrategy::Batched)
        .run_at(now)
        .await
        .unwrap();

    assert_eq!(summary.deleted_orphaned_terms, 0);
    assert_eq!(summary.current_stats.total_search_terms, 600);
    assert_eq!(store.count_search_terms().await.unwrap(), 600);
}
