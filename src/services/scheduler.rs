use anyhow::{Context, Result};
use std::sync::Arc;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};

use crate::config::SchedulerConfig;
use crate::services::sweep::Sweeper;

/// Runs the sweep on a cron schedule.
pub struct SweepScheduler {
    sweeper: Arc<Sweeper>,
    config: SchedulerConfig,
}

impl SweepScheduler {
    #[must_use]
    pub const fn new(sweeper: Arc<Sweeper>, config: SchedulerConfig) -> Self {
        Self { sweeper, config }
    }

    /// Registers the sweep job and starts ticking.
    ///
    /// Returns `None` when scheduling is disabled. The caller owns the returned
    /// scheduler and shuts it down.
    pub async fn start(&self) -> Result<Option<JobScheduler>> {
        if !self.config.enabled {
            info!("Scheduler is disabled in config");
            return Ok(None);
        }

        let cron_expr = self
            .config
            .cron_expression
            .as_deref()
            .context("Scheduler enabled without a cron expression")?;

        let sched = JobScheduler::new().await?;

        let sweeper = Arc::clone(&self.sweeper);
        let job = Job::new_async(cron_expr, move |_uuid, _lock| {
            let sweeper = Arc::clone(&sweeper);
            Box::pin(async move {
                if let Err(e) = sweeper.run().await {
                    error!("Scheduled sweep failed: {}", e);
                }
            })
        })
        .with_context(|| format!("Invalid cron expression: {cron_expr}"))?;

        sched.add(job).await?;
        sched.start().await?;

        info!("Scheduler running with cron: {}", cron_expr);

        if self.config.run_on_startup {
            let sweeper = Arc::clone(&self.sweeper);
            tokio::spawn(async move {
                info!("Running startup sweep");
                if let Err(e) = sweeper.run().await {
                    error!("Startup sweep failed: {}", e);
                }
            });
        }

        Ok(Some(sched))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SweepConfig;
    use crate::db::Store;
    use crate::services::SeaOrmSweepStore;

    async fn sweeper() -> Arc<Sweeper> {
        let store = Store::with_pool_options("sqlite::memory:", 1, 1)
            .await
            .unwrap();
        Arc::new(Sweeper::new(
            Arc::new(SeaOrmSweepStore::new(store)),
            SweepConfig::default(),
        ))
    }

    #[tokio::test]
    async fn disabled_scheduler_does_not_start() {
        let scheduler = SweepScheduler::new(sweeper().await, SchedulerConfig::default());
        assert!(scheduler.start().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn invalid_cron_expression_is_rejected() {
        let config = SchedulerConfig {
            enabled: true,
            cron_expression: Some("every now and then".to_string()),
            run_on_startup: false,
        };
        let scheduler = SweepScheduler::new(sweeper().await, config);
        assert!(scheduler.start().await.is_err());
    }
}
