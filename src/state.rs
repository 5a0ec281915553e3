use std::sync::Arc;

use crate::config::Config;
use crate::db::Store;
use crate::services::{SeaOrmSweepStore, Sweeper};

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub store: Store,

    pub sweeper: Arc<Sweeper>,
}

impl SharedState {
    /// Connects to the store named in `config` and wires the sweeper to it.
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_url,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        Ok(Self::with_store(config, store))
    }

    #[must_use]
    pub fn with_store(config: Config, store: Store) -> Self {
        let sweep_store = Arc::new(SeaOrmSweepStore::new(store.clone()));
        let sweeper = Arc::new(Sweeper::new(sweep_store, config.sweep.clone()));

        Self {
            config: Arc::new(config),
            store,
            sweeper,
        }
    }
}
