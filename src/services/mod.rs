pub mod scheduler;
pub use scheduler::SweepScheduler;

pub mod sweep;
pub use sweep::{CurrentStats, Stage, SweepError, SweepSummary, Sweeper};

pub mod sweep_store;
pub mod sweep_store_impl;
pub use sweep_store::{ExpiringTable, StoreError, SweepStore, Table};
pub use sweep_store_impl::SeaOrmSweepStore;
