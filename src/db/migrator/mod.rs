use sea_orm_migration::prelude::*;

mod m20250601_add_job_cache;
mod m20260301_normalize_job_cache;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250601_add_job_cache::Migration),
            Box::new(m20260301_normalize_job_cache::Migration),
        ]
    }
}
