use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(JobCache::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(JobCache::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(JobCache::Query).string().not_null())
                    .col(ColumnDef::new(JobCache::ResultsJson).text().not_null())
                    .col(
                        ColumnDef::new(JobCache::CreatedAt)
                            .string()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(JobCache::ExpiresAt).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_job_cache_query")
                    .table(JobCache::Table)
                    .col(JobCache::Query)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(JobCache::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum JobCache {
    Table,
    Id,
    Query,
    ResultsJson,
    CreatedAt,
    ExpiresAt,
}
