use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Jobs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Jobs::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Jobs::Title).string().not_null())
                    .col(ColumnDef::new(Jobs::Company).string())
                    .col(ColumnDef::new(Jobs::Url).string().not_null())
                    .col(
                        ColumnDef::new(Jobs::CreatedAt)
                            .string()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Jobs::ExpiresAt).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_jobs_expires_at")
                    .table(Jobs::Table)
                    .col(Jobs::ExpiresAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SearchTerms::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SearchTerms::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(SearchTerms::Term)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(SearchTerms::SearchCount)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(SearchTerms::LastSearchedAt)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SearchTerms::CreatedAt)
                            .string()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_search_terms_last_searched_at")
                    .table(SearchTerms::Table)
                    .col(SearchTerms::LastSearchedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SearchTermJobs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SearchTermJobs::SearchTermId)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(SearchTermJobs::JobId).integer().not_null())
                    .primary_key(
                        Index::create()
                            .name("pk_search_term_jobs")
                            .col(SearchTermJobs::SearchTermId)
                            .col(SearchTermJobs::JobId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_search_term_jobs_search_term_id")
                            .from(SearchTermJobs::Table, SearchTermJobs::SearchTermId)
                            .to(SearchTerms::Table, SearchTerms::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_search_term_jobs_job_id")
                            .from(SearchTermJobs::Table, SearchTermJobs::JobId)
                            .to(Jobs::Table, Jobs::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // The composite key only covers lookups by search term.
        manager
            .create_index(
                Index::create()
                    .name("idx_search_term_jobs_job_id")
                    .table(SearchTermJobs::Table)
                    .col(SearchTermJobs::JobId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SearchTermJobs::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SearchTerms::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Jobs::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Jobs {
    Table,
    Id,
    Title,
    Company,
    Url,
    CreatedAt,
    ExpiresAt,
}

#[derive(DeriveIden)]
enum SearchTerms {
    Table,
    Id,
    Term,
    SearchCount,
    LastSearchedAt,
    CreatedAt,
}

#[derive(DeriveIden)]
enum SearchTermJobs {
    Table,
    SearchTermId,
    JobId,
}
