use std::collections::HashMap;

use crate::entities::{prelude::*, search_term_jobs};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryFilter,
    QuerySelect, Set,
};

use super::MAX_BOUND_PARAMS;

/// Rows of `search_term_jobs`, the join between search terms and the postings they matched.
pub struct LinkRepository {
    conn: DatabaseConnection,
}

impl LinkRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn add(&self, search_term_id: i32, job_id: i32) -> Result<(), DbErr> {
        let active_model = search_term_jobs::ActiveModel {
            search_term_id: Set(search_term_id),
            job_id: Set(job_id),
        };

        SearchTermJobs::insert(active_model)
            .on_conflict(
                sea_orm::sea_query::OnConflict::columns([
                    search_term_jobs::Column::SearchTermId,
                    search_term_jobs::Column::JobId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .do_nothing()
            .exec(&self.conn)
            .await?;

        Ok(())
    }

    pub async fn count_for_term(&self, search_term_id: i32) -> Result<u64, DbErr> {
        SearchTermJobs::find()
            .filter(search_term_jobs::Column::SearchTermId.eq(search_term_id))
            .count(&self.conn)
            .await
    }

    /// Link counts keyed by search term. Terms without links are absent from the map.
    pub async fn count_grouped_by_term(
        &self,
        search_term_ids: &[i32],
    ) -> Result<HashMap<i32, u64>, DbErr> {
        let mut counts = HashMap::with_capacity(search_term_ids.len());

        for chunk in search_term_ids.chunks(MAX_BOUND_PARAMS) {
            let rows: Vec<(i32, i64)> = SearchTermJobs::find()
                .select_only()
                .column(search_term_jobs::Column::SearchTermId)
                .column_as(Expr::col(search_term_jobs::Column::JobId).count(), "links")
                .filter(search_term_jobs::Column::SearchTermId.is_in(chunk.iter().copied()))
                .group_by(search_term_jobs::Column::SearchTermId)
                .into_tuple()
                .all(&self.conn)
                .await?;

            counts.extend(
                rows.into_iter()
                    .map(|(id, links)| (id, u64::try_from(links).unwrap_or(0))),
            );
        }

        Ok(counts)
    }

    pub async fn count(&self) -> Result<u64, DbErr> {
        SearchTermJobs::find().count(&self.conn).await
    }
}
