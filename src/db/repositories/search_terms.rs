use crate::entities::{prelude::*, search_terms};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryFilter,
    QuerySelect, Set, TransactionTrait,
};

use super::{MAX_BOUND_PARAMS, earlier_than};

pub struct SearchTermRepository {
    conn: DatabaseConnection,
}

impl SearchTermRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn add(
        &self,
        term: &str,
        search_count: i32,
        last_searched_at: &str,
    ) -> Result<i32, DbErr> {
        let active_model = search_terms::ActiveModel {
            term: Set(term.to_string()),
            search_count: Set(search_count),
            last_searched_at: Set(last_searched_at.to_string()),
            created_at: Set(last_searched_at.to_string()),
            ..Default::default()
        };

        let result = SearchTerms::insert(active_model).exec(&self.conn).await?;
        Ok(result.last_insert_id)
    }

    pub async fn get(&self, id: i32) -> Result<Option<search_terms::Model>, DbErr> {
        SearchTerms::find_by_id(id).one(&self.conn).await
    }

    /// Sets `search_count` to `floor` for every term last searched before `before`
    /// whose count is still above `floor`.
    pub async fn reset_counts(&self, before: &str, floor: i32) -> Result<u64, DbErr> {
        let result = SearchTerms::update_many()
            .col_expr(search_terms::Column::SearchCount, Expr::value(floor))
            .filter(earlier_than(search_terms::Column::LastSearchedAt, before))
            .filter(search_terms::Column::SearchCount.gt(floor))
            .exec(&self.conn)
            .await?;

        Ok(result.rows_affected)
    }

    pub async fn ids_last_searched_before(&self, before: &str) -> Result<Vec<i32>, DbErr> {
        SearchTerms::find()
            .select_only()
            .column(search_terms::Column::Id)
            .filter(earlier_than(search_terms::Column::LastSearchedAt, before))
            .into_tuple::<i32>()
            .all(&self.conn)
            .await
    }

    pub async fn delete(&self, id: i32) -> Result<u64, DbErr> {
        let result = SearchTerms::delete_by_id(id).exec(&self.conn).await?;
        Ok(result.rows_affected)
    }

    /// Deletes every listed term or none of them.
    ///
    /// Chunks share one transaction; a failing chunk rolls back the ones before it.
    pub async fn delete_many(&self, ids: &[i32]) -> Result<u64, DbErr> {
        let txn = self.conn.begin().await?;
        let mut deleted = 0;

        for chunk in ids.chunks(MAX_BOUND_PARAMS) {
            let result = SearchTerms::delete_many()
                .filter(search_terms::Column::Id.is_in(chunk.iter().copied()))
                .exec(&txn)
                .await?;
            deleted += result.rows_affected;
        }

        txn.commit().await?;
        Ok(deleted)
    }

    pub async fn count(&self) -> Result<u64, DbErr> {
        SearchTerms::find().count(&self.conn).await
    }
}
