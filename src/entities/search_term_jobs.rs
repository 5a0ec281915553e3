use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "search_term_jobs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub search_term_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub job_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::search_terms::Entity",
        from = "Column::SearchTermId",
        to = "super::search_terms::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    SearchTerm,
    #[sea_orm(
        belongs_to = "super::jobs::Entity",
        from = "Column::JobId",
        to = "super::jobs::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Job,
}

impl Related<super::search_terms::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SearchTerm.def()
    }
}

impl Related<super::jobs::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Job.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
