use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "search_terms")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub term: String,
    pub search_count: i32,
    pub last_searched_at: String,
    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::search_term_jobs::Entity")]
    SearchTermJobs,
}

impl Related<super::search_term_jobs::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SearchTermJobs.def()
    }
}

impl Related<super::jobs::Entity> for Entity {
    fn to() -> RelationDef {
        super::search_term_jobs::Relation::Job.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::search_term_jobs::Relation::SearchTerm.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
