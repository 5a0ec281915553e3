use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "jobs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    pub company: Option<String>,
    pub url: String,
    pub created_at: String,
    pub expires_at: String,
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

impl Related<super::search_terms::Entity> for Entity {
    fn to() -> RelationDef {
        super::search_term_jobs::Relation::SearchTerm.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::search_term_jobs::Relation::Job.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
