use sea_orm::entity::prelude::*;

/// One record per pipeline execution: which source triggered it, how far it
/// got, what each stage touched, and the error text when it failed.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "sync_run")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub source: String,
    pub status: String,
    pub stage: String,
    pub characters_upserted: i32,
    pub characters_removed: i32,
    pub accounts_upserted: i32,
    pub accounts_removed: i32,
    pub players_created: i32,
    pub links_created: i32,
    pub suggestions_flagged: i32,
    pub issues_created: i32,
    pub issues_refreshed: i32,
    pub issues_resolved: i32,
    pub notifications_sent: i32,
    pub error: Option<String>,
    pub started_at: DateTime,
    pub finished_at: Option<DateTime>,
    pub duration_ms: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
