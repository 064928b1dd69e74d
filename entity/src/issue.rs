use sea_orm::entity::prelude::*;

/// Deduplicated anomaly ledger row. `dedupe_hash` is deterministic over
/// (issue_type, subject_ids) so re-detections refresh the open row instead
/// of inserting a duplicate. Resolution stamps `resolved_at`/`resolved_by`
/// and never deletes.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "issue")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub issue_type: String,
    pub dedupe_hash: String,
    pub subject_ids: String,
    pub severity: String,
    pub detail: String,
    pub first_seen: DateTime,
    pub last_seen: DateTime,
    pub reported_at: Option<DateTime>,
    pub resolved_at: Option<DateTime>,
    pub resolved_by: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
