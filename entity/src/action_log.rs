use sea_orm::entity::prelude::*;

/// Append-only audit record of claim/unclaim/reassign/confirm operations
/// against the identity graph.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "action_log")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub action: String,
    pub player_id: Option<i32>,
    pub character_id: Option<i32>,
    pub actor: String,
    pub detail: String,
    pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
