use sea_orm::entity::prelude::*;

/// Canonical identity unifying one or more game characters and at most one
/// chat account. The unique nullable `chat_account_id` column is what
/// guarantees a chat account is owned by at most one player.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "player")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub display_name: String,
    #[sea_orm(unique)]
    pub chat_account_id: Option<i32>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::chat_account::Entity",
        from = "Column::ChatAccountId",
        to = "super::chat_account::Column::Id"
    )]
    ChatAccount,
    #[sea_orm(has_many = "super::link::Entity")]
    Link,
    #[sea_orm(has_many = "super::alias::Entity")]
    Alias,
}

impl Related<super::chat_account::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ChatAccount.def()
    }
}

impl Related<super::link::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Link.def()
    }
}

impl Related<super::alias::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Alias.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
