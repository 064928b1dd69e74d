use sea_orm::entity::prelude::*;

/// Read-only snapshot record of an in-game avatar, keyed by (name, realm).
/// Created and refreshed exclusively by ingestion; absent characters are
/// soft-deleted via `deleted_at` rather than removed.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "game_character")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub realm: String,
    pub primary_note: Option<String>,
    pub secondary_note: Option<String>,
    pub last_login: Option<DateTime>,
    pub provenance: String,
    pub deleted_at: Option<DateTime>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::link::Entity")]
    Link,
}

impl Related<super::link::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Link.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
