use sea_orm::entity::prelude::*;

/// Provenance-carrying association between a player and a game character.
/// Rows are never deleted; a detached link keeps its history with
/// `detached_at`/`detached_by` stamped. The active link for a character is
/// the row where `detached_at` is null.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "link")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub player_id: i32,
    pub character_id: i32,
    pub link_source: String,
    pub confidence: String,
    pub detached_at: Option<DateTime>,
    pub detached_by: Option<String>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::player::Entity",
        from = "Column::PlayerId",
        to = "super::player::Column::Id"
    )]
    Player,
    #[sea_orm(
        belongs_to = "super::game_character::Entity",
        from = "Column::CharacterId",
        to = "super::game_character::Column::Id"
    )]
    GameCharacter,
}

impl Related<super::player::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Player.def()
    }
}

impl Related<super::game_character::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GameCharacter.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
