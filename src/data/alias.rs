use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter,
};

pub struct AliasRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> AliasRepository<'a> {
    /// Creates a new instance of [`AliasRepository`]
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Record a confirmed hint string for a player. Idempotent per
    /// (player, alias) pair; returns the row and whether it was inserted.
    pub async fn add(
        &self,
        player_id: i32,
        alias: &str,
    ) -> Result<(entity::alias::Model, bool), DbErr> {
        let existing = entity::prelude::Alias::find()
            .filter(entity::alias::Column::PlayerId.eq(player_id))
            .filter(entity::alias::Column::Alias.eq(alias))
            .one(self.db)
            .await?;

        if let Some(existing) = existing {
            return Ok((existing, false));
        }

        let row = entity::alias::ActiveModel {
            player_id: ActiveValue::Set(player_id),
            alias: ActiveValue::Set(alias.to_string()),
            created_at: ActiveValue::Set(Utc::now().naive_utc()),
            ..Default::default()
        };

        Ok((row.insert(self.db).await?, true))
    }

    pub async fn get_many_by_player(
        &self,
        player_id: i32,
    ) -> Result<Vec<entity::alias::Model>, DbErr> {
        entity::prelude::Alias::find()
            .filter(entity::alias::Column::PlayerId.eq(player_id))
            .all(self.db)
            .await
    }
}
