use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    IntoActiveModel, QueryFilter, QueryOrder,
};

use crate::model::confidence::{Confidence, LinkSource};

pub struct LinkRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> LinkRepository<'a> {
    /// Creates a new instance of [`LinkRepository`]
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create an active link row. Callers (the link service) are
    /// responsible for ensuring no other active link exists for the
    /// character.
    pub async fn create(
        &self,
        player_id: i32,
        character_id: i32,
        source: LinkSource,
        confidence: Confidence,
    ) -> Result<entity::link::Model, DbErr> {
        let link = entity::link::ActiveModel {
            player_id: ActiveValue::Set(player_id),
            character_id: ActiveValue::Set(character_id),
            link_source: ActiveValue::Set(source.as_str().to_string()),
            confidence: ActiveValue::Set(confidence.as_str().to_string()),
            detached_at: ActiveValue::Set(None),
            detached_by: ActiveValue::Set(None),
            created_at: ActiveValue::Set(Utc::now().naive_utc()),
            updated_at: ActiveValue::Set(Utc::now().naive_utc()),
            ..Default::default()
        };

        link.insert(self.db).await
    }

    /// The active (not detached) link owning a character, if any.
    pub async fn find_active_by_character(
        &self,
        character_id: i32,
    ) -> Result<Option<entity::link::Model>, DbErr> {
        entity::prelude::Link::find()
            .filter(entity::link::Column::CharacterId.eq(character_id))
            .filter(entity::link::Column::DetachedAt.is_null())
            .one(self.db)
            .await
    }

    pub async fn get(&self, id: i32) -> Result<Option<entity::link::Model>, DbErr> {
        entity::prelude::Link::find_by_id(id).one(self.db).await
    }

    pub async fn get_all_active(&self) -> Result<Vec<entity::link::Model>, DbErr> {
        entity::prelude::Link::find()
            .filter(entity::link::Column::DetachedAt.is_null())
            .order_by_asc(entity::link::Column::Id)
            .all(self.db)
            .await
    }

    /// Stamp a link detached. The row survives for history; only the stamp
    /// makes it inactive.
    pub async fn detach(
        &self,
        link_id: i32,
        detached_by: &str,
    ) -> Result<Option<entity::link::Model>, DbErr> {
        let link = match entity::prelude::Link::find_by_id(link_id).one(self.db).await? {
            Some(link) => link,
            None => return Ok(None),
        };

        let mut link_am = link.into_active_model();
        link_am.detached_at = ActiveValue::Set(Some(Utc::now().naive_utc()));
        link_am.detached_by = ActiveValue::Set(Some(detached_by.to_string()));
        link_am.updated_at = ActiveValue::Set(Utc::now().naive_utc());

        let link = link_am.update(self.db).await?;

        Ok(Some(link))
    }

    /// Overwrite a link's confidence tier (manual confirmation path).
    pub async fn set_confidence(
        &self,
        link_id: i32,
        confidence: Confidence,
    ) -> Result<Option<entity::link::Model>, DbErr> {
        let link = match entity::prelude::Link::find_by_id(link_id).one(self.db).await? {
            Some(link) => link,
            None => return Ok(None),
        };

        let mut link_am = link.into_active_model();
        link_am.confidence = ActiveValue::Set(confidence.as_str().to_string());
        link_am.updated_at = ActiveValue::Set(Utc::now().naive_utc());

        let link = link_am.update(self.db).await?;

        Ok(Some(link))
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::DbErr;

    use crate::data::{
        character::CharacterRepository, link::LinkRepository, player::PlayerRepository,
    };
    use crate::model::confidence::{Confidence, LinkSource};
    use crate::util::test::{mock::character_snapshot, setup::test_db};

    /// Expect detach to preserve the row while removing it from the active set
    #[tokio::test]
    async fn test_detach_preserves_row() -> Result<(), DbErr> {
        let db = test_db().await?;
        let player_repo = PlayerRepository::new(&db);
        let character_repo = CharacterRepository::new(&db);
        let link_repo = LinkRepository::new(&db);

        let player = player_repo.create("nightowl".to_string(), None).await?;
        let character = character_repo
            .upsert(&character_snapshot("Brightmoon"), "game_api")
            .await?;

        let link = link_repo
            .create(player.id, character.id, LinkSource::Manual, Confidence::High)
            .await?;
        let detached = link_repo.detach(link.id, "admin").await?.unwrap();

        assert!(detached.detached_at.is_some());
        assert_eq!(detached.detached_by.as_deref(), Some("admin"));
        assert!(link_repo.find_active_by_character(character.id).await?.is_none());
        assert!(link_repo.get(link.id).await?.is_some());

        Ok(())
    }
}
