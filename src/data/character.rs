use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    IntoActiveModel, QueryFilter, QueryOrder,
};

use crate::model::snapshot::CharacterSnapshot;

pub struct CharacterRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> CharacterRepository<'a> {
    /// Creates a new instance of [`CharacterRepository`]
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Insert or refresh a character from a snapshot row, keyed by
    /// (name, realm). A previously soft-deleted character that reappears in
    /// a snapshot comes back to life with `deleted_at` cleared.
    pub async fn upsert(
        &self,
        snapshot: &CharacterSnapshot,
        provenance: &str,
    ) -> Result<entity::game_character::Model, DbErr> {
        let existing = entity::prelude::GameCharacter::find()
            .filter(entity::game_character::Column::Name.eq(snapshot.name.as_str()))
            .filter(entity::game_character::Column::Realm.eq(snapshot.realm.as_str()))
            .one(self.db)
            .await?;

        match existing {
            Some(character) => {
                let mut character_am = character.into_active_model();
                character_am.primary_note = ActiveValue::Set(snapshot.primary_note.clone());
                character_am.secondary_note = ActiveValue::Set(snapshot.secondary_note.clone());
                character_am.last_login = ActiveValue::Set(snapshot.last_login);
                character_am.provenance = ActiveValue::Set(provenance.to_string());
                character_am.deleted_at = ActiveValue::Set(None);
                character_am.updated_at = ActiveValue::Set(Utc::now().naive_utc());

                character_am.update(self.db).await
            }
            None => {
                let character = entity::game_character::ActiveModel {
                    name: ActiveValue::Set(snapshot.name.clone()),
                    realm: ActiveValue::Set(snapshot.realm.clone()),
                    primary_note: ActiveValue::Set(snapshot.primary_note.clone()),
                    secondary_note: ActiveValue::Set(snapshot.secondary_note.clone()),
                    last_login: ActiveValue::Set(snapshot.last_login),
                    provenance: ActiveValue::Set(provenance.to_string()),
                    deleted_at: ActiveValue::Set(None),
                    created_at: ActiveValue::Set(Utc::now().naive_utc()),
                    updated_at: ActiveValue::Set(Utc::now().naive_utc()),
                    ..Default::default()
                };

                character.insert(self.db).await
            }
        }
    }

    /// Soft-delete every live character whose (name, realm) key is absent
    /// from the latest authoritative snapshot. Returns how many were
    /// stamped.
    pub async fn soft_delete_absent(
        &self,
        present_keys: &[(String, String)],
    ) -> Result<usize, DbErr> {
        let live = self.get_all_active().await?;
        let mut removed = 0;

        for character in live {
            let key_present = present_keys
                .iter()
                .any(|(name, realm)| *name == character.name && *realm == character.realm);
            if key_present {
                continue;
            }

            let mut character_am = character.into_active_model();
            character_am.deleted_at = ActiveValue::Set(Some(Utc::now().naive_utc()));
            character_am.updated_at = ActiveValue::Set(Utc::now().naive_utc());
            character_am.update(self.db).await?;

            removed += 1;
        }

        Ok(removed)
    }

    pub async fn get(&self, id: i32) -> Result<Option<entity::game_character::Model>, DbErr> {
        entity::prelude::GameCharacter::find_by_id(id)
            .one(self.db)
            .await
    }

    /// All live characters in snapshot order (insertion id ascending).
    pub async fn get_all_active(&self) -> Result<Vec<entity::game_character::Model>, DbErr> {
        entity::prelude::GameCharacter::find()
            .filter(entity::game_character::Column::DeletedAt.is_null())
            .order_by_asc(entity::game_character::Column::Id)
            .all(self.db)
            .await
    }
}
