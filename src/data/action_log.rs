use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection, DbErr, EntityTrait, QueryOrder};

pub struct ActionLogRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> ActionLogRepository<'a> {
    /// Creates a new instance of [`ActionLogRepository`]
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Append an audit entry. The log is append-only; nothing in the core
    /// updates or deletes entries.
    pub async fn record(
        &self,
        action: &str,
        player_id: Option<i32>,
        character_id: Option<i32>,
        actor: &str,
        detail: &str,
    ) -> Result<entity::action_log::Model, DbErr> {
        let entry = entity::action_log::ActiveModel {
            action: ActiveValue::Set(action.to_string()),
            player_id: ActiveValue::Set(player_id),
            character_id: ActiveValue::Set(character_id),
            actor: ActiveValue::Set(actor.to_string()),
            detail: ActiveValue::Set(detail.to_string()),
            created_at: ActiveValue::Set(Utc::now().naive_utc()),
            ..Default::default()
        };

        entry.insert(self.db).await
    }

    pub async fn get_all(&self) -> Result<Vec<entity::action_log::Model>, DbErr> {
        entity::prelude::ActionLog::find()
            .order_by_asc(entity::action_log::Column::Id)
            .all(self.db)
            .await
    }
}
