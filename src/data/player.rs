use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter,
};

pub struct PlayerRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> PlayerRepository<'a> {
    /// Creates a new instance of [`PlayerRepository`]
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create a canonical player, optionally owning a chat account.
    ///
    /// The unique constraint on `chat_account_id` rejects a second player
    /// claiming the same account.
    pub async fn create(
        &self,
        display_name: String,
        chat_account_id: Option<i32>,
    ) -> Result<entity::player::Model, DbErr> {
        let player = entity::player::ActiveModel {
            display_name: ActiveValue::Set(display_name),
            chat_account_id: ActiveValue::Set(chat_account_id),
            created_at: ActiveValue::Set(Utc::now().naive_utc()),
            updated_at: ActiveValue::Set(Utc::now().naive_utc()),
            ..Default::default()
        };

        player.insert(self.db).await
    }

    pub async fn get(&self, id: i32) -> Result<Option<entity::player::Model>, DbErr> {
        entity::prelude::Player::find_by_id(id).one(self.db).await
    }

    pub async fn get_all(&self) -> Result<Vec<entity::player::Model>, DbErr> {
        entity::prelude::Player::find().all(self.db).await
    }

    /// Find the player owning the given chat account entry, if any.
    pub async fn find_by_chat_account(
        &self,
        chat_account_id: i32,
    ) -> Result<Option<entity::player::Model>, DbErr> {
        entity::prelude::Player::find()
            .filter(entity::player::Column::ChatAccountId.eq(chat_account_id))
            .one(self.db)
            .await
    }

    pub async fn count(&self) -> Result<u64, DbErr> {
        entity::prelude::Player::find().count(self.db).await
    }
}
