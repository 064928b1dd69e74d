use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    IntoActiveModel, QueryFilter, QueryOrder,
};

use crate::model::snapshot::ChatAccountSnapshot;

pub struct ChatAccountRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> ChatAccountRepository<'a> {
    /// Creates a new instance of [`ChatAccountRepository`]
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Insert or refresh a chat member from a snapshot row, keyed by the
    /// platform account id.
    pub async fn upsert(
        &self,
        snapshot: &ChatAccountSnapshot,
    ) -> Result<entity::chat_account::Model, DbErr> {
        let existing = entity::prelude::ChatAccount::find()
            .filter(entity::chat_account::Column::AccountId.eq(snapshot.account_id.as_str()))
            .one(self.db)
            .await?;

        let role_tags = snapshot.role_tags.join(",");

        match existing {
            Some(account) => {
                let mut account_am = account.into_active_model();
                account_am.handle = ActiveValue::Set(snapshot.handle.clone());
                account_am.display_name = ActiveValue::Set(snapshot.display_name.clone());
                account_am.role_tags = ActiveValue::Set(role_tags);
                account_am.present = ActiveValue::Set(snapshot.present);
                account_am.deleted_at = ActiveValue::Set(None);
                account_am.updated_at = ActiveValue::Set(Utc::now().naive_utc());

                account_am.update(self.db).await
            }
            None => {
                let account = entity::chat_account::ActiveModel {
                    account_id: ActiveValue::Set(snapshot.account_id.clone()),
                    handle: ActiveValue::Set(snapshot.handle.clone()),
                    display_name: ActiveValue::Set(snapshot.display_name.clone()),
                    role_tags: ActiveValue::Set(role_tags),
                    present: ActiveValue::Set(snapshot.present),
                    deleted_at: ActiveValue::Set(None),
                    created_at: ActiveValue::Set(Utc::now().naive_utc()),
                    updated_at: ActiveValue::Set(Utc::now().naive_utc()),
                    ..Default::default()
                };

                account.insert(self.db).await
            }
        }
    }

    /// Soft-delete every live account absent from the latest member
    /// snapshot. Returns how many were stamped.
    pub async fn soft_delete_absent(&self, present_ids: &[String]) -> Result<usize, DbErr> {
        let live = self.get_all_active().await?;
        let mut removed = 0;

        for account in live {
            if present_ids.contains(&account.account_id) {
                continue;
            }

            let mut account_am = account.into_active_model();
            account_am.deleted_at = ActiveValue::Set(Some(Utc::now().naive_utc()));
            account_am.updated_at = ActiveValue::Set(Utc::now().naive_utc());
            account_am.update(self.db).await?;

            removed += 1;
        }

        Ok(removed)
    }

    pub async fn get(&self, id: i32) -> Result<Option<entity::chat_account::Model>, DbErr> {
        entity::prelude::ChatAccount::find_by_id(id)
            .one(self.db)
            .await
    }

    /// All live accounts in snapshot order (insertion id ascending).
    pub async fn get_all_active(&self) -> Result<Vec<entity::chat_account::Model>, DbErr> {
        entity::prelude::ChatAccount::find()
            .filter(entity::chat_account::Column::DeletedAt.is_null())
            .order_by_asc(entity::chat_account::Column::Id)
            .all(self.db)
            .await
    }
}
