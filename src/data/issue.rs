use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    IntoActiveModel, QueryFilter, QueryOrder,
};

use crate::model::issue::IssueCandidate;

pub struct IssueRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> IssueRepository<'a> {
    /// Creates a new instance of [`IssueRepository`]
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// The unresolved row carrying this dedupe hash, if one exists.
    /// Resolved rows never block a fresh detection of the same problem.
    pub async fn find_open_by_hash(
        &self,
        dedupe_hash: &str,
    ) -> Result<Option<entity::issue::Model>, DbErr> {
        entity::prelude::Issue::find()
            .filter(entity::issue::Column::DedupeHash.eq(dedupe_hash))
            .filter(entity::issue::Column::ResolvedAt.is_null())
            .one(self.db)
            .await
    }

    /// Insert a fresh unresolved, unreported ledger row for a candidate.
    pub async fn insert(&self, candidate: &IssueCandidate) -> Result<entity::issue::Model, DbErr> {
        let now = Utc::now().naive_utc();

        let issue = entity::issue::ActiveModel {
            issue_type: ActiveValue::Set(candidate.kind.as_str().to_string()),
            dedupe_hash: ActiveValue::Set(candidate.dedupe_hash()),
            subject_ids: ActiveValue::Set(candidate.subject_ids_string()),
            severity: ActiveValue::Set(candidate.kind.severity().as_str().to_string()),
            detail: ActiveValue::Set(candidate.detail.to_string()),
            first_seen: ActiveValue::Set(now),
            last_seen: ActiveValue::Set(now),
            reported_at: ActiveValue::Set(None),
            resolved_at: ActiveValue::Set(None),
            resolved_by: ActiveValue::Set(None),
            ..Default::default()
        };

        issue.insert(self.db).await
    }

    /// Refresh an open row's payload and last-seen stamp. No new row, no
    /// reset of `first_seen` or `reported_at`.
    pub async fn touch(
        &self,
        issue: entity::issue::Model,
        detail: &serde_json::Value,
    ) -> Result<entity::issue::Model, DbErr> {
        let mut issue_am = issue.into_active_model();
        issue_am.detail = ActiveValue::Set(detail.to_string());
        issue_am.last_seen = ActiveValue::Set(Utc::now().naive_utc());

        issue_am.update(self.db).await
    }

    /// Stamp an issue resolved. The row is preserved for history.
    pub async fn resolve(
        &self,
        issue: entity::issue::Model,
        resolved_by: &str,
    ) -> Result<entity::issue::Model, DbErr> {
        let mut issue_am = issue.into_active_model();
        issue_am.resolved_at = ActiveValue::Set(Some(Utc::now().naive_utc()));
        issue_am.resolved_by = ActiveValue::Set(Some(resolved_by.to_string()));

        issue_am.update(self.db).await
    }

    pub async fn get_open(&self) -> Result<Vec<entity::issue::Model>, DbErr> {
        entity::prelude::Issue::find()
            .filter(entity::issue::Column::ResolvedAt.is_null())
            .order_by_asc(entity::issue::Column::Id)
            .all(self.db)
            .await
    }

    /// Open issues the reporter has not yet handed to the notifier.
    pub async fn get_open_unreported(&self) -> Result<Vec<entity::issue::Model>, DbErr> {
        entity::prelude::Issue::find()
            .filter(entity::issue::Column::ResolvedAt.is_null())
            .filter(entity::issue::Column::ReportedAt.is_null())
            .order_by_asc(entity::issue::Column::Id)
            .all(self.db)
            .await
    }

    pub async fn mark_reported(
        &self,
        issue: entity::issue::Model,
    ) -> Result<entity::issue::Model, DbErr> {
        let mut issue_am = issue.into_active_model();
        issue_am.reported_at = ActiveValue::Set(Some(Utc::now().naive_utc()));

        issue_am.update(self.db).await
    }
}
