use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue, DatabaseConnection, DbErr, EntityTrait, IntoActiveModel,
    QueryOrder,
};

use crate::model::run::{RunStage, RunStatus};
use crate::model::snapshot::IngestSource;

/// Everything a finished run writes back onto its `sync_run` row.
#[derive(Clone, Copy, Debug, Default)]
pub struct RunCounters {
    pub characters_upserted: usize,
    pub characters_removed: usize,
    pub accounts_upserted: usize,
    pub accounts_removed: usize,
    pub players_created: usize,
    pub links_created: usize,
    pub suggestions_flagged: usize,
    pub issues_created: usize,
    pub issues_refreshed: usize,
    pub issues_resolved: usize,
    pub notifications_sent: usize,
}

pub struct SyncRunRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> SyncRunRepository<'a> {
    /// Creates a new instance of [`SyncRunRepository`]
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Open a run record in `running` status. A restart finds the stale row
    /// in the table instead of losing track of an in-flight run.
    pub async fn create(&self, source: IngestSource) -> Result<entity::sync_run::Model, DbErr> {
        let run = entity::sync_run::ActiveModel {
            source: ActiveValue::Set(source.as_str().to_string()),
            status: ActiveValue::Set(RunStatus::Running.as_str().to_string()),
            stage: ActiveValue::Set(RunStage::Idle.as_str().to_string()),
            characters_upserted: ActiveValue::Set(0),
            characters_removed: ActiveValue::Set(0),
            accounts_upserted: ActiveValue::Set(0),
            accounts_removed: ActiveValue::Set(0),
            players_created: ActiveValue::Set(0),
            links_created: ActiveValue::Set(0),
            suggestions_flagged: ActiveValue::Set(0),
            issues_created: ActiveValue::Set(0),
            issues_refreshed: ActiveValue::Set(0),
            issues_resolved: ActiveValue::Set(0),
            notifications_sent: ActiveValue::Set(0),
            error: ActiveValue::Set(None),
            started_at: ActiveValue::Set(Utc::now().naive_utc()),
            finished_at: ActiveValue::Set(None),
            duration_ms: ActiveValue::Set(None),
            ..Default::default()
        };

        run.insert(self.db).await
    }

    /// Advance the run's recorded stage.
    pub async fn set_stage(
        &self,
        run: entity::sync_run::Model,
        stage: RunStage,
    ) -> Result<entity::sync_run::Model, DbErr> {
        let mut run_am = run.into_active_model();
        run_am.stage = ActiveValue::Set(stage.as_str().to_string());

        run_am.update(self.db).await
    }

    /// Close out a run with its final status, counters, and optional error
    /// text. Duration is measured from the row's `started_at`.
    pub async fn finalize(
        &self,
        run: entity::sync_run::Model,
        status: RunStatus,
        counters: &RunCounters,
        error: Option<String>,
    ) -> Result<entity::sync_run::Model, DbErr> {
        let finished_at = Utc::now().naive_utc();
        let duration_ms = (finished_at - run.started_at).num_milliseconds();

        let mut run_am = run.into_active_model();
        run_am.status = ActiveValue::Set(status.as_str().to_string());
        run_am.characters_upserted = ActiveValue::Set(counters.characters_upserted as i32);
        run_am.characters_removed = ActiveValue::Set(counters.characters_removed as i32);
        run_am.accounts_upserted = ActiveValue::Set(counters.accounts_upserted as i32);
        run_am.accounts_removed = ActiveValue::Set(counters.accounts_removed as i32);
        run_am.players_created = ActiveValue::Set(counters.players_created as i32);
        run_am.links_created = ActiveValue::Set(counters.links_created as i32);
        run_am.suggestions_flagged = ActiveValue::Set(counters.suggestions_flagged as i32);
        run_am.issues_created = ActiveValue::Set(counters.issues_created as i32);
        run_am.issues_refreshed = ActiveValue::Set(counters.issues_refreshed as i32);
        run_am.issues_resolved = ActiveValue::Set(counters.issues_resolved as i32);
        run_am.notifications_sent = ActiveValue::Set(counters.notifications_sent as i32);
        run_am.error = ActiveValue::Set(error);
        run_am.finished_at = ActiveValue::Set(Some(finished_at));
        run_am.duration_ms = ActiveValue::Set(Some(duration_ms));

        run_am.update(self.db).await
    }

    pub async fn get_all(&self) -> Result<Vec<entity::sync_run::Model>, DbErr> {
        entity::prelude::SyncRun::find()
            .order_by_asc(entity::sync_run::Column::Id)
            .all(self.db)
            .await
    }
}
