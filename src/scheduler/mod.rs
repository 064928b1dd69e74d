//! Orchestration of the reconciliation pipeline.
//!
//! Each run ingests one source's snapshot, then holds the pipeline lock
//! through matching, drift scanning, and reporting. Every run writes a
//! `sync_run` row recording its stage, counters, and outcome; a failed
//! stage finalizes the run as failed with the stage it died in, and keeps
//! everything the earlier stages already committed.

use std::collections::HashMap;
use std::sync::Arc;

use sea_orm::DatabaseConnection;
use tokio::sync::Mutex;

use crate::config::Config;
use crate::data::{
    CharacterRepository, ChatAccountRepository, LinkRepository, PlayerRepository, RunCounters,
    SyncRunRepository,
};
use crate::error::Error;
use crate::model::run::{CoverageStats, RunStage, RunStatus};
use crate::model::snapshot::IngestSource;
use crate::service::drift::DriftScanner;
use crate::service::ingest::{IngestService, SnapshotProvider};
use crate::service::issue::IssueService;
use crate::service::matching::MatchingService;
use crate::service::report::{Notifier, ReportService};

pub mod config;
pub mod cron;

pub struct Scheduler {
    db: DatabaseConnection,
    config: Config,
    provider: Arc<dyn SnapshotProvider>,
    notifier: Arc<dyn Notifier>,
    source_locks: HashMap<IngestSource, Mutex<()>>,
    pipeline_lock: Mutex<()>,
}

impl Scheduler {
    /// Creates a new instance of [`Scheduler`]
    pub fn new(
        db: DatabaseConnection,
        config: Config,
        provider: Arc<dyn SnapshotProvider>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let source_locks = IngestSource::ALL
            .iter()
            .map(|source| (*source, Mutex::new(())))
            .collect();

        Self {
            db,
            config,
            provider,
            notifier,
            source_locks,
            pipeline_lock: Mutex::new(()),
        }
    }

    /// Execute one full reconciliation run for a source.
    ///
    /// Runs for the same source are serialized; runs for different sources
    /// may overlap in ingestion but take the pipeline lock one at a time for
    /// the matching, drift, and reporting stages.
    ///
    /// A stage failure is recorded on the run row (status `failed`, the
    /// stage it failed in, the error text) and returned as a normal run
    /// result. `Err` is reserved for bookkeeping failures where not even
    /// the run row could be written.
    pub async fn run_once(&self, source: IngestSource) -> Result<entity::sync_run::Model, Error> {
        let source_lock = self.source_locks.get(&source).ok_or_else(|| {
            Error::InternalError(format!("No run lock for source {source}"))
        })?;
        let _source_guard = source_lock.lock().await;

        let run_repo = SyncRunRepository::new(&self.db);
        let mut run = run_repo.create(source).await?;
        let mut counters = RunCounters::default();

        tracing::info!(run_id = run.id, source = source.as_str(), "Starting run");

        run = run_repo.set_stage(run, RunStage::Ingesting).await?;
        let ingest = IngestService::new(&self.db, &self.config);
        match ingest.ingest(source, self.provider.as_ref()).await {
            Ok(counts) => match source {
                IngestSource::ChatPlatform => {
                    counters.accounts_upserted = counts.upserted;
                    counters.accounts_removed = counts.removed;
                }
                IngestSource::GameApi | IngestSource::ClientExport => {
                    counters.characters_upserted = counts.upserted;
                    counters.characters_removed = counts.removed;
                }
            },
            Err(error) => return self.fail(run, &counters, error).await,
        }

        let _pipeline_guard = self.pipeline_lock.lock().await;

        run = run_repo.set_stage(run, RunStage::Matching).await?;
        let outcome = match MatchingService::new(&self.db, &self.config).run_pass().await {
            Ok(outcome) => outcome,
            Err(error) => return self.fail(run, &counters, error).await,
        };
        counters.players_created = outcome.counts.players_created;
        counters.links_created = outcome.counts.links_created;
        counters.suggestions_flagged = outcome.counts.suggestions_flagged;

        run = run_repo.set_stage(run, RunStage::ScanningDrift).await?;
        let mut candidates = outcome.suggestions;
        match DriftScanner::new(&self.db, &self.config).scan().await {
            Ok(mut drift) => candidates.append(&mut drift),
            Err(error) => return self.fail(run, &counters, error).await,
        }
        let sweep = match IssueService::new(&self.db).apply(&candidates).await {
            Ok(sweep) => sweep,
            Err(error) => return self.fail(run, &counters, error).await,
        };
        counters.issues_created = sweep.created;
        counters.issues_refreshed = sweep.refreshed;
        counters.issues_resolved = sweep.resolved;

        run = run_repo.set_stage(run, RunStage::Reporting).await?;
        match ReportService::new(&self.db)
            .dispatch_new_issues(self.notifier.as_ref())
            .await
        {
            Ok(sent) => counters.notifications_sent = sent,
            Err(error) => return self.fail(run, &counters, error).await,
        }

        let run = run_repo
            .finalize(run, RunStatus::Completed, &counters, None)
            .await?;

        tracing::info!(
            run_id = run.id,
            source = source.as_str(),
            links_created = counters.links_created,
            issues_created = counters.issues_created,
            "Run completed"
        );

        Ok(run)
    }

    async fn fail(
        &self,
        run: entity::sync_run::Model,
        counters: &RunCounters,
        error: Error,
    ) -> Result<entity::sync_run::Model, Error> {
        tracing::error!(
            run_id = run.id,
            stage = run.stage.as_str(),
            "Run failed: {error}"
        );

        SyncRunRepository::new(&self.db)
            .finalize(run, RunStatus::Failed, counters, Some(error.to_string()))
            .await
            .map_err(Error::from)
    }

    /// Every unresolved issue, oldest first.
    pub async fn open_issues(&self) -> Result<Vec<entity::issue::Model>, Error> {
        IssueService::new(&self.db).get_open().await
    }

    /// Headline numbers for how much of the registry is reconciled.
    pub async fn coverage_stats(&self) -> Result<CoverageStats, Error> {
        let characters = CharacterRepository::new(&self.db).get_all_active().await?;
        let accounts = ChatAccountRepository::new(&self.db).get_all_active().await?;
        let links = LinkRepository::new(&self.db).get_all_active().await?;
        let players = PlayerRepository::new(&self.db).get_all().await?;

        let linked: std::collections::HashSet<i32> =
            links.iter().map(|l| l.character_id).collect();
        let characters_linked = characters.iter().filter(|c| linked.contains(&c.id)).count();

        Ok(CoverageStats {
            characters_total: characters.len(),
            characters_linked,
            characters_unlinked: characters.len() - characters_linked,
            accounts_total: accounts.len(),
            accounts_claimed: players.iter().filter(|p| p.chat_account_id.is_some()).count(),
            players_total: players.len(),
        })
    }
}
