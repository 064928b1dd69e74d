//! The issue registry: reconciles freshly detected anomaly candidates
//! against the persistent ledger, so each standing problem is exactly one
//! open row no matter how many sweeps re-detect it.

use std::collections::HashSet;

use sea_orm::DatabaseConnection;

use crate::data::IssueRepository;
use crate::error::Error;
use crate::model::issue::{issue_hash, IssueCandidate, IssueKind};
use crate::model::run::IssueSweepCounts;
use crate::service::link::SYSTEM_ACTOR;

pub struct IssueService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> IssueService<'a> {
    /// Creates a new instance of [`IssueService`]
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// File a candidate against the ledger: refresh the open row carrying
    /// its hash, or open a new one. Returns the row and whether it was
    /// freshly created.
    pub async fn create_or_refresh(
        &self,
        candidate: &IssueCandidate,
    ) -> Result<(entity::issue::Model, bool), Error> {
        let repo = IssueRepository::new(self.db);

        match repo.find_open_by_hash(&candidate.dedupe_hash()).await? {
            Some(existing) => {
                let refreshed = repo.touch(existing, &candidate.detail).await?;
                Ok((refreshed, false))
            }
            None => {
                let created = repo.insert(candidate).await?;
                tracing::info!(
                    issue_type = created.issue_type.as_str(),
                    subjects = created.subject_ids.as_str(),
                    "Opened issue"
                );
                Ok((created, true))
            }
        }
    }

    /// File a full sweep's worth of candidates, then resolve every open row
    /// whose condition the sweep no longer detected. Manually resolved rows
    /// are untouched either way.
    pub async fn apply(&self, candidates: &[IssueCandidate]) -> Result<IssueSweepCounts, Error> {
        let mut counts = IssueSweepCounts::default();

        for candidate in candidates {
            let (_, created) = self.create_or_refresh(candidate).await?;
            if created {
                counts.created += 1;
            } else {
                counts.refreshed += 1;
            }
        }

        let live_hashes: HashSet<String> =
            candidates.iter().map(|c| c.dedupe_hash()).collect();
        counts.resolved = self.auto_resolve_sweep(&live_hashes).await?;

        Ok(counts)
    }

    /// Resolve every open row whose hash is absent from the live set; the
    /// condition that raised it no longer holds.
    pub async fn auto_resolve_sweep(
        &self,
        live_hashes: &HashSet<String>,
    ) -> Result<usize, Error> {
        let repo = IssueRepository::new(self.db);
        let mut resolved = 0;

        for issue in repo.get_open().await? {
            if !live_hashes.contains(&issue.dedupe_hash) {
                repo.resolve(issue, SYSTEM_ACTOR).await?;
                resolved += 1;
            }
        }

        if resolved > 0 {
            tracing::info!(resolved, "Auto-resolved issues no longer detected");
        }

        Ok(resolved)
    }

    /// Manually resolve the open issue identified by kind and subjects.
    /// Returns the resolved row, or None when no matching open row exists.
    pub async fn resolve(
        &self,
        kind: IssueKind,
        subject_ids: &[i32],
        resolved_by: &str,
    ) -> Result<Option<entity::issue::Model>, Error> {
        let repo = IssueRepository::new(self.db);

        match repo.find_open_by_hash(&issue_hash(kind, subject_ids)).await? {
            Some(issue) => Ok(Some(repo.resolve(issue, resolved_by).await?)),
            None => Ok(None),
        }
    }

    pub async fn get_open(&self) -> Result<Vec<entity::issue::Model>, Error> {
        Ok(IssueRepository::new(self.db).get_open().await?)
    }
}
