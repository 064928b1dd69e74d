//! The reporter: batches open, not-yet-reported issues by kind and hands
//! them to the configured notifier. Rows are only stamped reported after
//! the notifier accepts the batch, so a failed dispatch retries next cycle.

use async_trait::async_trait;
use sea_orm::DatabaseConnection;

use crate::data::IssueRepository;
use crate::error::Error;
use crate::model::issue::Severity;

/// One outbound notification covering every new issue of a single kind.
#[derive(Clone, Debug, PartialEq)]
pub struct NotificationBatch {
    pub title: String,
    pub body: String,
    pub severity: Severity,
}

/// Destination for issue notifications. Implementations deliver to whatever
/// channel the deployment uses; delivery failure surfaces as an error and
/// leaves the batch's issues unreported.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, batch: NotificationBatch) -> Result<(), Error>;
}

pub struct ReportService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> ReportService<'a> {
    /// Creates a new instance of [`ReportService`]
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Dispatch every open unreported issue, one batch per issue kind, and
    /// stamp the dispatched rows. Returns how many issues were reported.
    /// Kinds are processed in first-seen order; a notifier failure stops the
    /// cycle and leaves the failed batch (and later kinds) for the next one.
    pub async fn dispatch_new_issues(&self, notifier: &dyn Notifier) -> Result<usize, Error> {
        let repo = IssueRepository::new(self.db);
        let pending = repo.get_open_unreported().await?;
        if pending.is_empty() {
            return Ok(0);
        }

        let mut kinds: Vec<String> = Vec::new();
        for issue in &pending {
            if !kinds.contains(&issue.issue_type) {
                kinds.push(issue.issue_type.clone());
            }
        }

        let mut reported = 0;
        for kind in kinds {
            let group: Vec<&entity::issue::Model> =
                pending.iter().filter(|i| i.issue_type == kind).collect();

            let batch = Self::build_batch(&kind, &group);
            notifier.notify(batch).await?;

            for issue in group {
                repo.mark_reported(issue.clone()).await?;
                reported += 1;
            }

            tracing::info!(kind = kind.as_str(), "Reported issue batch");
        }

        Ok(reported)
    }

    fn build_batch(kind: &str, group: &[&entity::issue::Model]) -> NotificationBatch {
        let severity = group
            .iter()
            .map(|i| Severity::parse(&i.severity))
            .max()
            .unwrap_or(Severity::Info);

        let body = group
            .iter()
            .map(|i| format!("- subjects [{}]: {}", i.subject_ids, i.detail))
            .collect::<Vec<_>>()
            .join("\n");

        NotificationBatch {
            title: format!("{} new {} issue(s)", group.len(), kind),
            body,
            severity,
        }
    }
}
