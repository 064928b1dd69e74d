//! Error types for the reconciliation core.
//!
//! Domain-specific error families live in their own modules and are
//! aggregated into a single [`Error`] via `thiserror`'s `#[from]` so the `?`
//! operator works across layers. Stage failures inside a pipeline run are
//! recorded on the run's `sync_run` row rather than propagated; an `Error`
//! escaping [`crate::scheduler::Scheduler::run_once`] means the failure
//! itself could not be recorded.

pub mod ingest;
pub mod link;

use thiserror::Error;

pub use ingest::IngestError;
pub use link::LinkError;

/// Main error type for the reconciliation core.
#[derive(Error, Debug)]
pub enum Error {
    /// Snapshot ingestion error (timeout or malformed snapshot).
    #[error(transparent)]
    IngestError(#[from] IngestError),
    /// Link store error (conflicting ownership).
    #[error(transparent)]
    LinkError(#[from] LinkError),
    /// Database error (query failures, connection issues, constraint
    /// violations).
    #[error(transparent)]
    DbErr(#[from] sea_orm::DbErr),
    /// Cron scheduler error (job registration, scheduler startup).
    #[error(transparent)]
    SchedulerError(#[from] tokio_cron_scheduler::JobSchedulerError),
    /// Internal error indicating a bug in lodestone's own logic.
    #[error("Internal error: {0:?}")]
    InternalError(String),
}
