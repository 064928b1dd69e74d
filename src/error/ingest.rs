use thiserror::Error;

/// Snapshot ingestion error type.
///
/// Terminal for the run that triggered it: the failure is recorded on the
/// `sync_run` row and nothing is retried inside the core. Retry policy
/// belongs to the surrounding scheduler.
#[derive(Error, Debug)]
pub enum IngestError {
    /// The snapshot provider did not respond within the configured timeout.
    #[error("Snapshot fetch for {source_name} timed out after {timeout_secs}s")]
    Timeout { source_name: String, timeout_secs: u64 },

    /// The provider produced a snapshot the core cannot apply.
    #[error("Malformed snapshot from {source_name}: {reason}")]
    MalformedSnapshot { source_name: String, reason: String },

    /// The provider itself failed (network, auth, upstream outage).
    #[error("Snapshot provider failed for {source_name}: {reason}")]
    Provider { source_name: String, reason: String },
}
