use serde::{Deserialize, Serialize};

/// Terminal status of a pipeline run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Running,
    Completed,
    Failed,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Running => "running",
            RunStatus::Completed => "completed",
            RunStatus::Failed => "failed",
        }
    }
}

/// Stage a pipeline run is in. Failure from any stage aborts the run and
/// skips the later stages; writes committed by completed stages remain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStage {
    Idle,
    Ingesting,
    Matching,
    ScanningDrift,
    Reporting,
}

impl RunStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStage::Idle => "idle",
            RunStage::Ingesting => "ingesting",
            RunStage::Matching => "matching",
            RunStage::ScanningDrift => "scanning_drift",
            RunStage::Reporting => "reporting",
        }
    }
}

/// What ingestion touched for one source.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IngestCounts {
    pub upserted: usize,
    pub removed: usize,
}

/// What one matching pass produced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MatchCounts {
    pub players_created: usize,
    pub links_created: usize,
    pub suggestions_flagged: usize,
}

/// What one issue-registry pass did to the ledger.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IssueSweepCounts {
    pub created: usize,
    pub refreshed: usize,
    pub resolved: usize,
}

/// Linked-versus-unlinked totals for the surrounding application's
/// dashboards.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageStats {
    pub characters_total: usize,
    pub characters_linked: usize,
    pub characters_unlinked: usize,
    pub accounts_total: usize,
    pub accounts_claimed: usize,
    pub players_total: usize,
}
