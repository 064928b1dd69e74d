use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Kind of anomaly tracked by the issue registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// A fuzzy match scored below the auto-link threshold but above the
    /// suggest threshold; a human should review it.
    SuggestedLink,
    /// A linked character's current annotation resolves to a different chat
    /// account than the one its player owns.
    LinkContradictsNote,
    /// Two players own chat accounts the latest snapshot shows as the same
    /// underlying account.
    DuplicateChatClaim,
    /// A non-confirmed link has sat unreviewed past the configured age.
    StaleUnconfirmedLink,
}

impl IssueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueKind::SuggestedLink => "suggested_link",
            IssueKind::LinkContradictsNote => "link_contradicts_note",
            IssueKind::DuplicateChatClaim => "duplicate_chat_claim",
            IssueKind::StaleUnconfirmedLink => "stale_unconfirmed_link",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            IssueKind::SuggestedLink => Severity::Info,
            IssueKind::LinkContradictsNote => Severity::Warning,
            IssueKind::DuplicateChatClaim => Severity::Error,
            IssueKind::StaleUnconfirmedLink => Severity::Info,
        }
    }
}

/// How loudly an issue should be surfaced when reported.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }

    pub fn parse(value: &str) -> Self {
        match value {
            "error" => Severity::Error,
            "warning" => Severity::Warning,
            _ => Severity::Info,
        }
    }
}

/// One detected anomaly, before deduplication against the ledger.
///
/// The dedupe hash covers the kind and the ordered subject ids only. The
/// detail payload is free to change between detections of the same problem
/// without spawning a new ledger row.
#[derive(Clone, Debug, PartialEq)]
pub struct IssueCandidate {
    pub kind: IssueKind,
    pub subject_ids: Vec<i32>,
    pub detail: serde_json::Value,
}

impl IssueCandidate {
    pub fn new(kind: IssueKind, subject_ids: Vec<i32>, detail: serde_json::Value) -> Self {
        Self {
            kind,
            subject_ids,
            detail,
        }
    }

    /// Deterministic content hash over (kind, subject_ids).
    pub fn dedupe_hash(&self) -> String {
        issue_hash(self.kind, &self.subject_ids)
    }

    pub fn subject_ids_string(&self) -> String {
        self.subject_ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Deterministic hash identifying an anomaly by kind and subjects,
/// independent of any payload content.
pub fn issue_hash(kind: IssueKind, subject_ids: &[i32]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(kind.as_str().as_bytes());
    for id in subject_ids {
        hasher.update(b":");
        hasher.update(id.to_le_bytes());
    }
    format!("{:x}", hasher.finalize())
}
