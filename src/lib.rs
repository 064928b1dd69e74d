//! Identity reconciliation core for game community rosters.
//!
//! Lodestone merges three independently-updated views of the same
//! population (a game-character registry, a chat-platform member registry,
//! and the internal canonical player record) into one identity graph.
//! Matching runs
//! over noisy signals (exact names, free-text annotation hints, fuzzy string
//! similarity), re-runs are idempotent, and contradictions surface as a
//! deduplicated, self-healing issue ledger instead of repeated alerts.
//!
//! The crate is a library core: snapshot transport and notification delivery
//! live behind the [`service::ingest::SnapshotProvider`] and
//! [`service::report::Notifier`] seams, and the surrounding application
//! drives everything through [`scheduler::Scheduler`].

pub mod config;
pub mod data;
pub mod error;
pub mod model;
pub mod scheduler;
pub mod service;
pub mod util;
