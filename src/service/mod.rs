//! Service layer: the reconciliation policy on top of the repositories.
//!
//! Each service borrows the database connection and composes repositories;
//! the scheduler sequences them and owns the locking discipline that keeps
//! identity-graph writes serialized.

pub mod drift;
pub mod ingest;
pub mod issue;
pub mod link;
pub mod matching;
pub mod report;
