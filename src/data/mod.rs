//! Data access layer: one repository per persisted entity.
//!
//! Repositories borrow the [`sea_orm::DatabaseConnection`] and stay free of
//! domain policy; ownership rules, dedupe discipline, and run sequencing all
//! live in the service layer above.

pub mod action_log;
pub mod alias;
pub mod character;
pub mod chat_account;
pub mod issue;
pub mod link;
pub mod player;
pub mod sync_run;

pub use action_log::ActionLogRepository;
pub use alias::AliasRepository;
pub use character::CharacterRepository;
pub use chat_account::ChatAccountRepository;
pub use issue::IssueRepository;
pub use link::LinkRepository;
pub use player::PlayerRepository;
pub use sync_run::{RunCounters, SyncRunRepository};
