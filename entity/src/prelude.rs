pub use super::action_log::Entity as ActionLog;
pub use super::alias::Entity as Alias;
pub use super::chat_account::Entity as ChatAccount;
pub use super::game_character::Entity as GameCharacter;
pub use super::issue::Entity as Issue;
pub use super::link::Entity as Link;
pub use super::player::Entity as Player;
pub use super::sync_run::Entity as SyncRun;
