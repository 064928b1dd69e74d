pub mod prelude;

pub mod action_log;
pub mod alias;
pub mod chat_account;
pub mod game_character;
pub mod issue;
pub mod link;
pub mod player;
pub mod sync_run;
