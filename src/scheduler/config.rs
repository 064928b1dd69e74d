//! Cron schedules for the periodic reconciliation runs, one per snapshot
//! source. Offsets are staggered so the chat roster lands between game
//! refreshes and the full pipeline never piles up at the top of the hour.

pub mod game_api {
    /// Cron expression for the authoritative game roster refresh
    /// Runs hourly at the top of the hour
    pub const CRON_EXPRESSION: &str = "0 0 * * * *";
}

pub mod client_export {
    /// Cron expression for picking up uploaded client exports
    /// Runs every 6 hours at half past (00:30, 06:30, 12:30, 18:30)
    pub const CRON_EXPRESSION: &str = "0 30 */6 * * *";
}

pub mod chat_platform {
    /// Cron expression for the chat member roster refresh
    /// Runs hourly at a quarter past
    pub const CRON_EXPRESSION: &str = "0 15 * * * *";
}
