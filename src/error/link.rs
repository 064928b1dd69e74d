use thiserror::Error;

/// Link store error type.
#[derive(Error, Debug)]
pub enum LinkError {
    /// Attach attempted on a character that already has an active link and
    /// no reassign intent was given. Rejected synchronously with no state
    /// change; reassignment is reserved for manual admin paths.
    #[error(
        "Character {character_id} is already linked to player {owning_player_id}; \
         pass reassign intent to transfer it"
    )]
    ConflictingLink {
        character_id: i32,
        owning_player_id: i32,
    },

    /// Detach or confirm attempted on a character with no active link.
    #[error("Character {character_id} has no active link")]
    NotLinked { character_id: i32 },
}
