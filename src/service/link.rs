//! Link store: every mutation of the identity graph goes through here so
//! the ownership invariants hold and every claim/unclaim/reassign lands in
//! the action log.

use sea_orm::DatabaseConnection;
use serde_json::json;

use crate::data::{ActionLogRepository, AliasRepository, LinkRepository, PlayerRepository};
use crate::error::{Error, LinkError};
use crate::model::confidence::{Confidence, LinkSource};

/// Actor name recorded for writes the pipeline performs on its own.
pub const SYSTEM_ACTOR: &str = "system";

pub struct LinkService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> LinkService<'a> {
    /// Creates a new instance of [`LinkService`]
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create a canonical player owning the given chat account. Display
    /// name falls back to the handle when the platform has none.
    pub async fn create_player_for_account(
        &self,
        account: &entity::chat_account::Model,
    ) -> Result<entity::player::Model, Error> {
        let player_repo = PlayerRepository::new(self.db);

        let display_name = account
            .display_name
            .clone()
            .unwrap_or_else(|| account.handle.clone());

        let player = player_repo.create(display_name, Some(account.id)).await?;

        Ok(player)
    }

    /// Attach a character to a player.
    ///
    /// # Behavior
    /// - No active link exists: the link row is created and a `claim` entry
    ///   is logged.
    /// - An active link exists and `reassign` is false: rejected with
    ///   [`LinkError::ConflictingLink`], no state change.
    /// - An active link exists and `reassign` is true (manual admin path
    ///   only): the old row is stamped detached, the new link is created,
    ///   and a `reassign` entry is logged.
    pub async fn attach_character(
        &self,
        player_id: i32,
        character_id: i32,
        source: LinkSource,
        confidence: Confidence,
        actor: &str,
        reassign: bool,
    ) -> Result<entity::link::Model, Error> {
        let link_repo = LinkRepository::new(self.db);
        let log_repo = ActionLogRepository::new(self.db);

        if let Some(existing) = link_repo.find_active_by_character(character_id).await? {
            if !reassign {
                return Err(LinkError::ConflictingLink {
                    character_id,
                    owning_player_id: existing.player_id,
                }
                .into());
            }

            link_repo.detach(existing.id, actor).await?;
            let link = link_repo
                .create(player_id, character_id, source, confidence)
                .await?;
            log_repo
                .record(
                    "reassign",
                    Some(player_id),
                    Some(character_id),
                    actor,
                    &json!({
                        "from_player_id": existing.player_id,
                        "to_player_id": player_id,
                    })
                    .to_string(),
                )
                .await?;

            return Ok(link);
        }

        let link = link_repo
            .create(player_id, character_id, source, confidence)
            .await?;
        log_repo
            .record(
                "claim",
                Some(player_id),
                Some(character_id),
                actor,
                &json!({
                    "link_source": source.as_str(),
                    "confidence": confidence.as_str(),
                })
                .to_string(),
            )
            .await?;

        Ok(link)
    }

    /// Detach a character from its player. The link row is preserved with
    /// the detach stamp, so the operation is reversible by a later attach.
    pub async fn detach_character(
        &self,
        character_id: i32,
        actor: &str,
    ) -> Result<entity::link::Model, Error> {
        let link_repo = LinkRepository::new(self.db);
        let log_repo = ActionLogRepository::new(self.db);

        let link = link_repo
            .find_active_by_character(character_id)
            .await?
            .ok_or(LinkError::NotLinked { character_id })?;

        let link = link_repo
            .detach(link.id, actor)
            .await?
            .ok_or_else(|| Error::InternalError(format!("Link {} vanished mid-detach", link.id)))?;

        log_repo
            .record(
                "unclaim",
                Some(link.player_id),
                Some(character_id),
                actor,
                "{}",
            )
            .await?;

        Ok(link)
    }

    /// Raise a link to `confirmed` after human review.
    pub async fn confirm_link(
        &self,
        character_id: i32,
        actor: &str,
    ) -> Result<entity::link::Model, Error> {
        let link_repo = LinkRepository::new(self.db);
        let log_repo = ActionLogRepository::new(self.db);

        let link = link_repo
            .find_active_by_character(character_id)
            .await?
            .ok_or(LinkError::NotLinked { character_id })?;

        let previous = link.confidence.clone();
        let link = link_repo
            .set_confidence(link.id, Confidence::Confirmed)
            .await?
            .ok_or_else(|| Error::InternalError(format!("Link {} vanished mid-confirm", link.id)))?;

        log_repo
            .record(
                "confirm",
                Some(link.player_id),
                Some(character_id),
                actor,
                &json!({ "previous_confidence": previous }).to_string(),
            )
            .await?;

        Ok(link)
    }

    /// Record a confirmed hint string for a player; a repeat of the same
    /// pair is a no-op. Returns whether a row was inserted.
    pub async fn add_alias(&self, player_id: i32, alias: &str) -> Result<bool, Error> {
        let alias_repo = AliasRepository::new(self.db);
        let (_, inserted) = alias_repo.add(player_id, alias).await?;

        Ok(inserted)
    }
}
