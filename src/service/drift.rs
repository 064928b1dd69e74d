//! The drift scanner: re-checks the standing identity graph against the
//! latest snapshots and emits issue candidates for anything that no longer
//! holds up.

use std::collections::HashMap;

use chrono::Utc;
use sea_orm::DatabaseConnection;
use serde_json::json;

use crate::config::Config;
use crate::data::{CharacterRepository, ChatAccountRepository, LinkRepository, PlayerRepository};
use crate::error::Error;
use crate::model::confidence::Confidence;
use crate::model::issue::{IssueCandidate, IssueKind};
use crate::service::matching::rule::MatchContext;
use crate::util::hint::extract_hints;
use crate::util::text::normalize;

pub struct DriftScanner<'a> {
    db: &'a DatabaseConnection,
    config: &'a Config,
}

impl<'a> DriftScanner<'a> {
    /// Creates a new instance of [`DriftScanner`]
    pub fn new(db: &'a DatabaseConnection, config: &'a Config) -> Self {
        Self { db, config }
    }

    /// Run every drift check over current state and return the full set of
    /// candidates. The scan never mutates the graph; reconciling candidates
    /// against the ledger is the issue registry's job.
    pub async fn scan(&self) -> Result<Vec<IssueCandidate>, Error> {
        let character_repo = CharacterRepository::new(self.db);
        let account_repo = ChatAccountRepository::new(self.db);
        let link_repo = LinkRepository::new(self.db);
        let player_repo = PlayerRepository::new(self.db);

        let characters = character_repo.get_all_active().await?;
        let accounts = account_repo.get_all_active().await?;
        let links = link_repo.get_all_active().await?;
        let players = player_repo.get_all().await?;

        let characters_by_id: HashMap<i32, &entity::game_character::Model> =
            characters.iter().map(|c| (c.id, c)).collect();
        let players_by_id: HashMap<i32, &entity::player::Model> =
            players.iter().map(|p| (p.id, p)).collect();
        let account_owners: HashMap<i32, i32> = players
            .iter()
            .filter_map(|p| p.chat_account_id.map(|account_id| (account_id, p.id)))
            .collect();

        let ctx = MatchContext::from_accounts(&accounts, |account_id| {
            account_owners.get(&account_id).copied()
        });

        let mut candidates = Vec::new();
        self.contradicted_notes(&links, &characters_by_id, &players_by_id, &ctx, &mut candidates);
        self.duplicate_claims(&accounts, &account_owners, &mut candidates);
        self.stale_links(&links, &characters_by_id, &mut candidates);

        tracing::info!(candidates = candidates.len(), "Drift scan complete");

        Ok(candidates)
    }

    /// A linked character whose current annotation resolves to a different
    /// live account than the one its player owns. Skipped when the player
    /// owns no account at all; there is nothing to contradict then.
    fn contradicted_notes(
        &self,
        links: &[entity::link::Model],
        characters_by_id: &HashMap<i32, &entity::game_character::Model>,
        players_by_id: &HashMap<i32, &entity::player::Model>,
        ctx: &MatchContext,
        out: &mut Vec<IssueCandidate>,
    ) {
        for link in links {
            let Some(character) = characters_by_id.get(&link.character_id) else {
                continue;
            };
            let Some(owned_account_id) = players_by_id
                .get(&link.player_id)
                .and_then(|p| p.chat_account_id)
            else {
                continue;
            };

            let hinted = character
                .primary_note
                .as_deref()
                .into_iter()
                .chain(character.secondary_note.as_deref())
                .flat_map(extract_hints)
                .find_map(|hint| ctx.find_any_by_name(&normalize(&hint)).map(|a| (hint, a.id)));

            if let Some((hint, hinted_account_id)) = hinted {
                if hinted_account_id != owned_account_id {
                    out.push(IssueCandidate::new(
                        IssueKind::LinkContradictsNote,
                        vec![character.id, hinted_account_id],
                        json!({
                            "character_name": character.name,
                            "player_id": link.player_id,
                            "owned_account_id": owned_account_id,
                            "hint": hint,
                        }),
                    ));
                }
            }
        }
    }

    /// Two live account rows that normalize to the same handle while owned
    /// by different players.
    fn duplicate_claims(
        &self,
        accounts: &[entity::chat_account::Model],
        account_owners: &HashMap<i32, i32>,
        out: &mut Vec<IssueCandidate>,
    ) {
        let mut by_handle: HashMap<String, Vec<&entity::chat_account::Model>> = HashMap::new();
        for account in accounts {
            let norm = normalize(&account.handle);
            if norm.is_empty() {
                continue;
            }
            by_handle.entry(norm).or_default().push(account);
        }

        let mut groups: Vec<(&String, &Vec<&entity::chat_account::Model>)> =
            by_handle.iter().collect();
        groups.sort_by_key(|(norm, _)| norm.as_str());

        for (norm, group) in groups {
            let mut owners: Vec<i32> = group
                .iter()
                .filter_map(|account| account_owners.get(&account.id).copied())
                .collect();
            owners.sort_unstable();
            owners.dedup();

            if owners.len() >= 2 {
                out.push(IssueCandidate::new(
                    IssueKind::DuplicateChatClaim,
                    owners.clone(),
                    json!({
                        "handle": norm,
                        "account_ids": group.iter().map(|a| a.id).collect::<Vec<_>>(),
                    }),
                ));
            }
        }
    }

    /// Non-confirmed links older than the configured review window.
    fn stale_links(
        &self,
        links: &[entity::link::Model],
        characters_by_id: &HashMap<i32, &entity::game_character::Model>,
        out: &mut Vec<IssueCandidate>,
    ) {
        let cutoff = Utc::now().naive_utc() - self.config.stale_link_age;

        for link in links {
            if link.confidence == Confidence::Confirmed.as_str() {
                continue;
            }
            if link.created_at >= cutoff {
                continue;
            }

            let character_name = characters_by_id
                .get(&link.character_id)
                .map(|c| c.name.clone())
                .unwrap_or_default();

            out.push(IssueCandidate::new(
                IssueKind::StaleUnconfirmedLink,
                vec![link.id],
                json!({
                    "character_name": character_name,
                    "player_id": link.player_id,
                    "confidence": link.confidence,
                    "linked_at": link.created_at.and_utc().to_rfc3339(),
                }),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use sea_orm::{ActiveModelTrait, ActiveValue::Set, IntoActiveModel};

    use crate::config::Config;
    use crate::data::{CharacterRepository, ChatAccountRepository, PlayerRepository};
    use crate::error::Error;
    use crate::model::confidence::{Confidence, LinkSource};
    use crate::model::issue::IssueKind;
    use crate::service::drift::DriftScanner;
    use crate::service::link::LinkService;
    use crate::util::test::{
        mock::{character_snapshot, character_snapshot_with_note, chat_account_snapshot},
        setup::test_db,
    };

    /// A re-pointed annotation on a linked character raises exactly one
    /// contradiction, and a rescan raises the identical candidate again
    #[tokio::test]
    async fn test_repointed_note_contradicts_link() -> Result<(), Error> {
        let db = test_db().await?;
        let config = Config::default();
        let character_repo = CharacterRepository::new(&db);
        let account_repo = ChatAccountRepository::new(&db);
        let player_repo = PlayerRepository::new(&db);
        let link_service = LinkService::new(&db);

        let owned = account_repo
            .upsert(&chat_account_snapshot("100", "nightowl"))
            .await?;
        let other = account_repo
            .upsert(&chat_account_snapshot("200", "daybreak"))
            .await?;
        let player = player_repo
            .create("nightowl".to_string(), Some(owned.id))
            .await?;
        let character = character_repo
            .upsert(
                &character_snapshot_with_note("Brightmoon", "contact: daybreak"),
                "game_api",
            )
            .await?;
        link_service
            .attach_character(
                player.id,
                character.id,
                LinkSource::Hint,
                Confidence::High,
                "system",
                false,
            )
            .await?;

        let scanner = DriftScanner::new(&db, &config);
        let first = scanner.scan().await?;

        let contradictions: Vec<_> = first
            .iter()
            .filter(|c| c.kind == IssueKind::LinkContradictsNote)
            .collect();
        assert_eq!(contradictions.len(), 1);
        assert_eq!(contradictions[0].subject_ids, vec![character.id, other.id]);

        let second = scanner.scan().await?;
        assert_eq!(second, first);

        Ok(())
    }

    /// A note pointing at the account the player already owns is not drift
    #[tokio::test]
    async fn test_consistent_note_raises_nothing() -> Result<(), Error> {
        let db = test_db().await?;
        let config = Config::default();
        let character_repo = CharacterRepository::new(&db);
        let account_repo = ChatAccountRepository::new(&db);
        let player_repo = PlayerRepository::new(&db);
        let link_service = LinkService::new(&db);

        let account = account_repo
            .upsert(&chat_account_snapshot("100", "nightowl"))
            .await?;
        let player = player_repo
            .create("nightowl".to_string(), Some(account.id))
            .await?;
        let character = character_repo
            .upsert(
                &character_snapshot_with_note("Brightmoon", "contact: nightowl"),
                "game_api",
            )
            .await?;
        link_service
            .attach_character(
                player.id,
                character.id,
                LinkSource::Hint,
                Confidence::High,
                "system",
                false,
            )
            .await?;

        let candidates = DriftScanner::new(&db, &config).scan().await?;

        assert!(candidates
            .iter()
            .all(|c| c.kind != IssueKind::LinkContradictsNote));

        Ok(())
    }

    /// Two live rows normalizing to the same handle, owned by different
    /// players, flag one duplicate-claim pair
    #[tokio::test]
    async fn test_duplicate_handle_across_players() -> Result<(), Error> {
        let db = test_db().await?;
        let config = Config::default();
        let account_repo = ChatAccountRepository::new(&db);
        let player_repo = PlayerRepository::new(&db);

        let first = account_repo
            .upsert(&chat_account_snapshot("100", "NightOwl"))
            .await?;
        let second = account_repo
            .upsert(&chat_account_snapshot("200", "nightowl"))
            .await?;
        let player_a = player_repo
            .create("a".to_string(), Some(first.id))
            .await?;
        let player_b = player_repo
            .create("b".to_string(), Some(second.id))
            .await?;

        let candidates = DriftScanner::new(&db, &config).scan().await?;

        let duplicates: Vec<_> = candidates
            .iter()
            .filter(|c| c.kind == IssueKind::DuplicateChatClaim)
            .collect();
        assert_eq!(duplicates.len(), 1);

        let mut expected = vec![player_a.id, player_b.id];
        expected.sort_unstable();
        assert_eq!(duplicates[0].subject_ids, expected);

        Ok(())
    }

    /// Old unconfirmed links go stale; confirmed ones of the same age do not
    #[tokio::test]
    async fn test_stale_detection_spares_confirmed_links() -> Result<(), Error> {
        let db = test_db().await?;
        let config = Config::default();
        let character_repo = CharacterRepository::new(&db);
        let player_repo = PlayerRepository::new(&db);
        let link_service = LinkService::new(&db);

        let player = player_repo.create("owner".to_string(), None).await?;
        let old = character_repo
            .upsert(&character_snapshot("Trogg"), "game_api")
            .await?;
        let confirmed = character_repo
            .upsert(&character_snapshot("Brightmoon"), "game_api")
            .await?;

        let stale_link = link_service
            .attach_character(
                player.id,
                old.id,
                LinkSource::Fuzzy,
                Confidence::Medium,
                "system",
                false,
            )
            .await?;
        let confirmed_link = link_service
            .attach_character(
                player.id,
                confirmed.id,
                LinkSource::Manual,
                Confidence::Confirmed,
                "admin",
                false,
            )
            .await?;

        let backdated = Utc::now().naive_utc() - Duration::days(45);
        for link in [&stale_link, &confirmed_link] {
            let mut active = link.clone().into_active_model();
            active.created_at = Set(backdated);
            active.update(&db).await?;
        }

        let candidates = DriftScanner::new(&db, &config).scan().await?;

        let stale: Vec<_> = candidates
            .iter()
            .filter(|c| c.kind == IssueKind::StaleUnconfirmedLink)
            .collect();
        assert_eq!(stale.len(), 1);
        assert_eq!(stale[0].subject_ids, vec![stale_link.id]);

        Ok(())
    }

    /// A linked player with no chat account has nothing a note can contradict
    #[tokio::test]
    async fn test_accountless_player_is_skipped() -> Result<(), Error> {
        let db = test_db().await?;
        let config = Config::default();
        let character_repo = CharacterRepository::new(&db);
        let account_repo = ChatAccountRepository::new(&db);
        let player_repo = PlayerRepository::new(&db);
        let link_service = LinkService::new(&db);

        account_repo
            .upsert(&chat_account_snapshot("200", "daybreak"))
            .await?;
        let player = player_repo.create("loner".to_string(), None).await?;
        let character = character_repo
            .upsert(
                &character_snapshot_with_note("Brightmoon", "contact: daybreak"),
                "game_api",
            )
            .await?;
        link_service
            .attach_character(
                player.id,
                character.id,
                LinkSource::Manual,
                Confidence::Confirmed,
                "admin",
                false,
            )
            .await?;

        let candidates = DriftScanner::new(&db, &config).scan().await?;

        assert!(candidates
            .iter()
            .all(|c| c.kind != IssueKind::LinkContradictsNote));

        Ok(())
    }
}
