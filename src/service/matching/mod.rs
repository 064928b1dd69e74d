//! The matching pipeline: turns unlinked characters into links (or
//! suggested-link issues) by running the ordered rules over fresh registry
//! state.

pub mod rule;

use std::collections::{HashMap, HashSet};

use sea_orm::DatabaseConnection;
use serde_json::json;

use crate::config::Config;
use crate::data::{CharacterRepository, ChatAccountRepository, LinkRepository, PlayerRepository};
use crate::error::Error;
use crate::model::issue::{IssueCandidate, IssueKind};
use crate::model::run::MatchCounts;
use crate::service::link::{LinkService, SYSTEM_ACTOR};

use self::rule::{evaluate, MatchContext, RuleOutcome};

/// What one pass produced: graph writes (counted) and suggested-link
/// candidates for the issue registry.
#[derive(Clone, Debug, Default)]
pub struct MatchOutcome {
    pub counts: MatchCounts,
    pub suggestions: Vec<IssueCandidate>,
}

pub struct MatchingService<'a> {
    db: &'a DatabaseConnection,
    config: &'a Config,
}

impl<'a> MatchingService<'a> {
    /// Creates a new instance of [`MatchingService`]
    pub fn new(db: &'a DatabaseConnection, config: &'a Config) -> Self {
        Self { db, config }
    }

    /// Run one matching pass over every unlinked live character.
    ///
    /// Matches attach to the existing player owning the account, or create
    /// a new player for it; hint-derived matches also record the hint as an
    /// alias. Accounts claimed earlier in the pass are unavailable to later
    /// characters. Two already-distinct players are never merged here.
    ///
    /// Idempotent: a second pass with unchanged input creates zero players,
    /// links, and aliases.
    pub async fn run_pass(&self) -> Result<MatchOutcome, Error> {
        let character_repo = CharacterRepository::new(self.db);
        let account_repo = ChatAccountRepository::new(self.db);
        let link_repo = LinkRepository::new(self.db);
        let player_repo = PlayerRepository::new(self.db);
        let link_service = LinkService::new(self.db);

        let characters = character_repo.get_all_active().await?;
        let accounts = account_repo.get_all_active().await?;
        let links = link_repo.get_all_active().await?;
        let players = player_repo.get_all().await?;

        let linked_characters: HashSet<i32> = links.iter().map(|l| l.character_id).collect();
        let account_owners: HashMap<i32, i32> = players
            .iter()
            .filter_map(|p| p.chat_account_id.map(|account_id| (account_id, p.id)))
            .collect();

        let mut ctx =
            MatchContext::from_accounts(&accounts, |account_id| {
                account_owners.get(&account_id).copied()
            });

        let mut outcome = MatchOutcome::default();

        for character in characters
            .iter()
            .filter(|c| !linked_characters.contains(&c.id))
        {
            match evaluate(&ctx, character, self.config) {
                RuleOutcome::NoMatch => {}
                RuleOutcome::Match {
                    account_id,
                    confidence,
                    source,
                    hint,
                } => {
                    let account = account_repo.get(account_id).await?.ok_or_else(|| {
                        Error::InternalError(format!(
                            "Matched chat account {account_id} vanished mid-pass"
                        ))
                    })?;

                    let player_id = match account_owners.get(&account_id).or(ctx
                        .accounts
                        .iter()
                        .find(|a| a.id == account_id)
                        .and_then(|a| a.owner_player_id.as_ref()))
                    {
                        Some(player_id) => *player_id,
                        None => {
                            let player = link_service.create_player_for_account(&account).await?;
                            outcome.counts.players_created += 1;
                            player.id
                        }
                    };
                    ctx.claim(account_id, player_id);

                    link_service
                        .attach_character(
                            player_id,
                            character.id,
                            source,
                            confidence,
                            SYSTEM_ACTOR,
                            false,
                        )
                        .await?;
                    outcome.counts.links_created += 1;

                    if let Some(hint) = hint {
                        link_service.add_alias(player_id, &hint).await?;
                    }

                    tracing::debug!(
                        character = character.name.as_str(),
                        account = account.handle.as_str(),
                        source = source.as_str(),
                        confidence = confidence.as_str(),
                        "Linked character to player"
                    );
                }
                RuleOutcome::Suggest { account_id, score } => {
                    let handle = ctx
                        .accounts
                        .iter()
                        .find(|a| a.id == account_id)
                        .map(|a| a.handle.clone())
                        .unwrap_or_default();

                    outcome.suggestions.push(IssueCandidate::new(
                        IssueKind::SuggestedLink,
                        vec![character.id, account_id],
                        json!({
                            "score": score,
                            "character_name": character.name,
                            "account_handle": handle,
                        }),
                    ));
                    outcome.counts.suggestions_flagged += 1;
                }
            }
        }

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use crate::config::Config;
    use crate::data::{
        AliasRepository, CharacterRepository, ChatAccountRepository, LinkRepository,
        PlayerRepository,
    };
    use crate::error::Error;
    use crate::model::issue::IssueKind;
    use crate::service::matching::MatchingService;
    use crate::util::test::{
        mock::{character_snapshot, character_snapshot_with_note, chat_account_snapshot},
        setup::test_db,
    };

    /// Hint scenario: "Brightmoon" annotated "contact: nightowl" with an
    /// unlinked "nightowl" account yields one player and one hint/high link
    #[tokio::test]
    async fn test_hint_match_creates_player_link_and_alias() -> Result<(), Error> {
        let db = test_db().await?;
        let config = Config::default();
        let character_repo = CharacterRepository::new(&db);
        let account_repo = ChatAccountRepository::new(&db);
        let player_repo = PlayerRepository::new(&db);
        let link_repo = LinkRepository::new(&db);
        let alias_repo = AliasRepository::new(&db);

        character_repo
            .upsert(
                &character_snapshot_with_note("Brightmoon", "contact: nightowl"),
                "game_api",
            )
            .await?;
        let account = account_repo
            .upsert(&chat_account_snapshot("100", "nightowl"))
            .await?;

        let outcome = MatchingService::new(&db, &config).run_pass().await?;

        assert_eq!(outcome.counts.players_created, 1);
        assert_eq!(outcome.counts.links_created, 1);
        assert_eq!(outcome.counts.suggestions_flagged, 0);

        let links = link_repo.get_all_active().await?;
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].link_source, "hint");
        assert_eq!(links[0].confidence, "high");

        let player = player_repo
            .find_by_chat_account(account.id)
            .await?
            .expect("player should own the account");
        let aliases = alias_repo.get_many_by_player(player.id).await?;
        assert_eq!(aliases.len(), 1);
        assert_eq!(aliases[0].alias, "nightowl");

        Ok(())
    }

    /// Fuzzy scenario: "Trogg" vs unlinked "trog" auto-links at medium
    #[tokio::test]
    async fn test_fuzzy_auto_link_at_medium() -> Result<(), Error> {
        let db = test_db().await?;
        let config = Config::default();
        let character_repo = CharacterRepository::new(&db);
        let account_repo = ChatAccountRepository::new(&db);
        let link_repo = LinkRepository::new(&db);

        character_repo
            .upsert(&character_snapshot("Trogg"), "game_api")
            .await?;
        account_repo
            .upsert(&chat_account_snapshot("100", "trog"))
            .await?;

        let outcome = MatchingService::new(&db, &config).run_pass().await?;

        assert_eq!(outcome.counts.links_created, 1);

        let links = link_repo.get_all_active().await?;
        assert_eq!(links[0].link_source, "fuzzy");
        assert_eq!(links[0].confidence, "medium");

        Ok(())
    }

    /// Suggest scenario: "Zed" vs "Zeed" creates no link and one suggestion
    /// carrying score 0.75
    #[tokio::test]
    async fn test_fuzzy_between_thresholds_suggests() -> Result<(), Error> {
        let db = test_db().await?;
        let config = Config::default();
        let character_repo = CharacterRepository::new(&db);
        let account_repo = ChatAccountRepository::new(&db);
        let link_repo = LinkRepository::new(&db);

        let character = character_repo
            .upsert(&character_snapshot("Zed"), "game_api")
            .await?;
        let account = account_repo
            .upsert(&chat_account_snapshot("100", "Zeed"))
            .await?;

        let outcome = MatchingService::new(&db, &config).run_pass().await?;

        assert!(link_repo.get_all_active().await?.is_empty());
        assert_eq!(outcome.counts.suggestions_flagged, 1);
        assert_eq!(outcome.suggestions.len(), 1);

        let suggestion = &outcome.suggestions[0];
        assert_eq!(suggestion.kind, IssueKind::SuggestedLink);
        assert_eq!(suggestion.subject_ids, vec![character.id, account.id]);

        let score = suggestion.detail["score"].as_f64().unwrap();
        assert!((score - 0.75).abs() < 1e-9);

        Ok(())
    }

    /// Exact rule beats fuzzy for the same character when both apply
    #[tokio::test]
    async fn test_exact_outranks_fuzzy() -> Result<(), Error> {
        let db = test_db().await?;
        let config = Config::default();
        let character_repo = CharacterRepository::new(&db);
        let account_repo = ChatAccountRepository::new(&db);
        let link_repo = LinkRepository::new(&db);

        character_repo
            .upsert(&character_snapshot("Brightmoon"), "game_api")
            .await?;
        account_repo
            .upsert(&chat_account_snapshot("100", "brightmoo"))
            .await?;
        let exact = account_repo
            .upsert(&chat_account_snapshot("200", "Brightmoon"))
            .await?;

        MatchingService::new(&db, &config).run_pass().await?;

        let links = link_repo.get_all_active().await?;
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].link_source, "exact_name");

        let player_repo = PlayerRepository::new(&db);
        assert!(player_repo.find_by_chat_account(exact.id).await?.is_some());

        Ok(())
    }

    /// A hint to an already-owned account attaches to the existing player
    /// instead of spawning a new one
    #[tokio::test]
    async fn test_hint_attaches_to_existing_player() -> Result<(), Error> {
        let db = test_db().await?;
        let config = Config::default();
        let character_repo = CharacterRepository::new(&db);
        let account_repo = ChatAccountRepository::new(&db);
        let player_repo = PlayerRepository::new(&db);
        let link_repo = LinkRepository::new(&db);

        let account = account_repo
            .upsert(&chat_account_snapshot("100", "nightowl"))
            .await?;
        let owner = player_repo
            .create("nightowl".to_string(), Some(account.id))
            .await?;

        character_repo
            .upsert(
                &character_snapshot_with_note("Moonwhisper", "alt of nightowl"),
                "game_api",
            )
            .await?;

        let outcome = MatchingService::new(&db, &config).run_pass().await?;

        assert_eq!(outcome.counts.players_created, 0);
        assert_eq!(outcome.counts.links_created, 1);

        let links = link_repo.get_all_active().await?;
        assert_eq!(links[0].player_id, owner.id);

        Ok(())
    }

    /// One account cannot be claimed by two characters in the same pass
    #[tokio::test]
    async fn test_account_claimed_once_per_pass() -> Result<(), Error> {
        let db = test_db().await?;
        let config = Config::default();
        let character_repo = CharacterRepository::new(&db);
        let account_repo = ChatAccountRepository::new(&db);
        let link_repo = LinkRepository::new(&db);

        character_repo
            .upsert(&character_snapshot("Trogg"), "game_api")
            .await?;
        character_repo
            .upsert(&character_snapshot("Troggx"), "game_api")
            .await?;
        account_repo
            .upsert(&chat_account_snapshot("100", "trogg"))
            .await?;

        let outcome = MatchingService::new(&db, &config).run_pass().await?;

        // Trogg takes the exact match; Troggx cannot fuzzy-claim the same
        // account afterwards.
        assert_eq!(outcome.counts.links_created, 1);
        let links = link_repo.get_all_active().await?;
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].link_source, "exact_name");

        Ok(())
    }

    /// A second pass over unchanged input writes nothing
    #[tokio::test]
    async fn test_second_pass_is_idempotent() -> Result<(), Error> {
        let db = test_db().await?;
        let config = Config::default();
        let character_repo = CharacterRepository::new(&db);
        let account_repo = ChatAccountRepository::new(&db);
        let player_repo = PlayerRepository::new(&db);
        let link_repo = LinkRepository::new(&db);

        character_repo
            .upsert(
                &character_snapshot_with_note("Brightmoon", "contact: nightowl"),
                "game_api",
            )
            .await?;
        character_repo
            .upsert(&character_snapshot("Zed"), "game_api")
            .await?;
        account_repo
            .upsert(&chat_account_snapshot("100", "nightowl"))
            .await?;
        account_repo
            .upsert(&chat_account_snapshot("200", "Zeed"))
            .await?;

        let matching = MatchingService::new(&db, &config);
        let first = matching.run_pass().await?;
        let players_after_first = player_repo.count().await?;
        let links_after_first = link_repo.get_all_active().await?.len();

        let second = matching.run_pass().await?;

        assert_eq!(first.counts.links_created, 1);
        assert_eq!(second.counts.players_created, 0);
        assert_eq!(second.counts.links_created, 0);
        assert_eq!(player_repo.count().await?, players_after_first);
        assert_eq!(link_repo.get_all_active().await?.len(), links_after_first);

        // The suggestion for Zed is re-emitted for the registry to dedupe.
        assert_eq!(second.suggestions, first.suggestions);

        Ok(())
    }
}
