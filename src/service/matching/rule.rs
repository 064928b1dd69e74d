//! The ordered matching rules.
//!
//! Rules are pure functions over a prebuilt [`MatchContext`], returning a
//! tagged [`RuleOutcome`] so each rule stays independently testable and the
//! pipeline's priority order is explicit in one place.

use crate::config::Config;
use crate::model::confidence::{Confidence, LinkSource};
use crate::util::hint::extract_hints;
use crate::util::similarity::similarity;
use crate::util::text::normalize;

/// One chat account as the matcher sees it: normalized names plus current
/// ownership.
#[derive(Clone, Debug)]
pub struct AccountEntry {
    pub id: i32,
    pub handle: String,
    pub norm_handle: String,
    pub norm_display: Option<String>,
    pub owner_player_id: Option<i32>,
}

/// Snapshot-ordered view of every live chat account, built once per pass.
#[derive(Clone, Debug, Default)]
pub struct MatchContext {
    pub accounts: Vec<AccountEntry>,
}

impl MatchContext {
    pub fn from_accounts(
        accounts: &[entity::chat_account::Model],
        owner_of_account: impl Fn(i32) -> Option<i32>,
    ) -> Self {
        let accounts = accounts
            .iter()
            .map(|account| AccountEntry {
                id: account.id,
                handle: account.handle.clone(),
                norm_handle: normalize(&account.handle),
                norm_display: account.display_name.as_deref().map(normalize),
                owner_player_id: owner_of_account(account.id),
            })
            .collect();

        Self { accounts }
    }

    /// Record that a player now owns an account, so later characters in the
    /// same pass see it as claimed.
    pub fn claim(&mut self, account_id: i32, player_id: i32) {
        if let Some(entry) = self.accounts.iter_mut().find(|a| a.id == account_id) {
            entry.owner_player_id = Some(player_id);
        }
    }

    fn matches_name(entry: &AccountEntry, norm: &str) -> bool {
        entry.norm_handle == norm || entry.norm_display.as_deref() == Some(norm)
    }

    /// Any live account with the given normalized name, owned or not.
    pub fn find_any_by_name(&self, norm: &str) -> Option<&AccountEntry> {
        if norm.is_empty() {
            return None;
        }
        self.accounts.iter().find(|a| Self::matches_name(a, norm))
    }

    /// An unowned account with the given normalized name.
    pub fn find_unowned_by_name(&self, norm: &str) -> Option<&AccountEntry> {
        if norm.is_empty() {
            return None;
        }
        self.accounts
            .iter()
            .filter(|a| a.owner_player_id.is_none())
            .find(|a| Self::matches_name(a, norm))
    }
}

/// What a rule decided for one character.
#[derive(Clone, Debug, PartialEq)]
pub enum RuleOutcome {
    NoMatch,
    Match {
        account_id: i32,
        confidence: Confidence,
        source: LinkSource,
        /// The hint string that produced the match, for alias accumulation.
        hint: Option<String>,
    },
    Suggest {
        account_id: i32,
        score: f64,
    },
}

/// Apply the rules in priority order; the first rule producing a candidate
/// wins and no further rules are evaluated for this character.
pub fn evaluate(
    ctx: &MatchContext,
    character: &entity::game_character::Model,
    config: &Config,
) -> RuleOutcome {
    let norm_name = normalize(&character.name);

    let outcome = exact_name(ctx, &norm_name);
    if outcome != RuleOutcome::NoMatch {
        return outcome;
    }

    let outcome = note_hint(ctx, character.primary_note.as_deref());
    if outcome != RuleOutcome::NoMatch {
        return outcome;
    }

    let outcome = note_hint(ctx, character.secondary_note.as_deref());
    if outcome != RuleOutcome::NoMatch {
        return outcome;
    }

    fuzzy(ctx, &norm_name, config)
}

/// Rule 1: exact normalized-name equality against an unowned account.
fn exact_name(ctx: &MatchContext, norm_name: &str) -> RuleOutcome {
    match ctx.find_unowned_by_name(norm_name) {
        Some(account) => RuleOutcome::Match {
            account_id: account.id,
            confidence: Confidence::High,
            source: LinkSource::ExactName,
            hint: None,
        },
        None => RuleOutcome::NoMatch,
    }
}

/// Rules 2 and 3: a hint extracted from an annotation resolves to any known
/// account, owned or not. The first resolving hint wins.
fn note_hint(ctx: &MatchContext, note: Option<&str>) -> RuleOutcome {
    let Some(note) = note else {
        return RuleOutcome::NoMatch;
    };

    for hint in extract_hints(note) {
        if let Some(account) = ctx.find_any_by_name(&normalize(&hint)) {
            return RuleOutcome::Match {
                account_id: account.id,
                confidence: Confidence::High,
                source: LinkSource::Hint,
                hint: Some(hint),
            };
        }
    }

    RuleOutcome::NoMatch
}

/// Rule 4: fuzzy similarity against the remaining unowned accounts. Ties
/// break on score, then on snapshot order.
fn fuzzy(ctx: &MatchContext, norm_name: &str, config: &Config) -> RuleOutcome {
    let mut best: Option<(&AccountEntry, f64)> = None;

    for entry in ctx.accounts.iter().filter(|a| a.owner_player_id.is_none()) {
        let mut score = similarity(norm_name, &entry.norm_handle);
        if let Some(display) = entry.norm_display.as_deref() {
            score = score.max(similarity(norm_name, display));
        }

        // Strictly-greater keeps the earliest candidate on ties.
        if best.map(|(_, s)| score > s).unwrap_or(score > 0.0) {
            best = Some((entry, score));
        }
    }

    match best {
        Some((account, score)) if score >= config.auto_link_threshold => RuleOutcome::Match {
            account_id: account.id,
            confidence: Confidence::Medium,
            source: LinkSource::Fuzzy,
            hint: None,
        },
        Some((account, score)) if score >= config.suggest_threshold => RuleOutcome::Suggest {
            account_id: account.id,
            score,
        },
        _ => RuleOutcome::NoMatch,
    }
}

#[cfg(test)]
mod tests {
    use super::{evaluate, AccountEntry, MatchContext, RuleOutcome};
    use crate::config::Config;
    use crate::model::confidence::{Confidence, LinkSource};

    fn entry(id: i32, handle: &str) -> AccountEntry {
        AccountEntry {
            id,
            handle: handle.to_string(),
            norm_handle: handle.to_lowercase(),
            norm_display: None,
            owner_player_id: None,
        }
    }

    fn character(name: &str, note: Option<&str>) -> entity::game_character::Model {
        let now = chrono::Utc::now().naive_utc();
        entity::game_character::Model {
            id: 1,
            name: name.to_string(),
            realm: "silvermoon".to_string(),
            primary_note: note.map(str::to_string),
            secondary_note: None,
            last_login: None,
            provenance: "game_api".to_string(),
            deleted_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn exact_name_outranks_fuzzy_when_both_apply() {
        // "brightmoon" matches account 2 exactly and account 1 fuzzily.
        let ctx = MatchContext {
            accounts: vec![entry(1, "brightmoo"), entry(2, "brightmoon")],
        };

        let outcome = evaluate(&ctx, &character("Brightmoon", None), &Config::default());

        assert_eq!(
            outcome,
            RuleOutcome::Match {
                account_id: 2,
                confidence: Confidence::High,
                source: LinkSource::ExactName,
                hint: None,
            }
        );
    }

    #[test]
    fn hint_outranks_fuzzy() {
        let ctx = MatchContext {
            accounts: vec![entry(1, "brightmoo"), entry(2, "nightowl")],
        };

        let outcome = evaluate(
            &ctx,
            &character("Brightmoon", Some("contact: nightowl")),
            &Config::default(),
        );

        assert_eq!(
            outcome,
            RuleOutcome::Match {
                account_id: 2,
                confidence: Confidence::High,
                source: LinkSource::Hint,
                hint: Some("nightowl".to_string()),
            }
        );
    }

    #[test]
    fn hint_resolves_to_owned_account() {
        let mut ctx = MatchContext {
            accounts: vec![entry(1, "nightowl")],
        };
        ctx.claim(1, 7);

        let outcome = evaluate(
            &ctx,
            &character("Moonwhisper", Some("alt of nightowl")),
            &Config::default(),
        );

        assert!(matches!(
            outcome,
            RuleOutcome::Match {
                account_id: 1,
                source: LinkSource::Hint,
                ..
            }
        ));
    }

    #[test]
    fn fuzzy_above_auto_threshold_matches_medium() {
        let ctx = MatchContext {
            accounts: vec![entry(1, "trog")],
        };

        let outcome = evaluate(&ctx, &character("Trogg", None), &Config::default());

        assert_eq!(
            outcome,
            RuleOutcome::Match {
                account_id: 1,
                confidence: Confidence::Medium,
                source: LinkSource::Fuzzy,
                hint: None,
            }
        );
    }

    #[test]
    fn fuzzy_between_thresholds_suggests_with_score() {
        let ctx = MatchContext {
            accounts: vec![entry(1, "zeed")],
        };

        let outcome = evaluate(&ctx, &character("Zed", None), &Config::default());

        match outcome {
            RuleOutcome::Suggest { account_id, score } => {
                assert_eq!(account_id, 1);
                assert!((score - 0.75).abs() < 1e-9);
            }
            other => panic!("expected Suggest, got {other:?}"),
        }
    }

    #[test]
    fn fuzzy_below_suggest_threshold_is_no_match() {
        let ctx = MatchContext {
            accounts: vec![entry(1, "grimjaw")],
        };

        let outcome = evaluate(&ctx, &character("Brightmoon", None), &Config::default());

        assert_eq!(outcome, RuleOutcome::NoMatch);
    }

    #[test]
    fn fuzzy_ties_break_on_snapshot_order() {
        // Both candidates contain the name with the same shared length.
        let ctx = MatchContext {
            accounts: vec![entry(5, "trogga"), entry(6, "troggb")],
        };

        let outcome = evaluate(&ctx, &character("Trogg", None), &Config::default());

        assert!(matches!(outcome, RuleOutcome::Match { account_id: 5, .. }));
    }

    #[test]
    fn owned_accounts_are_invisible_to_exact_and_fuzzy() {
        let mut ctx = MatchContext {
            accounts: vec![entry(1, "brightmoon")],
        };
        ctx.claim(1, 7);

        let outcome = evaluate(&ctx, &character("Brightmoon", None), &Config::default());

        assert_eq!(outcome, RuleOutcome::NoMatch);
    }
}
