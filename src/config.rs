use chrono::Duration;
use std::time::Duration as StdDuration;

/// Runtime configuration for the reconciliation core.
///
/// The fuzzy thresholds mirror the historically-used 0.85 / 0.70 cutoffs but
/// are deliberately configurable rather than baked-in constants; nothing in
/// the matching rules assumes any particular values beyond
/// `suggest_threshold <= auto_link_threshold`.
#[derive(Clone, Debug)]
pub struct Config {
    /// Fuzzy similarity at or above which a link is created automatically
    /// at `medium` confidence.
    pub auto_link_threshold: f64,
    /// Fuzzy similarity at or above which (but below the auto threshold) a
    /// `suggested_link` issue is raised instead of a link.
    pub suggest_threshold: f64,
    /// Age past which an unreviewed, non-confirmed link is flagged by the
    /// drift scanner.
    pub stale_link_age: Duration,
    /// Timeout applied to each snapshot provider call. A timeout fails that
    /// source's run only; the identity graph is untouched.
    pub ingest_timeout: StdDuration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            auto_link_threshold: 0.85,
            suggest_threshold: 0.70,
            stale_link_age: Duration::days(30),
            ingest_timeout: StdDuration::from_secs(30),
        }
    }
}

impl Config {
    /// Builds a config from environment variables, falling back to the
    /// defaults for anything unset or unparseable.
    ///
    /// Recognized variables: `LODESTONE_AUTO_LINK_THRESHOLD`,
    /// `LODESTONE_SUGGEST_THRESHOLD`, `LODESTONE_STALE_LINK_DAYS`,
    /// `LODESTONE_INGEST_TIMEOUT_SECS`.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            auto_link_threshold: env_parse("LODESTONE_AUTO_LINK_THRESHOLD")
                .unwrap_or(defaults.auto_link_threshold),
            suggest_threshold: env_parse("LODESTONE_SUGGEST_THRESHOLD")
                .unwrap_or(defaults.suggest_threshold),
            stale_link_age: env_parse("LODESTONE_STALE_LINK_DAYS")
                .map(Duration::days)
                .unwrap_or(defaults.stale_link_age),
            ingest_timeout: env_parse("LODESTONE_INGEST_TIMEOUT_SECS")
                .map(StdDuration::from_secs)
                .unwrap_or(defaults.ingest_timeout),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}
