//! Snapshot ingestion: applying already-parsed external snapshots to the
//! local registries.
//!
//! Transport lives behind [`SnapshotProvider`]; the core never speaks to the
//! game API or chat platform itself. Provider calls are the only suspension
//! points with a timeout; everything after them is storage work.

use async_trait::async_trait;

use sea_orm::DatabaseConnection;

use crate::config::Config;
use crate::data::{CharacterRepository, ChatAccountRepository};
use crate::error::{Error, IngestError};
use crate::model::run::IngestCounts;
use crate::model::snapshot::{CharacterSnapshot, ChatAccountSnapshot, IngestSource};

/// Source of already-parsed external snapshots.
///
/// Implementations do whatever network or file work they need; the core
/// wraps each call in [`Config::ingest_timeout`] and treats a timeout as
/// that source's ingestion failure.
#[async_trait]
pub trait SnapshotProvider: Send + Sync {
    /// Full or partial character roster for a game-side source.
    async fn fetch_characters(
        &self,
        source: IngestSource,
    ) -> Result<Vec<CharacterSnapshot>, IngestError>;

    /// Current chat-platform member list.
    async fn fetch_chat_accounts(&self) -> Result<Vec<ChatAccountSnapshot>, IngestError>;
}

pub struct IngestService<'a> {
    db: &'a DatabaseConnection,
    config: &'a Config,
}

impl<'a> IngestService<'a> {
    /// Creates a new instance of [`IngestService`]
    pub fn new(db: &'a DatabaseConnection, config: &'a Config) -> Self {
        Self { db, config }
    }

    /// Fetch the source's snapshot and apply it. Character sources upsert
    /// (and, for the authoritative game API, soft-delete absentees); the
    /// chat platform refreshes the member registry the same way.
    pub async fn ingest(
        &self,
        source: IngestSource,
        provider: &dyn SnapshotProvider,
    ) -> Result<IngestCounts, Error> {
        match source {
            IngestSource::GameApi | IngestSource::ClientExport => {
                let snapshots = self
                    .with_timeout(source, provider.fetch_characters(source))
                    .await?;
                self.apply_characters(source, snapshots).await
            }
            IngestSource::ChatPlatform => {
                let snapshots = self
                    .with_timeout(source, provider.fetch_chat_accounts())
                    .await?;
                self.apply_chat_accounts(snapshots).await
            }
        }
    }

    async fn with_timeout<T>(
        &self,
        source: IngestSource,
        fut: impl std::future::Future<Output = Result<T, IngestError>>,
    ) -> Result<T, Error> {
        let result = tokio::time::timeout(self.config.ingest_timeout, fut)
            .await
            .map_err(|_| IngestError::Timeout {
                source_name: source.as_str().to_string(),
                timeout_secs: self.config.ingest_timeout.as_secs(),
            })??;

        Ok(result)
    }

    async fn apply_characters(
        &self,
        source: IngestSource,
        snapshots: Vec<CharacterSnapshot>,
    ) -> Result<IngestCounts, Error> {
        let character_repo = CharacterRepository::new(self.db);
        let mut counts = IngestCounts::default();

        for snapshot in &snapshots {
            if snapshot.name.trim().is_empty() || snapshot.realm.trim().is_empty() {
                return Err(IngestError::MalformedSnapshot {
                    source_name: source.as_str().to_string(),
                    reason: "character row with empty name or realm".to_string(),
                }
                .into());
            }

            character_repo.upsert(snapshot, source.as_str()).await?;
            counts.upserted += 1;
        }

        // A client export is partial: absence from it means nothing.
        if source.is_authoritative() {
            let present_keys: Vec<(String, String)> = snapshots
                .iter()
                .map(|s| (s.name.clone(), s.realm.clone()))
                .collect();
            counts.removed = character_repo.soft_delete_absent(&present_keys).await?;
        }

        tracing::info!(
            source = source.as_str(),
            upserted = counts.upserted,
            removed = counts.removed,
            "Applied character snapshot"
        );

        Ok(counts)
    }

    async fn apply_chat_accounts(
        &self,
        snapshots: Vec<ChatAccountSnapshot>,
    ) -> Result<IngestCounts, Error> {
        let account_repo = ChatAccountRepository::new(self.db);
        let mut counts = IngestCounts::default();

        for snapshot in &snapshots {
            if snapshot.account_id.trim().is_empty() || snapshot.handle.trim().is_empty() {
                return Err(IngestError::MalformedSnapshot {
                    source_name: IngestSource::ChatPlatform.as_str().to_string(),
                    reason: "member row with empty account id or handle".to_string(),
                }
                .into());
            }

            account_repo.upsert(snapshot).await?;
            counts.upserted += 1;
        }

        let present_ids: Vec<String> = snapshots.iter().map(|s| s.account_id.clone()).collect();
        counts.removed = account_repo.soft_delete_absent(&present_ids).await?;

        tracing::info!(
            upserted = counts.upserted,
            removed = counts.removed,
            "Applied chat member snapshot"
        );

        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use crate::config::Config;
    use crate::error::{Error, IngestError};
    use crate::model::snapshot::{CharacterSnapshot, ChatAccountSnapshot, IngestSource};
    use crate::service::ingest::{IngestService, SnapshotProvider};
    use crate::util::test::{
        mock::{character_snapshot, chat_account_snapshot, FixedProvider},
        setup::test_db,
    };

    /// Provider that never responds, for timeout coverage.
    struct HangingProvider;

    #[async_trait]
    impl SnapshotProvider for HangingProvider {
        async fn fetch_characters(
            &self,
            _source: IngestSource,
        ) -> Result<Vec<CharacterSnapshot>, IngestError> {
            std::future::pending().await
        }

        async fn fetch_chat_accounts(&self) -> Result<Vec<ChatAccountSnapshot>, IngestError> {
            std::future::pending().await
        }
    }

    /// Expect upserts for every row and soft deletion only for the game API
    #[tokio::test]
    async fn test_game_api_ingest_is_authoritative() -> Result<(), Error> {
        let db = test_db().await?;
        let config = Config::default();
        let ingest = IngestService::new(&db, &config);

        let provider = FixedProvider {
            characters: vec![character_snapshot("Brightmoon"), character_snapshot("Trogg")],
            accounts: vec![],
        };
        let counts = ingest.ingest(IngestSource::GameApi, &provider).await?;

        assert_eq!(counts.upserted, 2);
        assert_eq!(counts.removed, 0);

        // Next snapshot only carries Brightmoon; Trogg is soft-deleted.
        let provider = FixedProvider {
            characters: vec![character_snapshot("Brightmoon")],
            accounts: vec![],
        };
        let counts = ingest.ingest(IngestSource::GameApi, &provider).await?;

        assert_eq!(counts.upserted, 1);
        assert_eq!(counts.removed, 1);

        Ok(())
    }

    /// Expect a partial client export to never soft-delete absentees
    #[tokio::test]
    async fn test_client_export_is_partial() -> Result<(), Error> {
        let db = test_db().await?;
        let config = Config::default();
        let ingest = IngestService::new(&db, &config);

        let provider = FixedProvider {
            characters: vec![character_snapshot("Brightmoon"), character_snapshot("Trogg")],
            accounts: vec![],
        };
        ingest.ingest(IngestSource::GameApi, &provider).await?;

        let provider = FixedProvider {
            characters: vec![character_snapshot("Brightmoon")],
            accounts: vec![],
        };
        let counts = ingest.ingest(IngestSource::ClientExport, &provider).await?;

        assert_eq!(counts.upserted, 1);
        assert_eq!(counts.removed, 0);

        Ok(())
    }

    /// Expect a malformed row to abort the run without partial soft deletes
    #[tokio::test]
    async fn test_malformed_snapshot_is_terminal() -> Result<(), Error> {
        let db = test_db().await?;
        let config = Config::default();
        let ingest = IngestService::new(&db, &config);

        let provider = FixedProvider {
            characters: vec![],
            accounts: vec![chat_account_snapshot("", "nightowl")],
        };
        let result = ingest.ingest(IngestSource::ChatPlatform, &provider).await;

        assert!(matches!(
            result,
            Err(Error::IngestError(IngestError::MalformedSnapshot { .. }))
        ));

        Ok(())
    }

    /// Expect a hung provider to fail with a timeout, not block forever
    #[tokio::test]
    async fn test_provider_timeout() -> Result<(), Error> {
        let db = test_db().await?;
        let config = Config {
            ingest_timeout: std::time::Duration::from_millis(20),
            ..Config::default()
        };
        let ingest = IngestService::new(&db, &config);

        let result = ingest.ingest(IngestSource::GameApi, &HangingProvider).await;

        assert!(matches!(
            result,
            Err(Error::IngestError(IngestError::Timeout { .. }))
        ));

        Ok(())
    }
}
