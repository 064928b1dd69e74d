use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Which external source a pipeline run ingests from.
///
/// `GameApi` and `ClientExport` both refresh game characters; the export is
/// a partial snapshot (absence means nothing), the API is authoritative
/// (absence soft-deletes). `ChatPlatform` refreshes chat accounts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IngestSource {
    GameApi,
    ClientExport,
    ChatPlatform,
}

impl IngestSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            IngestSource::GameApi => "game_api",
            IngestSource::ClientExport => "client_export",
            IngestSource::ChatPlatform => "chat_platform",
        }
    }

    /// Whether a character absent from this source's snapshot should be
    /// soft-deleted. Only the game API sees the full roster.
    pub fn is_authoritative(&self) -> bool {
        matches!(self, IngestSource::GameApi)
    }

    pub const ALL: [IngestSource; 3] = [
        IngestSource::GameApi,
        IngestSource::ClientExport,
        IngestSource::ChatPlatform,
    ];
}

impl std::fmt::Display for IngestSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Already-parsed game-character snapshot row, keyed by (name, realm).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CharacterSnapshot {
    pub name: String,
    pub realm: String,
    pub primary_note: Option<String>,
    pub secondary_note: Option<String>,
    pub last_login: Option<NaiveDateTime>,
}

/// Already-parsed chat-platform member snapshot row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatAccountSnapshot {
    pub account_id: String,
    pub handle: String,
    pub display_name: Option<String>,
    pub role_tags: Vec<String>,
    pub present: bool,
}
