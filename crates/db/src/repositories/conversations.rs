use async_trait::async_trait;
use chrono::{DateTime, Utc};

use stockwise_core::domain::conversation::{
    ConversationTurn, NewConversationTurn, SessionId, TurnMetadata,
};

use super::{ConversationRepository, RepositoryError};
use crate::DbPool;

pub struct SqlConversationRepository {
    pool: DbPool,
}

impl SqlConversationRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct TurnRow {
    id: i64,
    session_id: String,
    user_message: String,
    assistant_message: String,
    intent: Option<String>,
    metadata: Option<String>,
    created_at: DateTime<Utc>,
}

impl TurnRow {
    fn into_turn(self) -> ConversationTurn {
        // Metadata is advisory context; a malformed blob degrades to
        // empty slots instead of failing the whole history read.
        let metadata = self
            .metadata
            .as_deref()
            .and_then(|raw| serde_json::from_str::<TurnMetadata>(raw).ok())
            .unwrap_or_default();

        ConversationTurn {
            id: self.id,
            session_id: SessionId(self.session_id),
            user_message: self.user_message,
            assistant_message: self.assistant_message,
            intent_label: self.intent,
            metadata,
            created_at: self.created_at,
        }
    }
}

const SELECT_COLUMNS: &str =
    "SELECT id, session_id, user_message, assistant_message, intent, metadata, created_at \
     FROM conversations";

#[async_trait]
impl ConversationRepository for SqlConversationRepository {
    async fn append(&self, turn: NewConversationTurn) -> Result<i64, RepositoryError> {
        let metadata = serde_json::to_string(&turn.metadata)
            .map_err(|error| RepositoryError::Decode(error.to_string()))?;

        let result = sqlx::query(
            "INSERT INTO conversations \
                 (session_id, user_message, assistant_message, intent, metadata) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&turn.session_id.0)
        .bind(&turn.user_message)
        .bind(&turn.assistant_message)
        .bind(&turn.intent_label)
        .bind(metadata)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    async fn session_history(
        &self,
        session_id: &SessionId,
        limit: i64,
    ) -> Result<Vec<ConversationTurn>, RepositoryError> {
        let rows = sqlx::query_as::<_, TurnRow>(&format!(
            "{SELECT_COLUMNS} WHERE session_id = ? ORDER BY created_at DESC, id DESC LIMIT ?"
        ))
        .bind(&session_id.0)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        let mut turns: Vec<ConversationTurn> = rows.into_iter().map(TurnRow::into_turn).collect();
        turns.reverse();
        Ok(turns)
    }

    async fn recent(&self, limit: i64) -> Result<Vec<ConversationTurn>, RepositoryError> {
        let rows = sqlx::query_as::<_, TurnRow>(&format!(
            "{SELECT_COLUMNS} ORDER BY created_at DESC, id DESC LIMIT ?"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(TurnRow::into_turn).collect())
    }
}
