use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::region::Region;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

/// Extracted slots stored alongside each turn as JSON metadata.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnMetadata {
    pub region: Option<Region>,
    pub category: Option<String>,
    pub sku: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewConversationTurn {
    pub session_id: SessionId,
    pub user_message: String,
    pub assistant_message: String,
    pub intent_label: Option<String>,
    pub metadata: TurnMetadata,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub id: i64,
    pub session_id: SessionId,
    pub user_message: String,
    pub assistant_message: String,
    pub intent_label: Option<String>,
    pub metadata: TurnMetadata,
    pub created_at: DateTime<Utc>,
}
