pub mod surreal;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::base::types::PipelineError;

// Traits.

/// Generic database client trait that clients must implement.
///
/// This trait defines the core functionality for persisting conversation
/// turns. Implementing this trait allows different database backends to be
/// used with the mention-bot.
#[async_trait]
pub trait GenericDbClient: Send + Sync + 'static {
    /// Persist one conversation turn for a user.
    ///
    /// The record is keyed by `user_id` and fully replaced on every call;
    /// there are no append or merge semantics. Failures surface as
    /// [`PipelineError::StoreWrite`] and are not retried.
    async fn save_conversation(&self, user_id: &str, input: &str, response: &str) -> Result<(), PipelineError>;
}

// Structs.

/// Database client for the application.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct DbClient {
    /// The database client instance.
    inner: Arc<dyn GenericDbClient>,
}

impl Deref for DbClient {
    type Target = dyn GenericDbClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl DbClient {
    pub fn new(inner: Arc<dyn GenericDbClient>) -> Self {
        Self { inner }
    }
}

// Data types.

/// One turn entry in a conversation record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub input: String,
    pub response: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// A conversation record, one per user.
///
/// `history` is written as a fixed two-entry list with both entries identical.
/// That duplication matches the observed behavior of this bot and is kept
/// deliberately.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationRecord {
    pub history: Vec<HistoryEntry>,
}

impl ConversationRecord {
    /// Build the record for one turn: two identical entries.
    pub fn for_turn(input: &str, response: &str) -> Self {
        let entry = HistoryEntry {
            input: input.to_string(),
            response: response.to_string(),
            timestamp: chrono::Utc::now(),
        };

        Self {
            history: vec![entry.clone(), entry],
        }
    }
}

// Tests.
