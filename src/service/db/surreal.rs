//! SurrealDB implementation of the conversation store.

use std::sync::Arc;

use async_trait::async_trait;
use surrealdb::{
    Surreal,
    engine::any::{Any, connect},
    opt::auth::Root,
};
use tracing::{info, instrument};

use crate::base::{
    config::Config,
    types::{PipelineError, Res},
};

use super::{ConversationRecord, DbClient, GenericDbClient};

/// Table holding one conversation record per user.
const CONVERSATION_TABLE: &str = "testChat";

// Extra methods on `DbClient` applied by the surreal implementation.

impl DbClient {
    /// Creates a new SurrealDB client from the configured endpoint.
    pub async fn surreal(config: &Config) -> Res<Self> {
        let client = SurrealDbClient::new(config).await?;
        Ok(Self { inner: Arc::new(client) })
    }

    /// Creates an in-memory SurrealDB client (used by tests).
    pub async fn surreal_memory() -> Res<Self> {
        let client = SurrealDbClient::memory().await?;
        Ok(Self { inner: Arc::new(client) })
    }
}

// Structs.

/// SurrealDB client implementation.
#[derive(Clone)]
pub struct SurrealDbClient {
    db: Surreal<Any>,
}

impl SurrealDbClient {
    /// Create a new database client against the configured endpoint.
    #[instrument(name = "SurrealDbClient::new", skip_all)]
    pub async fn new(config: &Config) -> Res<Self> {
        let db = connect(&config.db_endpoint).await?;

        // Sign in only when credentials are configured (mem:// has none).
        if let (Some(username), Some(password)) = (&config.db_username, &config.db_password) {
            db.signin(Root { username, password }).await?;
        }

        Self::initialize(db).await
    }

    /// Create an in-memory database client.
    #[instrument(name = "SurrealDbClient::memory", skip_all)]
    pub async fn memory() -> Res<Self> {
        let db = connect("mem://").await?;

        Self::initialize(db).await
    }

    async fn initialize(db: Surreal<Any>) -> Res<Self> {
        db.use_ns("mention").use_db("bot").await?;

        db.query(format!("DEFINE TABLE IF NOT EXISTS {CONVERSATION_TABLE} SCHEMALESS")).await?;

        info!("Database initialized successfully.");

        Ok(Self { db })
    }

    async fn save_conversation_internal(&self, user_id: &str, input: &str, response: &str) -> Res<()> {
        let record = ConversationRecord::for_turn(input, response);

        // Full replacement of any prior record for this user.
        let _: Option<ConversationRecord> = self.db.upsert((CONVERSATION_TABLE, user_id)).content(record).await?;

        info!("Conversation for `{}` saved.", user_id);

        Ok(())
    }
}

#[async_trait]
impl GenericDbClient for SurrealDbClient {
    #[instrument(name = "SurrealDbClient::save_conversation", skip(self, input, response))]
    async fn save_conversation(&self, user_id: &str, input: &str, response: &str) -> Result<(), PipelineError> {
        self.save_conversation_internal(user_id, input, response).await.map_err(PipelineError::StoreWrite)
    }
}

// Tests.

#[cfg(test)]
mod tests {
    use super::*;

    async fn read_record(client: &SurrealDbClient, user_id: &str) -> Option<ConversationRecord> {
        client.db.select((CONVERSATION_TABLE, user_id)).await.unwrap()
    }

    #[tokio::test]
    async fn save_writes_two_identical_entries() {
        let client = SurrealDbClient::memory().await.unwrap();

        client.save_conversation("U123", " hello", "こんにちは").await.unwrap();

        let record = read_record(&client, "U123").await.unwrap();
        assert_eq!(record.history.len(), 2);
        assert_eq!(record.history[0], record.history[1]);
        assert_eq!(record.history[0].input, " hello");
        assert_eq!(record.history[0].response, "こんにちは");
    }

    #[tokio::test]
    async fn save_replaces_prior_record() {
        let client = SurrealDbClient::memory().await.unwrap();

        client.save_conversation("U123", "first", "one").await.unwrap();
        client.save_conversation("U123", "second", "two").await.unwrap();

        // The second write fully replaced the first; nothing was appended.
        let record = read_record(&client, "U123").await.unwrap();
        assert_eq!(record.history.len(), 2);
        assert!(record.history.iter().all(|entry| entry.input == "second" && entry.response == "two"));
    }

    #[tokio::test]
    async fn records_are_keyed_per_user() {
        let client = SurrealDbClient::memory().await.unwrap();

        client.save_conversation("U1", "a", "x").await.unwrap();
        client.save_conversation("U2", "b", "y").await.unwrap();

        assert_eq!(read_record(&client, "U1").await.unwrap().history[0].input, "a");
        assert_eq!(read_record(&client, "U2").await.unwrap().history[0].input, "b");
    }
}
