//! Runtime services and shared state for the mention-bot.

use tracing::{info, instrument};

use crate::{
    base::{
        config::Config,
        types::{Res, Void},
    },
    server,
    service::{agent::AgentClient, chat::ChatClient, db::DbClient, search::SearchClient},
};

/// Runtime service context that can be shared across the application.
///
/// This struct holds the database client, agent client, chat client, and
/// configuration. It is designed to be trivially cloneable, allowing it to be
/// passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct Runtime {
    /// The configuration for the application.
    pub config: Config,
    /// The database client instance.
    pub db: DbClient,
    /// The agent client instance.
    pub agent: AgentClient,
    /// The chat client instance.
    pub chat: ChatClient,
}

impl Runtime {
    /// Create a new runtime instance.
    #[instrument(skip_all)]
    pub async fn new(config: Config) -> Res<Self> {
        // Initialize the database.
        let db = DbClient::surreal(&config).await?;

        // Initialize the search tool and the agent client that wraps it.
        let search = SearchClient::google(&config)?;
        let agent = AgentClient::openai(&config, search);

        // Initialize the slack client.
        let chat = ChatClient::slack(&config).await?;

        Ok(Self { config, db, agent, chat })
    }

    /// Serve the event endpoint until the process is torn down.
    pub async fn start(&self) -> Void {
        let listener = tokio::net::TcpListener::bind(&self.config.listen_address).await?;

        info!("Listening on {}", self.config.listen_address);

        axum::serve(listener, server::router(self.clone())).await?;

        Ok(())
    }
}
