//! Library root for `mention-bot`.
//!
//! Mention-bot is an OpenAI-powered conversational assistant for Slack that:
//! - Receives Slack event callbacks over a single HTTP endpoint
//! - Strips mention markup and answers through an agent with web search
//! - Persists each conversation turn to SurrealDB
//! - Replies into the originating channel
//!
//! The bot integrates with Slack for chat, SurrealDB for storage, OpenAI for
//! responses, and Google Custom Search as the agent's one tool. The
//! architecture is built around extensible traits that allow for different
//! implementations of each service.

#[deny(missing_docs)]
pub mod base;
pub mod event;
pub mod interaction;
pub mod runtime;
pub mod server;
pub mod service;

use base::{config::Config, types::Void};
use rustls::crypto;
use tracing::info;

/// Public async entry for the binary crate.
///
/// Sets up necessary services and starts the mention-bot runtime:
/// - Initializes the crypto provider
/// - Creates the runtime context with database, agent, and chat clients
/// - Serves the event endpoint
pub async fn start(config: Config) -> Void {
    info!("Starting mention-bot ...");

    // Start the crypto provider.
    crypto::ring::default_provider().install_default().unwrap();

    // Initialize the runtime.
    let runtime = runtime::Runtime::new(config).await?;

    // Start the runtime.
    runtime.start().await?;

    Ok(())
}
