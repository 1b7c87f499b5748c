//! Service integrations for external APIs and clients.
//!
//! This module contains implementations for the services used by the mention-bot:
//! - Chat services (e.g., Slack)
//! - Database services (e.g., SurrealDB)
//! - Agent services (e.g., OpenAI)
//! - Web search services (e.g., Google Custom Search)
//!
//! Each service module defines both generic traits and concrete implementations,
//! allowing for extensibility and easy testing.

pub mod agent;
pub mod chat;
pub mod db;
pub mod search;
