//! Core components, types, and utilities for the mention-bot.
//!
//! This module contains fundamental building blocks used throughout the application:
//! - Configuration handling and environment variables.
//! - The instruction frame for the conversational agent.
//! - Common types, result aliases, and the pipeline error taxonomy.

pub mod config;
pub mod prompts;
pub mod types;
