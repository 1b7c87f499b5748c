//! Event handling for the mention-bot.
//!
//! This module runs the conversational turn pipeline for a single message
//! event: normalize the event, ask the agent, persist the turn, and send the
//! reply.

pub mod turn;
