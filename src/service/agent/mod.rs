pub mod openai;

use std::{
    collections::VecDeque,
    ops::Deref,
    sync::Arc,
};

use async_trait::async_trait;

use crate::base::types::PipelineError;

// Traits.

/// Generic agent trait that clients must implement.
///
/// This wraps a stateful language-model agent that may invoke external tools
/// before producing a final answer. Implementing this trait allows different
/// model backends to be used with the mention-bot.
#[async_trait]
pub trait GenericAgentClient: Send + Sync + 'static {
    /// Produce a final answer for one message.
    ///
    /// Blocks until the backend either answers or exhausts its tool-use loop;
    /// no timeout or retry is imposed here. Backend and tool failures surface
    /// as [`PipelineError::AgentInvocation`] and are not caught downstream.
    async fn respond(&self, input: &str) -> Result<String, PipelineError>;
}

// Structs.

/// Agent client for the application.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct AgentClient {
    inner: Arc<dyn GenericAgentClient>,
}

impl Deref for AgentClient {
    type Target = dyn GenericAgentClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl AgentClient {
    pub fn new(inner: Arc<dyn GenericAgentClient>) -> Self {
        Self { inner }
    }
}

/// One completed conversational turn held in agent memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryTurn {
    pub input: String,
    pub response: String,
}

/// Sliding-window memory of the last `k` turns.
///
/// Process-wide and shared across all users: concurrent conversations
/// interleave into the same window. That cross-user leakage is the observed
/// behavior of this bot and is kept as-is.
#[derive(Debug)]
pub struct MemoryWindow {
    turns: VecDeque<MemoryTurn>,
    capacity: usize,
}

impl MemoryWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            turns: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Record a completed turn, evicting the oldest once over capacity.
    pub fn push(&mut self, input: &str, response: &str) {
        if self.turns.len() == self.capacity {
            self.turns.pop_front();
        }

        self.turns.push_back(MemoryTurn {
            input: input.to_string(),
            response: response.to_string(),
        });
    }

    /// The remembered turns, oldest first.
    pub fn turns(&self) -> impl Iterator<Item = &MemoryTurn> {
        self.turns.iter()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

// Tests.
