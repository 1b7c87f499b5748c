pub mod google;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;

use crate::base::types::Res;

// Traits.

/// Generic web search trait that clients must implement.
///
/// The agent exposes exactly one tool, and this is it. Implementing this
/// trait allows different search backends to be used with the mention-bot.
#[async_trait]
pub trait GenericSearchClient: Send + Sync + 'static {
    /// Run a web search and return a plain-text digest of the results.
    ///
    /// The digest is fed back to the agent verbatim as a tool observation,
    /// so it should be short and line-oriented.
    async fn search(&self, query: &str) -> Res<String>;
}

// Structs.

/// Search client for the application.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct SearchClient {
    inner: Arc<dyn GenericSearchClient>,
}

impl Deref for SearchClient {
    type Target = dyn GenericSearchClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl SearchClient {
    pub fn new(inner: Arc<dyn GenericSearchClient>) -> Self {
        Self { inner }
    }
}
