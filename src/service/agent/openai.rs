//! OpenAI implementation of the conversational agent.
//!
//! One shared agent instance serves every user: a chat-completions backend at
//! a fixed sampling temperature, a single `google_search` tool, and a
//! sliding-window memory of the last few turns. A call loops through tool
//! invocations until the model produces a final answer; the pipeline imposes
//! no timeout, step ceiling, or retry on top of that.

use std::sync::{Arc, OnceLock};

use async_openai::{
    Client,
    config::OpenAIConfig,
    types::{
        ChatCompletionMessageToolCall, ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestToolMessageArgs,
        ChatCompletionRequestUserMessageArgs, ChatCompletionTool, ChatCompletionToolArgs, ChatCompletionToolType, CreateChatCompletionRequestArgs, FunctionObjectArgs,
    },
};
use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{info, instrument};

use crate::{
    base::{
        config::Config,
        types::{PipelineError, Res},
    },
    service::search::SearchClient,
};

use super::{AgentClient, GenericAgentClient, MemoryWindow};

/// Tool name advertised to the model.
const SEARCH_TOOL_NAME: &str = "google_search";

// Extra methods on `AgentClient` applied by the openai implementation.

impl AgentClient {
    pub fn openai(config: &Config, search: SearchClient) -> Self {
        let client = OpenAiAgentClient::new(config, search);
        Self { inner: Arc::new(client) }
    }
}

// Specific implementations.

/// Arguments the model passes to the search tool.
#[derive(Debug, Deserialize)]
struct SearchToolCallArgs {
    query: String,
}

/// OpenAI agent client implementation.
#[derive(Clone)]
pub struct OpenAiAgentClient {
    client: Client<OpenAIConfig>,
    config: Config,
    search: SearchClient,
    /// Shared across all users; concurrent turns interleave into one window.
    memory: Arc<Mutex<MemoryWindow>>,
}

impl OpenAiAgentClient {
    /// Create a new OpenAI agent client.
    #[instrument(name = "OpenAiAgentClient::new", skip_all)]
    pub fn new(config: &Config, search: SearchClient) -> Self {
        let cfg = OpenAIConfig::new().with_api_key(config.openai_api_key.clone());

        Self {
            client: Client::with_config(cfg),
            config: config.clone(),
            search,
            memory: Arc::new(Mutex::new(MemoryWindow::new(config.agent_memory_window))),
        }
    }

    /// Assemble the system instruction frame: prefix directive, tool
    /// description, suffix directive.
    fn build_instruction_frame(&self) -> String {
        format!(
            "{}\n\n{SEARCH_TOOL_NAME}: a web search engine; useful for questions about current events or facts you are unsure of. The input is a search query.\n\n{}",
            self.config.agent_prefix_directive, self.config.agent_suffix_directive
        )
    }

    /// Build the message list: instruction frame, remembered turns, new input.
    #[instrument(name = "OpenAiAgentClient::build_messages", skip_all)]
    async fn build_messages(&self, input: &str) -> Res<Vec<ChatCompletionRequestMessage>> {
        let mut messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(self.build_instruction_frame())
                .build()?
                .into(),
        ];

        {
            let memory = self.memory.lock().await;

            for turn in memory.turns() {
                messages.push(ChatCompletionRequestUserMessageArgs::default().content(turn.input.as_str()).build()?.into());
                messages.push(ChatCompletionRequestAssistantMessageArgs::default().content(turn.response.as_str()).build()?.into());
            }
        }

        messages.push(ChatCompletionRequestUserMessageArgs::default().content(input).build()?.into());

        Ok(messages)
    }

    /// Execute one tool call and return the observation for the model.
    #[instrument(name = "OpenAiAgentClient::execute_tool_call", skip_all)]
    async fn execute_tool_call(&self, call: &ChatCompletionMessageToolCall) -> Res<String> {
        if call.function.name != SEARCH_TOOL_NAME {
            return Err(anyhow::anyhow!("Unknown function call: {}", call.function.name));
        }

        let SearchToolCallArgs { query } = serde_json::from_str(&call.function.arguments)?;

        info!("Search tool called with query: {query}");

        self.search.search(&query).await
    }

    /// Run the reason-then-act loop until the model yields a final answer.
    async fn respond_internal(&self, input: &str) -> Res<String> {
        let mut messages = self.build_messages(input).await?;

        // Loop over completions until the model stops calling tools.
        loop {
            let request = CreateChatCompletionRequestArgs::default()
                .model(&self.config.openai_model)
                .temperature(self.config.openai_temperature)
                .max_completion_tokens(self.config.openai_max_tokens)
                .tools(vec![get_search_tool().clone()])
                .messages(messages.clone())
                .build()?;

            let response = self.client.chat().create(request).await?;
            let message = response.choices.into_iter().next().ok_or_else(|| anyhow::anyhow!("Completion contained no choices."))?.message;

            if let Some(tool_calls) = message.tool_calls.filter(|calls| !calls.is_empty()) {
                info!("Model requested {} tool call(s).", tool_calls.len());

                messages.push(ChatCompletionRequestAssistantMessageArgs::default().tool_calls(tool_calls.clone()).build()?.into());

                for call in &tool_calls {
                    let observation = self.execute_tool_call(call).await?;

                    messages.push(
                        ChatCompletionRequestToolMessageArgs::default()
                            .tool_call_id(call.id.clone())
                            .content(observation)
                            .build()?
                            .into(),
                    );
                }

                continue;
            }

            let answer = message.content.ok_or_else(|| anyhow::anyhow!("Completion contained no content."))?;

            // Only a completed turn enters the memory window.
            self.memory.lock().await.push(input, &answer);

            return Ok(answer);
        }
    }
}

#[async_trait]
impl GenericAgentClient for OpenAiAgentClient {
    #[instrument(name = "OpenAiAgentClient::respond", skip_all)]
    async fn respond(&self, input: &str) -> Result<String, PipelineError> {
        self.respond_internal(input).await.map_err(PipelineError::AgentInvocation)
    }
}

// Statics.

static SEARCH_TOOL: OnceLock<ChatCompletionTool> = OnceLock::new();

/// Get the `google_search` tool definition.
fn get_search_tool() -> &'static ChatCompletionTool {
    SEARCH_TOOL.get_or_init(|| {
        ChatCompletionToolArgs::default()
            .r#type(ChatCompletionToolType::Function)
            .function(
                FunctionObjectArgs::default()
                    .name(SEARCH_TOOL_NAME)
                    .description("Search the web with Google.  Useful for questions about current events, or anything you are not certain about.")
                    .parameters(serde_json::json!({
                        "type": "object",
                        "properties": {
                            "query": {"type": "string", "description": "The search query."},
                        },
                        "required": ["query"],
                        "additionalProperties": false
                    }))
                    .build()
                    .unwrap(),
            )
            .build()
            .unwrap()
    })
}

// Tests.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::base::config::ConfigInner;

    use super::*;

    fn create_test_config() -> Config {
        Config {
            inner: Arc::new(ConfigInner {
                openai_api_key: "test_key".to_string(),
                openai_model: "gpt-4".to_string(),
                openai_temperature: 0.7,
                openai_max_tokens: 64,
                agent_memory_window: 5,
                agent_prefix_directive: "PREFIX".to_string(),
                agent_suffix_directive: "SUFFIX".to_string(),
                google_api_key: "g_key".to_string(),
                google_cse_id: "g_cse".to_string(),
                ..Default::default()
            }),
        }
    }

    fn create_test_client() -> OpenAiAgentClient {
        let config = create_test_config();
        let search = SearchClient::google(&config).unwrap();
        OpenAiAgentClient::new(&config, search)
    }

    #[test]
    fn instruction_frame_wraps_tool_description() {
        let client = create_test_client();
        let frame = client.build_instruction_frame();

        assert!(frame.starts_with("PREFIX"));
        assert!(frame.ends_with("SUFFIX"));
        assert!(frame.contains(SEARCH_TOOL_NAME));
    }

    #[tokio::test]
    async fn messages_replay_memory_between_frame_and_input() {
        let client = create_test_client();

        client.memory.lock().await.push("earlier question", "earlier answer");

        let messages = client.build_messages("new question").await.unwrap();

        // system + one remembered turn (user + assistant) + new input.
        assert_eq!(messages.len(), 4);
    }

    #[tokio::test]
    async fn unknown_tool_calls_are_rejected() {
        let client = create_test_client();

        let call = ChatCompletionMessageToolCall {
            id: "call_1".to_string(),
            r#type: ChatCompletionToolType::Function,
            function: async_openai::types::FunctionCall {
                name: "not_a_tool".to_string(),
                arguments: "{}".to_string(),
            },
        };

        assert!(client.execute_tool_call(&call).await.is_err());
    }

    #[test]
    fn search_tool_definition_builds() {
        let tool = get_search_tool();
        assert_eq!(tool.function.name, SEARCH_TOOL_NAME);
    }
}
