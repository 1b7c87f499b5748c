//! Instruction frame for the conversational agent.

/// Opening directive placed before the tool description in the system frame.
pub const AGENT_PREFIX_DIRECTIVE: &str = r#"Answer the following questions as best you can, but always speak Japanese when giving your final answer, regardless of the language of the question. You have access to the following tools:"#;

/// Closing directive placed after the tool description in the system frame.
pub const AGENT_SUFFIX_DIRECTIVE: &str = r#"Think step by step: decide whether a tool is needed, act, observe the result, and repeat until you can answer. Begin! Remember to speak Japanese when giving your final answer."#;
