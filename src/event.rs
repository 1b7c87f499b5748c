//! Inbound event parsing and mention-token normalization.
//!
//! Slack delivers everything to a single endpoint: the one-time URL
//! verification handshake, at-least-once event redeliveries, and genuine
//! message events. This module classifies a raw request into an
//! [`InboundEvent`] and derives the [`NormalizedTurn`] that feeds the agent.

use std::sync::OnceLock;

use axum::http::HeaderMap;
use regex::Regex;
use serde_json::Value;

use crate::base::types::PipelineError;

/// Header Slack sets on every redelivery of an unacknowledged event.
pub const RETRY_HEADER: &str = "x-slack-retry-num";

/// Body `type` sentinel for the endpoint registration handshake.
pub const URL_VERIFICATION_TYPE: &str = "url_verification";

/// A Slack user-mention token: `<@` + 11 alphanumeric characters + `>`.
fn mention_token() -> &'static Regex {
    static MENTION_TOKEN: OnceLock<Regex> = OnceLock::new();
    MENTION_TOKEN.get_or_init(|| Regex::new("<@[a-zA-Z0-9]{11}>").unwrap())
}

/// Classification of one inbound HTTP request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// Endpoint registration handshake (`type == "url_verification"`).
    UrlVerification,
    /// A `message`-type event callback.
    Message,
    /// Anything else; acknowledged without processing.
    Other,
}

/// One inbound request, parsed. Ephemeral; constructed per request and
/// discarded after handling.
#[derive(Debug, Clone)]
pub struct InboundEvent {
    pub kind: EventKind,
    /// Slack user ID of the message author (`event.user`).
    pub user: Option<String>,
    /// Channel the message was posted in (`event.channel`); replies go here.
    pub channel: Option<String>,
    /// Raw message text, mention markup included (`event.text`).
    pub text: Option<String>,
    /// Handshake challenge to echo back.
    pub challenge: Option<Value>,
    /// Parsed `x-slack-retry-num` header, when present.
    pub retry_attempt: Option<u32>,
}

impl InboundEvent {
    /// Parse an inbound request from its headers and JSON body.
    pub fn from_parts(headers: &HeaderMap, body: &Value) -> Self {
        let retry_attempt = headers
            .get(RETRY_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse().ok());

        let kind = if body.get("type").and_then(Value::as_str) == Some(URL_VERIFICATION_TYPE) {
            EventKind::UrlVerification
        } else if body.pointer("/event/type").and_then(Value::as_str) == Some("message") {
            EventKind::Message
        } else {
            EventKind::Other
        };

        let field = |name: &str| body.pointer(&format!("/event/{name}")).and_then(Value::as_str).map(str::to_owned);

        Self {
            kind,
            user: field("user"),
            channel: field("channel"),
            text: field("text"),
            challenge: body.get("challenge").cloned(),
            retry_attempt,
        }
    }

    /// Whether Slack marked this delivery as a retry (header present, any value).
    pub fn is_retry(headers: &HeaderMap) -> bool {
        headers.contains_key(RETRY_HEADER)
    }
}

/// A message event reduced to what the pipeline needs.
///
/// Invariant: `clean_text` contains no mention token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedTurn {
    pub user_id: String,
    pub clean_text: String,
}

/// Extract the author and text from a message event, stripping mention markup.
///
/// Every substring matching the mention-token pattern is removed; the
/// remainder is returned verbatim, with no additional whitespace trimming.
pub fn normalize(event: &InboundEvent) -> Result<NormalizedTurn, PipelineError> {
    let user_id = event
        .user
        .clone()
        .ok_or_else(|| PipelineError::MalformedEvent("missing `event.user`".to_string()))?;

    let text = event
        .text
        .as_deref()
        .ok_or_else(|| PipelineError::MalformedEvent("missing `event.text`".to_string()))?;

    let clean_text = mention_token().replace_all(text, "").into_owned();

    Ok(NormalizedTurn { user_id, clean_text })
}

// Tests.
