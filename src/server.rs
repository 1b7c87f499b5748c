//! HTTP delivery controller for Slack event callbacks.
//!
//! A single POST endpoint classifies each inbound request, checked in order
//! and terminal on first match:
//! 1. URL verification handshake → echo the challenge.
//! 2. Retried delivery (`x-slack-retry-num` header) → acknowledge without
//!    reprocessing. A turn can outlast Slack's delivery timeout, and replaying
//!    it would duplicate agent calls and store writes.
//! 3. Genuine `message` event → run the turn pipeline synchronously.
//!
//! Pipeline errors are not handled here; they surface as a 500 to Slack.

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
};
use serde_json::{Value, json};
use tracing::{error, info, instrument, warn};

use crate::{
    event::{EventKind, InboundEvent},
    interaction,
    runtime::Runtime,
};

/// Assemble the event endpoint router.
pub fn router(runtime: Runtime) -> Router {
    Router::new().route("/", post(handle_request)).with_state(runtime)
}

/// POST / — classify and dispatch one inbound Slack request.
#[instrument(skip_all)]
async fn handle_request(State(runtime): State<Runtime>, headers: HeaderMap, Json(body): Json<Value>) -> Result<Json<Value>, AppError> {
    let inbound = InboundEvent::from_parts(&headers, &body);

    // 1. Endpoint registration handshake: echo the challenge verbatim.
    if inbound.kind == EventKind::UrlVerification {
        info!("URL verification started.");

        return Ok(Json(json!({ "challenge": inbound.challenge.unwrap_or(Value::Null) })));
    }

    // 2. Redelivery of an event we already took too long to acknowledge.
    if InboundEvent::is_retry(&headers) {
        info!("Slack retry received (attempt {:?}); not reprocessing.", inbound.retry_attempt);

        return Ok(Json(json!({ "message": "No need to resend" })));
    }

    // 3. Genuine event dispatch.
    match inbound.kind {
        EventKind::Message => {
            interaction::turn::handle_message_event(&inbound, &runtime.agent, &runtime.db, &runtime.chat).await?;
        }
        _ => {
            warn!("Received unhandled event; acknowledging without processing.");
        }
    }

    Ok(Json(json!({ "ok": true })))
}

/// Adapter that turns a pipeline error into the hosting runtime's
/// unhandled-error response.
pub struct AppError(crate::base::types::Err);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        error!("Error while handling: {:#}", self.0);

        StatusCode::INTERNAL_SERVER_ERROR.into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<crate::base::types::Err>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
