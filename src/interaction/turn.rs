//! The conversational turn pipeline for one message event.

use tracing::{info, instrument};

use crate::{
    base::types::{PipelineError, Void},
    event::{self, InboundEvent},
    service::{agent::AgentClient, chat::ChatClient, db::DbClient},
};

/// Run one turn: normalize → respond → save → reply, strictly in that order.
///
/// Fully synchronous with respect to the caller; Slack's delivery is only
/// acknowledged once the turn completes. An error at any step aborts the
/// remaining steps — no reply without an answer, no save without a clean
/// normalization, and no compensation for a partial save.
#[instrument(skip_all)]
pub async fn handle_message_event(inbound: &InboundEvent, agent: &AgentClient, db: &DbClient, chat: &ChatClient) -> Void {
    let turn = event::normalize(inbound)?;

    let channel_id = inbound
        .channel
        .as_deref()
        .ok_or_else(|| PipelineError::MalformedEvent("missing `event.channel`".to_string()))?;

    let response = agent.respond(&turn.clean_text).await?;

    db.save_conversation(&turn.user_id, &turn.clean_text, &response).await?;

    chat.send_message(channel_id, &response).await?;

    info!("Turn for `{}` completed.", turn.user_id);

    Ok(())
}
