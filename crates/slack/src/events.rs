use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use drover_core::flows::engine::FlowError;
use drover_core::triggers::MessageContext;

use crate::outbound::SendError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlackEnvelope {
    pub envelope_id: String,
    pub event: SlackEvent,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SlackEvent {
    Message(MessageEvent),
    Unsupported { event_type: String },
}

/// One inbound chat message, already resolved to the context it arrived
/// in (plain DM, direct mention, or ambient mention).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageEvent {
    pub channel_id: String,
    pub user_id: String,
    pub text: String,
    pub context: MessageContext,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventContext {
    pub correlation_id: String,
}

impl Default for EventContext {
    fn default() -> Self {
        Self { correlation_id: "unknown-correlation-id".to_owned() }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HandlerResult {
    /// The message was routed and acted on.
    Processed,
    /// Nothing matched; the message was deliberately left alone.
    Ignored,
}

#[derive(Debug, Error)]
pub enum EventHandlerError {
    #[error(transparent)]
    Flow(#[from] FlowError),
    #[error("outbound send failed: {0}")]
    Send(#[from] SendError),
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Handler(#[from] EventHandlerError),
}

/// The bot's message-handling service. There is exactly one event family
/// the bot consumes, so dispatch is a single trait object rather than a
/// per-type handler table.
#[async_trait]
pub trait MessageService: Send + Sync {
    async fn handle_message(
        &self,
        event: &MessageEvent,
        ctx: &EventContext,
    ) -> Result<HandlerResult, EventHandlerError>;
}

pub struct EventDispatcher {
    service: Arc<dyn MessageService>,
}

impl EventDispatcher {
    pub fn new(service: Arc<dyn MessageService>) -> Self {
        Self { service }
    }

    pub async fn dispatch(
        &self,
        envelope: &SlackEnvelope,
        ctx: &EventContext,
    ) -> Result<HandlerResult, DispatchError> {
        match &envelope.event {
            SlackEvent::Message(event) => {
                self.service.handle_message(event, ctx).await.map_err(DispatchError::from)
            }
            SlackEvent::Unsupported { .. } => Ok(HandlerResult::Ignored),
        }
    }
}
