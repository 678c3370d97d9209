use std::sync::Arc;

use super::envelope::{Message, MessageType, Response};

/// Handles one message and always answers with an envelope.
pub trait MessageHandler: Send + Sync {
    fn handle(&self, message: &Message) -> Response;
}

/// Handles a message carrying several records at once.
pub trait BatchHandler: Send + Sync {
    fn handle_batch(&self, message: &Message) -> Response;
}

#[derive(Clone)]
pub enum Handler {
    Single(Arc<dyn MessageHandler>),
    Batch(Arc<dyn BatchHandler>),
}

impl Handler {
    pub fn invoke(&self, message: &Message) -> Response {
        match self {
            Handler::Single(handler) => handler.handle(message),
            Handler::Batch(handler) => handler.handle_batch(message),
        }
    }
}

impl std::fmt::Debug for Handler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Handler::Single(_) => f.write_str("Handler::Single"),
            Handler::Batch(_) => f.write_str("Handler::Batch"),
        }
    }
}

/// A `(message type, handler)` pair contributed by an agent.
#[derive(Debug, Clone)]
pub struct HandlerRegistration {
    pub message_type: MessageType,
    pub handler: Handler,
}

impl HandlerRegistration {
    pub fn single(message_type: MessageType, handler: Arc<dyn MessageHandler>) -> Self {
        Self {
            message_type,
            handler: Handler::Single(handler),
        }
    }

    pub fn batch(message_type: MessageType, handler: Arc<dyn BatchHandler>) -> Self {
        Self {
            message_type,
            handler: Handler::Batch(handler),
        }
    }
}

/// Component that contributes handlers to the master control program.
pub trait Agent: Send + Sync + 'static {
    /// Stable name used for status reporting and unregistration.
    fn name(&self) -> &'static str;

    fn registrations(self: Arc<Self>) -> Vec<HandlerRegistration>;
}
