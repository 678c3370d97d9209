//! Master control program: the message envelope, handler registry, and HTTP surface.

pub mod agent;
pub mod envelope;
pub mod registry;
pub mod router;

pub use agent::{Agent, BatchHandler, Handler, HandlerRegistration, MessageHandler};
pub use envelope::{payload, Message, MessageType, Response, UnknownMessageType};
pub use registry::{AgentStatus, ControlStatus, MasterControl};
pub use router::mcp_router;
