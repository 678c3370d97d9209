use std::any::Any;
use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, error, info, warn};

use super::agent::{Agent, Handler};
use super::envelope::{Message, MessageType, Response};

#[derive(Debug, Clone)]
struct Route {
    agent: &'static str,
    handler: Handler,
}

/// Central dispatcher mapping message types to agent handlers.
///
/// Registration happens during startup through `&mut self`; afterwards the control program
/// is shared behind an `Arc` and only read.
#[derive(Debug, Default)]
pub struct MasterControl {
    routes: BTreeMap<MessageType, Route>,
    agents: BTreeMap<&'static str, Vec<MessageType>>,
}

/// Snapshot returned by [`MasterControl::status`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControlStatus {
    pub mcp_status: &'static str,
    pub active: bool,
    pub message_types: Vec<MessageType>,
    pub agents: BTreeMap<String, AgentStatus>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentStatus {
    pub status: &'static str,
    pub message_types: Vec<MessageType>,
}

impl MasterControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every handler the agent declares, replacing earlier handlers for the same
    /// message types. Returns the number of handlers added.
    pub fn register<A: Agent>(&mut self, agent: Arc<A>) -> usize {
        let name = agent.name();
        let registrations = agent.registrations();
        let count = registrations.len();

        for registration in registrations {
            let message_type = registration.message_type;
            let route = Route {
                agent: name,
                handler: registration.handler,
            };
            if let Some(previous) = self.routes.insert(message_type, route) {
                warn!(
                    %message_type,
                    previous = previous.agent,
                    replacement = name,
                    "replacing registered handler"
                );
                if previous.agent != name {
                    self.forget_route(previous.agent, message_type);
                }
            }

            let types = self.agents.entry(name).or_default();
            if !types.contains(&message_type) {
                types.push(message_type);
            }
        }

        info!(agent = name, handlers = count, "agent registered");
        count
    }

    /// Remove an agent and every handler it contributed.
    pub fn unregister(&mut self, agent: &str) -> bool {
        let Some(types) = self.agents.remove(agent) else {
            warn!(agent, "attempted to unregister unknown agent");
            return false;
        };

        for message_type in types {
            let owned = self
                .routes
                .get(&message_type)
                .is_some_and(|route| route.agent == agent);
            if owned {
                self.routes.remove(&message_type);
            }
        }

        info!(agent, "agent unregistered");
        true
    }

    fn forget_route(&mut self, agent: &'static str, message_type: MessageType) {
        if let Some(types) = self.agents.get_mut(agent) {
            types.retain(|registered| *registered != message_type);
            if types.is_empty() {
                self.agents.remove(agent);
            }
        }
    }

    pub fn handles(&self, message_type: MessageType) -> bool {
        self.routes.contains_key(&message_type)
    }

    pub fn status(&self) -> ControlStatus {
        ControlStatus {
            mcp_status: "active",
            active: true,
            message_types: self.routes.keys().copied().collect(),
            agents: self
                .agents
                .iter()
                .map(|(name, types)| {
                    (
                        name.to_string(),
                        AgentStatus {
                            status: "active",
                            message_types: types.clone(),
                        },
                    )
                })
                .collect(),
        }
    }

    /// Dispatch `message` to its handler. Never panics: unknown types and handler panics
    /// both come back as failure envelopes.
    pub fn route(&self, message: &Message) -> Response {
        let Some(route) = message
            .kind()
            .ok()
            .and_then(|message_type| self.routes.get(&message_type))
        else {
            error!(
                message_type = message.message_type(),
                "unable to route message"
            );
            return Response::failure(format!(
                "No handler for message type: {}",
                message.message_type()
            ));
        };

        debug!(
            message_type = message.message_type(),
            sender = message.sender(),
            agent = route.agent,
            "routing message"
        );

        match panic::catch_unwind(AssertUnwindSafe(|| route.handler.invoke(message))) {
            Ok(response) => response,
            Err(payload) => {
                let text = panic_text(payload.as_ref());
                error!(agent = route.agent, error = %text, "handler panicked");
                Response::failure(format!("Error routing message: {text}"))
            }
        }
    }

    /// Route a request addressed to a public `/api/mcp/...` endpoint.
    pub fn process_api_request(&self, endpoint: &str, payload: Map<String, Value>) -> Response {
        match MessageType::from_endpoint(endpoint) {
            Some(message_type) => {
                let message = Message::new(message_type.as_str(), payload).from_sender("api");
                self.route(&message)
            }
            None => Response::failure(format!("Unknown endpoint: {endpoint}")),
        }
    }
}

fn panic_text(payload: &(dyn Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        (*text).to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "handler panicked".to_string()
    }
}
