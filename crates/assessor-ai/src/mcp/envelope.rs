use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Message kinds the master control program knows how to dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    PropertyValidation,
    BatchValidate,
    PropertyValuation,
    PropertyImpact,
    UserQuery,
}

impl MessageType {
    pub const ALL: [MessageType; 5] = [
        MessageType::PropertyValidation,
        MessageType::BatchValidate,
        MessageType::PropertyValuation,
        MessageType::PropertyImpact,
        MessageType::UserQuery,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            MessageType::PropertyValidation => "property_validation",
            MessageType::BatchValidate => "batch_validate",
            MessageType::PropertyValuation => "property_valuation",
            MessageType::PropertyImpact => "property_impact",
            MessageType::UserQuery => "user_query",
        }
    }

    /// Message type served by a public `/api/mcp/...` endpoint.
    pub fn from_endpoint(endpoint: &str) -> Option<Self> {
        match endpoint {
            "/api/mcp/property-validate" => Some(MessageType::PropertyValidation),
            "/api/mcp/property-value" => Some(MessageType::PropertyValuation),
            "/api/mcp/property-impact" => Some(MessageType::PropertyImpact),
            "/api/mcp/user-query" => Some(MessageType::UserQuery),
            "/api/mcp/batch-validate" => Some(MessageType::BatchValidate),
            _ => None,
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown message type '{0}'")]
pub struct UnknownMessageType(pub String);

impl FromStr for MessageType {
    type Err = UnknownMessageType;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        MessageType::ALL
            .into_iter()
            .find(|kind| kind.as_str() == value)
            .ok_or_else(|| UnknownMessageType(value.to_string()))
    }
}

fn default_sender() -> String {
    "system".to_string()
}

/// Request envelope passed from callers to agents.
///
/// The type is kept as received so that routing failures can echo it back verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    #[serde(rename = "type")]
    message_type: String,
    #[serde(default = "default_sender")]
    sender: String,
    #[serde(default)]
    payload: Map<String, Value>,
}

impl Message {
    pub fn new(message_type: impl Into<String>, payload: Map<String, Value>) -> Self {
        Self {
            message_type: message_type.into(),
            sender: default_sender(),
            payload,
        }
    }

    pub fn from_sender(mut self, sender: impl Into<String>) -> Self {
        self.sender = sender.into();
        self
    }

    pub fn message_type(&self) -> &str {
        &self.message_type
    }

    pub fn kind(&self) -> Result<MessageType, UnknownMessageType> {
        self.message_type.parse()
    }

    pub fn sender(&self) -> &str {
        &self.sender
    }

    pub fn payload(&self) -> &Map<String, Value> {
        &self.payload
    }

    /// Payload value for `key`; explicit JSON `null` counts as absent.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.payload.get(key).filter(|value| !value.is_null())
    }

    pub fn get_or<'a>(&'a self, key: &str, default: &'a Value) -> &'a Value {
        self.get(key).unwrap_or(default)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Decode the payload value for `key`, `None` when the key is absent.
    pub fn decode<T: DeserializeOwned>(&self, key: &str) -> Option<Result<T, serde_json::Error>> {
        self.get(key)
            .map(|value| serde_json::from_value(value.clone()))
    }
}

/// Outcome envelope returned by every handler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub success: bool,
    #[serde(default)]
    pub data: Map<String, Value>,
    #[serde(default)]
    pub error: Option<String>,
}

impl Response {
    pub fn new(success: bool, data: Value, error: Option<String>) -> Self {
        Self {
            success,
            data: into_object(data),
            error,
        }
    }

    pub fn ok(data: Value) -> Self {
        Self::new(true, data, None)
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: Map::new(),
            error: Some(error.into()),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Decode the data entry for `key`, `None` when the key is absent.
    pub fn decode<T: DeserializeOwned>(&self, key: &str) -> Option<Result<T, serde_json::Error>> {
        self.data
            .get(key)
            .map(|value| serde_json::from_value(value.clone()))
    }
}

fn into_object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        Value::Null => Map::new(),
        other => Map::from_iter([("result".to_string(), other)]),
    }
}

/// Build a payload map from a `json!` object literal.
pub fn payload(value: Value) -> Map<String, Value> {
    into_object(value)
}
