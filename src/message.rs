// src/message.rs
use serde_json::{Map, Value};

use crate::config::{UserIdPlacement, WidgetConfig};
use crate::error::ReplyError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Sender {
    You,
    Assistant(String),
    /// A failed reply, shown in place of the assistant's answer.
    Notice(String),
}

impl Sender {
    pub fn label(&self) -> &str {
        match self {
            Sender::You => "You",
            Sender::Assistant(label) | Sender::Notice(label) => label,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatMessage {
    pub sender: Sender,
    pub text: String,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self { sender: Sender::You, text: text.into() }
    }

    pub fn assistant(label: impl Into<String>, text: impl Into<String>) -> Self {
        Self { sender: Sender::Assistant(label.into()), text: text.into() }
    }

    pub fn notice(label: impl Into<String>, text: impl Into<String>) -> Self {
        Self { sender: Sender::Notice(label.into()), text: text.into() }
    }

    pub fn sender_label(&self) -> &str {
        self.sender.label()
    }
}

/// JSON body for one chat request. The user id is left out when it travels
/// in the path.
pub fn request_body(config: &WidgetConfig, user_id: &str, text: &str) -> Value {
    let mut body = Map::new();
    if let UserIdPlacement::Body { field } = &config.user_id {
        body.insert(field.clone(), Value::String(user_id.to_string()));
    }
    body.insert(config.text_field.clone(), Value::String(text.to_string()));
    Value::Object(body)
}

pub fn extract_reply(response_field: &str, body: &[u8]) -> Result<String, ReplyError> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| ReplyError::MalformedReply(format!("body is not json: {}", e)))?;

    let object = value
        .as_object()
        .ok_or_else(|| ReplyError::MalformedReply("body is not a json object".to_string()))?;

    match object.get(response_field) {
        Some(Value::String(reply)) => Ok(reply.clone()),
        Some(_) => Err(ReplyError::MalformedReply(format!("'{}' is not a string", response_field))),
        None => Err(ReplyError::MalformedReply(format!("missing '{}' field", response_field))),
    }
}
