// src/error.rs
use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;

/// Any failure to obtain a valid assistant reply.
#[derive(Debug, Error)]
pub enum ReplyError {
    /// The request could not be sent or no response came back.
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("no reply within {0:?}")]
    Timeout(Duration),

    #[error("backend answered {status}: {body}")]
    Http { status: StatusCode, body: String },

    /// Body was not JSON, or the reply field was missing or not a string.
    #[error("malformed reply: {0}")]
    MalformedReply(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyErrorKind {
    Network,
    Http,
    MalformedReply,
}

impl ReplyError {
    pub fn kind(&self) -> ReplyErrorKind {
        match self {
            ReplyError::Network(_) | ReplyError::Timeout(_) => ReplyErrorKind::Network,
            ReplyError::Http { .. } => ReplyErrorKind::Http,
            ReplyError::MalformedReply(_) => ReplyErrorKind::MalformedReply,
        }
    }
}

#[derive(Debug, Error)]
pub enum WidgetError {
    #[error("user id cannot be empty")]
    EmptyUserId,

    #[error("message cannot be empty")]
    EmptyMessage,

    #[error("no session: identify the user first")]
    NotIdentified,

    /// The session passed in was replaced by a later `begin_session`.
    #[error("session is no longer active")]
    StaleSession,

    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),

    #[error(transparent)]
    Reply(#[from] ReplyError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid endpoint url '{url}': {reason}")]
    InvalidEndpoint { url: String, reason: String },

    #[error("invalid value for {key}: '{value}'")]
    InvalidValue { key: &'static str, value: String },
}
