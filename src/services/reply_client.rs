// src/services/reply_client.rs
use reqwest::{Client, Url};
use tracing::debug;

use crate::config::{UserIdPlacement, WidgetConfig};
use crate::error::{ReplyError, WidgetError};
use crate::message::{extract_reply, request_body};

const ERROR_BODY_LIMIT: usize = 200;

/// Performs the single POST exchange against the chat endpoint.
#[derive(Debug, Clone)]
pub struct ReplyClient {
    http: Client,
    config: WidgetConfig,
}

impl ReplyClient {
    pub fn new(config: WidgetConfig) -> Result<Self, WidgetError> {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(WidgetError::Client)?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    pub fn url_for(&self, user_id: &str) -> Url {
        let mut url = self.config.endpoint.clone();
        if self.config.user_id == UserIdPlacement::Path {
            // http(s) urls always have a path to push onto
            if let Ok(mut segments) = url.path_segments_mut() {
                segments.pop_if_empty().push(user_id);
            }
        }
        url
    }

    pub async fn fetch_reply(&self, user_id: &str, text: &str) -> Result<String, ReplyError> {
        let url = self.url_for(user_id);
        let body = request_body(&self.config, user_id, text);
        debug!(%url, "posting chat message");

        let response = self
            .http
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(|e| self.transport_error(e))?;

        if !status.is_success() {
            let mut body = String::from_utf8_lossy(&bytes).into_owned();
            if body.len() > ERROR_BODY_LIMIT {
                let cut = (0..=ERROR_BODY_LIMIT).rev().find(|i| body.is_char_boundary(*i)).unwrap_or(0);
                body.truncate(cut);
            }
            return Err(ReplyError::Http { status, body });
        }

        let reply = extract_reply(&self.config.response_field, &bytes)?;
        debug!(%status, reply_len = reply.len(), "reply received");
        Ok(reply)
    }

    fn transport_error(&self, err: reqwest::Error) -> ReplyError {
        if err.is_timeout() {
            ReplyError::Timeout(self.config.request_timeout)
        } else {
            ReplyError::Network(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_placement_appends_encoded_segment() {
        let endpoint = Url::parse("http://localhost:8000/chat").unwrap();
        let client = ReplyClient::new(WidgetConfig::path_text(endpoint.clone())).unwrap();
        assert_eq!(client.url_for("ann marie").as_str(), "http://localhost:8000/chat/ann%20marie");

        let client = ReplyClient::new(WidgetConfig::user_id_message(endpoint)).unwrap();
        assert_eq!(client.url_for("ann").as_str(), "http://localhost:8000/chat");
    }

    #[test]
    fn trailing_slash_is_not_doubled() {
        let endpoint = Url::parse("http://localhost:8000/chat/").unwrap();
        let client = ReplyClient::new(WidgetConfig::path_text(endpoint)).unwrap();
        assert_eq!(client.url_for("u1").as_str(), "http://localhost:8000/chat/u1");
    }
}
