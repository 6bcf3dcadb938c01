// src/config.rs
use std::time::Duration;

use reqwest::Url;

use crate::error::ConfigError;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_PATH: &str = "/chat";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Where the user id travels in the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserIdPlacement {
    /// As a field of the JSON body.
    Body { field: String },
    /// As the last path segment of the endpoint, e.g. `/chat/{user_id}`.
    Path,
}

/// Everything that differs between deployments of the widget.
#[derive(Debug, Clone)]
pub struct WidgetConfig {
    pub endpoint: Url,
    pub user_id: UserIdPlacement,
    pub text_field: String,
    pub response_field: String,
    pub assistant_label: String,
    pub notice_label: String,
    pub request_timeout: Duration,
    /// Append a visible notice to the transcript when a reply fails.
    pub surface_failures: bool,
}

impl WidgetConfig {
    /// `{ "user_id", "message" }` in, `{ "response" }` out.
    pub fn user_id_message(endpoint: Url) -> Self {
        Self {
            endpoint,
            user_id: UserIdPlacement::Body { field: "user_id".to_string() },
            text_field: "message".to_string(),
            response_field: "response".to_string(),
            assistant_label: "Assistant".to_string(),
            notice_label: "Error".to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            surface_failures: true,
        }
    }

    /// `POST <endpoint>/{user_id}` with `{ "text" }` in and `{ "text" }` out.
    pub fn path_text(endpoint: Url) -> Self {
        Self {
            user_id: UserIdPlacement::Path,
            text_field: "text".to_string(),
            response_field: "text".to_string(),
            ..Self::user_id_message(endpoint)
        }
    }

    pub fn with_assistant_label(mut self, label: impl Into<String>) -> Self {
        self.assistant_label = label.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Load `.env` if present, then read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let endpoint = match get("CHAT_BACKEND_URL") {
            Some(url) => url,
            None => {
                let host = get("BACKEND_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
                let port = match get("BACKEND_PORT") {
                    Some(raw) => raw
                        .parse::<u16>()
                        .map_err(|_| ConfigError::InvalidValue { key: "BACKEND_PORT", value: raw })?,
                    None => DEFAULT_PORT,
                };
                let path = get("CHAT_ENDPOINT_PATH").unwrap_or_else(|| DEFAULT_PATH.to_string());
                join_endpoint(&base_url(&host, port), &path)
            }
        };
        let endpoint = parse_endpoint(&endpoint)?;

        let in_path = match get("CHAT_USER_IN_PATH") {
            Some(raw) => parse_flag("CHAT_USER_IN_PATH", raw)?,
            None => false,
        };
        let user_field = get("CHAT_USER_FIELD").unwrap_or_else(|| "user_id".to_string());
        let user_id = if in_path || user_field == "-" {
            UserIdPlacement::Path
        } else {
            UserIdPlacement::Body { field: user_field }
        };

        let request_timeout = match get("CHAT_TIMEOUT_SECS") {
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => return Err(ConfigError::InvalidValue { key: "CHAT_TIMEOUT_SECS", value: raw }),
            },
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        let surface_failures = match get("CHAT_SURFACE_FAILURES") {
            Some(raw) => parse_flag("CHAT_SURFACE_FAILURES", raw)?,
            None => true,
        };

        Ok(Self {
            endpoint,
            user_id,
            text_field: get("CHAT_TEXT_FIELD").unwrap_or_else(|| "message".to_string()),
            response_field: get("CHAT_RESPONSE_FIELD").unwrap_or_else(|| "response".to_string()),
            assistant_label: get("CHAT_ASSISTANT_LABEL").unwrap_or_else(|| "Assistant".to_string()),
            notice_label: get("CHAT_NOTICE_LABEL").unwrap_or_else(|| "Error".to_string()),
            request_timeout,
            surface_failures,
        })
    }
}

/// A bare host gets `http://` and the port; anything already carrying a
/// scheme is used as-is.
fn base_url(host: &str, port: u16) -> String {
    if host.contains("http") {
        host.to_string()
    } else {
        format!("http://{}:{}", host, port)
    }
}

fn join_endpoint(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

fn parse_endpoint(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::InvalidEndpoint {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::InvalidEndpoint {
            url: raw.to_string(),
            reason: format!("unsupported scheme '{}'", other),
        }),
    }
}

fn parse_flag(key: &'static str, raw: String) -> Result<bool, ConfigError> {
    match raw.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue { key, value: raw }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<WidgetConfig, ConfigError> {
        let vars: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        WidgetConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_point_at_local_backend() {
        let cfg = load(&[]).unwrap();
        assert_eq!(cfg.endpoint.as_str(), "http://0.0.0.0:8000/chat");
        assert_eq!(cfg.user_id, UserIdPlacement::Body { field: "user_id".to_string() });
        assert_eq!(cfg.text_field, "message");
        assert_eq!(cfg.response_field, "response");
        assert_eq!(cfg.request_timeout, Duration::from_secs(30));
        assert!(cfg.surface_failures);
    }

    #[test]
    fn host_with_scheme_ignores_port() {
        let cfg = load(&[("BACKEND_HOST", "https://bot.example.com/"), ("BACKEND_PORT", "9999")]).unwrap();
        assert_eq!(cfg.endpoint.as_str(), "https://bot.example.com/chat");
    }

    #[test]
    fn full_url_wins_over_host_and_port() {
        let cfg = load(&[
            ("CHAT_BACKEND_URL", "http://127.0.0.1:3000/api/chat"),
            ("BACKEND_HOST", "ignored"),
        ])
        .unwrap();
        assert_eq!(cfg.endpoint.as_str(), "http://127.0.0.1:3000/api/chat");
    }

    #[test]
    fn dash_user_field_moves_id_into_path() {
        let cfg = load(&[("CHAT_USER_FIELD", "-"), ("CHAT_TEXT_FIELD", "text")]).unwrap();
        assert_eq!(cfg.user_id, UserIdPlacement::Path);
        assert_eq!(cfg.text_field, "text");

        let cfg = load(&[("CHAT_USER_IN_PATH", "yes")]).unwrap();
        assert_eq!(cfg.user_id, UserIdPlacement::Path);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            load(&[("BACKEND_PORT", "eighty")]),
            Err(ConfigError::InvalidValue { key: "BACKEND_PORT", .. })
        ));
        assert!(matches!(
            load(&[("CHAT_TIMEOUT_SECS", "0")]),
            Err(ConfigError::InvalidValue { key: "CHAT_TIMEOUT_SECS", .. })
        ));
        assert!(matches!(
            load(&[("CHAT_BACKEND_URL", "ftp://example.com/chat")]),
            Err(ConfigError::InvalidEndpoint { .. })
        ));
        assert!(matches!(
            load(&[("CHAT_SURFACE_FAILURES", "maybe")]),
            Err(ConfigError::InvalidValue { .. })
        ));
    }
}
