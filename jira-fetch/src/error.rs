//! Error types for the JIRA fetch pipeline
//!
//! One enum covers the whole taxonomy: configuration problems detected before
//! any network call, transport/authentication failures surfaced from the
//! tracker, and local I/O errors while persisting artifacts. There are no
//! transform errors: the document renderer tolerates every tree shape.

use thiserror::Error;

/// Errors produced by the fetch pipeline and the tool-server adapter
#[derive(Debug, Error)]
pub enum JiraFetchError {
    /// Required configuration keys are absent; every missing key is listed
    #[error("Missing required configuration: {}", keys.join(", "))]
    MissingConfiguration { keys: Vec<String> },

    /// Configuration present but malformed
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Connection test failed; short-circuits the pipeline
    #[error("JIRA connection failed: {message}")]
    Connection { message: String },

    /// Remote API error with the message the tracker returned
    #[error("JIRA API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// HTTP transport failure (DNS, TLS, timeout, ...)
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    /// JSON (de)serialization failure
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Local filesystem failure writing artifacts
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl JiraFetchError {
    /// Create a missing-configuration error from the collected key names
    pub fn missing_config<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        JiraFetchError::MissingConfiguration {
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        JiraFetchError::Configuration {
            message: message.into(),
        }
    }

    /// Create a connection error
    pub fn connection(message: impl Into<String>) -> Self {
        JiraFetchError::Connection {
            message: message.into(),
        }
    }

    /// Create a remote API error
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        JiraFetchError::Api {
            status,
            message: message.into(),
        }
    }

    /// Error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            JiraFetchError::MissingConfiguration { .. } | JiraFetchError::Configuration { .. } => {
                "configuration"
            }
            JiraFetchError::Connection { .. } => "connection",
            JiraFetchError::Api { .. } => "api",
            JiraFetchError::Transport(_) => "transport",
            JiraFetchError::Json(_) => "serialization",
            JiraFetchError::Io(_) => "io",
        }
    }

    /// HTTP status carried by this error, when there is one
    pub fn http_status(&self) -> Option<u16> {
        match self {
            JiraFetchError::Api { status, .. } => Some(*status),
            JiraFetchError::Transport(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for JiraFetchError {
    fn from(err: toml::de::Error) -> Self {
        JiraFetchError::config(format!("TOML parsing error: {err}"))
    }
}

/// Result type alias for pipeline operations
pub type JiraFetchResult<T> = Result<T, JiraFetchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_config_lists_every_key() {
        let err = JiraFetchError::missing_config(["JIRA_DOMAIN", "JIRA_API_TOKEN"]);
        let message = err.to_string();
        assert!(message.contains("JIRA_DOMAIN"));
        assert!(message.contains("JIRA_API_TOKEN"));
        assert!(message.starts_with("Missing required configuration:"));
    }

    #[test]
    fn categories() {
        assert_eq!(
            JiraFetchError::missing_config(["PROJECT_KEY"]).category(),
            "configuration"
        );
        assert_eq!(
            JiraFetchError::connection("refused").category(),
            "connection"
        );
        assert_eq!(JiraFetchError::api(401, "denied").category(), "api");
    }

    #[test]
    fn api_error_exposes_status() {
        let err = JiraFetchError::api(403, "Access denied");
        assert_eq!(err.http_status(), Some(403));
        assert!(err.to_string().contains("403"));
        assert!(err.to_string().contains("Access denied"));
    }
}
