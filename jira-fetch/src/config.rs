//! Configuration for the JIRA fetch pipeline
//!
//! Configuration is loaded once into an immutable [`JiraConfig`] value and
//! injected into the client and driver explicitly. Sources are layered:
//! defaults, then an optional TOML file, then environment variables.

use crate::error::{JiraFetchError, JiraFetchResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Default maximum search results, capped at [`MAX_RESULTS_CEILING`]
pub const DEFAULT_MAX_RESULTS: u32 = 50;

/// Hard cap on search results per the JIRA API limits
pub const MAX_RESULTS_CEILING: u32 = 200;

/// Main configuration for the JIRA fetch pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JiraConfig {
    /// JIRA instance domain, e.g. "example.atlassian.net" (required)
    pub domain: String,

    /// Account email used as the basic-auth username (required)
    pub email: String,

    /// API token used as the basic-auth password (required)
    pub api_token: String,

    /// Project key for CLI fetch modes; tool-server operations take it as an argument
    pub project_key: Option<String>,

    /// Assignee filter (optional)
    pub assignee: Option<String>,

    /// Status filter, single name or comma-separated list (optional)
    pub status_filter: Option<String>,

    /// Issue type filter (optional)
    pub issue_type_filter: Option<String>,

    /// Maximum search results (default: 50, max: 200)
    pub max_results: u32,

    /// Directory for report artifacts (default: "output")
    pub output_dir: PathBuf,

    /// HTTP request timeout in seconds (default: 30)
    pub request_timeout_seconds: u64,
}

impl Default for JiraConfig {
    fn default() -> Self {
        Self {
            domain: String::new(),
            email: String::new(),
            api_token: String::new(),
            project_key: None,
            assignee: None,
            status_filter: None,
            issue_type_filter: None,
            max_results: DEFAULT_MAX_RESULTS,
            output_dir: PathBuf::from("output"),
            request_timeout_seconds: 30,
        }
    }
}

impl JiraConfig {
    /// Load configuration from TOML file and environment variables
    /// Priority: env vars > TOML file > defaults
    pub fn load() -> JiraFetchResult<Self> {
        Self::load_with(false)
    }

    /// Load configuration for the CLI fetch modes, which also require a
    /// project key; all missing keys are reported together
    pub fn load_for_fetch() -> JiraFetchResult<Self> {
        Self::load_with(true)
    }

    fn load_with(require_project_key: bool) -> JiraFetchResult<Self> {
        let mut config = Self::default();

        if let Ok(file_config) = Self::load_from_file("jira-fetch.toml") {
            debug!("Loaded configuration from jira-fetch.toml");
            config = file_config;
        } else {
            debug!("No TOML configuration file found, using defaults and environment variables");
        }

        config.load_from_env();
        config.validate(require_project_key)?;

        Ok(config)
    }

    /// Load configuration from a TOML file
    fn load_from_file<P: AsRef<Path>>(path: P) -> JiraFetchResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Apply environment variable overrides
    fn load_from_env(&mut self) {
        if let Ok(domain) = env::var("JIRA_DOMAIN") {
            self.domain = domain;
        }
        if let Ok(email) = env::var("JIRA_EMAIL") {
            self.email = email;
        }
        if let Ok(token) = env::var("JIRA_API_TOKEN") {
            self.api_token = token;
        }
        if let Ok(project) = env::var("PROJECT_KEY") {
            self.project_key = Some(project);
        }
        if let Ok(assignee) = env::var("ASSIGNEE") {
            self.assignee = Some(assignee);
        }
        // STATUS_FILTERS is an accepted alias for STATUS_FILTER
        if let Ok(status) = env::var("STATUS_FILTER").or_else(|_| env::var("STATUS_FILTERS")) {
            self.status_filter = Some(status);
        }
        if let Ok(issue_type) = env::var("ISSUE_TYPE_FILTER") {
            self.issue_type_filter = Some(issue_type);
        }
        if let Ok(max_results) = env::var("MAX_RESULTS") {
            match max_results.parse::<u32>() {
                Ok(max) => self.max_results = max.min(MAX_RESULTS_CEILING),
                Err(_) => warn!("MAX_RESULTS is not an integer, keeping {}", self.max_results),
            }
        }
        if let Ok(dir) = env::var("OUTPUT_DIR") {
            self.output_dir = PathBuf::from(dir);
        }
        if let Ok(timeout) = env::var("JIRA_REQUEST_TIMEOUT") {
            if let Ok(seconds) = timeout.parse::<u64>() {
                self.request_timeout_seconds = seconds;
            }
        }
    }

    /// Validate the credential triple and numeric ranges
    ///
    /// Every missing required key is collected and reported in one error so
    /// the operator can fix the environment in a single pass.
    fn validate(&self, require_project_key: bool) -> JiraFetchResult<()> {
        let mut missing = Vec::new();
        if self.domain.is_empty() {
            missing.push("JIRA_DOMAIN");
        }
        if self.email.is_empty() {
            missing.push("JIRA_EMAIL");
        }
        if self.api_token.is_empty() {
            missing.push("JIRA_API_TOKEN");
        }
        if require_project_key && self.project_key.as_deref().map_or(true, str::is_empty) {
            missing.push("PROJECT_KEY");
        }
        if !missing.is_empty() {
            return Err(JiraFetchError::missing_config(missing));
        }

        if self.domain.contains("://") {
            return Err(JiraFetchError::config(format!(
                "JIRA_DOMAIN must be a bare domain like \"example.atlassian.net\", got: {}",
                self.domain
            )));
        }

        if self.max_results > MAX_RESULTS_CEILING {
            return Err(JiraFetchError::config(format!(
                "max_results cannot exceed {MAX_RESULTS_CEILING}"
            )));
        }

        Ok(())
    }

    /// Project key, required by the CLI fetch modes
    pub fn require_project_key(&self) -> JiraFetchResult<&str> {
        self.project_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| JiraFetchError::missing_config(["PROJECT_KEY"]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        for key in [
            "JIRA_DOMAIN",
            "JIRA_EMAIL",
            "JIRA_API_TOKEN",
            "PROJECT_KEY",
            "ASSIGNEE",
            "STATUS_FILTER",
            "STATUS_FILTERS",
            "ISSUE_TYPE_FILTER",
            "MAX_RESULTS",
            "OUTPUT_DIR",
            "JIRA_REQUEST_TIMEOUT",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    fn default_config() {
        let config = JiraConfig::default();
        assert_eq!(config.max_results, 50);
        assert_eq!(config.request_timeout_seconds, 30);
        assert_eq!(config.output_dir, PathBuf::from("output"));
        assert!(config.project_key.is_none());
    }

    #[test]
    #[serial]
    fn env_var_loading() {
        clear_env();
        env::set_var("JIRA_DOMAIN", "test.atlassian.net");
        env::set_var("JIRA_EMAIL", "dev@example.com");
        env::set_var("JIRA_API_TOKEN", "secret");
        env::set_var("PROJECT_KEY", "TLW");
        env::set_var("MAX_RESULTS", "500");

        let mut config = JiraConfig::default();
        config.load_from_env();

        assert_eq!(config.domain, "test.atlassian.net");
        assert_eq!(config.email, "dev@example.com");
        assert_eq!(config.api_token, "secret");
        assert_eq!(config.project_key.as_deref(), Some("TLW"));
        // capped at the API ceiling
        assert_eq!(config.max_results, 200);

        clear_env();
    }

    #[test]
    #[serial]
    fn status_filters_alias() {
        clear_env();
        env::set_var("STATUS_FILTERS", "Open, In Progress");

        let mut config = JiraConfig::default();
        config.load_from_env();
        assert_eq!(config.status_filter.as_deref(), Some("Open, In Progress"));

        clear_env();
    }

    #[test]
    fn validation_reports_all_missing_keys() {
        let config = JiraConfig::default();
        let err = config.validate(false).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("JIRA_DOMAIN"));
        assert!(message.contains("JIRA_EMAIL"));
        assert!(message.contains("JIRA_API_TOKEN"));
        assert!(!message.contains("PROJECT_KEY"));
    }

    #[test]
    fn fetch_validation_includes_project_key() {
        let config = JiraConfig::default();
        let err = config.validate(true).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("JIRA_DOMAIN"));
        assert!(message.contains("PROJECT_KEY"));
    }

    #[test]
    fn validation_rejects_url_domain() {
        let config = JiraConfig {
            domain: "https://test.atlassian.net".to_string(),
            email: "dev@example.com".to_string(),
            api_token: "secret".to_string(),
            ..Default::default()
        };
        assert!(config.validate(false).is_err());
    }

    #[test]
    fn require_project_key() {
        let mut config = JiraConfig::default();
        assert!(config.require_project_key().is_err());

        config.project_key = Some("TLW".to_string());
        assert_eq!(config.require_project_key().unwrap(), "TLW");
    }
}
