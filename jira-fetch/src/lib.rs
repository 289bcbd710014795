//! JIRA Fetch Library
//!
//! An issue-retrieval-and-transformation pipeline for JIRA: a structured
//! filter becomes a JQL query, the REST client executes it, and the
//! transformer renders issues as markdown reports, console summaries,
//! statistics, and a categorized analysis. The same pipeline is exposed as
//! an MCP (Model Context Protocol) tool server over stdio for AI-agent
//! hosts.
//!
//! ## Tools
//!
//! - **fetch_issues**: filtered search rendered as a full report
//! - **get_issue**: a single issue rendered as one markdown block
//! - **test_connection**: identity check, reported as plain text either way
//! - **analyze_issues**: categorized and priority-ranked analysis

use crate::config::JiraConfig;
use crate::error::JiraFetchResult;
use crate::jira_client::{ConnectionStatus, JiraClient};
use crate::tools::{
    AnalyzeIssuesParams, AnalyzeIssuesTool, FetchIssuesParams, FetchIssuesTool, GetIssueParams,
    GetIssueTool,
};

use pulseengine_mcp_macros::{mcp_server, mcp_tools};
use std::sync::Arc;
use tracing::{error, info, instrument};

pub mod adf;
pub mod config;
pub mod error;
pub mod formatter;
pub mod jira_client;
pub mod jql;
pub mod pipeline;
pub mod tools;

/// JIRA Fetch MCP Server
///
/// Republishes the fetch pipeline as named, schema-declared operations.
/// Construction validates credentials but performs no network I/O, so
/// `test_connection` can report an unreachable instance as ordinary text.
#[mcp_server(
    name = "JIRA Fetch MCP Server",
    version = "0.3.0",
    description = "JIRA issue fetcher exposing search, retrieval, and analysis tools",
    auth = "disabled"
)]
#[derive(Clone)]
pub struct JiraFetchServer {
    /// Configuration
    config: Arc<JiraConfig>,

    /// JIRA client for API operations
    jira_client: Arc<JiraClient>,

    /// Tool implementations
    fetch_tool: Arc<FetchIssuesTool>,
    get_issue_tool: Arc<GetIssueTool>,
    analyze_tool: Arc<AnalyzeIssuesTool>,
}

impl Default for JiraFetchServer {
    fn default() -> Self {
        // The server requires loaded configuration; there is no meaningful default
        panic!("JiraFetchServer cannot be created with default(). Use JiraFetchServer::new() instead.")
    }
}

impl JiraFetchServer {
    /// Create a server from environment/TOML configuration
    #[instrument]
    pub fn new() -> JiraFetchResult<Self> {
        info!("Initializing JIRA Fetch MCP Server");
        let config = Arc::new(JiraConfig::load()?);
        Self::with_config(config)
    }

    /// Create a server with the given configuration (for testing)
    pub fn with_config(config: Arc<JiraConfig>) -> JiraFetchResult<Self> {
        let jira_client = Arc::new(JiraClient::new(&config)?);

        let fetch_tool = Arc::new(FetchIssuesTool::new(
            Arc::clone(&jira_client),
            Arc::clone(&config),
        ));
        let get_issue_tool = Arc::new(GetIssueTool::new(
            Arc::clone(&jira_client),
            Arc::clone(&config),
        ));
        let analyze_tool = Arc::new(AnalyzeIssuesTool::new(
            Arc::clone(&jira_client),
            Arc::clone(&config),
        ));

        info!("JIRA Fetch MCP Server initialized for {}", config.domain);

        Ok(Self {
            config,
            jira_client,
            fetch_tool,
            get_issue_tool,
            analyze_tool,
        })
    }
}

/// All public methods in this impl block become MCP tools automatically
#[mcp_tools]
impl JiraFetchServer {
    /// Fetch JIRA issues based on filters and return them formatted for analysis
    ///
    /// Builds a JQL query from the supplied filters, searches the configured
    /// instance, and returns the full markdown report. With no status filter
    /// the search defaults to open issues.
    ///
    /// # Examples
    /// - All open issues in a project: `{"project_key": "TLW"}`
    /// - Bugs for one assignee: `{"project_key": "TLW", "issue_type": "Bug", "assignee": "dev@example.com"}`
    #[instrument(skip(self))]
    pub async fn fetch_issues(&self, params: FetchIssuesParams) -> anyhow::Result<String> {
        self.fetch_tool.execute(params).await.map_err(|e| {
            error!("fetch_issues failed: {}", e);
            anyhow::anyhow!("Error executing fetch_issues: {}", e)
        })
    }

    /// Get detailed information about a specific JIRA issue
    ///
    /// Retrieves one issue by key and returns it as a markdown block with
    /// description, recent comments, and a browse URL.
    ///
    /// # Examples
    /// - `{"issue_key": "TLW-123"}`
    #[instrument(skip(self))]
    pub async fn get_issue(&self, params: GetIssueParams) -> anyhow::Result<String> {
        self.get_issue_tool.execute(params).await.map_err(|e| {
            error!("get_issue failed: {}", e);
            anyhow::anyhow!("Error executing get_issue: {}", e)
        })
    }

    /// Test the connection to JIRA with current credentials
    ///
    /// An unreachable or unauthorized instance is an expected, displayable
    /// outcome, so failures come back as normal text rather than a protocol
    /// error.
    #[instrument(skip(self))]
    pub async fn test_connection(&self) -> anyhow::Result<String> {
        info!("Testing JIRA connection to {}", self.config.domain);

        match self.jira_client.test_connection().await {
            ConnectionStatus::Connected(user) => Ok(format!(
                "✅ JIRA connection successful!\nConnected as: {} ({})",
                user.display_name,
                user.email_address.as_deref().unwrap_or("N/A")
            )),
            ConnectionStatus::Failed { error } => {
                Ok(format!("❌ JIRA connection failed: {error}"))
            }
        }
    }

    /// Analyze a set of JIRA issues and provide structured analysis for code fixes
    ///
    /// Searches the project, buckets issues into non-exclusive categories
    /// (bugs, tasks, improvements, critical, code-related), and returns a
    /// prioritized markdown analysis.
    ///
    /// # Examples
    /// - `{"project_key": "TLW", "focus_areas": ["bugs", "performance"]}`
    #[instrument(skip(self))]
    pub async fn analyze_issues(&self, params: AnalyzeIssuesParams) -> anyhow::Result<String> {
        self.analyze_tool.execute(params).await.map_err(|e| {
            error!("analyze_issues failed: {}", e);
            anyhow::anyhow!("Error executing analyze_issues: {}", e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_config_builds_without_network() {
        let config = Arc::new(JiraConfig {
            domain: "test.atlassian.net".to_string(),
            email: "dev@example.com".to_string(),
            api_token: "secret".to_string(),
            ..Default::default()
        });
        assert!(JiraFetchServer::with_config(config).is_ok());
    }

    #[test]
    #[should_panic(expected = "cannot be created with default()")]
    fn default_panics_toward_new() {
        let _ = JiraFetchServer::default();
    }
}
