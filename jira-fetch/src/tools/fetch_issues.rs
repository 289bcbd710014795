//! Fetch-issues tool: filtered search rendered as the full markdown report

use crate::config::{JiraConfig, DEFAULT_MAX_RESULTS, MAX_RESULTS_CEILING};
use crate::error::JiraFetchResult;
use crate::formatter::format_report;
use crate::jira_client::JiraClient;
use crate::jql::{build_jql, IssueFilter};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};

/// Parameters for the fetch_issues tool
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct FetchIssuesParams {
    /// JIRA project key (e.g. "TLW")
    pub project_key: String,

    /// Maximum number of issues to fetch (optional, default: 50)
    pub max_results: Option<u32>,

    /// Filter by assignee email or username (optional)
    pub assignee: Option<String>,

    /// Filter by status, single name or comma-separated list
    /// (optional, defaults to open issues)
    pub status: Option<String>,

    /// Filter by issue type like "Bug" or "Task" (optional)
    pub issue_type: Option<String>,

    /// Filter by priority level (optional)
    pub priority: Option<String>,
}

/// Implementation of the fetch_issues tool
pub struct FetchIssuesTool {
    jira_client: Arc<JiraClient>,
    #[allow(dead_code)]
    config: Arc<JiraConfig>,
}

impl FetchIssuesTool {
    pub fn new(jira_client: Arc<JiraClient>, config: Arc<JiraConfig>) -> Self {
        Self {
            jira_client,
            config,
        }
    }

    /// Execute a filtered search and render the report text
    #[instrument(skip(self), fields(project_key = %params.project_key))]
    pub async fn execute(&self, params: FetchIssuesParams) -> JiraFetchResult<String> {
        let filter = IssueFilter {
            project_key: Some(params.project_key),
            assignee: params.assignee,
            status: params.status,
            issue_type: params.issue_type,
            priority: params.priority,
        };

        let jql = build_jql(&filter);
        let max_results = params
            .max_results
            .unwrap_or(DEFAULT_MAX_RESULTS)
            .min(MAX_RESULTS_CEILING);

        let results = self.jira_client.search_issues(&jql, max_results).await?;
        info!("fetch_issues returning {} issues", results.issues.len());

        Ok(format_report(&results.issues, self.jira_client.domain()))
    }
}
