//! Get-issue tool: single issue rendered as one markdown block

use crate::config::JiraConfig;
use crate::error::JiraFetchResult;
use crate::formatter::format_issue;
use crate::jira_client::JiraClient;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::instrument;

/// Parameters for the get_issue tool
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct GetIssueParams {
    /// JIRA issue key (e.g. "TLW-123")
    pub issue_key: String,
}

/// Implementation of the get_issue tool
pub struct GetIssueTool {
    jira_client: Arc<JiraClient>,
    #[allow(dead_code)]
    config: Arc<JiraConfig>,
}

impl GetIssueTool {
    pub fn new(jira_client: Arc<JiraClient>, config: Arc<JiraConfig>) -> Self {
        Self {
            jira_client,
            config,
        }
    }

    /// Fetch one issue and render it without a list index
    #[instrument(skip(self), fields(issue_key = %params.issue_key))]
    pub async fn execute(&self, params: GetIssueParams) -> JiraFetchResult<String> {
        let issue = self.jira_client.get_issue(&params.issue_key).await?;
        Ok(format_issue(&issue, None, self.jira_client.domain()))
    }
}
