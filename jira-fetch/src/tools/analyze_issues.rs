//! Analyze-issues tool: categorized, priority-ranked analysis report

use crate::config::{JiraConfig, MAX_RESULTS_CEILING};
use crate::error::JiraFetchResult;
use crate::formatter::analyze_issues;
use crate::jira_client::JiraClient;
use crate::jql::{build_jql, IssueFilter};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};

/// Default search size for analysis; smaller than plain fetches because
/// every issue is rendered into categorized sections
pub const DEFAULT_ANALYZE_RESULTS: u32 = 25;

/// Parameters for the analyze_issues tool
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct AnalyzeIssuesParams {
    /// JIRA project key to analyze
    pub project_key: String,

    /// Specific areas to focus on (e.g. ["bugs", "performance", "ui"])
    pub focus_areas: Option<Vec<String>>,

    /// Maximum number of issues to analyze (optional, default: 25)
    pub max_results: Option<u32>,
}

/// Implementation of the analyze_issues tool
pub struct AnalyzeIssuesTool {
    jira_client: Arc<JiraClient>,
    #[allow(dead_code)]
    config: Arc<JiraConfig>,
}

impl AnalyzeIssuesTool {
    pub fn new(jira_client: Arc<JiraClient>, config: Arc<JiraConfig>) -> Self {
        Self {
            jira_client,
            config,
        }
    }

    /// Search the project and render the categorized analysis
    #[instrument(skip(self), fields(project_key = %params.project_key))]
    pub async fn execute(&self, params: AnalyzeIssuesParams) -> JiraFetchResult<String> {
        let filter = IssueFilter {
            project_key: Some(params.project_key),
            ..Default::default()
        };

        let jql = build_jql(&filter);
        let max_results = params
            .max_results
            .unwrap_or(DEFAULT_ANALYZE_RESULTS)
            .min(MAX_RESULTS_CEILING);

        let results = self.jira_client.search_issues(&jql, max_results).await?;
        info!("analyze_issues categorizing {} issues", results.issues.len());

        let focus_areas = params.focus_areas.unwrap_or_default();
        Ok(analyze_issues(
            &results.issues,
            &focus_areas,
            self.jira_client.domain(),
        ))
    }
}
