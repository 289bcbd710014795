//! JIRA REST client
//!
//! Owns the HTTP transport: basic auth (account email + API token), the
//! `/rest/api/3` base path, and the explicit field-selection list used by
//! every issue request. Results deserialize into the typed issue model;
//! optional fields stay `Option` until the rendering boundary.
//!
//! The connection test never fails — unavailability is an expected,
//! displayable outcome. Search and single-issue fetches propagate transport
//! and remote errors to the caller; there is no caching and no retry, a
//! failed call is terminal for the invocation.

use crate::adf::Description;
use crate::config::JiraConfig;
use crate::error::{JiraFetchError, JiraFetchResult};
use reqwest::{Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Field-selection list sent with every search and single-issue request
pub const ISSUE_FIELDS: [&str; 14] = [
    "key",
    "summary",
    "description",
    "status",
    "priority",
    "issuetype",
    "assignee",
    "reporter",
    "created",
    "updated",
    "components",
    "labels",
    "fixVersions",
    "comment",
];

/// Result of a JQL search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResults {
    /// Total match count; the `/search/jql` endpoint may omit it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,

    #[serde(default)]
    pub issues: Vec<Issue>,
}

impl SearchResults {
    /// Total matches, falling back to the returned page size
    pub fn total_count(&self) -> u64 {
        self.total.unwrap_or(self.issues.len() as u64)
    }
}

/// Raw issue record as returned by the tracker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub key: String,
    pub fields: IssueFields,
}

/// Selected issue fields; absent optionals are defaulted at render time only
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IssueFields {
    #[serde(default)]
    pub summary: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Description>,

    #[serde(default)]
    pub status: Named,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Named>,

    #[serde(default)]
    pub issuetype: Named,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<UserRef>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reporter: Option<UserRef>,

    #[serde(default)]
    pub created: String,

    #[serde(default)]
    pub updated: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<Named>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,

    #[serde(default, rename = "fixVersions", skip_serializing_if = "Vec::is_empty")]
    pub fix_versions: Vec<Named>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<CommentPage>,
}

/// A named tracker entity (status, priority, issue type, component, version)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Named {
    #[serde(default)]
    pub name: String,
}

/// A user reference carrying a display name when the tracker provides one
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserRef {
    #[serde(rename = "displayName", default)]
    pub display_name: Option<String>,
}

/// Trailing window of comments returned with an issue
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommentPage {
    #[serde(default)]
    pub comments: Vec<Comment>,
}

/// A single issue comment; the body may itself be a document tree
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Comment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<UserRef>,

    #[serde(default)]
    pub created: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Description>,
}

/// Project listing entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectInfo {
    pub key: String,
    #[serde(default)]
    pub name: String,
}

/// Authenticated user returned by the identity check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    #[serde(rename = "displayName", default)]
    pub display_name: String,

    #[serde(rename = "emailAddress", default)]
    pub email_address: Option<String>,
}

/// Outcome of the connection test; never an error
#[derive(Debug, Clone)]
pub enum ConnectionStatus {
    Connected(CurrentUser),
    Failed { error: String },
}

/// JIRA REST client scoped to one instance
#[derive(Debug, Clone)]
pub struct JiraClient {
    http: reqwest::Client,
    base_url: String,
    domain: String,
    email: String,
    api_token: String,
}

impl JiraClient {
    /// Build a client for the configured instance
    pub fn new(config: &JiraConfig) -> JiraFetchResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()?;

        Ok(Self {
            http,
            base_url: format!("https://{}/rest/api/3", config.domain),
            domain: config.domain.clone(),
            email: config.email.clone(),
            api_token: config.api_token.clone(),
        })
    }

    /// Domain this client is scoped to, used for browse URLs
    pub fn domain(&self) -> &str {
        &self.domain
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.http
            .get(format!("{}{}", self.base_url, path))
            .basic_auth(&self.email, Some(&self.api_token))
            .header("Accept", "application/json")
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.http
            .post(format!("{}{}", self.base_url, path))
            .basic_auth(&self.email, Some(&self.api_token))
            .header("Accept", "application/json")
    }

    /// Identity check against `/myself`
    ///
    /// Failures are captured and returned, not raised: absence of JIRA is an
    /// expected outcome the caller displays.
    #[instrument(skip(self))]
    pub async fn test_connection(&self) -> ConnectionStatus {
        debug!("Testing JIRA connection");

        let response = match self.get("/myself").send().await {
            Ok(response) => response,
            Err(err) => {
                return ConnectionStatus::Failed {
                    error: err.to_string(),
                }
            }
        };

        let response = match check_status(response).await {
            Ok(response) => response,
            Err(err) => {
                return ConnectionStatus::Failed {
                    error: err.to_string(),
                }
            }
        };

        match response.json::<CurrentUser>().await {
            Ok(user) => {
                info!("Connected to JIRA as {}", user.display_name);
                ConnectionStatus::Connected(user)
            }
            Err(err) => ConnectionStatus::Failed {
                error: err.to_string(),
            },
        }
    }

    /// Execute a JQL search via `POST /search/jql`
    #[instrument(skip(self))]
    pub async fn search_issues(&self, jql: &str, max_results: u32) -> JiraFetchResult<SearchResults> {
        debug!("Searching issues with JQL: {jql}");

        let body = serde_json::json!({
            "jql": jql,
            "maxResults": max_results,
            "fields": ISSUE_FIELDS,
        });

        let response = self.post("/search/jql").json(&body).send().await?;
        let response = check_status(response).await?;
        let results: SearchResults = response.json().await?;

        info!(
            "Found {} issues (showing {})",
            results.total_count(),
            results.issues.len()
        );
        Ok(results)
    }

    /// Fetch a single issue by key with the same field selection
    #[instrument(skip(self))]
    pub async fn get_issue(&self, issue_key: &str) -> JiraFetchResult<Issue> {
        debug!("Fetching issue {issue_key}");

        let response = self
            .get(&format!("/issue/{issue_key}"))
            .query(&[("fields", ISSUE_FIELDS.join(","))])
            .send()
            .await?;
        let response = check_status(response).await?;

        Ok(response.json().await?)
    }

    /// List projects visible to the authenticated user
    #[instrument(skip(self))]
    pub async fn get_projects(&self) -> JiraFetchResult<Vec<ProjectInfo>> {
        let response = self.get("/project").send().await?;
        let response = check_status(response).await?;

        Ok(response.json().await?)
    }
}

/// Turn a non-success response into an API error carrying the remote message
async fn check_status(response: Response) -> JiraFetchResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(JiraFetchError::api(
        status.as_u16(),
        remote_error_message(&body).unwrap_or_else(|| status_fallback(status)),
    ))
}

/// Extract `errorMessages[0]`, else `message`, from a JIRA error body
fn remote_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;

    if let Some(first) = value
        .get("errorMessages")
        .and_then(|messages| messages.as_array())
        .and_then(|messages| messages.first())
        .and_then(|message| message.as_str())
    {
        return Some(first.to_string());
    }

    value
        .get("message")
        .and_then(|message| message.as_str())
        .map(str::to_string)
}

fn status_fallback(status: StatusCode) -> String {
    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| status.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn search_results_total_falls_back_to_page_size() {
        let results: SearchResults = serde_json::from_value(json!({
            "issues": [
                {"key": "TLW-1", "fields": {"summary": "One"}},
                {"key": "TLW-2", "fields": {"summary": "Two"}}
            ]
        }))
        .unwrap();
        assert_eq!(results.total_count(), 2);

        let results: SearchResults = serde_json::from_value(json!({
            "total": 40,
            "issues": [{"key": "TLW-1", "fields": {"summary": "One"}}]
        }))
        .unwrap();
        assert_eq!(results.total_count(), 40);
    }

    #[test]
    fn issue_deserializes_with_null_optionals() {
        let issue: Issue = serde_json::from_value(json!({
            "key": "TLW-7",
            "fields": {
                "summary": "Crash on load",
                "status": {"name": "Open"},
                "issuetype": {"name": "Bug"},
                "priority": null,
                "assignee": null,
                "reporter": {"displayName": "Dana"},
                "created": "2024-03-01T09:00:00.000+0000",
                "updated": "2024-03-02T10:00:00.000+0000",
                "labels": ["crash"]
            }
        }))
        .unwrap();

        assert_eq!(issue.key, "TLW-7");
        assert!(issue.fields.priority.is_none());
        assert!(issue.fields.assignee.is_none());
        assert_eq!(
            issue.fields.reporter.unwrap().display_name.as_deref(),
            Some("Dana")
        );
        assert!(issue.fields.components.is_empty());
    }

    #[test]
    fn issue_deserializes_adf_description_and_comments() {
        let issue: Issue = serde_json::from_value(json!({
            "key": "TLW-8",
            "fields": {
                "summary": "Broken dialog",
                "status": {"name": "Open"},
                "issuetype": {"name": "Bug"},
                "description": {
                    "type": "doc",
                    "version": 1,
                    "content": [
                        {"type": "paragraph", "content": [{"type": "text", "text": "Repro"}]}
                    ]
                },
                "comment": {
                    "comments": [
                        {
                            "author": {"displayName": "Sam"},
                            "created": "2024-03-03T08:00:00.000+0000",
                            "body": "plain comment"
                        }
                    ]
                }
            }
        }))
        .unwrap();

        assert!(issue.fields.description.is_some());
        let comments = issue.fields.comment.unwrap().comments;
        assert_eq!(comments.len(), 1);
        assert_eq!(
            comments[0].author.as_ref().unwrap().display_name.as_deref(),
            Some("Sam")
        );
    }

    #[test]
    fn remote_error_message_prefers_error_messages() {
        let body = r#"{"errorMessages": ["Issue does not exist"], "message": "other"}"#;
        assert_eq!(
            remote_error_message(body).as_deref(),
            Some("Issue does not exist")
        );

        let body = r#"{"message": "Unauthorized"}"#;
        assert_eq!(remote_error_message(body).as_deref(), Some("Unauthorized"));

        assert_eq!(remote_error_message("not json"), None);
        assert_eq!(remote_error_message("{}"), None);
    }
}
