//! JQL query building from structured filters
//!
//! Turns an [`IssueFilter`] into a JQL string. Pure string assembly: no I/O,
//! no failure modes, absent fields are skipped.

use crate::config::JiraConfig;

/// Default ordering clause appended to every built query
pub const DEFAULT_ORDER: &str = "priority DESC, updated DESC";

/// Ordering used when sorting is deferred to the in-memory comparator
pub const UPDATED_ORDER: &str = "updated DESC";

/// Structured search filter, one optional clause per field
#[derive(Debug, Clone, Default)]
pub struct IssueFilter {
    pub project_key: Option<String>,
    pub assignee: Option<String>,
    /// Single status name or comma-separated list
    pub status: Option<String>,
    pub issue_type: Option<String>,
    pub priority: Option<String>,
}

impl IssueFilter {
    /// Build the CLI filter from loaded configuration
    pub fn from_config(config: &JiraConfig) -> Self {
        Self {
            project_key: config.project_key.clone(),
            assignee: config.assignee.clone(),
            status: config.status_filter.clone(),
            issue_type: config.issue_type_filter.clone(),
            priority: None,
        }
    }
}

/// Build a JQL query with the default ordering clause
pub fn build_jql(filter: &IssueFilter) -> String {
    build_jql_ordered(filter, DEFAULT_ORDER)
}

/// Build a JQL query with a caller-supplied ordering clause
///
/// Clauses are joined with AND in field order: project, assignee, status,
/// issuetype, priority. When no status clause was added, an implicit clause
/// keeps terminal issues out of the default view; supplying any status token
/// overrides it. The ordering clause is always the final suffix.
pub fn build_jql_ordered(filter: &IssueFilter, order_by: &str) -> String {
    let mut conditions = Vec::new();

    if let Some(project) = &filter.project_key {
        conditions.push(format!("project = \"{project}\""));
    }

    if let Some(assignee) = &filter.assignee {
        conditions.push(format!("assignee = \"{assignee}\""));
    }

    let mut status_clause_added = false;
    if let Some(status) = &filter.status {
        let statuses: Vec<&str> = status
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();
        match statuses.as_slice() {
            [] => {}
            [single] => {
                conditions.push(format!("status = \"{single}\""));
                status_clause_added = true;
            }
            many => {
                let status_list = many
                    .iter()
                    .map(|s| format!("\"{s}\""))
                    .collect::<Vec<_>>()
                    .join(", ");
                conditions.push(format!("status IN ({status_list})"));
                status_clause_added = true;
            }
        }
    }

    if let Some(issue_type) = &filter.issue_type {
        conditions.push(format!("issuetype = \"{issue_type}\""));
    }

    if let Some(priority) = &filter.priority {
        conditions.push(format!("priority = \"{priority}\""));
    }

    // Default to open issues when no status was specified
    if !status_clause_added {
        conditions.push("status != \"Done\" AND status != \"Closed\"".to_string());
    }

    if conditions.is_empty() {
        format!("ORDER BY {order_by}")
    } else {
        format!("{} ORDER BY {order_by}", conditions.join(" AND "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_filter_defaults_to_open_issues() {
        let jql = build_jql(&IssueFilter::default());
        assert_eq!(
            jql,
            "status != \"Done\" AND status != \"Closed\" ORDER BY priority DESC, updated DESC"
        );
        assert!(!jql.starts_with("AND"));
        assert!(!jql.starts_with(' '));
    }

    #[test]
    fn all_fields_in_order() {
        let filter = IssueFilter {
            project_key: Some("TLW".to_string()),
            assignee: Some("dev@example.com".to_string()),
            status: Some("Open".to_string()),
            issue_type: Some("Bug".to_string()),
            priority: Some("High".to_string()),
        };
        assert_eq!(
            build_jql(&filter),
            "project = \"TLW\" AND assignee = \"dev@example.com\" AND status = \"Open\" \
             AND issuetype = \"Bug\" AND priority = \"High\" \
             ORDER BY priority DESC, updated DESC"
        );
    }

    #[test]
    fn single_status_is_equality() {
        let filter = IssueFilter {
            status: Some("In Progress".to_string()),
            ..Default::default()
        };
        let jql = build_jql(&filter);
        assert!(jql.contains("status = \"In Progress\""));
        assert!(!jql.contains("status !="));
    }

    #[test]
    fn comma_status_becomes_membership_list() {
        let filter = IssueFilter {
            project_key: Some("TLW".to_string()),
            status: Some("Open, In Progress".to_string()),
            ..Default::default()
        };
        let jql = build_jql(&filter);
        assert!(jql.contains("status IN (\"Open\", \"In Progress\")"));
        // an explicit status overrides the terminal-state exclusion
        assert!(!jql.contains("status != \"Done\""));
    }

    #[test]
    fn status_with_only_delimiters_falls_back_to_default() {
        let filter = IssueFilter {
            status: Some(" , ,".to_string()),
            ..Default::default()
        };
        let jql = build_jql(&filter);
        assert!(jql.contains("status != \"Done\" AND status != \"Closed\""));
    }

    #[test]
    fn ordering_clause_is_always_the_suffix() {
        let filter = IssueFilter {
            project_key: Some("TLW".to_string()),
            ..Default::default()
        };
        let jql = build_jql_ordered(&filter, UPDATED_ORDER);
        assert!(jql.ends_with("ORDER BY updated DESC"));
        assert!(!jql.contains("priority DESC"));
    }

    #[test]
    fn missing_fields_are_skipped() {
        let filter = IssueFilter {
            assignee: Some("dev@example.com".to_string()),
            ..Default::default()
        };
        let jql = build_jql(&filter);
        assert!(!jql.contains("project"));
        assert!(!jql.contains("issuetype"));
        assert!(jql.starts_with("assignee = \"dev@example.com\" AND status != \"Done\""));
    }
}
