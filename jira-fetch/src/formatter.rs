//! Issue rendering, statistics, and categorization
//!
//! Pure transformations over [`Issue`] data: markdown blocks for AI-assistant
//! consumption, console summaries, aggregate statistics, priority ranking,
//! and the analysis report. Missing optional fields become explicit defaults
//! ("None", "Unassigned", "Unknown") here and nowhere earlier.

use crate::adf::render_description;
use crate::jira_client::Issue;
use chrono::DateTime;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Keywords marking an issue as code-related, matched against lowercased
/// summary, description, and labels
const CODE_KEYWORDS: [&str; 12] = [
    "bug",
    "error",
    "exception",
    "crash",
    "performance",
    "ui",
    "unity",
    "code",
    "script",
    "method",
    "class",
    "function",
];

/// How many comments from the trailing window are rendered per issue
const RECENT_COMMENT_WINDOW: usize = 3;

/// Render cap for the bug-fix section of the analysis report
const BUG_SECTION_CAP: usize = 10;

/// Render cap for the improvements section of the analysis report
const IMPROVEMENT_SECTION_CAP: usize = 5;

/// Aggregate issue statistics: total plus four frequency mappings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueStats {
    pub total: usize,
    pub by_status: BTreeMap<String, usize>,
    pub by_type: BTreeMap<String, usize>,
    pub by_priority: BTreeMap<String, usize>,
    pub by_assignee: BTreeMap<String, usize>,
}

/// Build statistics in a single pass over the issues
pub fn summary_stats(issues: &[Issue]) -> IssueStats {
    let mut stats = IssueStats {
        total: issues.len(),
        by_status: BTreeMap::new(),
        by_type: BTreeMap::new(),
        by_priority: BTreeMap::new(),
        by_assignee: BTreeMap::new(),
    };

    for issue in issues {
        let fields = &issue.fields;
        *stats
            .by_status
            .entry(fields.status.name.clone())
            .or_default() += 1;
        *stats
            .by_type
            .entry(fields.issuetype.name.clone())
            .or_default() += 1;
        *stats
            .by_priority
            .entry(priority_name(issue).to_string())
            .or_default() += 1;
        *stats
            .by_assignee
            .entry(assignee_name(issue).to_string())
            .or_default() += 1;
    }

    stats
}

/// Render statistics for the console
pub fn format_stats(stats: &IssueStats) -> String {
    let mut out = String::new();
    out.push_str("📊 Issue Statistics:\n");
    out.push_str(&format!("Total Issues: {}\n", stats.total));

    out.push_str("\nBy Status:\n");
    for (status, count) in &stats.by_status {
        out.push_str(&format!("  {status}: {count}\n"));
    }

    out.push_str("\nBy Type:\n");
    for (issue_type, count) in &stats.by_type {
        out.push_str(&format!("  {issue_type}: {count}\n"));
    }

    out.push_str("\nBy Priority:\n");
    for (priority, count) in &stats.by_priority {
        out.push_str(&format!("  {priority}: {count}\n"));
    }

    out
}

/// Render one issue as a markdown block
///
/// Field order is fixed; sections with empty source data are omitted
/// entirely rather than emitted blank. The trailing window of comments is
/// capped at the last three.
pub fn format_issue(issue: &Issue, index: Option<usize>, domain: &str) -> String {
    let fields = &issue.fields;
    let mut out = String::new();

    match index {
        Some(n) => out.push_str(&format!("## {n}. {}: {}\n\n", issue.key, fields.summary)),
        None => out.push_str(&format!("## {}: {}\n\n", issue.key, fields.summary)),
    }

    out.push_str(&format!("**Type:** {}\n", fields.issuetype.name));
    out.push_str(&format!("**Status:** {}\n", fields.status.name));
    out.push_str(&format!("**Priority:** {}\n", priority_name(issue)));
    out.push_str(&format!("**Assignee:** {}\n", assignee_name(issue)));
    out.push_str(&format!("**Reporter:** {}\n", reporter_name(issue)));
    out.push_str(&format!("**Created:** {}\n", short_date(&fields.created)));
    out.push_str(&format!("**Updated:** {}\n\n", short_date(&fields.updated)));

    if !fields.components.is_empty() {
        let names: Vec<&str> = fields.components.iter().map(|c| c.name.as_str()).collect();
        out.push_str(&format!("**Components:** {}\n", names.join(", ")));
    }
    if !fields.labels.is_empty() {
        out.push_str(&format!("**Labels:** {}\n", fields.labels.join(", ")));
    }
    if !fields.fix_versions.is_empty() {
        let names: Vec<&str> = fields
            .fix_versions
            .iter()
            .map(|v| v.name.as_str())
            .collect();
        out.push_str(&format!("**Fix Versions:** {}\n", names.join(", ")));
    }
    out.push('\n');

    if fields.description.is_some() {
        out.push_str("**Description:**\n");
        out.push_str(&render_description(fields.description.as_ref()));
        out.push_str("\n\n");
    }

    if let Some(comment_page) = &fields.comment {
        if !comment_page.comments.is_empty() {
            out.push_str("**Recent Comments:**\n");
            let start = comment_page
                .comments
                .len()
                .saturating_sub(RECENT_COMMENT_WINDOW);
            for comment in &comment_page.comments[start..] {
                let author = comment
                    .author
                    .as_ref()
                    .and_then(|a| a.display_name.as_deref())
                    .unwrap_or("Unknown");
                out.push_str(&format!(
                    "- **{author}** ({}): {}\n",
                    short_date(&comment.created),
                    render_description(comment.body.as_ref())
                ));
            }
            out.push('\n');
        }
    }

    out.push_str(&format!(
        "**JIRA URL:** https://{domain}/browse/{}\n",
        issue.key
    ));

    out
}

/// Render the full report: header, numbered issue blocks separated by
/// `---`, and the fixed instructional trailer
pub fn format_report(issues: &[Issue], domain: &str) -> String {
    let mut out = String::new();

    out.push_str("# JIRA Issues for Claude Code Analysis\n\n");
    out.push_str(&format!("Found {} issues to analyze:\n\n", issues.len()));

    for (i, issue) in issues.iter().enumerate() {
        out.push_str(&format_issue(issue, Some(i + 1), domain));
        out.push_str("\n---\n\n");
    }

    out.push_str("## Instructions for Claude\n\n");
    out.push_str("Please analyze these JIRA issues and:\n");
    out.push_str("1. Identify which issues are code-related and can be fixed\n");
    out.push_str("2. Prioritize them by complexity and impact\n");
    out.push_str("3. For each fixable issue, provide the file paths and changes needed\n");
    out.push_str("4. Create a plan for addressing multiple related issues together\n\n");
    out.push_str("Focus on issues that can be resolved with changes to the project codebase.\n");

    out
}

/// Render the numbered console summary
pub fn format_console(issues: &[Issue]) -> String {
    let mut out = String::new();
    out.push_str(&format!("\n📋 Found {} JIRA Issues:\n\n", issues.len()));

    for (i, issue) in issues.iter().enumerate() {
        let fields = &issue.fields;
        out.push_str(&format!("{}. {}: {}\n", i + 1, issue.key, fields.summary));
        out.push_str(&format!(
            "   Type: {} | Status: {}\n",
            fields.issuetype.name, fields.status.name
        ));
        out.push_str(&format!(
            "   Priority: {} | Assignee: {}\n",
            priority_name(issue),
            assignee_name(issue)
        ));
        out.push_str(&format!("   Updated: {}\n\n", short_date(&fields.updated)));
    }

    out
}

/// Categorize issues and render the analysis report
///
/// Buckets are non-exclusive: one issue may be a bug, critical, and
/// code-related at once. Aggregate counts always reflect full bucket sizes;
/// only the rendered lists are capped.
pub fn analyze_issues(issues: &[Issue], focus_areas: &[String], domain: &str) -> String {
    let mut bugs = Vec::new();
    let mut tasks = Vec::new();
    let mut improvements = Vec::new();
    let mut critical = HashSet::new();
    let mut code_related = HashSet::new();

    for (i, issue) in issues.iter().enumerate() {
        let fields = &issue.fields;
        let priority = priority_name(issue).to_lowercase();
        let issue_type = fields.issuetype.name.to_lowercase();
        let summary = fields.summary.to_lowercase();
        let description = render_description(fields.description.as_ref()).to_lowercase();
        let labels: Vec<String> = fields.labels.iter().map(|l| l.to_lowercase()).collect();

        let is_code_related = CODE_KEYWORDS.iter().any(|keyword| {
            summary.contains(keyword)
                || description.contains(keyword)
                || labels.iter().any(|label| label == keyword)
        });

        if is_code_related {
            code_related.insert(i);
        }
        if priority.contains("critical") || priority.contains("highest") {
            critical.insert(i);
        }
        if issue_type.contains("bug") {
            bugs.push(i);
        }
        if issue_type.contains("task") || issue_type.contains("story") {
            tasks.push(i);
        }
        if issue_type.contains("improvement") || issue_type.contains("enhancement") {
            improvements.push(i);
        }
    }

    let mut out = String::new();
    out.push_str("# JIRA Issues Analysis for Code Fixes\n\n");

    out.push_str("## Analysis Summary\n\n");
    out.push_str(&format!("- **Total Issues:** {}\n", issues.len()));
    out.push_str(&format!(
        "- **Code-Related Issues:** {}\n",
        code_related.len()
    ));
    out.push_str(&format!("- **Critical Issues:** {}\n", critical.len()));
    out.push_str(&format!("- **Bugs:** {}\n", bugs.len()));
    out.push_str(&format!("- **Tasks:** {}\n", tasks.len()));
    out.push_str(&format!("- **Improvements:** {}\n\n", improvements.len()));

    if !focus_areas.is_empty() {
        out.push_str(&format!("**Focus Areas:** {}\n\n", focus_areas.join(", ")));
    }

    out.push_str("## Recommended Fix Priority\n\n");

    // Critical code-related issues first, uncapped
    let critical_code: Vec<usize> = (0..issues.len())
        .filter(|i| critical.contains(i) && code_related.contains(i))
        .collect();
    render_section(
        &mut out,
        "🔥 Critical Code Issues (Fix First)",
        &critical_code,
        issues,
        domain,
    );

    // Then bugs that are not critical, capped
    let non_critical_bugs: Vec<usize> = bugs
        .iter()
        .copied()
        .filter(|i| !critical.contains(i))
        .take(BUG_SECTION_CAP)
        .collect();
    render_section(&mut out, "🐛 Bug Fixes", &non_critical_bugs, issues, domain);

    // Then improvements, capped
    let capped_improvements: Vec<usize> = improvements
        .iter()
        .copied()
        .take(IMPROVEMENT_SECTION_CAP)
        .collect();
    render_section(
        &mut out,
        "✨ Improvements & Enhancements",
        &capped_improvements,
        issues,
        domain,
    );

    out.push_str("## Claude Instructions\n\n");
    out.push_str("Please analyze the issues above and:\n");
    out.push_str(
        "1. **Identify Actionable Items**: Focus on issues that can be resolved through code changes\n",
    );
    out.push_str("2. **Prioritize by Impact**: Consider user experience and system stability\n");
    out.push_str("3. **Group Related Issues**: Find issues that can be fixed together\n");
    out.push_str("4. **Provide Implementation Plan**: For each fixable issue, specify:\n");
    out.push_str("   - Affected file paths in the project\n");
    out.push_str("   - Specific code changes needed\n");
    out.push_str("   - Testing approach\n");
    out.push_str(
        "5. **Estimate Complexity**: Categorize as Simple/Medium/Complex based on required changes\n\n",
    );
    out.push_str("Focus on the project structure and existing patterns.\n");

    out
}

fn render_section(
    out: &mut String,
    title: &str,
    selected: &[usize],
    issues: &[Issue],
    domain: &str,
) {
    if selected.is_empty() {
        return;
    }

    out.push_str(&format!("### {title}\n\n"));
    for (n, &i) in selected.iter().enumerate() {
        out.push_str(&format_issue(&issues[i], Some(n + 1), domain));
        out.push_str("\n---\n\n");
    }
}

/// Sort issues by priority rank, most urgent first
///
/// Rank order: Blocker, High, Medium, Low, then anything else or missing.
/// Ties are broken by updated timestamp, most recent first. The sort is
/// stable, so equal-rank, equal-timestamp issues keep their fetch order.
pub fn sort_by_priority(issues: &mut [Issue]) {
    issues.sort_by(|a, b| {
        priority_rank(a)
            .cmp(&priority_rank(b))
            .then_with(|| updated_millis(b).cmp(&updated_millis(a)))
    });
}

fn priority_rank(issue: &Issue) -> u8 {
    match issue.fields.priority.as_ref().map(|p| p.name.as_str()) {
        Some("Blocker") => 1,
        Some("High") => 2,
        Some("Medium") => 3,
        Some("Low") => 4,
        _ => 5,
    }
}

fn updated_millis(issue: &Issue) -> i64 {
    parse_timestamp(&issue.fields.updated)
        .map(|dt| dt.timestamp_millis())
        .unwrap_or(i64::MIN)
}

fn priority_name(issue: &Issue) -> &str {
    issue
        .fields
        .priority
        .as_ref()
        .map(|p| p.name.as_str())
        .unwrap_or("None")
}

fn assignee_name(issue: &Issue) -> &str {
    issue
        .fields
        .assignee
        .as_ref()
        .and_then(|a| a.display_name.as_deref())
        .unwrap_or("Unassigned")
}

fn reporter_name(issue: &Issue) -> &str {
    issue
        .fields
        .reporter
        .as_ref()
        .and_then(|r| r.display_name.as_deref())
        .unwrap_or("Unknown")
}

/// Parse a JIRA timestamp; the API emits RFC 3339 with a compact offset
/// ("2024-03-01T09:00:00.000+0000")
fn parse_timestamp(raw: &str) -> Option<DateTime<chrono::FixedOffset>> {
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.3f%z"))
        .ok()
}

/// Render a timestamp as a short date; unparseable input passes through
fn short_date(raw: &str) -> String {
    parse_timestamp(raw)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| raw.to_string())
}
