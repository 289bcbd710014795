//! Pipeline driver for the CLI entry modes
//!
//! One driver covers both entry points; only the output strategy differs.
//! Steps: validate configuration, build the filter and JQL, test the
//! connection, search, then either persist markdown + raw-JSON artifacts or
//! print a priority-sorted report to stdout. Zero results are a success,
//! not an error.

use crate::config::JiraConfig;
use crate::error::{JiraFetchError, JiraFetchResult};
use crate::formatter::{
    format_console, format_report, format_stats, sort_by_priority, summary_stats, IssueStats,
};
use crate::jira_client::{ConnectionStatus, JiraClient, SearchResults};
use crate::jql::{build_jql_ordered, IssueFilter, DEFAULT_ORDER, UPDATED_ORDER};
use chrono::Utc;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Output strategy selecting the entry mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Fetch-and-save: console summary, statistics, artifacts on disk
    SaveToFile,
    /// Priority-sorted report to stdout, no file output
    PrintSorted,
}

/// Shape of the raw JSON artifact written next to the report
#[derive(Serialize)]
struct RawSnapshot<'a> {
    #[serde(rename = "searchResults")]
    search_results: &'a SearchResults,
    stats: &'a IssueStats,
}

/// Run the fetch pipeline in the given output mode
pub async fn run_pipeline(config: &JiraConfig, mode: OutputMode) -> JiraFetchResult<()> {
    // Fail fast before any network call; server-mode operations take the
    // project key as an argument instead.
    config.require_project_key()?;

    println!("🔌 Connecting to JIRA...");
    let client = JiraClient::new(config)?;

    match client.test_connection().await {
        ConnectionStatus::Connected(user) => {
            println!("✓ JIRA connection successful!");
            println!(
                "Connected as: {} ({})",
                user.display_name,
                user.email_address.as_deref().unwrap_or("N/A")
            );
        }
        ConnectionStatus::Failed { error } => {
            return Err(JiraFetchError::connection(error));
        }
    }

    let filter = IssueFilter::from_config(config);
    let order = match mode {
        OutputMode::SaveToFile => DEFAULT_ORDER,
        // sorting happens in memory afterwards
        OutputMode::PrintSorted => UPDATED_ORDER,
    };
    let jql = build_jql_ordered(&filter, order);

    println!("\n🔍 Searching for issues...");
    println!("JQL: {jql}");
    println!("Max Results: {}\n", config.max_results);

    let results = client.search_issues(&jql, config.max_results).await?;

    if results.issues.is_empty() {
        println!("⚠️  No issues found matching the criteria");
        return Ok(());
    }

    match mode {
        OutputMode::SaveToFile => {
            print!("{}", format_console(&results.issues));

            let stats = summary_stats(&results.issues);
            print!("{}", format_stats(&stats));

            println!("\n📝 Formatting issues for Claude Code...");
            let report = format_report(&results.issues, client.domain());

            let (report_path, raw_path) =
                write_artifacts(&config.output_dir, &results, &stats, &report)?;

            println!("✅ Issues saved to: {}", report_path.display());
            println!("\n🤖 Next steps:");
            println!("1. Open the generated markdown file");
            println!("2. Copy the content to Claude Code");
            println!("3. Ask Claude to analyze and fix the issues");
            println!("\n📄 Raw data saved to: {}", raw_path.display());
        }
        OutputMode::PrintSorted => {
            let mut issues = results.issues;
            sort_by_priority(&mut issues);

            println!("{}", "─".repeat(80));
            println!("{}", format_report(&issues, client.domain()));
        }
    }

    Ok(())
}

/// Write the report and the raw JSON snapshot into the output directory
///
/// The directory is created when absent. Filenames carry a second-granularity
/// UTC timestamp; concurrent invocations may race on them.
pub fn write_artifacts(
    output_dir: &Path,
    results: &SearchResults,
    stats: &IssueStats,
    report: &str,
) -> JiraFetchResult<(PathBuf, PathBuf)> {
    let timestamp = Utc::now().format("%Y-%m-%dT%H-%M-%S").to_string();
    write_artifacts_with_timestamp(output_dir, &timestamp, results, stats, report)
}

fn write_artifacts_with_timestamp(
    output_dir: &Path,
    timestamp: &str,
    results: &SearchResults,
    stats: &IssueStats,
    report: &str,
) -> JiraFetchResult<(PathBuf, PathBuf)> {
    fs::create_dir_all(output_dir)?;

    let report_path = output_dir.join(format!("jira-issues-{timestamp}.md"));
    fs::write(&report_path, report)?;

    let snapshot = RawSnapshot {
        search_results: results,
        stats,
    };
    let raw_path = output_dir.join(format!("jira-issues-raw-{timestamp}.json"));
    fs::write(&raw_path, serde_json::to_string_pretty(&snapshot)?)?;

    info!(
        "Wrote artifacts {} and {}",
        report_path.display(),
        raw_path.display()
    );
    Ok((report_path, raw_path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_results() -> SearchResults {
        serde_json::from_value(json!({
            "total": 1,
            "issues": [{
                "key": "TLW-1",
                "fields": {
                    "summary": "One",
                    "status": {"name": "Open"},
                    "issuetype": {"name": "Bug"}
                }
            }]
        }))
        .unwrap()
    }

    #[test]
    fn artifacts_land_in_created_directory() {
        let dir = tempfile::tempdir().unwrap();
        let output_dir = dir.path().join("nested").join("output");

        let results = sample_results();
        let stats = summary_stats(&results.issues);
        let report = format_report(&results.issues, "example.atlassian.net");

        let (report_path, raw_path) = write_artifacts_with_timestamp(
            &output_dir,
            "2024-03-02T10-00-00",
            &results,
            &stats,
            &report,
        )
        .unwrap();

        assert_eq!(
            report_path.file_name().unwrap(),
            "jira-issues-2024-03-02T10-00-00.md"
        );
        assert_eq!(
            raw_path.file_name().unwrap(),
            "jira-issues-raw-2024-03-02T10-00-00.json"
        );
        assert_eq!(fs::read_to_string(&report_path).unwrap(), report);

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&raw_path).unwrap()).unwrap();
        assert_eq!(raw["searchResults"]["total"], 1);
        assert_eq!(raw["stats"]["total"], 1);
        assert_eq!(raw["searchResults"]["issues"][0]["key"], "TLW-1");
    }
}
