//! Tool implementations for the MCP server mode
//!
//! Each tool republishes a slice of the fetch pipeline as a named operation
//! with a declared input schema.

pub mod analyze_issues;
pub mod fetch_issues;
pub mod get_issue;

pub use analyze_issues::*;
pub use fetch_issues::*;
pub use get_issue::*;
