//! Atlassian Document Format flattening
//!
//! JIRA Cloud returns descriptions and comment bodies either as a plain
//! string (API v2) or as an ADF node tree (API v3). The renderer walks the
//! tree depth-first, left to right, and emits plain text with markdown block
//! separators. Unrecognized node types recurse into their children when
//! present, otherwise emit their own text, so new ADF node kinds degrade
//! gracefully instead of failing.

use serde::{Deserialize, Serialize};

/// Sentinel for an absent description or a tree without content
pub const NO_DESCRIPTION: &str = "No description provided.";

/// Sentinel for a tree whose flattened text is empty
pub const NO_DESCRIPTION_CONTENT: &str = "No description content found.";

/// A description or comment body: plain text or an ADF tree
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Description {
    Text(String),
    Doc(Node),
}

/// One node of the ADF tree
///
/// `content` is kept optional rather than defaulted: a node with no content
/// key renders the "no description" sentinel, while an empty array renders
/// the "no content" sentinel.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Node {
    #[serde(rename = "type", default)]
    pub node_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Vec<Node>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attrs: Option<Attrs>,
}

/// Node attributes; only the heading level matters for rendering
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Attrs {
    #[serde(default)]
    pub level: Option<u8>,
}

/// Flatten a description into readable text
///
/// Plain strings are returned unchanged. Absent documents yield
/// [`NO_DESCRIPTION`]; trees that flatten to whitespace yield
/// [`NO_DESCRIPTION_CONTENT`]. Never fails, whatever the tree shape.
pub fn render_description(description: Option<&Description>) -> String {
    match description {
        None => NO_DESCRIPTION.to_string(),
        Some(Description::Text(text)) => text.clone(),
        Some(Description::Doc(doc)) => {
            let Some(content) = doc.content.as_deref() else {
                return NO_DESCRIPTION.to_string();
            };
            let text = render_nodes(content);
            let trimmed = text.trim();
            if trimmed.is_empty() {
                NO_DESCRIPTION_CONTENT.to_string()
            } else {
                trimmed.to_string()
            }
        }
    }
}

/// Recursive descent over a node list, returning the accumulated text
fn render_nodes(nodes: &[Node]) -> String {
    let mut text = String::new();

    for node in nodes {
        match node.node_type.as_str() {
            "paragraph" => {
                text.push_str(&inline_text(node));
                text.push_str("\n\n");
            }
            "codeBlock" => {
                text.push_str("```\n");
                text.push_str(&inline_text(node));
                text.push_str("\n```\n\n");
            }
            "bulletList" | "orderedList" => {
                for item in node.content.as_deref().unwrap_or(&[]) {
                    text.push_str("- ");
                    for paragraph in item.content.as_deref().unwrap_or(&[]) {
                        text.push_str(&inline_text(paragraph));
                    }
                    text.push('\n');
                }
                text.push('\n');
            }
            "heading" => {
                let level = node
                    .attrs
                    .as_ref()
                    .and_then(|attrs| attrs.level)
                    .unwrap_or(1);
                text.push_str(&"#".repeat(level as usize));
                text.push(' ');
                text.push_str(&inline_text(node));
                text.push_str("\n\n");
            }
            _ => {
                // Unknown node kinds: recurse into children, else emit own text
                match node.content.as_deref() {
                    Some(children) => text.push_str(&render_nodes(children)),
                    None => {
                        if let Some(own_text) = &node.text {
                            text.push_str(own_text);
                        }
                    }
                }
            }
        }
    }

    text
}

/// Concatenate the text of a node's inline `text` children
fn inline_text(node: &Node) -> String {
    node.content
        .as_deref()
        .unwrap_or(&[])
        .iter()
        .filter(|inline| inline.node_type == "text")
        .filter_map(|inline| inline.text.as_deref())
        .collect()
}
