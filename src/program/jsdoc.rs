//! Doc comment lookup and tag parsing
//!
//! A declaration is documented by the `/** ... */` block that immediately
//! precedes it (decorators in between are skipped). Only the tags the
//! documentation site renders are kept: `@title`, `@description`, `@see`
//! and `@returns`.

use super::checker::Checker;
use crate::model::Documentation;
use tree_sitter::Node;

/// Wrapper statements whose leading comment belongs to the inner declaration
const COMMENT_ANCHORS: &[&str] = &[
    "export_statement",
    "ambient_declaration",
    "lexical_declaration",
    "variable_declaration",
    "expression_statement",
];

/// Documentation of a declaration node
pub fn documentation_for(checker: &Checker, node: Node) -> Documentation {
    doc_comment_node(node)
        .map(|comment| parse_jsdoc(checker.text(comment)))
        .unwrap_or_default()
}

/// Find the JSDoc block attached to `node`
fn doc_comment_node(node: Node) -> Option<Node> {
    let mut anchor = node;
    while let Some(parent) = anchor.parent() {
        if !COMMENT_ANCHORS.contains(&parent.kind()) {
            break;
        }
        // Only the first declarator of a statement inherits its comment
        if matches!(parent.kind(), "lexical_declaration" | "variable_declaration")
            && parent.named_child(0).map(|c| c.id()) != Some(anchor.id())
        {
            break;
        }
        anchor = parent;
    }

    let mut current = anchor.prev_named_sibling();
    while let Some(sibling) = current {
        match sibling.kind() {
            "decorator" => current = sibling.prev_named_sibling(),
            "comment" => return Some(sibling),
            _ => return None,
        }
    }
    None
}

/// Split a `/** */` block into text and tags
pub fn parse_jsdoc(comment: &str) -> Documentation {
    let trimmed = comment.trim();
    let Some(body) = trimmed.strip_prefix("/**") else {
        return Documentation::default();
    };
    let body = body.strip_suffix("*/").unwrap_or(body);

    let mut text_lines: Vec<&str> = Vec::new();
    let mut tags: Vec<(String, Vec<&str>)> = Vec::new();

    for raw in body.lines() {
        let line = raw.trim_start();
        let line = line.strip_prefix('*').unwrap_or(line);
        let line = line.strip_prefix(' ').unwrap_or(line).trim_end();

        if let Some(tag) = line.trim_start().strip_prefix('@') {
            let (name, rest) = tag
                .split_once(char::is_whitespace)
                .unwrap_or((tag, ""));
            tags.push((name.to_string(), vec![rest.trim()]));
        } else if let Some((_, lines)) = tags.last_mut() {
            lines.push(line);
        } else {
            text_lines.push(line);
        }
    }

    let mut doc = Documentation {
        text: text_lines.join("\n").trim().to_string(),
        ..Documentation::default()
    };
    for (name, lines) in tags {
        let value = lines.join("\n").trim().to_string();
        match name.as_str() {
            "title" => doc.title = Some(value),
            "description" => doc.description = Some(value),
            "see" => doc.see.push(value),
            "returns" | "return" => doc.returns = Some(value),
            _ => {}
        }
    }
    doc
}
