//! Documentation dump
//!
//! Writes the output classes and output members as `classes.json` and
//! `pmes.json`. Before writing, event members get a "Parameters:" block
//! describing the sender and every documented member of their options
//! interface.

use crate::error::{GenerateError, Result};
use crate::model::{EntityModel, Member};
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Placeholder sentence replaced by the generated parameter list
pub const EVENT_PARAMETERS_PLACEHOLDER: &str =
    "For information on event handler parameters, refer to descriptions within the interface.";
const SURVEY_SENDER_DESCRIPTION: &str = "A survey instance that raised the event.";
const CREATOR_SENDER_DESCRIPTION: &str = "A Survey Creator instance that raised the event.";

pub const CLASSES_FILE: &str = "classes.json";
pub const PMES_FILE: &str = "pmes.json";

/// Append (or substitute) the parameter description of every event member
pub fn update_events_documentation(model: &mut EntityModel) {
    let refs = model.output_pme_refs().to_vec();
    for at in refs {
        let member = model.member(at);
        let (Some(sender), Some(options)) = (
            member.event_sender_name.as_deref(),
            member.event_options_name.as_deref(),
        ) else {
            continue;
        };
        if options == "__type" || member.doc.text.contains("- `sender`:") {
            continue;
        }

        let mut lines = vec![String::new(), "Parameters:".to_string(), String::new()];
        sender_lines(sender, &mut lines);
        option_lines(model, options, &mut lines);

        let member = model.member_mut(at);
        let text = &mut member.doc.text;
        if text.contains(EVENT_PARAMETERS_PLACEHOLDER) {
            *text = text.replacen(EVENT_PARAMETERS_PLACEHOLDER, &lines.join("\n"), 1);
        } else {
            lines.insert(0, String::new());
            text.push_str(&lines.join("\n"));
        }
        debug!("Documented parameters of event {}", member.name);
    }
}

fn sender_lines(sender: &str, lines: &mut Vec<String>) {
    let description = if sender.contains("Creator") {
        Some(CREATOR_SENDER_DESCRIPTION)
    } else if sender == "SurveyModel" {
        Some(SURVEY_SENDER_DESCRIPTION)
    } else {
        None
    };
    lines.push(format!(
        " - `sender`: `{}`{}",
        sender,
        if description.is_some() { "  " } else { "" }
    ));
    if let Some(description) = description {
        lines.push(description.to_string());
    }
}

fn option_lines(model: &EntityModel, options: &str, lines: &mut Vec<String>) {
    let mut members = IndexMap::new();
    let mut visited = HashSet::new();
    collect_option_members(model, options, &mut members, &mut visited);
    for member in members.values() {
        let doc = member.doc.text.as_str();
        if is_hidden_by_doc(doc) {
            continue;
        }
        lines.push(format!("- `options.{}`: `{}`  ", member.name, member.type_text));
        lines.push(doc.to_string());
    }
}

/// Members of an options interface, inherited ones first
fn collect_option_members<'m>(
    model: &'m EntityModel,
    name: &str,
    members: &mut IndexMap<&'m str, &'m Member>,
    visited: &mut HashSet<String>,
) {
    if !visited.insert(name.to_string()) {
        return;
    }
    let Some(entity) = model.get(name) else {
        return;
    };
    for parent in &entity.implements {
        collect_option_members(model, parent, members, visited);
    }
    for member in &entity.members {
        members.insert(member.name.as_str(), member);
    }
}

fn is_hidden_by_doc(doc: &str) -> bool {
    if doc.is_empty() {
        return true;
    }
    let doc = doc.to_lowercase();
    doc.starts_with("obsolete") || doc.starts_with("for internal use")
}

/// Write `classes.json` and `pmes.json` into `dir`
pub fn write_docs(model: &EntityModel, dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir).map_err(|source| GenerateError::Write {
        path: dir.to_path_buf(),
        source,
    })?;
    let classes: Vec<_> = model.output_classes().collect();
    let pmes: Vec<_> = model.output_pmes().collect();

    let classes_path = dir.join(CLASSES_FILE);
    write_json(&classes_path, &classes)?;
    let pmes_path = dir.join(PMES_FILE);
    write_json(&pmes_path, &pmes)?;
    info!(
        "Wrote {} classes and {} members to {}",
        classes.len(),
        pmes.len(),
        dir.display()
    );
    Ok(vec![classes_path, pmes_path])
}

/// Pretty-print with four-space indentation
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let mut buffer = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    value.serialize(&mut serializer)?;
    std::fs::write(path, buffer).map_err(|source| GenerateError::Write {
        path: path.to_path_buf(),
        source,
    })
}
