// Decorator lookups and naming heuristics shared by the extractors

use crate::program::checker::{unquote, Checker};
use tree_sitter::Node;

/// `get` / `set` keyword of an accessor declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Accessor {
    Get,
    Set,
}

pub(super) fn accessor_kind(node: Node) -> Option<Accessor> {
    if node.kind() != "method_definition" {
        return None;
    }
    node.children(&mut node.walk())
        .filter(|c| !c.is_named())
        .find_map(|c| match c.kind() {
            "get" => Some(Accessor::Get),
            "set" => Some(Accessor::Set),
            _ => None,
        })
}

/// Decorators applied to a class member
///
/// Field decorators are children of the field; method decorators are the
/// preceding siblings in the class body.
pub(super) fn decorators(node: Node) -> Vec<Node> {
    let mut result: Vec<Node> = node
        .children(&mut node.walk())
        .filter(|c| c.kind() == "decorator")
        .collect();

    let mut previous = node.prev_named_sibling();
    while let Some(sibling) = previous {
        match sibling.kind() {
            "decorator" => result.push(sibling),
            "comment" => {}
            _ => break,
        }
        previous = sibling.prev_named_sibling();
    }
    result
}

/// `@property({ localizable: ... })`
pub(super) fn is_localizable(checker: &Checker, node: Node) -> bool {
    decorators(node).into_iter().any(|decorator| {
        let Some(call) = decorator
            .named_children(&mut decorator.walk())
            .find(|c| c.kind() == "call_expression")
        else {
            return false;
        };
        if checker.field_text(call, "function") != Some("property") {
            return false;
        }
        let Some(arguments) = call.child_by_field_name("arguments") else {
            return false;
        };
        let found = arguments
            .named_children(&mut arguments.walk())
            .filter(|arg| arg.kind() == "object")
            .any(|object| has_object_key(checker, object, "localizable"));
        found
    })
}

fn has_object_key(checker: &Checker, object: Node, key: &str) -> bool {
    object.named_children(&mut object.walk()).any(|prop| match prop.kind() {
        "pair" => checker
            .field_text(prop, "key")
            .is_some_and(|k| unquote(k) == key),
        "shorthand_property_identifier" => checker.text(prop) == key,
        _ => false,
    })
}

/// Interfaces describing event options are kept even when undocumented
pub(super) fn is_options_interface(name: &str) -> bool {
    name.contains("Options") || name.contains("Event")
}

pub(super) fn is_event_type(type_text: &str) -> bool {
    type_text.starts_with("Event") || type_text.starts_with("CreatorEvent")
}

/// Option interfaces named `IOn...` never reach the documentation output
pub(super) fn is_hidden_options_class(name: &str) -> bool {
    name.starts_with("IOn")
}
