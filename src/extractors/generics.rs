// Generic parameter lists
//
// Declared lists render as `T`, `T extends C` or `T extends C = D`.
// Argument lists render each argument by its type name.

use super::FileContext;
use crate::program::checker::type_arguments;
use tree_sitter::Node;

/// Declared type parameters of a class, interface or function
pub(super) fn declared_type_parameters(cx: &FileContext, node: Node) -> Option<Vec<String>> {
    let list = node.child_by_field_name("type_parameters")?;
    let params: Vec<String> = list
        .named_children(&mut list.walk())
        .filter(|p| p.kind() == "type_parameter")
        .filter_map(|p| declared_type_parameter(cx, p))
        .collect();
    (!params.is_empty()).then_some(params)
}

fn declared_type_parameter(cx: &FileContext, param: Node) -> Option<String> {
    let mut text = cx.checker.field_text(param, "name")?.to_string();
    if let Some(constraint) = param
        .child_by_field_name("constraint")
        .and_then(|c| c.named_child(0))
    {
        text.push_str(" extends ");
        text.push_str(&cx.checker.type_argument_name(constraint));
    }
    if let Some(default) = param
        .child_by_field_name("value")
        .and_then(|d| d.named_child(0))
    {
        text.push_str(" = ");
        text.push_str(&cx.checker.type_argument_name(default));
    }
    Some(text)
}

/// Argument names of a generic reference (`Base<A, B>` gives `[A, B]`)
pub(super) fn argument_names(cx: &FileContext, node: Node) -> Vec<String> {
    type_arguments(node)
        .into_iter()
        .map(|arg| cx.checker.type_argument_name(arg))
        .collect()
}

/// Generic arguments of a function's return type annotation
pub(super) fn return_type_generics(cx: &FileContext, node: Node) -> Vec<String> {
    match cx.checker.annotation_type_node(node, "return_type") {
        Some(type_node) if type_node.kind() == "generic_type" => argument_names(cx, type_node),
        _ => Vec::new(),
    }
}
