// Variable statements
//
// Only the first declarator of a statement is considered. Object-literal
// initializers contribute their properties as (possibly nested) members; in
// doc mode the variable is listed like a class whose first-level properties
// are public settable fields.

use super::{DeclarationExtractor, FileContext};
use crate::model::{Entity, EntityKind, Member, PmeType};
use crate::program::checker::{function_type_text, unquote};
use crate::program::jsdoc::documentation_for;
use tree_sitter::Node;

pub(super) fn visit_variable_statement(
    extractor: &mut DeclarationExtractor,
    cx: &FileContext,
    node: Node,
) {
    let Some(declarator) = node
        .named_children(&mut node.walk())
        .find(|c| c.kind() == "variable_declarator")
    else {
        return;
    };
    let is_identifier = declarator
        .child_by_field_name("name")
        .is_some_and(|n| n.kind() == "identifier");
    if !is_identifier {
        return;
    }
    let Some(name) = cx.checker.name_of(declarator) else {
        return;
    };
    let doc = documentation_for(&cx.checker, declarator);
    if !extractor.options().generate_dts && doc.is_empty() {
        return;
    }

    let mut entity = Entity::new(name.clone(), EntityKind::Variable);
    entity.doc = doc;
    entity.type_text = cx.checker.declared_type(declarator);
    let members = declarator
        .child_by_field_name("value")
        .filter(|v| v.kind() == "object")
        .map(|object| object_members(cx, object))
        .unwrap_or_default();

    let generate_docs = extractor.options().generate_docs;
    if generate_docs {
        entity.all_types = vec![name.clone()];
        entity.is_public = true;
    }
    let model = extractor.model_mut();
    let index = model.insert(entity);
    if generate_docs {
        model.record_output_class(index);
    }

    for mut member in members {
        if generate_docs {
            member.class_name = Some(name.clone());
            member.pme_type = PmeType::Property;
            member.is_public = true;
            member.is_field = true;
            member.has_set = true;
        }
        let at = model.push_member(index, member);
        if generate_docs {
            model.record_output_pme(at);
        }
    }
}

/// Properties of an object literal, recursing into nested literals
fn object_members(cx: &FileContext, object: Node) -> Vec<Member> {
    let mut result = Vec::new();
    for child in object.named_children(&mut object.walk()) {
        let mut member = match child.kind() {
            "pair" => {
                let Some(key) = child.child_by_field_name("key") else {
                    continue;
                };
                if key.kind() == "computed_property_name" {
                    continue;
                }
                let mut member = Member::new(unquote(cx.checker.text(key)), PmeType::Property);
                if let Some(value) = child.child_by_field_name("value") {
                    member.type_text = cx.checker.expression_type(value);
                    if value.kind() == "object" {
                        member.members = object_members(cx, value);
                    }
                } else {
                    member.type_text = "any".to_string();
                }
                member
            }
            "method_definition" => {
                let Some(name) = cx.checker.name_of(child) else {
                    continue;
                };
                let mut member = Member::new(name, PmeType::Property);
                member.type_text =
                    function_type_text(&cx.checker.parameters(child), &cx.checker.return_type(child));
                member
            }
            "shorthand_property_identifier" => {
                let mut member = Member::new(cx.checker.text(child), PmeType::Property);
                member.type_text = "any".to_string();
                member
            }
            _ => continue,
        };

        member.doc = documentation_for(&cx.checker, child);
        if !member.name.is_empty() {
            result.push(member);
        }
    }
    result
}
