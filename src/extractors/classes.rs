//! Classes and interfaces
//!
//! A class is kept in bundling mode or when it carries a doc comment.
//! Interfaces are additionally kept when their name marks them as event
//! option types. Heritage clauses give the base type (classes only, first
//! clause, first type) and the implemented list (every heritage type).

use super::{generics, helpers, members, DeclarationExtractor, FileContext};
use crate::model::{Entity, EntityKind, EntityModel, Member, PmeType, Signature};
use crate::program::checker::ModifierFlags;
use crate::program::jsdoc::documentation_for;
use std::collections::HashSet;
use tree_sitter::Node;

/// One `extends` / `implements` reference with its generic arguments
struct HeritageType {
    name: String,
    arguments: Vec<String>,
}

pub(super) fn visit_class(extractor: &mut DeclarationExtractor, cx: &FileContext, node: Node) {
    let Some(name) = cx.checker.name_of(node) else {
        return;
    };
    let doc = documentation_for(&cx.checker, node);
    if !extractor.options().generate_dts && doc.is_empty() {
        return;
    }

    let heritage = class_heritage(cx, node);
    let body = node.child_by_field_name("body");
    let constructors = body
        .map(|body| constructor_signatures(cx, body, &name))
        .unwrap_or_default();

    let mut entity = Entity::new(name.clone(), EntityKind::Class { constructors: Vec::new() });
    entity.doc = doc;
    entity.type_text = format!("typeof {}", name);
    entity.is_abstract = cx
        .checker
        .declaration_modifier_flags(node)
        .contains(ModifierFlags::ABSTRACT);
    entity.base_type = heritage.first().map(|h| h.name.clone());
    entity.implements = heritage.iter().map(|h| h.name.clone()).collect();
    // Public constructor parameters become fields ahead of the declared members
    for signature in &constructors {
        for param in signature.parameters.iter().filter(|p| p.is_public) {
            let mut field = Member::new(param.name.clone(), PmeType::Property);
            field.is_field = true;
            field.is_public = true;
            field.type_text = param.type_text.clone();
            entity.members.push(field);
        }
    }
    let has_constructors = !constructors.is_empty();
    entity.kind = EntityKind::Class { constructors };

    let index = register(extractor, cx, node, entity, &heritage);
    if !has_constructors {
        extractor.constructorless.push(index);
    }
    if let Some(body) = body {
        visit_body(extractor, cx, body, index);
    }
}

pub(super) fn visit_interface(extractor: &mut DeclarationExtractor, cx: &FileContext, node: Node) {
    let Some(name) = cx.checker.name_of(node) else {
        return;
    };
    let doc = documentation_for(&cx.checker, node);
    if !extractor.options().generate_dts && doc.is_empty() && !helpers::is_options_interface(&name)
    {
        return;
    }

    let heritage = interface_heritage(cx, node);
    let mut entity = Entity::new(name.clone(), EntityKind::Interface);
    entity.doc = doc;
    entity.type_text = name;
    entity.implements = heritage.iter().map(|h| h.name.clone()).collect();

    let index = register(extractor, cx, node, entity, &heritage);
    if let Some(body) = node.child_by_field_name("body") {
        visit_body(extractor, cx, body, index);
    }
}

/// Insert the entity and record its generic parameter lists
fn register(
    extractor: &mut DeclarationExtractor,
    cx: &FileContext,
    node: Node,
    entity: Entity,
    heritage: &[HeritageType],
) -> usize {
    let name = entity.name.clone();
    let model = extractor.model_mut();
    if let Some(declared) = generics::declared_type_parameters(cx, node) {
        model.generics.set_declared(&name, declared);
    }
    for parent in heritage.iter().filter(|h| !h.arguments.is_empty()) {
        model
            .generics
            .set_arguments(&parent.name, &name, parent.arguments.clone());
    }

    let index = model.insert(entity);
    if !helpers::is_hidden_options_class(&name) {
        model.record_output_class(index);
    }
    index
}

fn visit_body(extractor: &mut DeclarationExtractor, cx: &FileContext, body: Node, index: usize) {
    let json_name = members::visit_members(extractor, cx, body, index);
    let entity = extractor.model_mut().entity_mut(index);
    if helpers::is_hidden_options_class(&entity.name) {
        return;
    }
    if let Some(json_name) = json_name {
        for member in &mut entity.members {
            member.json_name = Some(json_name.clone());
        }
        entity.json_name = Some(json_name);
    }
}

fn class_heritage(cx: &FileContext, node: Node) -> Vec<HeritageType> {
    let Some(heritage) = node
        .children(&mut node.walk())
        .find(|c| c.kind() == "class_heritage")
    else {
        return Vec::new();
    };

    let mut result: Vec<HeritageType> = Vec::new();
    for clause in heritage.named_children(&mut heritage.walk()) {
        match clause.kind() {
            "extends_clause" => {
                // values and their type arguments are interleaved siblings
                for child in clause.named_children(&mut clause.walk()) {
                    if child.kind() == "type_arguments" {
                        if let Some(last) = result.last_mut() {
                            last.arguments = child
                                .named_children(&mut child.walk())
                                .map(|arg| cx.checker.type_argument_name(arg))
                                .collect();
                        }
                    } else {
                        result.push(HeritageType {
                            name: cx.checker.heritage_name(child),
                            arguments: Vec::new(),
                        });
                    }
                }
            }
            "implements_clause" => result.extend(type_list(cx, clause)),
            _ => {}
        }
    }
    result.retain(|h| !h.name.is_empty());
    result
}

fn interface_heritage(cx: &FileContext, node: Node) -> Vec<HeritageType> {
    node.children(&mut node.walk())
        .filter(|c| c.kind() == "extends_type_clause")
        .flat_map(|clause| type_list(cx, clause))
        .filter(|h| !h.name.is_empty())
        .collect()
}

fn type_list(cx: &FileContext, clause: Node) -> Vec<HeritageType> {
    clause
        .named_children(&mut clause.walk())
        .map(|type_node| HeritageType {
            name: cx.checker.heritage_name(type_node),
            arguments: generics::argument_names(cx, type_node),
        })
        .collect()
}

/// Construct signatures declared by the class itself
///
/// Overload signatures win over the implementation, matching what a
/// checker reports for an overloaded constructor.
fn constructor_signatures(cx: &FileContext, body: Node, class_name: &str) -> Vec<Signature> {
    let declarations: Vec<Node> = body
        .named_children(&mut body.walk())
        .filter(|n| matches!(n.kind(), "method_definition" | "method_signature"))
        .filter(|n| cx.checker.name_of(*n).as_deref() == Some("constructor"))
        .collect();

    let overloads: Vec<Node> = declarations
        .iter()
        .copied()
        .filter(|n| n.kind() == "method_signature")
        .collect();
    let chosen = if overloads.is_empty() {
        declarations
    } else {
        overloads
    };

    chosen
        .into_iter()
        .map(|ctor| Signature {
            parameters: cx.checker.parameters(ctor),
            return_type: class_name.to_string(),
            documentation: documentation_for(&cx.checker, ctor).text,
            type_generics: Vec::new(),
            return_type_generics: Vec::new(),
        })
        .collect()
}

/// Copy the construct signatures of the nearest ancestor that declares any
pub(super) fn inherit_constructors(model: &mut EntityModel, index: usize) {
    let mut visited = HashSet::new();
    let mut current = model.entity(index).base_type.clone();
    let mut inherited = Vec::new();

    while let Some(base) = current {
        if !visited.insert(base.clone()) {
            break;
        }
        let Some(parent) = model.get(&base) else {
            break;
        };
        if !parent.constructors().is_empty() {
            inherited = parent.constructors().to_vec();
            break;
        }
        current = parent.base_type.clone();
    }
    if inherited.is_empty() {
        return;
    }

    let entity = model.entity_mut(index);
    for signature in &mut inherited {
        signature.return_type = entity.name.clone();
    }
    if let EntityKind::Class { constructors } = &mut entity.kind {
        *constructors = inherited;
    }
}
