//! Statement routing, enums, free functions and library re-exports

use super::{classes, generics, variables, DeclarationExtractor, FileContext};
use crate::model::{Entity, EntityKind, EnumValue, LibraryExport, Signature};
use crate::program::checker::{function_type_text, unquote, ModifierFlags};
use crate::program::jsdoc::documentation_for;
use tree_sitter::Node;

/// Route one statement; `nested` is set inside a namespace body
pub(super) fn visit_statement(
    extractor: &mut DeclarationExtractor,
    cx: &FileContext,
    node: Node,
    nested: bool,
) {
    match node.kind() {
        "export_statement" => {
            if let Some(declaration) = node.child_by_field_name("declaration") {
                visit_declaration(extractor, cx, declaration, nested);
            } else {
                visit_export_clause(extractor, cx, node);
            }
        }
        "ambient_declaration" | "expression_statement" => {
            for child in node.named_children(&mut node.walk()) {
                visit_declaration(extractor, cx, child, nested);
            }
        }
        _ => visit_declaration(extractor, cx, node, nested),
    }
}

fn visit_declaration(
    extractor: &mut DeclarationExtractor,
    cx: &FileContext,
    node: Node,
    nested: bool,
) {
    match node.kind() {
        "enum_declaration" => {
            if extractor.options().generate_dts {
                visit_enum(extractor, cx, node);
            }
        }
        "function_declaration" | "function_signature" => {
            if extractor.options().generate_dts {
                visit_function(extractor, cx, node);
            }
        }
        "lexical_declaration" | "variable_declaration" => {
            variables::visit_variable_statement(extractor, cx, node);
        }
        "class_declaration" | "abstract_class_declaration" => {
            classes::visit_class(extractor, cx, node);
        }
        "interface_declaration" => {
            classes::visit_interface(extractor, cx, node);
        }
        "internal_module" | "module" => {
            if !nested {
                visit_namespace(extractor, cx, node);
            }
        }
        "ambient_declaration" => {
            for child in node.named_children(&mut node.walk()) {
                visit_declaration(extractor, cx, child, nested);
            }
        }
        _ => {}
    }
}

/// Visit the statements of a namespace body (one level only)
fn visit_namespace(extractor: &mut DeclarationExtractor, cx: &FileContext, node: Node) {
    let Some(body) = node.child_by_field_name("body") else {
        return;
    };
    for statement in body.named_children(&mut body.walk()) {
        visit_statement(extractor, cx, statement, true);
    }
}

fn is_exported(cx: &FileContext, node: Node) -> bool {
    cx.checker
        .declaration_modifier_flags(node)
        .contains(ModifierFlags::EXPORT)
}

fn visit_enum(extractor: &mut DeclarationExtractor, cx: &FileContext, node: Node) {
    if !is_exported(cx, node) {
        return;
    }
    let Some(name) = cx.checker.name_of(node) else {
        return;
    };

    let mut values = Vec::new();
    if let Some(body) = node.child_by_field_name("body") {
        for member in body.named_children(&mut body.walk()) {
            match member.kind() {
                "enum_assignment" => {
                    let Some(member_name) = cx.checker.name_of(member) else {
                        continue;
                    };
                    values.push(EnumValue {
                        name: member_name,
                        value: cx
                            .checker
                            .field_text(member, "value")
                            .map(|v| v.trim().to_string()),
                    });
                }
                "property_identifier" => values.push(EnumValue {
                    name: cx.checker.text(member).to_string(),
                    value: None,
                }),
                "string" => values.push(EnumValue {
                    name: unquote(cx.checker.text(member)).to_string(),
                    value: None,
                }),
                _ => {}
            }
        }
    }

    let mut entity = Entity::new(name, EntityKind::Enum { values });
    entity.doc = documentation_for(&cx.checker, node);
    entity.type_text = entity.name.clone();
    extractor.model_mut().insert(entity);
}

fn visit_function(extractor: &mut DeclarationExtractor, cx: &FileContext, node: Node) {
    if !is_exported(cx, node) {
        return;
    }
    let Some(name) = cx.checker.name_of(node) else {
        return;
    };

    let doc = documentation_for(&cx.checker, node);
    let signature = function_signature(cx, node, &doc.text);
    let mut entity = Entity::new(name, EntityKind::Function { signature });
    if let EntityKind::Function { signature } = &entity.kind {
        entity.type_text = function_type_text(&signature.parameters, &signature.return_type);
    }
    entity.doc = doc;
    extractor.model_mut().insert(entity);
}

/// Parameters, return type and generics of a function-like declaration
pub(super) fn function_signature(cx: &FileContext, node: Node, documentation: &str) -> Signature {
    let return_type = cx.checker.return_type(node);
    let mut return_type_generics = generics::return_type_generics(cx, node);
    if return_type == "Array" && return_type_generics.is_empty() {
        return_type_generics.push("any".to_string());
    }
    Signature {
        parameters: cx.checker.parameters(node),
        return_type,
        documentation: documentation.to_string(),
        type_generics: generics::declared_type_parameters(cx, node).unwrap_or_default(),
        return_type_generics,
    }
}

/// `export { A as B } from "lib"` statements
fn visit_export_clause(extractor: &mut DeclarationExtractor, cx: &FileContext, node: Node) {
    let Some(clause) = node
        .named_children(&mut node.walk())
        .find(|c| c.kind() == "export_clause")
    else {
        return;
    };
    if cx.is_declaration_file {
        return;
    }

    let library = node
        .child_by_field_name("source")
        .map(|s| unquote(cx.checker.text(s)).to_string())
        .filter(|module| extractor.options().library_modules.contains(module));

    for specifier in clause.named_children(&mut clause.walk()) {
        if specifier.kind() != "export_specifier" {
            continue;
        }
        let Some(local) = cx.checker.field_text(specifier, "name") else {
            continue;
        };
        let alias = cx.checker.field_text(specifier, "alias");
        if alias.is_none() && library.is_none() {
            continue;
        }

        let (name, original_name) = match alias {
            Some(alias) => (alias.to_string(), Some(local.to_string())),
            None => (local.to_string(), None),
        };
        if name.is_empty() {
            continue;
        }
        extractor.model_mut().library_exports.push(LibraryExport {
            name,
            original_name,
            module: library.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use crate::extractors::{doc_options, dts_options, extract_source};
    use crate::model::{EntityKind, LibraryExport};

    #[test]
    fn test_enums_only_when_exported_in_bundling_mode() {
        let source = r#"
export enum Mode { Edit = "edit", Display = 2, Plain }
enum Hidden { A }
"#;
        let model = extract_source(source, dts_options());
        let Some(EntityKind::Enum { values }) = model.get("Mode").map(|e| e.kind.clone()) else {
            panic!("Mode enum missing");
        };
        assert_eq!(values.len(), 3);
        assert_eq!(values[0].value.as_deref(), Some("\"edit\""));
        assert_eq!(values[1].value.as_deref(), Some("2"));
        assert_eq!(values[2].value, None);
        assert!(model.get("Hidden").is_none());

        let docs = extract_source(source, doc_options());
        assert!(docs.get("Mode").is_none());
    }

    #[test]
    fn test_exported_function_signature() {
        let source = r#"
export function createItems<T>(count: number, prefix?: string): Array<T> { return []; }
function internal() {}
"#;
        let model = extract_source(source, dts_options());
        let entity = model.get("createItems").unwrap();
        let EntityKind::Function { signature } = &entity.kind else {
            panic!("not a function");
        };
        assert_eq!(signature.parameters.len(), 2);
        assert!(signature.parameters[1].is_optional);
        assert_eq!(signature.return_type, "Array<T>");
        assert_eq!(signature.type_generics, vec!["T"]);
        assert_eq!(signature.return_type_generics, vec!["T"]);
        assert!(model.get("internal").is_none());
    }

    #[test]
    fn test_library_reexports() {
        let source = r#"
export { Serializer as JsonSerializer } from "survey-core";
export { Question } from "survey-core";
export { Local as Renamed };
export { Skipped } from "./local";
"#;
        let model = extract_source(source, dts_options());
        assert_eq!(
            model.library_exports,
            vec![
                LibraryExport {
                    name: "JsonSerializer".to_string(),
                    original_name: Some("Serializer".to_string()),
                    module: Some("survey-core".to_string()),
                },
                LibraryExport {
                    name: "Question".to_string(),
                    original_name: None,
                    module: Some("survey-core".to_string()),
                },
                LibraryExport {
                    name: "Renamed".to_string(),
                    original_name: Some("Local".to_string()),
                    module: None,
                },
            ]
        );
    }

    #[test]
    fn test_namespace_members_are_visited_one_level() {
        let source = r#"
export namespace Outer {
  export class Inner {}
  export namespace Deeper { export class Hidden {} }
}
"#;
        let model = extract_source(source, dts_options());
        assert!(model.get("Inner").is_some());
        assert!(model.get("Hidden").is_none());
    }
}
