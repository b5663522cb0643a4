//! Declaration renderer
//!
//! Renders the entity model back to `.d.ts` text:
//!
//! 1. library re-exports (`export { A as B } from "lib";`)
//! 2. enums, interfaces, classes (ancestors first), functions, variables
//! 3. the import block collected while rendering, prepended last
//!
//! Indentation is two spaces per level; lines are joined with `\n`.

pub mod banner;
pub mod imports;
pub mod sort;
mod types;

use crate::error::Result;
use crate::language::parse_source;
use crate::model::{Documentation, Entity, EntityKind, EntityModel, Member, PmeType, Signature};
use imports::{ExternalTable, ImportTable};
use std::collections::HashSet;
use tracing::debug;
use tree_sitter::Node;
use types::{generic_list, remove_generics};

/// Rendering switches
#[derive(Debug, Clone, Copy, Default)]
pub struct DtsRenderOptions {
    /// Leave out declarations the external modules already provide (and import them instead)
    pub exclude_imports: bool,
    pub render_doc_comments: bool,
}

/// Renders one model to declaration text
pub struct DtsRenderer<'a> {
    model: &'a EntityModel,
    externals: &'a ExternalTable,
    options: DtsRenderOptions,
    imports: ImportTable,
    /// Set once a `React.*` type is seen; `Element` then renders as `JSX.Element`
    exports_react: bool,
}

impl<'a> DtsRenderer<'a> {
    pub fn new(
        model: &'a EntityModel,
        externals: &'a ExternalTable,
        options: DtsRenderOptions,
    ) -> Self {
        Self {
            model,
            externals,
            options,
            imports: ImportTable::default(),
            exports_react: false,
        }
    }

    pub fn render(mut self) -> String {
        let model = self.model;
        let mut enums = Vec::new();
        let mut interfaces = Vec::new();
        let mut classes = Vec::new();
        let mut functions = Vec::new();
        let mut variables = Vec::new();
        for entity in model.named() {
            if self.options.exclude_imports && self.externals.contains(&entity.name) {
                continue;
            }
            match entity.kind {
                EntityKind::Class { .. } => classes.push(entity),
                EntityKind::Interface => interfaces.push(entity),
                EntityKind::Function { .. } => functions.push(entity),
                EntityKind::Variable => variables.push(entity),
                EntityKind::Enum { .. } => enums.push(entity),
            }
        }
        sort::sort_classes(&mut classes);

        let mut lines = Vec::new();
        self.render_library_exports(&mut lines);
        for entity in enums {
            self.render_enum(&mut lines, entity);
        }
        for entity in interfaces {
            self.render_interface(&mut lines, entity);
        }
        for entity in classes {
            self.render_class(&mut lines, entity);
        }
        for entity in functions {
            self.render_function(&mut lines, entity);
        }
        for entity in variables {
            self.render_variable(
                &mut lines,
                &entity.name,
                &entity.type_text,
                &entity.doc,
                &entity.members,
                0,
            );
        }

        let import_lines = self.imports.render();
        debug!(
            "Rendered {} declaration lines, {} import lines",
            lines.len(),
            import_lines.len()
        );
        if import_lines.is_empty() {
            return lines.join("\n");
        }
        let mut output = import_lines;
        output.push(String::new());
        output.extend(lines);
        output.join("\n")
    }

    fn render_library_exports(&mut self, lines: &mut Vec<String>) {
        let exports = &self.model.library_exports;
        let mut exported = HashSet::new();
        for export in exports {
            if !exported.insert(export.name.as_str()) {
                continue;
            }
            let mut line = "export { ".to_string();
            if let Some(original) = &export.original_name {
                line.push_str(original);
                line.push_str(" as ");
            }
            line.push_str(&export.name);
            line.push_str(" }");
            if let Some(module) = &export.module {
                line.push_str(&format!(" from \"{}\"", module));
            }
            line.push(';');
            lines.push(line);
        }
        if !exports.is_empty() {
            lines.push(String::new());
        }
    }

    fn render_doc(&self, lines: &mut Vec<String>, doc: &Documentation, level: usize) {
        if !self.options.render_doc_comments || doc.text.is_empty() {
            return;
        }
        let indent = spaces(level);
        lines.push(format!("{}/*", indent));
        for line in doc.text.split('\n') {
            lines.push(format!("{}* {}", indent, line));
        }
        lines.push(format!("{}*/", indent));
    }

    fn render_enum(&mut self, lines: &mut Vec<String>, entity: &Entity) {
        let EntityKind::Enum { values } = &entity.kind else {
            return;
        };
        if values.is_empty() {
            return;
        }
        self.render_doc(lines, &entity.doc, 0);
        lines.push(format!("export enum {} {{", entity.name));
        for (i, value) in values.iter().enumerate() {
            let initializer = value
                .value
                .as_ref()
                .map(|v| format!(" = {}", v))
                .unwrap_or_default();
            let comma = if i + 1 < values.len() { "," } else { "" };
            lines.push(format!("{}{}{}{}", spaces(1), value.name, initializer, comma));
        }
        lines.push("}".to_string());
    }

    fn render_interface(&mut self, lines: &mut Vec<String>, entity: &Entity) {
        self.render_doc(lines, &entity.doc, 0);
        let name = self.get_type(&entity.name);
        let generic = self.type_generic(&entity.name, None);
        let implemented = self.implemented_interfaces(entity, false);
        lines.push(format!(
            "export interface {}{}{} {{",
            name, generic, implemented
        ));
        self.render_body(lines, entity);
        lines.push("}".to_string());
    }

    fn render_class(&mut self, lines: &mut Vec<String>, entity: &Entity) {
        if entity.name == "default" {
            return;
        }
        self.render_doc(lines, &entity.doc, 0);
        let generic = self.type_generic(&entity.name, None);
        let extend = self.class_extend(entity);
        lines.push(format!(
            "export declare class {}{}{} {{",
            entity.name, generic, extend
        ));
        for constructor in entity.constructors() {
            let parameters = self.parameters(&constructor.parameters);
            lines.push(format!("{}constructor({});", spaces(1), parameters));
        }
        self.render_body(lines, entity);
        lines.push("}".to_string());
    }

    fn render_function(&mut self, lines: &mut Vec<String>, entity: &Entity) {
        let EntityKind::Function { signature } = &entity.kind else {
            return;
        };
        self.render_doc(lines, &entity.doc, 0);
        let declaration = self.function_declaration(&entity.name, signature);
        lines.push(format!("export declare function {}", declaration));
    }

    fn render_variable(
        &mut self,
        lines: &mut Vec<String>,
        name: &str,
        type_text: &str,
        doc: &Documentation,
        members: &[Member],
        level: usize,
    ) {
        self.render_doc(lines, doc, level);
        let mut line = if level == 0 {
            "export declare var ".to_string()
        } else {
            spaces(level)
        };
        line.push_str(name);
        line.push_str(": ");
        let terminator = if level == 0 { ";" } else { "," };

        if members.is_empty() {
            line.push_str(&self.get_type(type_text));
            line.push_str(terminator);
            lines.push(line);
            return;
        }
        line.push('{');
        lines.push(line);
        for (i, member) in members.iter().enumerate() {
            if is_same_as_previous(members, i) {
                continue;
            }
            self.render_variable(
                lines,
                &member.name,
                &member.type_text,
                &member.doc,
                &member.members,
                level + 1,
            );
        }
        lines.push(format!("{}}}{}", spaces(level), terminator));
    }

    /// ` extends Base<Args> implements I1, I2` (or only the implements part)
    fn class_extend(&mut self, entity: &Entity) -> String {
        let Some(base) = entity.base_type.as_deref() else {
            return String::new();
        };
        if !self.has_class_type(base) {
            return String::new();
        }
        let base_is_interface = self.is_interface_type(base);
        let implemented = self.implemented_interfaces(entity, !base_is_interface);
        if base_is_interface {
            return implemented;
        }
        let generic = self.type_generic(base, Some(&entity.name));
        format!(" extends {}{}{}", base, generic, implemented)
    }

    fn implemented_interfaces(&mut self, entity: &Entity, skip_base: bool) -> String {
        let mut rendered = Vec::new();
        for implemented in &entity.implements {
            if skip_base && entity.base_type.as_deref() == Some(implemented.as_str()) {
                continue;
            }
            let generic = self.type_generic(implemented, Some(&entity.name));
            self.add_import(implemented);
            rendered.push(format!("{}{}", implemented, generic));
        }
        if rendered.is_empty() {
            return String::new();
        }
        let keyword = if entity.is_interface() {
            " extends "
        } else {
            " implements "
        };
        format!("{}{}", keyword, rendered.join(", "))
    }

    /// Own members, then members of an implemented base interface the class lacks
    fn body_members<'m>(&self, entity: &'m Entity) -> Vec<&'m Member>
    where
        'a: 'm,
    {
        let mut members: Vec<&Member> = entity.members.iter().collect();
        if !entity.is_class() {
            return members;
        }
        let model = self.model;
        if let Some(base) = entity
            .base_type
            .as_deref()
            .and_then(|name| model.get(name))
            .filter(|base| base.is_interface())
        {
            for member in &base.members {
                if !entity.has_member(&member.name) {
                    members.push(member);
                }
            }
        }
        members
    }

    /// True if a class ancestor already declares the member
    fn is_inherited(&self, entity: &Entity, name: &str) -> bool {
        entity.all_types.iter().skip(1).any(|ancestor| {
            self.model
                .get(ancestor)
                .is_some_and(|a| !a.is_interface() && a.has_member(name))
        })
    }

    fn render_body(&mut self, lines: &mut Vec<String>, entity: &Entity) {
        let members = self.body_members(entity);
        for (i, member) in members.iter().enumerate() {
            if i > 0 && members[i - 1].name == member.name {
                continue;
            }
            if self.is_inherited(entity, &member.name) {
                continue;
            }
            self.render_member(lines, member);
            if member.is_localizable {
                let loc_name = localizable_name(&member.name);
                if entity.has_member(&loc_name) {
                    continue;
                }
                let mut loc = Member::new(loc_name, PmeType::Property);
                loc.type_text = "LocalizableString".to_string();
                self.render_member(lines, &loc);
            }
        }
    }

    fn render_member(&mut self, lines: &mut Vec<String>, member: &Member) {
        let prefix = format!(
            "{}{}{}",
            spaces(1),
            if member.is_protected { "protected " } else { "" },
            if member.is_static { "static " } else { "" }
        );
        self.render_doc(lines, &member.doc, 1);

        let import_type = match member.pme_type {
            PmeType::Method | PmeType::Function => {
                let signature = Signature {
                    parameters: member.parameters.clone(),
                    return_type: member.return_type.clone().unwrap_or_default(),
                    documentation: String::new(),
                    type_generics: member.type_generics.clone(),
                    return_type_generics: member.return_type_generics.clone(),
                };
                let declaration = self.function_declaration(&member.name, &signature);
                lines.push(format!("{}{}", prefix, declaration));
                signature.return_type
            }
            PmeType::Property => {
                let property_type = self.get_type(&member.type_text);
                if member.is_field {
                    lines.push(format!(
                        "{}{}{}: {};",
                        prefix,
                        member.name,
                        if member.is_optional { "?" } else { "" },
                        property_type
                    ));
                } else {
                    lines.push(format!("{}get {}(): {};", prefix, member.name, property_type));
                    if member.has_set {
                        lines.push(format!(
                            "{}set {}(val: {});",
                            prefix, member.name, property_type
                        ));
                    }
                }
                member.type_text.clone()
            }
            PmeType::Event => {
                lines.push(format!("{}{}: {};", prefix, member.name, member.type_text));
                member.type_text.clone()
            }
        };
        self.add_import(remove_generics(&import_type));
    }

    /// `name<G>(params): Ret;`
    fn function_declaration(&mut self, name: &str, signature: &Signature) -> String {
        let rendered = self.function_signature_text(
            &signature.parameters,
            &signature.return_type,
            &signature.return_type_generics,
            false,
        );
        format!(
            "{}{}{};",
            name,
            generic_list(&signature.type_generics),
            rendered
        )
    }
}

fn spaces(level: usize) -> String {
    "  ".repeat(level)
}

fn is_same_as_previous(members: &[Member], index: usize) -> bool {
    index > 0 && members[index].name == members[index - 1].name
}

/// `title` -> `locTitle`
fn localizable_name(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => format!("loc{}{}", first.to_uppercase(), chars.as_str()),
        None => "loc".to_string(),
    }
}

/// Syntax errors and missing nodes of a declaration text, one message each
pub fn syntax_errors(text: &str) -> Result<Vec<String>> {
    let tree = parse_source(text, "typescript")?;
    let mut errors = Vec::new();
    collect_syntax_errors(tree.root_node(), text, &mut errors);
    Ok(errors)
}

fn collect_syntax_errors(node: Node, text: &str, errors: &mut Vec<String>) {
    if !node.has_error() {
        return;
    }
    let position = node.start_position();
    if node.is_missing() {
        errors.push(format!(
            "Error: '{}' expected at line {}, column {}",
            node.kind(),
            position.row + 1,
            position.column + 1
        ));
        return;
    }
    if node.is_error() {
        let snippet: String = text
            .get(node.byte_range())
            .unwrap_or("")
            .chars()
            .take(40)
            .collect();
        errors.push(format!(
            "Error: Unexpected syntax at line {}, column {} . Source: {}",
            position.row + 1,
            position.column + 1,
            snippet.trim()
        ));
        return;
    }
    for child in node.children(&mut node.walk()) {
        collect_syntax_errors(child, text, errors);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Diagnostics;
    use crate::extractors::{dts_options, extract_source};
    use crate::hierarchy::resolve_all_types;

    fn render_source(source: &str, externals: &ExternalTable, options: DtsRenderOptions) -> String {
        let mut model = extract_source(source, dts_options());
        let mut diagnostics = Diagnostics::new();
        resolve_all_types(&mut model, &mut diagnostics);
        DtsRenderer::new(&model, externals, options).render()
    }

    fn render(source: &str) -> String {
        render_source(source, &ExternalTable::default(), DtsRenderOptions::default())
    }

    #[test]
    fn test_trivial_class_round_trip() {
        let text = render("export class Foo { bar: string; }");
        assert_eq!(text, "export declare class Foo {\n  bar: string;\n}");
        assert!(syntax_errors(&text).unwrap().is_empty());
    }

    #[test]
    fn test_classes_render_ancestors_first() {
        let text = render(
            r#"
export class C extends B {}
export class B extends A {}
export class A {}
"#,
        );
        assert_eq!(
            text,
            "export declare class A {\n}\nexport declare class B extends A {\n}\nexport declare class C extends B {\n}"
        );
    }

    #[test]
    fn test_adjacent_duplicates_only() {
        let mut model = EntityModel::new();
        let mut entity = Entity::new("Panel", EntityKind::Interface);
        for name in ["a", "a", "b", "a"] {
            let mut member = Member::new(name, PmeType::Property);
            member.type_text = "string".to_string();
            member.is_field = true;
            entity.members.push(member);
        }
        entity.all_types = vec!["Panel".to_string()];
        model.insert(entity);

        let externals = ExternalTable::default();
        let text = DtsRenderer::new(&model, &externals, DtsRenderOptions::default()).render();
        assert_eq!(
            text,
            "export interface Panel {\n  a: string;\n  b: string;\n  a: string;\n}"
        );
    }

    #[test]
    fn test_accessors_unknown_types_and_localizable() {
        let text = render(
            r#"
export class Question {
  public get title(): string { return ""; }
  public set title(val: string) {}
  public get owner(): ExternalOwner { return null; }
  @property({ localizable: true }) description: string;
  protected static create(name: string, options?: Options): Question { return null; }
}
export class LocalizableString {}
"#,
        );
        let question_start = text.find("export declare class Question").unwrap();
        let question = &text[question_start..];
        assert!(question.contains("  get title(): string;\n  set title(val: string);\n"));
        assert!(question.contains("  get owner(): any;\n"));
        assert!(question.contains(
            "  get description(): string;\n  set description(val: string);\n  get locDescription(): LocalizableString;\n"
        ));
        assert!(question.contains("  protected static create(name: string, options?: any): Question;\n"));
        assert!(syntax_errors(&text).unwrap().is_empty());
    }

    #[test]
    fn test_extends_interface_base_and_generics() {
        let text = render(
            r#"
export interface IAction { id: string; title?: string; }
export class Action implements IAction { id: string; }
export class Base<T> {}
export class ListModel extends Base<Action> implements IAction {
  id: string;
  title: string;
  public getItems(): Array<Action> { return []; }
}
"#,
        );
        assert!(text.contains("export interface IAction {\n  id: string;\n  title?: string;\n}"));
        assert!(text.contains(
            "export declare class Action implements IAction {\n  id: string;\n  title?: string;\n}"
        ));
        assert!(text.contains("export declare class Base<T> {\n}"));
        assert!(text.contains(
            "export declare class ListModel extends Base<Action> implements IAction {\n  id: string;\n  title: string;\n  getItems(): Array<Action>;\n}"
        ));
    }

    #[test]
    fn test_members_of_class_ancestors_are_skipped() {
        let text = render(
            r#"
export class Base { name: string; }
export class Question extends Base { name: string; value: any; }
"#,
        );
        assert!(text.contains("export declare class Question extends Base {\n  value: any;\n}"));
    }

    #[test]
    fn test_enums_functions_variables_and_exports() {
        let text = render(
            r#"
export { Serializer as JsonSerializer } from "survey-core";
export { Serializer as JsonSerializer } from "survey-core";
export enum Mode { Edit = "edit", Display }
export enum Empty {}
export function createSurvey(json?: any): Survey { return null; }
export var settings = {
  locale: "en",
  web: { cacheLoaded: true, empty: {} },
};
export class Survey {}
"#,
        );
        let expected = [
            "export { Serializer as JsonSerializer } from \"survey-core\";",
            "",
            "export enum Mode {",
            "  Edit = \"edit\",",
            "  Display",
            "}",
            "export declare class Survey {",
            "}",
            "export declare function createSurvey(json?: any): Survey;",
            "export declare var settings: {",
            "  locale: string,",
            "  web: {",
            "    cacheLoaded: boolean,",
            "    empty: any,",
            "  },",
            "};",
        ]
        .join("\n");
        assert_eq!(text, expected);
        assert!(syntax_errors(&text).unwrap().is_empty());
    }

    #[test]
    fn test_external_imports_and_exclusion() {
        let mut externals = ExternalTable::default();
        externals.insert_text(
            "survey-core",
            "export declare class Question {\nexport interface IElement {\nexport declare class Base {",
        );
        let source = r#"
export class Base {}
export class QuestionText extends Question implements IElement {}
"#;
        let text = render_source(source, &externals, DtsRenderOptions::default());
        assert!(text.starts_with("import { Question, IElement } from \"survey-core\";\n\n"));
        assert!(text.contains("export declare class Base {"));
        assert!(text.contains("export declare class QuestionText extends Question implements IElement {"));

        let excluded = render_source(
            source,
            &externals,
            DtsRenderOptions {
                exclude_imports: true,
                render_doc_comments: false,
            },
        );
        assert!(!excluded.contains("export declare class Base {"));
        assert!(excluded.starts_with("import { Question, IElement } from \"survey-core\";\n\n"));
    }

    #[test]
    fn test_doc_comments_are_opt_in() {
        let source = "/** A panel\n * with two lines */\nexport class Panel {}";
        assert_eq!(render(source), "export declare class Panel {\n}");
        let with_docs = render_source(
            source,
            &ExternalTable::default(),
            DtsRenderOptions {
                exclude_imports: false,
                render_doc_comments: true,
            },
        );
        assert_eq!(
            with_docs,
            "/*\n* A panel\n* with two lines\n*/\nexport declare class Panel {\n}"
        );
    }

    #[test]
    fn test_syntax_errors_are_reported() {
        let errors = syntax_errors("export declare class Broken {\n  bar: ;\n").unwrap();
        assert!(!errors.is_empty());
        assert!(errors.iter().all(|e| e.starts_with("Error: ")));
    }
}
