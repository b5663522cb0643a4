//! Syntactic type-resolution service
//!
//! Answers the questions the extractor would otherwise put to a full type
//! checker, using only the concrete syntax tree of one file: names, modifier
//! flags, textual types, signatures and optional-parameter tests. Types are
//! re-derived from annotations and simple initializers; anything else is
//! reported as `any`.

use crate::model::Parameter;
use bitflags::bitflags;
use std::collections::HashMap;
use tree_sitter::Node;

bitflags! {
    /// Combined modifiers of a declaration
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ModifierFlags: u32 {
        const EXPORT = 1 << 0;
        const AMBIENT = 1 << 1;
        const DEFAULT = 1 << 2;
        const PUBLIC = 1 << 3;
        const PRIVATE = 1 << 4;
        const PROTECTED = 1 << 5;
        const STATIC = 1 << 6;
        const READONLY = 1 << 7;
        const ABSTRACT = 1 << 8;
        const ASYNC = 1 << 9;
        const OVERRIDE = 1 << 10;
    }
}

/// Node kinds that open a new function scope
const FUNCTION_SCOPES: &[&str] = &[
    "function_declaration",
    "function_expression",
    "function",
    "arrow_function",
    "generator_function",
    "generator_function_declaration",
    "method_definition",
    "class_declaration",
    "class",
];

/// Event factory methods and the event class they return, for calls whose
/// declaration lives in another file
const EVENT_FACTORIES: &[(&str, &str)] = &[("addEvent", "EventBase")];

/// Declarations a call can resolve to
const CALLABLE_DECLARATIONS: &[&str] = &[
    "method_definition",
    "method_signature",
    "abstract_method_signature",
    "function_declaration",
    "function_signature",
];

/// Checker bound to the source text of one file
#[derive(Debug, Clone, Copy)]
pub struct Checker<'a> {
    source: &'a str,
}

impl<'a> Checker<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { source }
    }

    /// Source text of a node
    pub fn text(&self, node: Node) -> &'a str {
        self.source.get(node.byte_range()).unwrap_or("")
    }

    pub fn field_text(&self, node: Node, field: &str) -> Option<&'a str> {
        node.child_by_field_name(field).map(|n| self.text(n))
    }

    /// Declared name of a declaration node (`name` field)
    pub fn name_of(&self, node: Node) -> Option<String> {
        let name = node.child_by_field_name("name")?;
        let text = match name.kind() {
            "string" => unquote(self.text(name)),
            "computed_property_name" | "private_property_identifier" => return None,
            _ => self.text(name),
        };
        if text.is_empty() {
            None
        } else {
            Some(text.to_string())
        }
    }

    /// Modifiers written directly on a class or interface member
    pub fn member_modifier_flags(&self, node: Node) -> ModifierFlags {
        let mut flags = ModifierFlags::empty();
        for child in node.children(&mut node.walk()) {
            match child.kind() {
                "accessibility_modifier" => match self.text(child) {
                    "public" => flags |= ModifierFlags::PUBLIC,
                    "private" => flags |= ModifierFlags::PRIVATE,
                    "protected" => flags |= ModifierFlags::PROTECTED,
                    _ => {}
                },
                "static" => flags |= ModifierFlags::STATIC,
                "readonly" => flags |= ModifierFlags::READONLY,
                "abstract" => flags |= ModifierFlags::ABSTRACT,
                "async" => flags |= ModifierFlags::ASYNC,
                "override_modifier" => flags |= ModifierFlags::OVERRIDE,
                "declare" => flags |= ModifierFlags::AMBIENT,
                _ => {}
            }
        }
        flags
    }

    /// Modifiers of a top-level declaration, including the wrapping
    /// `export` / `declare` statements
    pub fn declaration_modifier_flags(&self, node: Node) -> ModifierFlags {
        let mut flags = ModifierFlags::empty();
        if node.kind() == "abstract_class_declaration" {
            flags |= ModifierFlags::ABSTRACT;
        }
        if node.children(&mut node.walk()).any(|c| c.kind() == "async") {
            flags |= ModifierFlags::ASYNC;
        }

        let mut current = node.parent();
        while let Some(parent) = current {
            match parent.kind() {
                "export_statement" => {
                    flags |= ModifierFlags::EXPORT;
                    if parent
                        .children(&mut parent.walk())
                        .any(|c| c.kind() == "default")
                    {
                        flags |= ModifierFlags::DEFAULT;
                    }
                }
                "ambient_declaration" => flags |= ModifierFlags::AMBIENT,
                "lexical_declaration" | "variable_declaration" => {}
                _ => break,
            }
            current = parent.parent();
        }
        flags
    }

    /// Text of the `type` annotation of a declaration, without the colon
    pub fn annotation_type(&self, node: Node, field: &str) -> Option<String> {
        let annotation = node.child_by_field_name(field)?;
        match annotation.kind() {
            "type_predicate_annotation" | "asserts_annotation" => Some("boolean".to_string()),
            "type_annotation" | "opting_type_annotation" | "omitting_type_annotation" => {
                annotation.named_child(0).map(|t| self.render_type(t))
            }
            _ => Some(self.render_type(annotation)),
        }
    }

    /// The type node behind an annotation field
    pub fn annotation_type_node(&self, node: Node<'a>, field: &str) -> Option<Node<'a>> {
        let annotation = node.child_by_field_name(field)?;
        match annotation.kind() {
            "type_annotation" | "opting_type_annotation" | "omitting_type_annotation" => {
                annotation.named_child(0)
            }
            "type_predicate_annotation" | "asserts_annotation" => None,
            _ => Some(annotation),
        }
    }

    /// Printed form of a type node: whitespace collapsed, `Array<X>` as `X[]`
    pub fn render_type(&self, type_node: Node) -> String {
        if type_node.kind() == "generic_type" && self.field_text(type_node, "name") == Some("Array")
        {
            let args = type_arguments(type_node);
            if let [element] = args.as_slice() {
                let element_text = self.render_type(*element);
                return match element.kind() {
                    "union_type" | "function_type" | "intersection_type" | "constructor_type" => {
                        format!("({})[]", element_text)
                    }
                    _ => format!("{}[]", element_text),
                };
            }
        }
        normalize_whitespace(self.text(type_node))
    }

    /// Type of a declaration: its annotation, else the type of its initializer
    pub fn declared_type(&self, node: Node) -> String {
        if let Some(annotated) = self.annotation_type(node, "type") {
            return annotated;
        }
        node.child_by_field_name("value")
            .map(|value| self.expression_type(value))
            .unwrap_or_else(|| "any".to_string())
    }

    /// Type of an initializer expression, for the literal forms that need no inference
    pub fn expression_type(&self, expr: Node) -> String {
        match expr.kind() {
            "string" | "template_string" => "string".to_string(),
            "number" => "number".to_string(),
            "true" | "false" => "boolean".to_string(),
            "array" => "any[]".to_string(),
            "new_expression" => expr
                .child_by_field_name("constructor")
                .map(|ctor| {
                    let mut text = self.text(ctor).to_string();
                    if let Some(args) = expr.child_by_field_name("type_arguments") {
                        text.push_str(self.text(args));
                    }
                    normalize_whitespace(&text)
                })
                .unwrap_or_else(|| "any".to_string()),
            "arrow_function" | "function_expression" | "function" => {
                let params = self.parameters(expr);
                let ret = self.return_type(expr);
                function_type_text(&params, &ret)
            }
            "as_expression" | "satisfies_expression" => expr
                .named_child(1)
                .map(|t| self.render_type(t))
                .unwrap_or_else(|| "any".to_string()),
            "parenthesized_expression" => expr
                .named_child(0)
                .map(|inner| self.expression_type(inner))
                .unwrap_or_else(|| "any".to_string()),
            "call_expression" => self
                .generic_call_type(expr)
                .unwrap_or_else(|| "any".to_string()),
            _ => "any".to_string(),
        }
    }

    /// Result type of a call with explicit type arguments
    ///
    /// A callee declared in this file contributes its return annotation with
    /// the type parameters bound to the call's arguments (or their defaults).
    /// Otherwise only the known event factories resolve.
    fn generic_call_type(&self, call: Node) -> Option<String> {
        let type_args = call.child_by_field_name("type_arguments")?;
        let callee = call.child_by_field_name("function")?;
        let name = match callee.kind() {
            "member_expression" => self.field_text(callee, "property")?,
            "identifier" => self.text(callee),
            _ => return None,
        };
        let args: Vec<String> = type_args
            .named_children(&mut type_args.walk())
            .map(|arg| self.render_type(arg))
            .collect();

        let mut root = call;
        while let Some(parent) = root.parent() {
            root = parent;
        }
        if let Some(declaration) = self.find_callable(root, name) {
            let return_type = declaration
                .child_by_field_name("return_type")
                .filter(|annotation| annotation.kind() == "type_annotation")
                .and_then(|annotation| annotation.named_child(0));
            if let Some(return_type) = return_type {
                let bindings = self.bind_type_parameters(declaration, &args);
                return Some(self.substitute(return_type, &bindings));
            }
        }

        EVENT_FACTORIES
            .iter()
            .find(|(factory, _)| *factory == name)
            .map(|(_, event)| format!("{}<{}>", event, args.join(", ")))
    }

    fn find_callable<'t>(&self, node: Node<'t>, name: &str) -> Option<Node<'t>> {
        if CALLABLE_DECLARATIONS.contains(&node.kind()) && self.field_text(node, "name") == Some(name)
        {
            return Some(node);
        }
        let mut cursor = node.walk();
        let children: Vec<Node<'t>> = node.named_children(&mut cursor).collect();
        children
            .into_iter()
            .find_map(|child| self.find_callable(child, name))
    }

    fn bind_type_parameters(&self, declaration: Node, args: &[String]) -> HashMap<&'a str, String> {
        let mut bindings = HashMap::new();
        let Some(params) = declaration.child_by_field_name("type_parameters") else {
            return bindings;
        };
        for (index, param) in params.named_children(&mut params.walk()).enumerate() {
            let Some(name) = self.field_text(param, "name") else {
                continue;
            };
            let bound = args.get(index).cloned().or_else(|| {
                param
                    .child_by_field_name("value")
                    .and_then(|default| default.named_child(0))
                    .map(|default| self.render_type(default))
            });
            bindings.insert(name, bound.unwrap_or_else(|| "any".to_string()));
        }
        bindings
    }

    /// Text of a type with bound type-parameter names replaced
    fn substitute(&self, type_node: Node, bindings: &HashMap<&str, String>) -> String {
        let mut identifiers = Vec::new();
        collect_type_identifiers(type_node, &mut identifiers);
        let base = type_node.start_byte();
        let mut text = self.text(type_node).to_string();
        for identifier in identifiers.into_iter().rev() {
            if let Some(bound) = bindings.get(self.text(identifier)) {
                text.replace_range(
                    identifier.start_byte() - base..identifier.end_byte() - base,
                    bound,
                );
            }
        }
        normalize_whitespace(&text)
    }

    /// Parameter list of a function-like node
    pub fn parameters(&self, node: Node) -> Vec<Parameter> {
        let Some(list) = node.child_by_field_name("parameters") else {
            // `x => ...` arrow functions carry a bare identifier
            return node
                .child_by_field_name("parameter")
                .map(|p| {
                    vec![Parameter {
                        name: self.text(p).to_string(),
                        type_text: "any".to_string(),
                        is_optional: false,
                        is_public: false,
                    }]
                })
                .unwrap_or_default();
        };

        let mut result = Vec::new();
        for (index, param) in list.named_children(&mut list.walk()).enumerate() {
            if !matches!(param.kind(), "required_parameter" | "optional_parameter") {
                continue;
            }
            let Some(pattern) = param.child_by_field_name("pattern") else {
                continue;
            };
            let (name, is_rest) = match pattern.kind() {
                "this" => continue,
                "identifier" => (self.text(pattern).to_string(), false),
                "rest_pattern" => (
                    pattern
                        .named_child(0)
                        .map(|n| self.text(n).to_string())
                        .unwrap_or_else(|| format!("__{}", index)),
                    true,
                ),
                _ => (format!("__{}", index), false),
            };

            let type_text = match self.annotation_type(param, "type") {
                Some(t) => t,
                None if is_rest => "any[]".to_string(),
                None => param
                    .child_by_field_name("value")
                    .map(|v| self.expression_type(v))
                    .unwrap_or_else(|| "any".to_string()),
            };

            let flags = self.member_modifier_flags(param);
            result.push(Parameter {
                name,
                type_text,
                is_optional: is_optional_parameter(param),
                is_public: flags.contains(ModifierFlags::PUBLIC),
            });
        }
        result
    }

    /// Return type of a function-like node
    ///
    /// The annotation when present; otherwise `void` for bodies without a
    /// `return <value>` and `any` for everything the checker would infer.
    pub fn return_type(&self, node: Node) -> String {
        if let Some(annotated) = self.annotation_type_raw(node, "return_type") {
            return annotated;
        }
        if self.member_modifier_flags(node).contains(ModifierFlags::ASYNC) {
            return "any".to_string();
        }
        match node.child_by_field_name("body") {
            Some(body) if body.kind() == "statement_block" => {
                if has_return_value(body) {
                    "any".to_string()
                } else {
                    "void".to_string()
                }
            }
            Some(_) => "any".to_string(),
            None => "any".to_string(),
        }
    }

    /// Annotation text exactly as written (generic arguments kept)
    fn annotation_type_raw(&self, node: Node, field: &str) -> Option<String> {
        let annotation = node.child_by_field_name(field)?;
        match annotation.kind() {
            "type_predicate_annotation" | "asserts_annotation" => Some("boolean".to_string()),
            "type_annotation" => annotation
                .named_child(0)
                .map(|t| normalize_whitespace(self.text(t))),
            _ => Some(normalize_whitespace(self.text(annotation))),
        }
    }

    /// Name of a type used as a generic argument
    ///
    /// Type references give their (last) identifier, predefined and array
    /// types their text; anything structural is `any`.
    pub fn type_argument_name(&self, node: Node) -> String {
        match node.kind() {
            "type_identifier" | "identifier" | "predefined_type" => self.text(node).to_string(),
            "nested_type_identifier" => node
                .child_by_field_name("name")
                .map(|n| self.text(n).to_string())
                .unwrap_or_else(|| "any".to_string()),
            "generic_type" => node
                .child_by_field_name("name")
                .map(|n| self.type_argument_name(n))
                .unwrap_or_else(|| "any".to_string()),
            "array_type" | "literal_type" => self.render_type(node),
            _ => "any".to_string(),
        }
    }

    /// Symbol-style name of an event type argument (`__type` for inline types)
    pub fn symbol_name_of_type(&self, node: Node) -> String {
        match node.kind() {
            "object_type" | "function_type" | "constructor_type" => "__type".to_string(),
            "predefined_type" | "literal_type" => String::new(),
            _ => self.type_argument_name(node),
        }
    }

    /// Dotted name of an `extends` / `implements` expression
    pub fn heritage_name(&self, node: Node) -> String {
        match node.kind() {
            "generic_type" => node
                .child_by_field_name("name")
                .map(|n| self.heritage_name(n))
                .unwrap_or_default(),
            "member_expression" | "nested_type_identifier" | "nested_identifier" => {
                normalize_whitespace(self.text(node))
            }
            _ => self.text(node).to_string(),
        }
    }
}

/// `type_arguments` of a generic type or call-like node
pub fn type_arguments(node: Node) -> Vec<Node> {
    let args = node.child_by_field_name("type_arguments").or_else(|| {
        node.children(&mut node.walk())
            .find(|c| c.kind() == "type_arguments")
    });
    match args {
        Some(args) => args.named_children(&mut args.walk()).collect(),
        None => Vec::new(),
    }
}

/// `type_identifier` leaves in source order
fn collect_type_identifiers<'t>(node: Node<'t>, out: &mut Vec<Node<'t>>) {
    if node.kind() == "type_identifier" {
        out.push(node);
        return;
    }
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        collect_type_identifiers(child, out);
    }
}

/// Parameters with a question token or an initializer may be omitted
pub fn is_optional_parameter(param: Node) -> bool {
    param.kind() == "optional_parameter" || param.child_by_field_name("value").is_some()
}

/// True if a statement block returns a value, ignoring nested functions
pub fn has_return_value(body: Node) -> bool {
    let mut stack = vec![body];
    while let Some(node) = stack.pop() {
        if node.kind() == "return_statement" && node.named_child_count() > 0 {
            return true;
        }
        for child in node.named_children(&mut node.walk()) {
            if !FUNCTION_SCOPES.contains(&child.kind()) {
                stack.push(child);
            }
        }
    }
    false
}

/// `(a: X, b?: Y) => R` as a checker would print a function type
pub fn function_type_text(params: &[Parameter], return_type: &str) -> String {
    let rendered: Vec<String> = params
        .iter()
        .map(|p| {
            format!(
                "{}{}: {}",
                p.name,
                if p.is_optional { "?" } else { "" },
                p.type_text
            )
        })
        .collect();
    format!("({}) => {}", rendered.join(", "), return_type)
}

/// Collapse every whitespace run to a single space
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Strip one pair of surrounding quotes
pub fn unquote(text: &str) -> &str {
    let trimmed = text.trim();
    for quote in ['"', '\'', '`'] {
        if let Some(inner) = trimmed
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    trimmed
}
