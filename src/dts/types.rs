// Type-text rendering for declaration output
//
// Types that cannot be resolved against the model, the external
// declaration table or the framework types render as `any`. Every type a
// declaration mentions is offered to the import table on the way.

use super::DtsRenderer;
use crate::model::Parameter;
use crate::textscan::ExternalKind;

const PRIMITIVES: &[&str] = &["number", "boolean", "string", "any", "void"];
const CALLBACK_RESULT: &str = ") => ";

impl DtsRenderer<'_> {
    /// Printed form of a type, or `any` when it cannot be resolved
    pub(super) fn get_type(&mut self, type_text: &str) -> String {
        if type_text.is_empty() {
            return "void".to_string();
        }
        if type_text == "T" {
            return type_text.to_string();
        }
        if type_text.contains('|') {
            return if type_text.contains('(') {
                "any".to_string()
            } else {
                type_text.to_string()
            };
        }
        let stripped = type_text.replacen('[', "", 1).replacen(']', "", 1);
        if PRIMITIVES.contains(&stripped.as_str()) {
            return type_text.to_string();
        }
        if type_text.starts_with('(') && type_text.contains(CALLBACK_RESULT) {
            return self.function_type(type_text);
        }
        if !self.has_class_type(&stripped) {
            return "any".to_string();
        }
        if self.is_react_element(type_text) {
            return "JSX.Element".to_string();
        }
        type_text.to_string()
    }

    /// Re-render `(a: X, b: Y) => R` with each part resolved
    fn function_type(&mut self, type_text: &str) -> String {
        let Some(index) = type_text.find(CALLBACK_RESULT) else {
            return "any".to_string();
        };
        let return_type = &type_text[index + CALLBACK_RESULT.len()..];
        let params_text = &type_text[1..index];

        let mut parameters = Vec::new();
        if !params_text.trim().is_empty() {
            for part in params_text.split(',') {
                let Some((name, param_type)) = part.split_once(':') else {
                    return "any".to_string();
                };
                parameters.push(Parameter {
                    name: name.trim().to_string(),
                    type_text: param_type.trim().to_string(),
                    ..Parameter::default()
                });
            }
        }
        self.function_signature_text(&parameters, return_type, &[], true)
    }

    /// `(params): Ret` or, for inline function types, `(params) => Ret`
    pub(super) fn function_signature_text(
        &mut self,
        parameters: &[Parameter],
        return_type: &str,
        return_type_generics: &[String],
        is_parameter: bool,
    ) -> String {
        let mut rendered_return = self.get_type(remove_generics(return_type));
        if rendered_return != "any" {
            rendered_return.push_str(&generic_list(return_type_generics));
        }
        let parameters = self.parameters(parameters);
        format!(
            "({}){}{}",
            parameters,
            if is_parameter { " => " } else { ": " },
            rendered_return
        )
    }

    pub(super) fn parameters(&mut self, parameters: &[Parameter]) -> String {
        let rendered: Vec<String> = parameters
            .iter()
            .map(|p| {
                let mut param_type = self.get_type(&p.type_text);
                // `Event` of the library would clash with the DOM type
                if param_type == "Event" {
                    param_type = "any".to_string();
                }
                format!(
                    "{}{}: {}",
                    p.name,
                    if p.is_optional { "?" } else { "" },
                    param_type
                )
            })
            .collect();
        rendered.join(", ")
    }

    /// `<...>` of a type: its declared parameters, or the arguments `consumer` passes
    pub(super) fn type_generic(&mut self, type_name: &str, consumer: Option<&str>) -> String {
        if type_name.is_empty() {
            return String::new();
        }
        let model = self.model;
        let params = match consumer {
            None => model.generics.declared(type_name),
            Some(consumer) => model.generics.arguments(type_name, consumer),
        };
        let Some(params) = params else {
            return String::new();
        };
        for param in params {
            self.add_import(param);
        }
        format!("<{}>", params.join(", "))
    }

    /// True if the type resolves to something the output can name
    pub(super) fn has_class_type(&mut self, type_name: &str) -> bool {
        if self.add_import(type_name) {
            return true;
        }
        type_name == "Array" || self.is_react_element(type_name) || self.model.contains(type_name)
    }

    fn is_react_element(&self, type_name: &str) -> bool {
        self.exports_react && type_name == "Element"
    }

    /// Register an import for an externally declared type
    ///
    /// Returns true when the type is provided by an import (framework or
    /// external module).
    pub(super) fn add_import(&mut self, type_name: &str) -> bool {
        if type_name.is_empty() {
            return false;
        }
        if type_name.starts_with("React.") {
            self.imports.add_framework("react", "import * as React");
            self.exports_react = true;
            return true;
        }
        if type_name == "Vue" {
            self.imports.add_framework("vue", "import Vue");
            return true;
        }
        if !self.options.exclude_imports && self.model.contains(type_name) {
            return false;
        }
        let Some(external) = self.externals.get(type_name) else {
            return false;
        };
        self.imports.add(type_name, &external.module);
        true
    }

    pub(super) fn is_interface_type(&self, type_name: &str) -> bool {
        match self.model.get(type_name) {
            Some(entity) => entity.is_interface(),
            None => self
                .externals
                .get(type_name)
                .is_some_and(|e| e.kind == ExternalKind::Interface),
        }
    }
}

/// `Foo<Bar>` -> `Foo`; anything not ending in `>` is returned as is
pub(super) fn remove_generics(type_text: &str) -> &str {
    if !type_text.ends_with('>') {
        return type_text;
    }
    match type_text.find('<') {
        Some(index) => &type_text[..index],
        None => type_text,
    }
}

/// `<A, B>` for a non-empty list
pub(super) fn generic_list(params: &[String]) -> String {
    if params.is_empty() {
        String::new()
    } else {
        format!("<{}>", params.join(", "))
    }
}
