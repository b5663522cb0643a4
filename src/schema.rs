//! JSON-Schema emitter
//!
//! Walks the serialized classes reachable from a root class and renders a
//! draft-07 style document. Classes without serialized properties are
//! transparent: they produce no definition but their subclasses are
//! visited. A subclass whose parent already has a definition refers to it
//! through an `allOff` composition.

use crate::model::{Entity, EntityModel, Member};
use crate::options::SchemaOptions;
use serde_json::{json, Map, Value};
use std::collections::HashSet;
use tracing::debug;

const SCHEMA_DRAFT: &str = "http://json-schema.org/draft-07/schema#";

/// Build the schema document for `options.root`
pub fn build_schema(model: &EntityModel, options: &SchemaOptions) -> Value {
    let mut builder = SchemaBuilder {
        model,
        options,
        visited: HashSet::new(),
        definitions: Map::new(),
        root_properties: Map::new(),
    };
    builder.add_class(&options.root, true);
    debug!(
        "Schema for {} has {} definitions",
        options.root,
        builder.definitions.len()
    );

    let mut document = Map::new();
    document.insert("$schema".to_string(), json!(SCHEMA_DRAFT));
    document.insert("title".to_string(), json!(options.title));
    document.insert("type".to_string(), json!("object"));
    if !builder.root_properties.is_empty() {
        document.insert(
            "properties".to_string(),
            Value::Object(builder.root_properties),
        );
    }
    if !builder.definitions.is_empty() {
        document.insert("definitions".to_string(), Value::Object(builder.definitions));
    }
    Value::Object(document)
}

struct SchemaBuilder<'a> {
    model: &'a EntityModel,
    options: &'a SchemaOptions,
    visited: HashSet<String>,
    definitions: Map<String, Value>,
    root_properties: Map<String, Value>,
}

impl<'a> SchemaBuilder<'a> {
    fn alias<'n>(&'n self, name: &'n str) -> &'n str {
        self.options
            .type_aliases
            .get(name)
            .map(String::as_str)
            .unwrap_or(name)
    }

    fn add_class(&mut self, class_name: &str, is_root: bool) {
        let class_name = self.alias(class_name).to_string();
        if !self.visited.insert(class_name.clone()) {
            return;
        }
        let model = self.model;
        let current = model.get(&class_name);
        if !is_root && (current.is_none() || !self.has_serialized_properties(&class_name)) {
            self.add_children(&class_name);
            return;
        }
        let Some(current) = current else {
            return;
        };
        let key = definition_key(current);
        if !is_root && self.definitions.contains_key(&key) {
            return;
        }
        if !is_root {
            // reserve the slot so definitions keep discovery order
            self.definitions.insert(key.clone(), Value::Null);
        }

        let mut properties = Map::new();
        for member in self.serialized_members(&current.name) {
            self.add_property(member, &mut properties);
        }
        if is_root {
            self.root_properties = properties;
            return;
        }

        let mut definition = Map::new();
        definition.insert("$id".to_string(), json!(format!("#{}", key)));
        definition.insert("type".to_string(), json!("object"));
        definition.insert("properties".to_string(), Value::Object(properties));
        self.add_parent(current, &mut definition);
        self.definitions.insert(key, Value::Object(definition));
        self.add_children(&current.name);
    }

    fn add_parent(&mut self, current: &Entity, definition: &mut Map<String, Value>) {
        let Some(base) = current.base_type.as_deref() else {
            return;
        };
        self.add_class(base, false);
        let Some(parent) = self.model.get(base) else {
            return;
        };
        let parent_key = definition_key(parent);
        if !self.definitions.contains_key(&parent_key) {
            return;
        }
        let properties = definition
            .remove("properties")
            .unwrap_or_else(|| json!({}));
        definition.insert(
            "allOff".to_string(),
            json!([
                { "$ref": format!("#{}", parent_key) },
                { "properties": properties },
            ]),
        );
    }

    fn add_children(&mut self, class_name: &str) {
        let model = self.model;
        for child in model.output_classes() {
            if child.base_type.as_deref() == Some(class_name) {
                self.add_class(&child.name, false);
            }
        }
    }

    fn serialized_members(&self, class_name: &str) -> Vec<&'a Member> {
        let model = self.model;
        model
            .output_pmes()
            .filter(|m| m.is_serialized && m.class_name.as_deref() == Some(class_name))
            .collect()
    }

    fn has_serialized_properties(&self, class_name: &str) -> bool {
        !self.serialized_members(class_name).is_empty()
    }

    fn add_property(&mut self, member: &Member, properties: &mut Map<String, Value>) {
        let type_name = member.type_text.as_str();
        let is_array = type_name.contains("[]");
        let item_type = type_name.replacen("[]", "", 1);
        if member.json_class_name.is_some() || is_array {
            self.add_class(&item_type, false);
        }

        let type_value = self.type_value(type_name, &item_type);
        let mut info = Map::new();
        if is_array {
            info.insert("type".to_string(), json!("array"));
            info.insert("items".to_string(), type_value);
        } else {
            info.insert("type".to_string(), type_value);
        }
        if let Some(choices) = member.serialized_choices.as_ref().filter(|c| c.len() > 1) {
            info.insert("enum".to_string(), Value::Array(choices.clone()));
        }
        properties.insert(member.name.clone(), Value::Object(info));
    }

    fn type_value(&self, type_name: &str, item_type: &str) -> Value {
        if type_name.find('|').is_some_and(|pos| pos > 0) {
            return json!(["boolean", "string"]);
        }
        match type_name {
            "any" => return json!(["string", "numeric", "boolean"]),
            "string" | "numeric" | "boolean" => return json!(type_name),
            _ => {}
        }

        let mut leaves = Vec::new();
        let mut seen = HashSet::new();
        self.collect_leaf_types(item_type, &mut leaves, &mut seen);
        match leaves.len() {
            0 => self.reference(item_type),
            1 => self.reference(&leaves[0]),
            _ => Value::Array(leaves.iter().map(|leaf| self.reference(leaf)).collect()),
        }
    }

    /// Subclasses of `type_name` that have no subclasses themselves
    fn collect_leaf_types(
        &self,
        type_name: &str,
        leaves: &mut Vec<String>,
        seen: &mut HashSet<String>,
    ) {
        let type_name = self.alias(type_name);
        if !seen.insert(type_name.to_string()) {
            return;
        }
        for child in self.model.output_classes() {
            if child.base_type.as_deref() != Some(type_name) {
                continue;
            }
            let count = leaves.len();
            self.collect_leaf_types(&child.name, leaves, seen);
            if count == leaves.len() {
                leaves.push(child.name.clone());
            }
        }
    }

    fn reference(&self, type_name: &str) -> Value {
        match self.model.get(type_name) {
            Some(class) => json!({ "$href": format!("#{}", definition_key(class)) }),
            None => json!(type_name),
        }
    }
}

fn definition_key(class: &Entity) -> String {
    class.json_name.clone().unwrap_or_else(|| class.name.clone())
}
