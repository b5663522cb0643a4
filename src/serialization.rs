//! Serialization-metadata binder
//!
//! Classes that declare a serialization name (`getType()`) are matched
//! against a metadata registry; members named like a registered property
//! are marked serialized and receive its default value, choices and item
//! class name.

use crate::error::{GenerateError, Result};
use crate::model::EntityModel;
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

/// One property as the serialization framework registers it
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryProperty {
    pub name: String,
    #[serde(default)]
    pub default_value: Option<Value>,
    #[serde(default)]
    pub choices: Option<Vec<Value>>,
    #[serde(default)]
    pub class_name: Option<String>,
}

/// Source of serialization metadata, keyed by serialization name
pub trait MetadataRegistry {
    /// Properties of a class including the ones it inherits
    fn get_properties(&self, json_name: &str) -> Vec<RegistryProperty>;
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegistryClass {
    #[serde(default)]
    parent_name: Option<String>,
    #[serde(default)]
    properties: Vec<RegistryProperty>,
}

/// Registry loaded from a JSON dump: `{ "<jsonName>": { "parentName"?, "properties": [...] } }`
#[derive(Debug, Clone, Default)]
pub struct JsonFileRegistry {
    classes: IndexMap<String, RegistryClass>,
}

impl JsonFileRegistry {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(Self {
            classes: serde_json::from_str(text)?,
        })
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| GenerateError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }
}

impl MetadataRegistry for JsonFileRegistry {
    fn get_properties(&self, json_name: &str) -> Vec<RegistryProperty> {
        let mut chain = Vec::new();
        let mut visited = HashSet::new();
        let mut current = Some(json_name.to_string());
        while let Some(name) = current {
            if !visited.insert(name.clone()) {
                break;
            }
            let Some(class) = self.classes.get(&name) else {
                break;
            };
            chain.push(class);
            current = class.parent_name.clone();
        }

        // Ancestors first; an own property overrides an inherited one of the same name
        let mut result: IndexMap<&str, &RegistryProperty> = IndexMap::new();
        for class in chain.iter().rev() {
            for property in &class.properties {
                result.insert(property.name.as_str(), property);
            }
        }
        result.into_values().cloned().collect()
    }
}

/// Annotate the output members of every serializable class
pub fn bind_serialization(model: &mut EntityModel, registry: &dyn MetadataRegistry) {
    let classes: Vec<(String, String)> = model
        .output_classes()
        .filter_map(|c| c.json_name.clone().map(|json| (c.name.clone(), json)))
        .collect();
    let refs = model.output_pme_refs().to_vec();

    for (class_name, json_name) in classes {
        let properties = registry.get_properties(&json_name);
        debug!(
            "Binding {} registered properties to {}",
            properties.len(),
            class_name
        );
        for &at in &refs {
            let member = model.member_mut(at);
            if member.class_name.as_deref() != Some(class_name.as_str()) {
                continue;
            }
            let Some(property) = properties.iter().find(|p| p.name == member.name) else {
                continue;
            };
            member.is_serialized = true;
            if let Some(default_value) = &property.default_value {
                member.default_value = Some(default_value.clone());
            }
            if let Some(choices) = &property.choices {
                member.serialized_choices = Some(choices.clone());
            }
            if let Some(class_name) = &property.class_name {
                member.json_class_name = Some(class_name.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Entity, EntityKind, Member, PmeType};
    use serde_json::json;

    const REGISTRY: &str = r#"{
        "question": {
            "properties": [
                { "name": "name" },
                { "name": "visible", "defaultValue": true },
                { "name": "title" }
            ]
        },
        "checkbox": {
            "parentName": "question",
            "properties": [
                { "name": "isRequired", "defaultValue": false },
                { "name": "choices", "className": "itemvalue" },
                { "name": "colCount", "choices": [0, 1, 2] },
                { "name": "visible", "defaultValue": false }
            ]
        }
    }"#;

    #[test]
    fn test_registry_includes_inherited_properties() {
        let registry = JsonFileRegistry::from_json(REGISTRY).unwrap();
        let names: Vec<String> = registry
            .get_properties("checkbox")
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(
            names,
            vec!["name", "visible", "title", "isRequired", "choices", "colCount"]
        );
        let visible = registry
            .get_properties("checkbox")
            .into_iter()
            .find(|p| p.name == "visible")
            .unwrap();
        assert_eq!(visible.default_value, Some(json!(false)));
        assert!(registry.get_properties("unknown").is_empty());
    }

    #[test]
    fn test_bind_marks_members_and_keeps_false_default() {
        let mut model = EntityModel::new();
        let mut question = Entity::new(
            "QuestionCheckbox",
            EntityKind::Class {
                constructors: Vec::new(),
            },
        );
        question.json_name = Some("checkbox".to_string());
        let index = model.insert(question);
        model.record_output_class(index);
        for name in ["isRequired", "choices", "colCount", "notRegistered"] {
            let mut member = Member::new(name, PmeType::Property);
            member.class_name = Some("QuestionCheckbox".to_string());
            let at = model.push_member(index, member);
            model.record_output_pme(at);
        }

        let registry = JsonFileRegistry::from_json(REGISTRY).unwrap();
        bind_serialization(&mut model, &registry);

        let members = &model.get("QuestionCheckbox").unwrap().members;
        assert!(members[0].is_serialized);
        assert_eq!(members[0].default_value, Some(json!(false)));
        assert_eq!(members[1].json_class_name.as_deref(), Some("itemvalue"));
        assert_eq!(
            members[2].serialized_choices,
            Some(vec![json!(0), json!(1), json!(2)])
        );
        assert!(!members[3].is_serialized);
    }
}
