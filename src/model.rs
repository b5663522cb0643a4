// Entity Model
//
// Plain records built by the extractor and consumed by the renderers.
// Serialized field names match the documentation JSON consumed by the
// documentation site (`classes.json`, `pmes.json`).

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

/// Documentation comment text plus the doc tags the site understands
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Documentation {
    #[serde(rename = "documentation")]
    pub text: String,
    #[serde(rename = "metaTitle", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "metaDescription", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub see: Vec<String>,
    #[serde(rename = "returnDocumentation", skip_serializing_if = "Option::is_none")]
    pub returns: Option<String>,
}

impl Documentation {
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Kind of a class/interface member
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PmeType {
    #[default]
    Property,
    Method,
    Function,
    Event,
}

/// A function, method or constructor parameter
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "type")]
    pub type_text: String,
    pub is_optional: bool,
    pub is_public: bool,
}

/// A call or construct signature
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Signature {
    pub parameters: Vec<Parameter>,
    pub return_type: String,
    pub documentation: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub type_generics: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub return_type_generics: Vec<String>,
}

/// One enum member with its initializer source text
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumValue {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// Property, method or event of an entity
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub name: String,
    pub pme_type: PmeType,
    #[serde(flatten)]
    pub doc: Documentation,
    #[serde(rename = "type")]
    pub type_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_type: Option<String>,
    pub parameters: Vec<Parameter>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub type_generics: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub return_type_generics: Vec<String>,
    pub is_field: bool,
    pub has_set: bool,
    pub is_optional: bool,
    pub is_static: bool,
    pub is_protected: bool,
    pub is_localizable: bool,
    pub is_public: bool,
    /// Owning entity name (back-reference by name, not ownership)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_sender_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_options_name: Option<String>,
    pub is_serialized: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serialized_choices: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json_class_name: Option<String>,
    /// Nested properties of object-literal variables
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<Member>,
}

impl Member {
    pub fn new(name: impl Into<String>, pme_type: PmeType) -> Self {
        Self {
            name: name.into(),
            pme_type,
            ..Self::default()
        }
    }

    pub fn is_callable(&self) -> bool {
        matches!(self.pme_type, PmeType::Method | PmeType::Function)
    }
}

/// Entity variants with their kind-specific payload
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "entryType")]
pub enum EntityKind {
    #[serde(rename = "classType")]
    Class { constructors: Vec<Signature> },
    #[serde(rename = "interfaceType")]
    Interface,
    #[serde(rename = "functionType")]
    Function { signature: Signature },
    #[serde(rename = "variableType")]
    Variable,
    #[serde(rename = "enumType")]
    Enum { values: Vec<EnumValue> },
}

/// A top-level declaration: class, interface, function, variable or enum
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    pub name: String,
    #[serde(flatten)]
    pub kind: EntityKind,
    #[serde(flatten)]
    pub doc: Documentation,
    #[serde(rename = "type")]
    pub type_text: String,
    pub is_public: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_type: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub implements: Vec<String>,
    pub all_types: Vec<String>,
    pub members: Vec<Member>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json_name: Option<String>,
    #[serde(skip)]
    pub is_abstract: bool,
}

impl Entity {
    pub fn new(name: impl Into<String>, kind: EntityKind) -> Self {
        Self {
            name: name.into(),
            kind,
            doc: Documentation::default(),
            type_text: String::new(),
            is_public: false,
            base_type: None,
            implements: Vec::new(),
            all_types: Vec::new(),
            members: Vec::new(),
            json_name: None,
            is_abstract: false,
        }
    }

    pub fn is_class(&self) -> bool {
        matches!(self.kind, EntityKind::Class { .. })
    }

    pub fn is_interface(&self) -> bool {
        matches!(self.kind, EntityKind::Interface)
    }

    pub fn constructors(&self) -> &[Signature] {
        match &self.kind {
            EntityKind::Class { constructors } => constructors,
            _ => &[],
        }
    }

    pub fn has_member(&self, name: &str) -> bool {
        self.members.iter().any(|m| m.name == name)
    }
}

/// Position of a member inside the model arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MemberRef {
    pub entity: usize,
    pub member: usize,
}

/// `export { Name }` / `export { Orig as Name } from "lib"` re-export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryExport {
    pub name: String,
    pub original_name: Option<String>,
    pub module: Option<String>,
}

/// Generic parameter lists, as declared and as instantiated per consumer
#[derive(Debug, Clone, Default)]
pub struct GenericTable {
    declared: HashMap<String, Vec<String>>,
    arguments: HashMap<String, HashMap<String, Vec<String>>>,
}

impl GenericTable {
    pub fn set_declared(&mut self, type_name: &str, params: Vec<String>) {
        self.declared.insert(type_name.to_string(), params);
    }

    /// Record the arguments `consumer` passes to `type_name`
    pub fn set_arguments(&mut self, type_name: &str, consumer: &str, params: Vec<String>) {
        self.arguments
            .entry(type_name.to_string())
            .or_default()
            .insert(consumer.to_string(), params);
    }

    pub fn declared(&self, type_name: &str) -> Option<&[String]> {
        self.declared.get(type_name).map(Vec::as_slice)
    }

    pub fn arguments(&self, type_name: &str, consumer: &str) -> Option<&[String]> {
        self.arguments
            .get(type_name)
            .and_then(|by_consumer| by_consumer.get(consumer))
            .map(Vec::as_slice)
    }
}

/// The whole extraction result of one generation run
///
/// Entities live in an arena in discovery order; the by-name index keeps
/// first-insertion order and last-writer-wins values.
#[derive(Debug, Default)]
pub struct EntityModel {
    entities: Vec<Entity>,
    by_name: IndexMap<String, usize>,
    output_classes: Vec<usize>,
    output_pmes: Vec<MemberRef>,
    pub generics: GenericTable,
    pub library_exports: Vec<LibraryExport>,
}

impl EntityModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entity and make it the one its name resolves to
    pub fn insert(&mut self, entity: Entity) -> usize {
        let index = self.entities.len();
        self.by_name.insert(entity.name.clone(), index);
        self.entities.push(entity);
        index
    }

    pub fn get(&self, name: &str) -> Option<&Entity> {
        self.by_name.get(name).map(|&i| &self.entities[i])
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn entity(&self, index: usize) -> &Entity {
        &self.entities[index]
    }

    pub fn entity_mut(&mut self, index: usize) -> &mut Entity {
        &mut self.entities[index]
    }

    /// Entities reachable by name, in first-declaration order
    pub fn named(&self) -> impl Iterator<Item = &Entity> + '_ {
        self.by_name.values().map(move |&i| &self.entities[i])
    }

    pub fn named_indices(&self) -> Vec<usize> {
        self.by_name.values().copied().collect()
    }

    pub fn member(&self, at: MemberRef) -> &Member {
        &self.entities[at.entity].members[at.member]
    }

    pub fn member_mut(&mut self, at: MemberRef) -> &mut Member {
        &mut self.entities[at.entity].members[at.member]
    }

    /// Append a member and return its position
    pub fn push_member(&mut self, entity: usize, member: Member) -> MemberRef {
        let members = &mut self.entities[entity].members;
        members.push(member);
        MemberRef {
            entity,
            member: members.len() - 1,
        }
    }

    pub fn record_output_class(&mut self, index: usize) {
        self.output_classes.push(index);
    }

    pub fn record_output_pme(&mut self, at: MemberRef) {
        self.output_pmes.push(at);
    }

    pub fn output_classes(&self) -> impl Iterator<Item = &Entity> + '_ {
        self.output_classes.iter().map(move |&i| &self.entities[i])
    }

    pub fn output_pme_refs(&self) -> &[MemberRef] {
        &self.output_pmes
    }

    pub fn output_pmes(&self) -> impl Iterator<Item = &Member> + '_ {
        self.output_pmes.iter().map(move |&at| self.member(at))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_writer_wins_keeps_first_position() {
        let mut model = EntityModel::new();
        model.insert(Entity::new("Base", EntityKind::Interface));
        model.insert(Entity::new("Other", EntityKind::Interface));
        let second = model.insert(Entity::new(
            "Base",
            EntityKind::Class {
                constructors: Vec::new(),
            },
        ));

        assert_eq!(model.index_of("Base"), Some(second));
        assert!(model.get("Base").unwrap().is_class());
        let names: Vec<&str> = model.named().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Base", "Other"]);
    }

    #[test]
    fn test_generic_table_tracks_consumers_separately() {
        let mut table = GenericTable::default();
        table.set_declared("Base", vec!["T".to_string()]);
        table.set_arguments("Base", "Left", vec!["string".to_string()]);
        table.set_arguments("Base", "Right", vec!["number".to_string()]);

        assert_eq!(table.declared("Base"), Some(&["T".to_string()][..]));
        assert_eq!(
            table.arguments("Base", "Left"),
            Some(&["string".to_string()][..])
        );
        assert_eq!(
            table.arguments("Base", "Right"),
            Some(&["number".to_string()][..])
        );
        assert_eq!(table.arguments("Base", "Missing"), None);
    }

    #[test]
    fn test_entity_serializes_entry_type_tag() {
        let mut entity = Entity::new("Question", EntityKind::Interface);
        entity.doc.text = "A question".to_string();
        let json = serde_json::to_value(&entity).unwrap();
        assert_eq!(json["entryType"], "interfaceType");
        assert_eq!(json["documentation"], "A question");
        assert_eq!(json["name"], "Question");
    }

    #[test]
    fn test_member_refs_resolve() {
        let mut model = EntityModel::new();
        let index = model.insert(Entity::new("Panel", EntityKind::Interface));
        let at = model.push_member(index, Member::new("title", PmeType::Property));
        model.record_output_pme(at);
        model.member_mut(at).has_set = true;
        assert!(model.output_pmes().next().unwrap().has_set);
    }
}
