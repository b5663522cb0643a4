//! Class and interface members
//!
//! Properties, methods, get/set accessor pairs and events. Accessor pairs
//! collapse into one property entry whose `has_set` tells whether a setter
//! exists; the setter itself never becomes a member.

use super::helpers::{self, Accessor};
use super::{declarations, DeclarationExtractor, FileContext};
use crate::model::{Member, PmeType};
use crate::program::checker::{function_type_text, type_arguments, ModifierFlags};
use crate::program::jsdoc::documentation_for;
use crate::textscan::json_type_name;
use tree_sitter::Node;

const MEMBER_KINDS: &[&str] = &[
    "method_definition",
    "method_signature",
    "abstract_method_signature",
    "public_field_definition",
    "property_signature",
];

/// Visit the members of a class or interface body
///
/// Returns the serialization name found in a `getType()` member.
pub(super) fn visit_members(
    extractor: &mut DeclarationExtractor,
    cx: &FileContext,
    body: Node,
    owner: usize,
) -> Option<String> {
    let (owner_name, owner_is_interface) = {
        let entity = extractor.model().entity(owner);
        (entity.name.clone(), entity.is_interface())
    };

    let mut json_name = None;
    for node in body.named_children(&mut body.walk()) {
        if !MEMBER_KINDS.contains(&node.kind()) {
            continue;
        }
        let Some(name) = cx.checker.name_of(node) else {
            continue;
        };
        if name == "constructor" {
            continue;
        }
        let Some(member) = build_member(extractor, cx, node, name, &owner_name, owner_is_interface)
        else {
            continue;
        };

        let key = format!("{}.{}", owner_name, member.name);
        match helpers::accessor_kind(node) {
            Some(Accessor::Set) => {
                pair_setter(extractor, key);
                continue;
            }
            Some(Accessor::Get) => {}
            None => {}
        }

        let is_get_type = member.name == "getType" && member.is_callable();
        let model = extractor.model_mut();
        let at = model.push_member(owner, member);
        model.record_output_pme(at);
        extractor.accessors.insert(key, at);

        if is_get_type {
            if let Some(found) = json_type_name(cx.checker.text(node)) {
                json_name = Some(found);
            }
        }
    }
    json_name
}

fn is_member_exported(
    extractor: &DeclarationExtractor,
    node: Node,
    flags: ModifierFlags,
    documented: bool,
    owner_is_interface: bool,
) -> bool {
    let dts = extractor.options().generate_dts;
    flags.contains(ModifierFlags::PUBLIC)
        || (dts && flags.is_empty())
        || (dts && flags.contains(ModifierFlags::PROTECTED))
        || node.kind() == "public_field_definition"
        || documented
        || owner_is_interface
}

/// Build the member entry, or `None` when it is hidden or dropped
fn build_member(
    extractor: &mut DeclarationExtractor,
    cx: &FileContext,
    node: Node,
    name: String,
    owner_name: &str,
    owner_is_interface: bool,
) -> Option<Member> {
    let flags = cx.checker.member_modifier_flags(node);
    let doc = documentation_for(&cx.checker, node);
    if !is_member_exported(extractor, node, flags, !doc.is_empty(), owner_is_interface) {
        return None;
    }

    let accessor = helpers::accessor_kind(node);
    let is_method = accessor.is_none()
        && matches!(
            node.kind(),
            "method_definition" | "method_signature" | "abstract_method_signature"
        );

    let mut member = Member::new(
        name,
        if is_method {
            PmeType::Method
        } else {
            PmeType::Property
        },
    );
    member.class_name = Some(owner_name.to_string());
    member.is_public = flags.contains(ModifierFlags::PUBLIC);
    member.is_static = flags.contains(ModifierFlags::STATIC);
    member.is_protected = flags.contains(ModifierFlags::PROTECTED);

    if is_method {
        let signature = declarations::function_signature(cx, node, &doc.text);
        member.type_text = function_type_text(&signature.parameters, &signature.return_type);
        member.parameters = signature.parameters;
        member.return_type = Some(signature.return_type);
        member.type_generics = signature.type_generics;
        member.return_type_generics = signature.return_type_generics;
        member.doc = doc;
        return Some(member);
    }

    member.type_text = match accessor {
        Some(Accessor::Get) => cx
            .checker
            .annotation_type(node, "return_type")
            .unwrap_or_else(|| "any".to_string()),
        Some(Accessor::Set) => cx
            .checker
            .parameters(node)
            .into_iter()
            .next()
            .map(|p| p.type_text)
            .unwrap_or_else(|| "any".to_string()),
        None => cx.checker.declared_type(node),
    };
    member.is_localizable = helpers::is_localizable(&cx.checker, node);
    if member.is_localizable {
        member.has_set = true;
    }
    match node.kind() {
        "public_field_definition" if !member.is_localizable => member.is_field = true,
        "property_signature" => {
            member.is_field = true;
            member.is_optional = node.children(&mut node.walk()).any(|c| c.kind() == "?");
        }
        _ => {}
    }

    if helpers::is_event_type(&member.type_text) {
        member.pme_type = PmeType::Event;
        let (sender, options) = event_type_arguments(cx, node);
        member.event_sender_name = sender;
        member.event_options_name = options;
        let sender_is_inline = member.event_sender_name.as_deref() == Some("__type");
        let options_missing = member
            .event_options_name
            .as_deref()
            .map_or(true, str::is_empty);
        if doc.is_empty() && (sender_is_inline || options_missing) {
            return None;
        }
    }

    if accessor == Some(Accessor::Get) {
        member.is_field = false;
        let key = format!("{}.{}", owner_name, member.name);
        let pending = extractor.pending_setters.remove(&key);
        let existing = extractor
            .accessors
            .get(&key)
            .is_some_and(|&at| extractor.model().member(at).has_set);
        member.has_set |= pending || existing;
    }

    member.doc = doc;
    Some(member)
}

/// Mark the getter a setter belongs to, or remember the setter for later
fn pair_setter(extractor: &mut DeclarationExtractor, key: String) {
    match extractor.accessors.get(&key).copied() {
        Some(at) => {
            let getter = extractor.model_mut().member_mut(at);
            getter.has_set = true;
            getter.is_field = false;
        }
        None => {
            extractor.pending_setters.insert(key);
        }
    }
}

/// Sender and options names: the last two type arguments of the event type
fn event_type_arguments(cx: &FileContext, node: Node) -> (Option<String>, Option<String>) {
    let from_annotation = cx
        .checker
        .annotation_type_node(node, "type")
        .or_else(|| cx.checker.annotation_type_node(node, "return_type"))
        .filter(|t| t.kind() == "generic_type")
        .map(type_arguments);
    let from_initializer = || {
        node.child_by_field_name("value")
            .filter(|v| matches!(v.kind(), "new_expression" | "call_expression"))
            .map(type_arguments)
    };
    let args = from_annotation.or_else(from_initializer).unwrap_or_default();

    match args.as_slice() {
        [.., sender, options] => (
            Some(cx.checker.symbol_name_of_type(*sender)),
            Some(cx.checker.symbol_name_of_type(*options)),
        ),
        _ => (None, None),
    }
}

#[cfg(test)]
mod tests {
    use crate::extractors::{doc_options, dts_options, extract_source};
    use crate::model::PmeType;

    #[test]
    fn test_getter_setter_pairing() {
        let source = r#"
export class Question {
  public get title(): string { return ""; }
  public set title(val: string) {}
  public get readOnlyText(): string { return ""; }
  public set late(val: number) {}
  public get late(): number { return 0; }
}
"#;
        let model = extract_source(source, dts_options());
        let question = model.get("Question").unwrap();
        let names: Vec<&str> = question.members.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["title", "readOnlyText", "late"]);

        let title = &question.members[0];
        assert_eq!(title.pme_type, PmeType::Property);
        assert_eq!(title.type_text, "string");
        assert!(title.has_set);
        assert!(!title.is_field);
        assert!(!question.members[1].has_set);
        assert!(question.members[2].has_set, "setter declared before getter");
    }

    #[test]
    fn test_member_visibility_by_mode() {
        let source = r#"
export class Panel {
  public visible: boolean;
  protected render(): void {}
  plain(): number { return 1; }
  private secret(): void {}
  /** Documented private helper */
  private documented(): void {}
  counter = 0;
}
"#;
        let dts = extract_source(source, dts_options());
        let names: Vec<&str> = dts.get("Panel").unwrap().members.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["visible", "render", "plain", "documented", "counter"]);

        let docs = extract_source(
            &format!("/** Panel */{}", source.trim_start()),
            doc_options(),
        );
        let names: Vec<&str> = docs.get("Panel").unwrap().members.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["visible", "documented", "counter"]);
    }

    #[test]
    fn test_methods_and_fields() {
        let source = r#"
export class Survey {
  static instanceCount: number = 0;
  public getItems<T>(filter?: string): Array<T> { return []; }
  @property({ localizable: true }) title: string;
}
export interface IOptions {
  name: string;
  value?: any;
}
"#;
        let model = extract_source(source, dts_options());
        let survey = model.get("Survey").unwrap();

        let count = &survey.members[0];
        assert!(count.is_static);
        assert!(count.is_field);

        let items = &survey.members[1];
        assert_eq!(items.pme_type, PmeType::Method);
        assert_eq!(items.return_type.as_deref(), Some("Array<T>"));
        assert_eq!(items.type_generics, vec!["T"]);
        assert_eq!(items.return_type_generics, vec!["T"]);
        assert!(items.parameters[0].is_optional);
        assert_eq!(items.type_text, "(filter?: string) => Array<T>");

        let title = &survey.members[2];
        assert!(title.is_localizable);
        assert!(title.has_set);
        assert!(!title.is_field);

        let options = model.get("IOptions").unwrap();
        assert!(options.members[0].is_field);
        assert!(!options.members[0].is_optional);
        assert!(options.members[1].is_optional);
    }

    #[test]
    fn test_events_and_dropped_events() {
        let source = r#"
export class SurveyModel {
  /** Raised after a value changes */
  public onValueChanged: EventBase<SurveyModel, ValueChangedEvent> = this.addEvent<SurveyModel, ValueChangedEvent>();
  public onComplete: EventBase<SurveyModel, CompleteEvent> = new EventBase<SurveyModel, CompleteEvent>();
  public onInline: Event<(sender: any) => any, { name: string }, any>;
  public onBare: EventBase<SurveyModel>;
  public onInferred = this.addEvent<SurveyModel, InferredEvent>();
}
"#;
        let model = extract_source(source, dts_options());
        let survey = model.get("SurveyModel").unwrap();
        let names: Vec<&str> = survey.members.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["onValueChanged", "onComplete", "onInferred"]);

        let inferred = &survey.members[2];
        assert_eq!(inferred.pme_type, PmeType::Event);
        assert_eq!(inferred.type_text, "EventBase<SurveyModel, InferredEvent>");
        assert_eq!(inferred.event_options_name.as_deref(), Some("InferredEvent"));

        let changed = &survey.members[0];
        assert_eq!(changed.pme_type, PmeType::Event);
        assert_eq!(changed.event_sender_name.as_deref(), Some("SurveyModel"));
        assert_eq!(changed.event_options_name.as_deref(), Some("ValueChangedEvent"));
        assert_eq!(
            survey.members[1].event_options_name.as_deref(),
            Some("CompleteEvent")
        );
    }
}
