//! Regex scans over raw file text
//!
//! Used where a parse is not worth it: the serialization name in a
//! `getType()` body, declarations exported by external `.d.ts` modules and
//! the `version` field of `package.json`.

use indexmap::IndexMap;
use regex::Regex;
use std::sync::LazyLock;

static INTERFACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)export interface(.*)\{").unwrap());

static VAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)export declare var(.*):").unwrap());

static FUNCTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)export declare function(.*)\(").unwrap());

static CLASS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)export declare class(.*?)(?:\{|extends|implements|<)").unwrap()
});

static VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""version":(.*),"#).unwrap());

const RETURN_MARKER: &str = "return \"";

/// Kind of a declaration found in an external module
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExternalKind {
    Interface,
    Variable,
    Function,
    Class,
}

/// Declarations exported by one external module, by name
pub type ExternalDeclarations = IndexMap<String, ExternalKind>;

/// The string literal returned by a `getType()` body
pub fn json_type_name(body: &str) -> Option<String> {
    let pos = body.find(RETURN_MARKER).filter(|&p| p > 0)?;
    let rest = &body[pos + RETURN_MARKER.len()..];
    let end = rest.find('"')?;
    Some(rest[..end].to_string())
}

/// Names of the declarations an external `.d.ts` text exports
pub fn scan_external_declarations(text: &str) -> ExternalDeclarations {
    let mut result = ExternalDeclarations::new();
    let scans: [(&Regex, ExternalKind); 4] = [
        (&INTERFACE_RE, ExternalKind::Interface),
        (&VAR_RE, ExternalKind::Variable),
        (&FUNCTION_RE, ExternalKind::Function),
        (&CLASS_RE, ExternalKind::Class),
    ];
    for (re, kind) in scans {
        for caps in re.captures_iter(text) {
            let name = declaration_name(&caps[1]);
            if !name.is_empty() {
                result.insert(name.to_string(), kind);
            }
        }
    }
    result
}

/// Cut a captured header at its heritage clause or generic list
fn declaration_name(header: &str) -> &str {
    let header = header.split(" extends ").next().unwrap_or(header);
    let header = header.split('<').next().unwrap_or(header);
    header.trim()
}

/// `version` of a `package.json` text, quotes removed
pub fn package_version(text: &str) -> Option<String> {
    let caps = VERSION_RE.captures(text)?;
    Some(caps[1].trim().replacen('"', "", 2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_type_name() {
        assert_eq!(
            json_type_name("getType(): string {\n    return \"dropdown\";\n  }"),
            Some("dropdown".to_string())
        );
        assert_eq!(json_type_name("getType() { return this.type; }"), None);
        assert_eq!(json_type_name("return \"first\""), None);
    }

    #[test]
    fn test_scan_external_declarations() {
        let text = r#"
export interface IElement {
export interface ISurvey extends IBase {
export interface IAction<T> {
export declare var settings: {
export declare function property(options?: any): any;
export declare class Base {
export declare class Question extends SurveyElement<Question> implements IElement {
export declare class ItemValue<T> {
"#;
        let declarations = scan_external_declarations(text);
        let names: Vec<&str> = declarations.keys().map(String::as_str).collect();
        assert_eq!(
            names,
            vec![
                "IElement", "ISurvey", "IAction", "settings", "property", "Base", "Question",
                "ItemValue"
            ]
        );
        assert_eq!(declarations["settings"], ExternalKind::Variable);
        assert_eq!(declarations["Question"], ExternalKind::Class);
        assert_eq!(declarations["IAction"], ExternalKind::Interface);
    }

    #[test]
    fn test_package_version() {
        let text = "{\n  \"name\": \"survey-core\",\n  \"version\": \"1.9.101\",\n  \"x\": 1\n}";
        assert_eq!(package_version(text), Some("1.9.101".to_string()));
        assert_eq!(package_version("{}"), None);
    }
}
