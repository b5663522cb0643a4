//! Language Support - Shared tree-sitter language configuration
//!
//! The generator only ever reads TypeScript: plain `.ts` sources, `.tsx`
//! component files, pre-built `.d.ts` declarations and the scripts spliced
//! out of Vue single-file components (`.vue.ts`).

use anyhow::Result;
use std::path::Path;
use tree_sitter::{Parser, Tree};

/// Get tree-sitter language parser for a given language name
///
/// This is the SINGLE SOURCE OF TRUTH for grammar selection.
pub fn get_tree_sitter_language(language: &str) -> Result<tree_sitter::Language> {
    match language {
        "typescript" => Ok(tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into()),
        "tsx" => Ok(tree_sitter_typescript::LANGUAGE_TSX.into()),
        _ => Err(anyhow::anyhow!(
            "Unsupported language: '{}'. Supported languages: typescript, tsx",
            language
        )),
    }
}

/// Detect language from file extension
///
/// Returns the language name that can be passed to `get_tree_sitter_language()`.
pub fn detect_language_from_extension(extension: &str) -> Option<&'static str> {
    match extension {
        "ts" | "mts" | "cts" => Some("typescript"),
        "tsx" => Some("tsx"),
        _ => None,
    }
}

/// Detect language from a file path, treating unknown extensions as TypeScript
pub fn detect_language_from_path(path: &Path) -> &'static str {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(detect_language_from_extension)
        .unwrap_or("typescript")
}

/// Parse `content` with the grammar for `language`
pub fn parse_source(content: &str, language: &str) -> Result<Tree> {
    let mut parser = Parser::new();
    let tree_sitter_language = get_tree_sitter_language(language)?;

    parser.set_language(&tree_sitter_language).map_err(|e| {
        anyhow::anyhow!("Failed to set parser language for {}: {}", language, e)
    })?;

    parser
        .parse(content, None)
        .ok_or_else(|| anyhow::anyhow!("Failed to parse {} source", language))
}

/// True for ambient declaration files (`x.d.ts`)
pub fn is_declaration_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.ends_with(".d.ts"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_language() {
        assert_eq!(detect_language_from_extension("ts"), Some("typescript"));
        assert_eq!(detect_language_from_extension("tsx"), Some("tsx"));
        assert_eq!(detect_language_from_extension("rs"), None);
        assert_eq!(
            detect_language_from_path(Path::new("src/react/reactSurvey.tsx")),
            "tsx"
        );
        assert_eq!(
            detect_language_from_path(Path::new("src/vue/survey.vue.ts")),
            "typescript"
        );
    }

    #[test]
    fn test_unknown_language_rejected() {
        let err = get_tree_sitter_language("python").unwrap_err();
        assert!(err.to_string().contains("Unsupported language"));
    }

    #[test]
    fn test_parse_source() {
        let tree = parse_source("export class Foo {}", "typescript").unwrap();
        assert_eq!(tree.root_node().kind(), "program");
        assert!(!tree.root_node().has_error());
    }

    #[test]
    fn test_declaration_file_detection() {
        assert!(is_declaration_file(Path::new("build/survey.core.d.ts")));
        assert!(!is_declaration_file(Path::new("src/question.ts")));
    }
}
