//! Program: the set of parsed source files of one generation run
//!
//! Starting from the root files, relative imports and re-exports are
//! followed transitively. Files are stored in post-order (dependencies
//! before the files that import them), which is the order declarations are
//! visited in. Non-relative module specifiers (packages, `paths` mappings)
//! are never loaded; their declarations are only known through the
//! external declaration pre-scan.

pub mod checker;
pub mod jsdoc;
pub mod sfc;

use crate::diagnostics::Diagnostics;
use crate::error::{GenerateError, Result};
use crate::language::{detect_language_from_path, is_declaration_file, parse_source};
use crate::utils::ignore::is_excluded_source;
use crate::utils::paths::normalize;
use checker::{unquote, Checker};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;
use tree_sitter::{Node, Tree};

/// Extensions tried, in order, when resolving a relative module specifier
const MODULE_SUFFIXES: &[&str] = &[".ts", ".tsx", ".d.ts"];
const INDEX_FILES: &[&str] = &["index.ts", "index.tsx", "index.d.ts"];

/// One parsed file
pub struct SourceFile {
    pub path: PathBuf,
    pub text: String,
    pub tree: Tree,
    pub is_root: bool,
}

impl SourceFile {
    pub fn parse(path: PathBuf, text: String, is_root: bool) -> Result<Self> {
        let tree = parse_source(&text, detect_language_from_path(&path))?;
        Ok(Self {
            path,
            text,
            tree,
            is_root,
        })
    }

    pub fn root_node(&self) -> Node<'_> {
        self.tree.root_node()
    }

    pub fn checker(&self) -> Checker<'_> {
        Checker::new(&self.text)
    }

    pub fn is_declaration_file(&self) -> bool {
        is_declaration_file(&self.path)
    }

    /// Module specifiers of every import / re-export statement
    pub fn module_specifiers(&self) -> Vec<String> {
        let checker = self.checker();
        let root = self.root_node();
        root.named_children(&mut root.walk())
            .filter(|n| matches!(n.kind(), "import_statement" | "export_statement"))
            .filter_map(|n| n.child_by_field_name("source"))
            .map(|source| unquote(checker.text(source)).to_string())
            .collect()
    }
}

/// All files reachable from the roots
pub struct Program {
    files: Vec<SourceFile>,
}

impl Program {
    /// Load the roots and everything they import
    ///
    /// A missing root is an error; an unreadable dependency is reported as
    /// a warning and skipped.
    pub fn load(roots: &[PathBuf], diagnostics: &mut Diagnostics) -> Result<Self> {
        let mut loader = Loader {
            files: Vec::new(),
            seen: HashSet::new(),
            roots: roots.iter().map(|p| normalize(p)).collect(),
            diagnostics,
        };
        for root in roots {
            loader.load(normalize(root))?;
        }
        debug!("Program loaded {} source files", loader.files.len());
        Ok(Self {
            files: loader.files,
        })
    }

    /// Build a program from in-memory sources (no import following)
    pub fn from_sources(sources: Vec<(PathBuf, String)>) -> Result<Self> {
        let files = sources
            .into_iter()
            .map(|(path, text)| SourceFile::parse(path, text, true))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { files })
    }

    pub fn source_files(&self) -> &[SourceFile] {
        &self.files
    }

    /// Files whose declarations are visited: roots always, others unless excluded
    pub fn visited_files(&self) -> impl Iterator<Item = &SourceFile> + '_ {
        self.files
            .iter()
            .filter(|f| f.is_root || !is_excluded_source(&f.path))
    }

    pub fn file(&self, path: &Path) -> Option<&SourceFile> {
        let path = normalize(path);
        self.files.iter().find(|f| f.path == path)
    }
}

struct Loader<'d> {
    files: Vec<SourceFile>,
    seen: HashSet<PathBuf>,
    roots: HashSet<PathBuf>,
    diagnostics: &'d mut Diagnostics,
}

impl Loader<'_> {
    fn load(&mut self, path: PathBuf) -> Result<()> {
        if !self.seen.insert(path.clone()) {
            return Ok(());
        }
        let is_root = self.roots.contains(&path);
        if !is_root && is_excluded_source(&path) {
            return Ok(());
        }

        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(source) if is_root => return Err(GenerateError::Read { path, source }),
            Err(err) => {
                self.diagnostics
                    .warning(format!("Cannot read {}: {}", path.display(), err));
                return Ok(());
            }
        };

        let file = SourceFile::parse(path, text, is_root)?;
        let dir = file.path.parent().map(Path::to_path_buf).unwrap_or_default();
        for specifier in file.module_specifiers() {
            if let Some(dependency) = resolve_module(&dir, &specifier) {
                self.load(dependency)?;
            }
        }
        self.files.push(file);
        Ok(())
    }
}

/// Resolve a relative module specifier to an existing file
pub fn resolve_module(dir: &Path, specifier: &str) -> Option<PathBuf> {
    if !specifier.starts_with("./") && !specifier.starts_with("../") && specifier != "." {
        return None;
    }
    let specifier = specifier.strip_suffix(".js").unwrap_or(specifier);
    let base = normalize(&dir.join(specifier));

    let has_source_extension = base
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.ends_with(".ts") || n.ends_with(".tsx"));
    if has_source_extension && base.is_file() {
        return Some(base);
    }

    let base_str = base.to_string_lossy();
    MODULE_SUFFIXES
        .iter()
        .map(|suffix| PathBuf::from(format!("{}{}", base_str, suffix)))
        .chain(INDEX_FILES.iter().map(|index| base.join(index)))
        .find(|candidate| candidate.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_dependencies_load_before_importers() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("src/entries")).unwrap();
        fs::write(
            root.join("src/entries/index.ts"),
            "export * from \"../question\";\nexport { Panel } from \"../panel\";\nimport { x } from \"lodash\";",
        )
        .unwrap();
        fs::write(
            root.join("src/question.ts"),
            "import { Base } from \"./base\";\nexport class Question extends Base {}",
        )
        .unwrap();
        fs::write(root.join("src/base.ts"), "export class Base {}").unwrap();
        fs::write(
            root.join("src/panel.ts"),
            "import { Base } from \"./base\";\nexport class Panel {}",
        )
        .unwrap();

        let mut diagnostics = Diagnostics::new();
        let program =
            Program::load(&[root.join("src/entries/index.ts")], &mut diagnostics).unwrap();
        let names: Vec<String> = program
            .source_files()
            .iter()
            .map(|f| f.path.file_name().unwrap().to_string_lossy().to_string())
            .collect();

        assert_eq!(names, vec!["base.ts", "question.ts", "panel.ts", "index.ts"]);
        assert!(program.source_files()[3].is_root);
        assert!(!program.source_files()[0].is_root);
        assert!(diagnostics.items().is_empty());
    }

    #[test]
    fn test_localization_files_are_skipped() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("localization")).unwrap();
        fs::write(
            root.join("index.ts"),
            "import \"./localization/german\";\nimport \"./localization/english\";",
        )
        .unwrap();
        fs::write(root.join("localization/german.ts"), "export var german = {};").unwrap();
        fs::write(root.join("localization/english.ts"), "export var english = {};").unwrap();

        let mut diagnostics = Diagnostics::new();
        let program = Program::load(&[root.join("index.ts")], &mut diagnostics).unwrap();
        assert_eq!(program.source_files().len(), 2);
        assert!(program
            .file(&root.join("localization/english.ts"))
            .is_some());
        assert!(program.file(&root.join("localization/german.ts")).is_none());
    }

    #[test]
    fn test_resolve_module_variants() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("react")).unwrap();
        fs::write(root.join("react/index.tsx"), "").unwrap();
        fs::write(root.join("survey.vue.ts"), "").unwrap();
        fs::write(root.join("types.d.ts"), "").unwrap();

        assert_eq!(
            resolve_module(root, "./react"),
            Some(root.join("react/index.tsx"))
        );
        assert_eq!(
            resolve_module(root, "./survey.vue"),
            Some(root.join("survey.vue.ts"))
        );
        assert_eq!(resolve_module(root, "./types"), Some(root.join("types.d.ts")));
        assert_eq!(resolve_module(root, "survey-core"), None);
        assert_eq!(resolve_module(root, "./missing"), None);
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let dir = TempDir::new().unwrap();
        let mut diagnostics = Diagnostics::new();
        let result = Program::load(&[dir.path().join("absent.ts")], &mut diagnostics);
        assert!(matches!(result, Err(GenerateError::Read { .. })));
    }
}
