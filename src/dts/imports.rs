//! External declarations and the import block
//!
//! Each module listed in `paths` is backed by pre-built `.d.ts` files. Their
//! exported names are pre-scanned into an [`ExternalTable`]; names the
//! rendered output refers to are collected in an [`ImportTable`] and emitted
//! as `import { .. } from "module";` lines, five names per line.

use crate::diagnostics::Diagnostics;
use crate::options::ModulePaths;
use crate::textscan::{scan_external_declarations, ExternalKind};
use crate::utils::paths::absolute_from;
use indexmap::IndexMap;
use std::path::Path;
use tracing::debug;

const NAMES_PER_LINE: usize = 5;

/// Module and kind of one externally declared name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalDeclaration {
    pub module: String,
    pub kind: ExternalKind,
}

/// Names exported by the external modules, last scan wins
#[derive(Debug, Clone, Default)]
pub struct ExternalTable {
    declarations: IndexMap<String, ExternalDeclaration>,
}

impl ExternalTable {
    /// Scan every declaration file mapped in `paths`
    pub fn load(paths: &ModulePaths, base_dir: &Path, diagnostics: &mut Diagnostics) -> Self {
        let mut table = Self::default();
        for (module, files) in paths {
            for file in files {
                let path = absolute_from(base_dir, file);
                match std::fs::read_to_string(&path) {
                    Ok(text) => table.insert_text(module, &text),
                    Err(e) => diagnostics.warning(format!(
                        "Cannot read declarations of {} from {}: {}",
                        module,
                        path.display(),
                        e
                    )),
                }
            }
        }
        debug!("Scanned {} external declarations", table.declarations.len());
        table
    }

    pub fn insert_text(&mut self, module: &str, text: &str) {
        for (name, kind) in scan_external_declarations(text) {
            self.declarations.insert(
                name,
                ExternalDeclaration {
                    module: module.to_string(),
                    kind,
                },
            );
        }
    }

    pub fn get(&self, name: &str) -> Option<&ExternalDeclaration> {
        self.declarations.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.declarations.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }
}

/// Imports the rendered declarations need
#[derive(Debug, Default)]
pub struct ImportTable {
    /// name -> module, in first-use order
    names: IndexMap<String, String>,
    /// module -> import clause
    frameworks: IndexMap<&'static str, &'static str>,
}

impl ImportTable {
    pub fn add(&mut self, name: &str, module: &str) {
        if !self.names.contains_key(name) {
            self.names.insert(name.to_string(), module.to_string());
        }
    }

    pub fn add_framework(&mut self, module: &'static str, clause: &'static str) {
        self.frameworks.insert(module, clause);
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty() && self.frameworks.is_empty()
    }

    /// Import lines: named imports grouped per module, then framework imports
    pub fn render(&self) -> Vec<String> {
        let mut by_module: IndexMap<&str, Vec<&str>> = IndexMap::new();
        for (name, module) in &self.names {
            by_module.entry(module.as_str()).or_default().push(name.as_str());
        }

        let mut lines = Vec::new();
        for (module, names) in by_module {
            for chunk in names.chunks(NAMES_PER_LINE) {
                lines.push(format!(
                    "import {{ {} }} from \"{}\";",
                    chunk.join(", "),
                    module
                ));
            }
        }
        for (module, clause) in &self.frameworks {
            lines.push(format!("{} from \"{}\";", clause, module));
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_imports_are_batched_by_five() {
        let mut imports = ImportTable::default();
        for i in 0..12 {
            imports.add(&format!("Type{}", i), "survey-core");
        }
        let lines = imports.render();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "import { Type0, Type1, Type2, Type3, Type4 } from \"survey-core\";"
        );
        assert_eq!(
            lines[1],
            "import { Type5, Type6, Type7, Type8, Type9 } from \"survey-core\";"
        );
        assert_eq!(lines[2], "import { Type10, Type11 } from \"survey-core\";");
    }

    #[test]
    fn test_modules_keep_first_use_order() {
        let mut imports = ImportTable::default();
        imports.add("Action", "survey-knockout-ui");
        imports.add("Question", "survey-core");
        imports.add("Panel", "survey-knockout-ui");
        imports.add("Question", "survey-core");
        imports.add_framework("react", "import * as React");
        assert_eq!(
            imports.render(),
            vec![
                "import { Action, Panel } from \"survey-knockout-ui\";",
                "import { Question } from \"survey-core\";",
                "import * as React from \"react\";",
            ]
        );
    }

    #[test]
    fn test_load_external_table() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("survey.core.d.ts"),
            "export declare class Question extends SurveyElement {\nexport interface IElement {\n",
        )
        .unwrap();
        let mut paths = ModulePaths::new();
        paths.insert(
            "survey-core".to_string(),
            vec!["survey.core.d.ts".into(), "missing.d.ts".into()],
        );

        let mut diagnostics = Diagnostics::new();
        let table = ExternalTable::load(&paths, dir.path(), &mut diagnostics);
        assert_eq!(table.len(), 2);
        assert_eq!(table.get("IElement").unwrap().kind, ExternalKind::Interface);
        assert_eq!(table.get("Question").unwrap().module, "survey-core");
        assert_eq!(diagnostics.items().len(), 1, "missing file is a warning");
    }
}
