//! Declaration extractor
//!
//! Walks the top-level statements of every visited file (and one namespace
//! level) and builds the entity model:
//!
//! - **declarations**: statement routing, enums, free functions, re-exports
//! - **classes**: classes and interfaces with heritage, generics and constructors
//! - **members**: properties, methods, accessors and events
//! - **variables**: variable statements and object-literal members
//! - **generics**: declared and instantiated generic parameter lists
//! - **helpers**: decorators and naming heuristics

mod classes;
mod declarations;
mod generics;
mod helpers;
mod members;
mod variables;

use crate::model::{EntityModel, MemberRef};
use crate::program::checker::Checker;
use crate::program::{Program, SourceFile};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Mode switches that decide which declarations are kept
#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    /// Bundling mode: keep everything exported, not just documented API
    pub generate_dts: bool,
    /// Doc mode: object-literal variables contribute their properties
    pub generate_docs: bool,
    /// External module names eligible for `export { .. } from "module"`
    pub library_modules: Vec<String>,
}

/// Per-file state shared by the extraction functions
pub(crate) struct FileContext<'f> {
    pub(crate) checker: Checker<'f>,
    pub(crate) is_declaration_file: bool,
}

/// Builds an [`EntityModel`] from a [`Program`]
pub struct DeclarationExtractor<'m> {
    model: &'m mut EntityModel,
    options: ExtractOptions,
    /// `Class.member` -> the member a later setter pairs with
    accessors: HashMap<String, MemberRef>,
    /// Setters seen before their getter
    pending_setters: HashSet<String>,
    /// Classes declared without a constructor of their own
    constructorless: Vec<usize>,
}

impl<'m> DeclarationExtractor<'m> {
    pub fn new(model: &'m mut EntityModel, options: ExtractOptions) -> Self {
        Self {
            model,
            options,
            accessors: HashMap::new(),
            pending_setters: HashSet::new(),
            constructorless: Vec::new(),
        }
    }

    /// Visit every file of the program, then resolve inherited constructors
    pub fn extract_program(&mut self, program: &Program) {
        for file in program.visited_files() {
            self.extract_file(file);
        }
        self.finish();
    }

    /// Visit the top-level statements of one file
    pub fn extract_file(&mut self, file: &SourceFile) {
        debug!("Extracting declarations from {}", file.path.display());
        let cx = FileContext {
            checker: file.checker(),
            is_declaration_file: file.is_declaration_file(),
        };
        let root = file.root_node();
        for statement in root.named_children(&mut root.walk()) {
            declarations::visit_statement(self, &cx, statement, false);
        }
    }

    /// Give constructor-less classes the signatures of their nearest ancestor
    pub fn finish(&mut self) {
        for index in std::mem::take(&mut self.constructorless) {
            classes::inherit_constructors(&mut *self.model, index);
        }
    }

    pub(crate) fn options(&self) -> &ExtractOptions {
        &self.options
    }

    pub(crate) fn model(&self) -> &EntityModel {
        &*self.model
    }

    pub(crate) fn model_mut(&mut self) -> &mut EntityModel {
        &mut *self.model
    }
}

/// Extract a single in-memory file (test helper)
#[cfg(test)]
pub(crate) fn extract_source(source: &str, options: ExtractOptions) -> EntityModel {
    let program = Program::from_sources(vec![(
        std::path::PathBuf::from("/src/test.ts"),
        source.to_string(),
    )])
    .expect("test source should parse");
    let mut model = EntityModel::new();
    DeclarationExtractor::new(&mut model, options).extract_program(&program);
    model
}

#[cfg(test)]
pub(crate) fn dts_options() -> ExtractOptions {
    ExtractOptions {
        generate_dts: true,
        generate_docs: false,
        library_modules: vec!["survey-core".to_string()],
    }
}

#[cfg(test)]
pub(crate) fn doc_options() -> ExtractOptions {
    ExtractOptions {
        generate_dts: false,
        generate_docs: true,
        library_modules: Vec::new(),
    }
}
