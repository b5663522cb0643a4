//! Generation driver
//!
//! Runs one batch: expand the entry list, write the component scratch
//! files, load and extract the program, resolve the hierarchy, bind the
//! serialization metadata, then write whichever artifacts the options ask
//! for (docs, schema, bundled declarations). Configuration problems are
//! recorded as error diagnostics and stop the branch; I/O failures are
//! returned as errors.

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::docs::{update_events_documentation, write_docs, write_json};
use crate::dts::banner::render_banner;
use crate::dts::imports::ExternalTable;
use crate::dts::{syntax_errors, DtsRenderOptions, DtsRenderer};
use crate::error::{GenerateError, Result};
use crate::extractors::{DeclarationExtractor, ExtractOptions};
use crate::hierarchy::resolve_all_types;
use crate::model::EntityModel;
use crate::options::{DocOptions, DtsOptions};
use crate::program::sfc::ScratchFiles;
use crate::program::Program;
use crate::schema::build_schema;
use crate::serialization::{bind_serialization, MetadataRegistry};
use crate::textscan::package_version;
use crate::utils::paths::{absolute_from, display_path};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// What one run produced
#[derive(Debug, Default)]
pub struct GenerationReport {
    pub diagnostics: Vec<Diagnostic>,
    /// Files written, in write order
    pub written: Vec<PathBuf>,
}

impl GenerationReport {
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == crate::diagnostics::Severity::Error)
    }
}

/// State of one generation run
pub struct GenerationContext<'r> {
    options: DocOptions,
    base_dir: PathBuf,
    registry: Option<&'r dyn MetadataRegistry>,
    diagnostics: Diagnostics,
    written: Vec<PathBuf>,
}

impl<'r> GenerationContext<'r> {
    pub fn new(options: DocOptions, registry: Option<&'r dyn MetadataRegistry>) -> Self {
        let base_dir = options.base_dir();
        Self {
            options,
            base_dir,
            registry,
            diagnostics: Diagnostics::new(),
            written: Vec::new(),
        }
    }

    pub fn diagnostics_mut(&mut self) -> &mut Diagnostics {
        &mut self.diagnostics
    }

    pub fn into_report(self) -> GenerationReport {
        GenerationReport {
            diagnostics: self.diagnostics.into_items(),
            written: self.written,
        }
    }

    /// Record a configuration error in the report, propagate anything else
    pub fn reject(&mut self, error: GenerateError) -> Result<()> {
        if !error.is_configuration() {
            return Err(error);
        }
        self.diagnostics.error(error.to_string());
        Ok(())
    }

    /// Run the whole pipeline over `entries`
    ///
    /// Returns `false` when a configuration error stopped the run early.
    pub fn run(&mut self, entries: &[String]) -> Result<bool> {
        let roots = match expand_entries(entries, &self.base_dir) {
            Ok(roots) => roots,
            Err(e) => {
                self.reject(e)?;
                return Ok(false);
            }
        };
        // dropped at the end of the run, error or not
        let scratch = ScratchFiles::generate(&roots);
        debug!("Generated {} component scripts", scratch.paths().len());
        if let Err(e) = check_files(&roots, "File for compiling is not found") {
            self.reject(e)?;
            return Ok(false);
        }

        let program = Program::load(&roots, &mut self.diagnostics)?;
        let mut model = EntityModel::new();
        DeclarationExtractor::new(&mut model, self.extract_options()).extract_program(&program);
        resolve_all_types(&mut model, &mut self.diagnostics);
        info!(
            "Extracted {} declarations from {} files",
            model.named().count(),
            program.source_files().len()
        );

        match self.registry {
            Some(registry) => bind_serialization(&mut model, registry),
            None if self.options.generate_json_definition => self
                .diagnostics
                .warning("No metadata registry given; the schema has no serialized properties"),
            None => {}
        }

        if self.options.generate_docs() {
            update_events_documentation(&mut model);
            let dir = self.options.resolve(&self.options.docs_dir);
            let written = write_docs(&model, &dir)?;
            self.written.extend(written);
        }
        if self.options.generate_json_definition {
            self.write_schema(&model)?;
        }
        if self.options.generate_dts() {
            self.write_dts(&model)?;
        }
        Ok(true)
    }

    fn extract_options(&self) -> ExtractOptions {
        ExtractOptions {
            generate_dts: self.options.generate_dts(),
            generate_docs: self.options.generate_docs(),
            library_modules: self.options.paths.keys().cloned().collect(),
        }
    }

    fn write_schema(&mut self, model: &EntityModel) -> Result<()> {
        let schema = build_schema(model, &self.options.schema);
        let dir = self.options.resolve(&self.options.docs_dir);
        std::fs::create_dir_all(&dir).map_err(|source| GenerateError::Write {
            path: dir.clone(),
            source,
        })?;
        let path = dir.join(&self.options.schema.file_name);
        write_json(&path, &schema)?;
        info!("Wrote schema to {}", display_path(&path, &self.base_dir));
        self.written.push(path);
        Ok(())
    }

    fn write_dts(&mut self, model: &EntityModel) -> Result<()> {
        let Some(output) = self.options.dts_output.as_deref() else {
            return Ok(());
        };
        let path = self.options.resolve(output);
        let externals =
            ExternalTable::load(&self.options.paths, &self.base_dir, &mut self.diagnostics);
        let render_options = DtsRenderOptions {
            exclude_imports: self.options.dts_exclude_imports,
            render_doc_comments: self.options.render_doc_comments,
        };

        let mut text = String::new();
        if let Some(name) = self.options.name.as_deref() {
            let version = read_package_version(&self.base_dir);
            text.push_str(&render_banner(
                name,
                version.as_deref(),
                self.options.copyright.as_deref(),
                self.options.license.as_deref(),
            ));
        }
        text.push_str(&DtsRenderer::new(model, &externals, render_options).render());

        std::fs::write(&path, text).map_err(|source| GenerateError::Write {
            path: path.clone(),
            source,
        })?;
        info!(
            "Wrote declarations to {}",
            display_path(&path, &self.base_dir)
        );
        self.written.push(path);
        Ok(())
    }
}

/// Extract the documentation of `entries` and write the configured artifacts
pub fn generate_documentation(
    entries: &[String],
    options: &DocOptions,
    registry: Option<&dyn MetadataRegistry>,
) -> Result<GenerationReport> {
    let mut context = GenerationContext::new(options.clone(), registry);
    context.run(entries)?;
    Ok(context.into_report())
}

/// Bundle the declarations of `options.entries` into `options.out`, then validate the result
pub fn generate_dts(options: &DtsOptions) -> Result<GenerationReport> {
    let doc_options = options.to_doc_options();
    let out = options
        .out
        .as_deref()
        .filter(|o| !o.as_os_str().is_empty())
        .map(|o| doc_options.resolve(o));
    let mut context = GenerationContext::new(doc_options, None);
    let Some(out) = out else {
        context.reject(GenerateError::MissingOutput)?;
        return Ok(context.into_report());
    };
    let out_dir = out.parent().map(Path::to_path_buf).unwrap_or_default();
    if let Err(e) = check_files(
        std::slice::from_ref(&out_dir),
        "directory for out file is not found",
    ) {
        context.reject(e)?;
        return Ok(context.into_report());
    }

    if !context.run(&options.entries)? {
        return Ok(context.into_report());
    }
    if let Err(e) = check_files(
        std::slice::from_ref(&out),
        "Generated d.ts file is not found",
    ) {
        context.reject(e)?;
        return Ok(context.into_report());
    }

    let text = std::fs::read_to_string(&out).map_err(|source| GenerateError::Read {
        path: out.clone(),
        source,
    })?;
    let errors = syntax_errors(&text)?;
    if !errors.is_empty() {
        warn!("{} syntax errors in {}", errors.len(), out.display());
    }
    for error in errors {
        context.diagnostics_mut().error(error);
    }
    Ok(context.into_report())
}

/// Resolve entries against `base_dir`, expanding glob patterns
///
/// A pattern that matches nothing is kept as a literal path so the
/// existence check reports it.
pub fn expand_entries(entries: &[String], base_dir: &Path) -> Result<Vec<PathBuf>> {
    if entries.is_empty() {
        return Err(GenerateError::EmptyFileList);
    }
    let mut roots = Vec::new();
    for entry in entries {
        let path = absolute_from(base_dir, Path::new(entry));
        if !is_glob_pattern(entry) {
            roots.push(path);
            continue;
        }
        let pattern = path.to_string_lossy().into_owned();
        let matches = glob::glob(&pattern).map_err(|e| GenerateError::Pattern {
            pattern: entry.clone(),
            message: e.to_string(),
        })?;
        let before = roots.len();
        for matched in matches {
            match matched {
                Ok(found) => roots.push(found),
                Err(e) => warn!("Skipping unreadable match of {}: {}", entry, e),
            }
        }
        if roots.len() == before {
            roots.push(path);
        }
    }
    Ok(roots)
}

fn is_glob_pattern(entry: &str) -> bool {
    entry.contains(['*', '?', '['])
}

fn check_files(files: &[PathBuf], context: &str) -> Result<()> {
    match files.iter().find(|f| !f.exists()) {
        Some(missing) => Err(GenerateError::FileNotFound {
            context: context.to_string(),
            path: missing.clone(),
        }),
        None => Ok(()),
    }
}

fn read_package_version(base_dir: &Path) -> Option<String> {
    let text = std::fs::read_to_string(base_dir.join("package.json")).ok()?;
    package_version(&text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::ModulePaths;
    use crate::serialization::JsonFileRegistry;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, text: &str) {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, text).unwrap();
    }

    fn dts_options(dir: &Path) -> DtsOptions {
        DtsOptions {
            entries: vec!["src/entries/index.ts".to_string()],
            out: Some(PathBuf::from("build/survey.d.ts")),
            base_dir: Some(dir.to_path_buf()),
            ..DtsOptions::default()
        }
    }

    #[test]
    fn test_generate_dts_reports_configuration_errors() {
        fn single_error(report: &GenerationReport) -> &str {
            assert!(report.has_errors());
            assert_eq!(report.diagnostics.len(), 1, "{:?}", report.diagnostics);
            assert!(report.written.is_empty());
            &report.diagnostics[0].message
        }

        let dir = TempDir::new().unwrap();
        let mut options = dts_options(dir.path());

        options.out = None;
        let report = generate_dts(&options).unwrap();
        assert_eq!(single_error(&report), "out is empty.");

        options.out = Some(PathBuf::from("missing/survey.d.ts"));
        let report = generate_dts(&options).unwrap();
        assert!(single_error(&report).starts_with("directory for out file is not found"));

        fs::create_dir_all(dir.path().join("build")).unwrap();
        options.out = Some(PathBuf::from("build/survey.d.ts"));
        let report = generate_dts(&options).unwrap();
        assert!(single_error(&report).starts_with("File for compiling is not found"));
        assert!(!dir.path().join("build/survey.d.ts").exists());

        options.entries.clear();
        let report = generate_dts(&options).unwrap();
        assert_eq!(single_error(&report), "file list is empty");
    }

    #[test]
    fn test_generate_documentation_reports_missing_input() {
        let dir = TempDir::new().unwrap();
        let options = DocOptions {
            base_dir: Some(dir.path().to_path_buf()),
            ..DocOptions::default()
        };
        let report =
            generate_documentation(&["src/absent.ts".to_string()], &options, None).unwrap();
        assert!(report.has_errors());
        assert!(report.diagnostics[0]
            .message
            .starts_with("File for compiling is not found"));
        assert!(!dir.path().join("docs").exists());
    }

    #[test]
    fn test_generate_dts_bundles_and_validates() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "package.json", "{\n  \"name\": \"survey-react\",\n  \"version\": \"1.9.110\",\n}");
        write(
            dir.path(),
            "build/survey-core/survey.core.d.ts",
            "export declare class Question extends SurveyElement {\n}\nexport interface IElement {\n}",
        );
        write(
            dir.path(),
            "src/entries/index.ts",
            "export * from \"../question_text\";\nexport { Serializer } from \"survey-core\";\n",
        );
        write(
            dir.path(),
            "src/question_text.ts",
            r#"
import { Question } from "survey-core";
export class QuestionText extends Question {
  public get inputType(): string { return ""; }
  public set inputType(val: string) {}
  protected onValueChanged(): void {}
}
"#,
        );

        let mut options = dts_options(dir.path());
        options.name = Some("Type definition for Survey JavaScript library".to_string());
        options.license = Some("MIT".to_string());
        let mut paths = ModulePaths::new();
        paths.insert(
            "survey-core".to_string(),
            vec![PathBuf::from("build/survey-core/survey.core.d.ts")],
        );
        options.paths = paths;
        fs::create_dir_all(dir.path().join("build")).unwrap();

        let report = generate_dts(&options).unwrap();
        assert!(!report.has_errors(), "{:?}", report.diagnostics);
        assert_eq!(report.written.len(), 1, "bundling writes no docs");

        let text = fs::read_to_string(dir.path().join("build/survey.d.ts")).unwrap();
        assert!(text.starts_with("/*\n* Type definition for Survey JavaScript library v1.9.110\n"));
        assert!(text.contains("* License: MIT\n*/\n"));
        assert!(text.contains("import { Question } from \"survey-core\";\n\n"));
        assert!(text.contains("export { Serializer } from \"survey-core\";\n\n"));
        assert!(text.contains(
            "export declare class QuestionText extends Question {\n  get inputType(): string;\n  set inputType(val: string);\n  protected onValueChanged(): void;\n}"
        ));
        assert!(!dir.path().join("docs").exists());
    }

    #[test]
    fn test_generate_documentation_writes_docs_and_schema() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "src/question.ts",
            r#"
/** A question */
export class Question {
  public getType(): string { return "question"; }
  /** Question name */
  public name: string;
  /** Required flag */
  public isRequired: boolean;
}
/** The survey */
export class SurveyModel {
  public getType(): string { return "survey"; }
  /** Questions */
  public questions: Question[];
}
"#,
        );
        let registry = JsonFileRegistry::from_json(
            r#"{
                "survey": { "properties": [ { "name": "questions" } ] },
                "question": { "properties": [
                    { "name": "name" }, { "name": "isRequired", "defaultValue": false }
                ] }
            }"#,
        )
        .unwrap();
        let options = DocOptions {
            generate_json_definition: true,
            base_dir: Some(dir.path().to_path_buf()),
            ..DocOptions::default()
        };

        let report =
            generate_documentation(&["src/*.ts".to_string()], &options, Some(&registry)).unwrap();
        assert_eq!(report.written.len(), 3);

        let docs = dir.path().join("docs");
        let pmes: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(docs.join("pmes.json")).unwrap()).unwrap();
        let is_required = pmes
            .as_array()
            .unwrap()
            .iter()
            .find(|m| m["name"] == "isRequired")
            .unwrap();
        assert_eq!(is_required["isSerialized"], true);
        assert_eq!(is_required["defaultValue"], false);

        let schema: serde_json::Value = serde_json::from_str(
            &fs::read_to_string(docs.join("surveyjs_definition.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(
            schema["definitions"]["question"]["properties"]["isRequired"],
            serde_json::json!({ "type": "boolean" })
        );
    }

    #[test]
    fn test_vue_scratch_files_are_removed() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "src/index.ts",
            "export { default as Rating } from \"./rating.vue\";\n",
        );
        write(
            dir.path(),
            "src/rating.vue",
            "<template><div/></template>\n<script lang=\"ts\">\n/** Rating */\nexport class Rating { public value: number; }\n</script>\n",
        );
        let options = DocOptions {
            base_dir: Some(dir.path().to_path_buf()),
            ..DocOptions::default()
        };
        let report = generate_documentation(&["src/index.ts".to_string()], &options, None).unwrap();
        assert_eq!(report.written.len(), 2);
        assert!(!dir.path().join("src/rating.vue.ts").exists());

        let classes: serde_json::Value = serde_json::from_str(
            &fs::read_to_string(dir.path().join("docs/classes.json")).unwrap(),
        )
        .unwrap();
        let rating = classes
            .as_array()
            .unwrap()
            .iter()
            .find(|c| c["name"] == "Rating")
            .unwrap();
        let value = rating["members"]
            .as_array()
            .unwrap()
            .iter()
            .find(|m| m["name"] == "value")
            .unwrap();
        assert_eq!(value["type"], "number");
        assert_eq!(value["isField"], true);
    }

    #[test]
    fn test_expand_entries() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "src/a.ts", "");
        write(dir.path(), "src/b.ts", "");
        let roots = expand_entries(
            &["src/*.ts".to_string(), "src/none*.ts".to_string(), "c.ts".to_string()],
            dir.path(),
        )
        .unwrap();
        let names: Vec<String> = roots
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.ts", "b.ts", "none*.ts", "c.ts"]);
    }
}
