//! Generator options
//!
//! Field names follow the camelCase keys of the JSON option objects the
//! generator has always been driven with, so existing driver configs load
//! unchanged via [`DtsOptions::from_json_file`] / [`DocOptions::from_json_file`].

use crate::error::{GenerateError, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// External module name -> pre-built declaration files for that module
pub type ModulePaths = IndexMap<String, Vec<PathBuf>>;

/// Options of the full documentation run (docs, schema and/or d.ts)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DocOptions {
    /// `None` means "use the mode default" (on for docs-only runs, off when bundling)
    pub generate_doc: Option<bool>,
    #[serde(rename = "generateJSONDefinition")]
    pub generate_json_definition: bool,
    pub dts_output: Option<PathBuf>,
    pub dts_exclude_imports: bool,
    pub paths: ModulePaths,
    pub name: Option<String>,
    pub license: Option<String>,
    pub copyright: Option<String>,
    pub render_doc_comments: bool,
    /// Directory every relative path is resolved against (defaults to the process cwd)
    pub base_dir: Option<PathBuf>,
    pub docs_dir: PathBuf,
    pub schema: SchemaOptions,
}

impl Default for DocOptions {
    fn default() -> Self {
        Self {
            generate_doc: None,
            generate_json_definition: false,
            dts_output: None,
            dts_exclude_imports: false,
            paths: IndexMap::new(),
            name: None,
            license: None,
            copyright: None,
            render_doc_comments: false,
            base_dir: None,
            docs_dir: PathBuf::from("docs"),
            schema: SchemaOptions::default(),
        }
    }
}

impl DocOptions {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| GenerateError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Bundling mode is on whenever an output file is configured
    pub fn generate_dts(&self) -> bool {
        self.dts_output.is_some()
    }

    /// Doc mode defaults on, but off when bundling unless explicitly re-enabled
    pub fn generate_docs(&self) -> bool {
        if self.generate_dts() {
            self.generate_doc == Some(true)
        } else {
            self.generate_doc != Some(false)
        }
    }

    pub fn base_dir(&self) -> PathBuf {
        self.base_dir
            .clone()
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn resolve(&self, path: &Path) -> PathBuf {
        crate::utils::paths::absolute_from(&self.base_dir(), path)
    }
}

/// Options of the JSON-Schema emitter
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SchemaOptions {
    pub root: String,
    pub title: String,
    pub file_name: String,
    /// Type names that are looked up under another class name (interface -> implementation)
    pub type_aliases: IndexMap<String, String>,
}

impl Default for SchemaOptions {
    fn default() -> Self {
        let mut type_aliases = IndexMap::new();
        type_aliases.insert("IElement".to_string(), "SurveyElement".to_string());
        Self {
            root: "SurveyModel".to_string(),
            title: "SurveyJS Library json schema".to_string(),
            file_name: "surveyjs_definition.json".to_string(),
            type_aliases,
        }
    }
}

/// Options of the d.ts bundling driver
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DtsOptions {
    /// Entry files; glob patterns are expanded relative to `base_dir`
    pub entries: Vec<String>,
    pub out: Option<PathBuf>,
    pub exclude_imports: bool,
    pub paths: ModulePaths,
    pub name: Option<String>,
    pub license: Option<String>,
    pub copyright: Option<String>,
    pub render_doc_comments: bool,
    pub base_dir: Option<PathBuf>,
}

impl DtsOptions {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| GenerateError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Bundling never writes the JSON docs or the schema
    pub fn to_doc_options(&self) -> DocOptions {
        DocOptions {
            generate_doc: Some(false),
            generate_json_definition: false,
            dts_output: self.out.clone(),
            dts_exclude_imports: self.exclude_imports,
            paths: self.paths.clone(),
            name: self.name.clone(),
            license: self.license.clone(),
            copyright: self.copyright.clone(),
            render_doc_comments: self.render_doc_comments,
            base_dir: self.base_dir.clone(),
            ..DocOptions::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_doc_mode_defaults() {
        let options = DocOptions::default();
        assert!(options.generate_docs());
        assert!(!options.generate_dts());

        let bundling = DocOptions {
            dts_output: Some(PathBuf::from("out.d.ts")),
            ..DocOptions::default()
        };
        assert!(bundling.generate_dts());
        assert!(
            !bundling.generate_docs(),
            "Docs should default off when bundling"
        );

        let both = DocOptions {
            generate_doc: Some(true),
            ..bundling
        };
        assert!(both.generate_docs(), "Docs can be re-enabled explicitly");
    }

    #[test]
    fn test_dts_options_from_json() {
        let json = r#"{
            "entries": ["./src/entries/index.ts"],
            "out": "./build/survey.d.ts",
            "name": "Type definition",
            "excludeImports": true,
            "paths": { "survey-core": ["./build/survey-core/survey.core.d.ts"] }
        }"#;
        let options: DtsOptions = serde_json::from_str(json).unwrap();
        assert_eq!(options.entries, vec!["./src/entries/index.ts"]);
        assert!(options.exclude_imports);
        assert_eq!(options.paths["survey-core"].len(), 1);

        let doc = options.to_doc_options();
        assert_eq!(doc.generate_doc, Some(false));
        assert!(doc.dts_exclude_imports);
        assert_eq!(doc.dts_output, Some(PathBuf::from("./build/survey.d.ts")));
    }

    #[test]
    fn test_schema_defaults() {
        let schema = SchemaOptions::default();
        assert_eq!(schema.root, "SurveyModel");
        assert_eq!(
            schema.type_aliases.get("IElement").map(String::as_str),
            Some("SurveyElement")
        );
    }
}
