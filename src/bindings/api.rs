// API Functions - PyO3-exposed functions for Python
//
// Thin wrappers over the generator entry points. Options are passed as the
// same JSON objects the generator reads from option files.

use super::PyGenerationReport;
use crate::dts::syntax_errors;
use crate::generator;
use crate::options::{DocOptions, DtsOptions};
use crate::serialization::JsonFileRegistry;
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

/// Extract documentation from entry files and write the configured artifacts
///
/// Args:
///     entries (list[str]): Entry files or glob patterns, relative to `baseDir`
///     options (str | None): JSON object with the documentation options
///     registry (str | None): JSON dump of the serialization metadata registry
///
/// Returns:
///     GenerationReport: Diagnostics and written files
///
/// Raises:
///     ValueError: If the options or registry are invalid, or writing fails
#[pyfunction]
#[pyo3(signature = (entries, options=None, registry=None))]
pub fn generate_documentation(
    py: Python<'_>,
    entries: Vec<String>,
    options: Option<&str>,
    registry: Option<&str>,
) -> PyResult<PyGenerationReport> {
    let options: DocOptions = match options {
        Some(json) => serde_json::from_str(json)
            .map_err(|e| PyValueError::new_err(format!("Invalid options: {}", e)))?,
        None => DocOptions::default(),
    };
    let registry = registry
        .map(JsonFileRegistry::from_json)
        .transpose()
        .map_err(|e| PyValueError::new_err(format!("Invalid registry: {}", e)))?;

    // Release the GIL for the file-system heavy run
    let report = py
        .detach(|| {
            generator::generate_documentation(
                &entries,
                &options,
                registry.as_ref().map(|r| r as &dyn crate::serialization::MetadataRegistry),
            )
        })
        .map_err(|e| PyValueError::new_err(format!("Generation failed: {}", e)))?;

    Ok(PyGenerationReport::from_report(report))
}

/// Bundle entry files into one declaration file
///
/// Args:
///     options (str): JSON object with `entries`, `out` and optional `paths`,
///         `excludeImports`, `name`, `license`
///
/// Returns:
///     GenerationReport: Diagnostics (including syntax errors of the output) and written files
#[pyfunction]
#[pyo3(signature = (options))]
pub fn generate_dts(py: Python<'_>, options: &str) -> PyResult<PyGenerationReport> {
    let options: DtsOptions = serde_json::from_str(options)
        .map_err(|e| PyValueError::new_err(format!("Invalid options: {}", e)))?;
    let report = py
        .detach(|| generator::generate_dts(&options))
        .map_err(|e| PyValueError::new_err(format!("Generation failed: {}", e)))?;
    Ok(PyGenerationReport::from_report(report))
}

/// Syntax errors of a declaration text
///
/// Returns:
///     list[str]: One message per error or missing node; empty when the text parses cleanly
#[pyfunction]
pub fn validate_declarations(text: &str) -> PyResult<Vec<String>> {
    syntax_errors(text).map_err(|e| PyValueError::new_err(format!("Validation failed: {}", e)))
}
