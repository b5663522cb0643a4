// dtsgen Core - tree-sitter powered declaration bundler and API doc extractor
//
// Reads annotated TypeScript sources and renders three artifacts from one
// entity model: the JSON documentation dump, a JSON schema of the
// serializable classes, and a bundled `.d.ts` file.
// Architecture: program loading -> extraction -> hierarchy -> renderers.

pub mod diagnostics;
pub mod error;
pub mod language;
pub mod model;
pub mod options;
pub mod program;
pub mod textscan;

// Dtsgen-specific utilities
pub mod utils;

pub mod extractors;
pub mod hierarchy;
pub mod serialization;

// Renderers
pub mod docs;
pub mod dts;
pub mod schema;

pub mod generator;

// PyO3 bindings layer
#[cfg(feature = "python")]
pub mod bindings;

pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use error::{GenerateError, Result};
pub use generator::{generate_documentation, generate_dts, GenerationContext, GenerationReport};
pub use model::{Entity, EntityKind, EntityModel, Member, PmeType};
pub use options::{DocOptions, DtsOptions, SchemaOptions};
pub use serialization::{JsonFileRegistry, MetadataRegistry};

#[cfg(feature = "python")]
use pyo3::prelude::*;

/// dtsgen Core Python module
///
/// Provides the documentation and declaration generators.
#[cfg(feature = "python")]
#[pymodule]
fn dtsgen_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;

    // Add Python functions
    m.add_function(wrap_pyfunction!(bindings::generate_documentation, m)?)?;
    m.add_function(wrap_pyfunction!(bindings::generate_dts, m)?)?;
    m.add_function(wrap_pyfunction!(bindings::validate_declarations, m)?)?;

    // Add Python classes
    m.add_class::<bindings::PyGenerationReport>()?;

    Ok(())
}
