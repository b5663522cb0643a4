// PyO3 Bindings Module
//
// Python entry points for the documentation and declaration generators.

mod api;
mod report;

// Re-export for lib.rs
pub use api::{generate_documentation, generate_dts, validate_declarations};
pub use report::PyGenerationReport;
