// PyGenerationReport - PyO3 wrapper for a GenerationReport
//
// Diagnostics and written files of one generation run

use crate::diagnostics::Severity;
use crate::generator::GenerationReport;
use pyo3::prelude::*;

/// Python-accessible result of a generation run
#[pyclass(name = "GenerationReport")]
pub struct PyGenerationReport {
    inner: GenerationReport,
}

impl PyGenerationReport {
    pub fn from_report(report: GenerationReport) -> Self {
        PyGenerationReport { inner: report }
    }
}

#[pymethods]
impl PyGenerationReport {
    /// Error messages, in report order
    #[getter]
    fn errors(&self) -> Vec<String> {
        self.messages(Severity::Error)
    }

    #[getter]
    fn warnings(&self) -> Vec<String> {
        self.messages(Severity::Warning)
    }

    /// Paths of the files written
    #[getter]
    fn written(&self) -> Vec<String> {
        self.inner
            .written
            .iter()
            .map(|p| p.to_string_lossy().into_owned())
            .collect()
    }

    #[getter]
    fn has_errors(&self) -> bool {
        self.inner.has_errors()
    }

    fn __repr__(&self) -> String {
        format!(
            "GenerationReport(errors={}, warnings={}, written={})",
            self.messages(Severity::Error).len(),
            self.messages(Severity::Warning).len(),
            self.inner.written.len()
        )
    }
}

impl PyGenerationReport {
    fn messages(&self, severity: Severity) -> Vec<String> {
        self.inner
            .diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .map(|d| d.message.clone())
            .collect()
    }
}
