use thiserror::Error;

/// Errors that abort report generation. Data-quality issues (unparseable
/// cells, missing months, makers absent from a year) are never errors; they
/// are absorbed by the substitution policies in `normalize` and `metrics`.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XLSX read error: {0}")]
    XlsxRead(#[from] calamine::XlsxError),

    #[error("sheet not found: {0}")]
    SheetNotFound(String),

    /// The header structure or the identifying column could not be resolved.
    #[error("schema error: {0}")]
    Schema(String),

    /// A required aggregate column is missing from the input entirely.
    #[error("input shape error: {0}")]
    InputShape(String),
}
