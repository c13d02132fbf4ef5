use std::path::PathBuf;

/// Failures a pipeline stage can surface. Data-quality problems inside a
/// table never land here: they coerce to zero or `NO_SIGNAL` instead.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("required input {} not found", path.display())]
    MissingInput { path: PathBuf },
    #[error("{table} has no '{column}' column to join on")]
    MissingColumn {
        column: &'static str,
        table: &'static str,
    },
    #[error("client {client_code} not found in the client table")]
    ClientNotFound { client_code: String },
    #[error("client code must be a number, got '{raw}'")]
    InvalidClientCode { raw: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("invalid CSV data: {0}")]
    Csv(#[from] csv::Error),
}

impl PipelineError {
    pub(crate) fn missing_input(path: impl Into<PathBuf>) -> Self {
        Self::MissingInput { path: path.into() }
    }
}
