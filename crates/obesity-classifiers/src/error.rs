use std::error::Error;
use std::fmt;
use std::path::PathBuf;

/// Failures raised by the loader, trainer and inference invoker.
///
/// The first four variants are the recoverable, caller-facing kinds; the rest
/// wrap I/O, parsing and numerical failures that abort the current operation.
#[derive(Debug)]
pub enum PipelineError {
    DatasetNotFound(PathBuf),
    SchemaError(String),
    ArtifactNotFound(PathBuf),
    FieldMismatch(String),
    InvalidConfig(String),
    Io(std::io::Error),
    Csv(csv::Error),
    Json(serde_json::Error),
    Model(String),
}

pub type Result<T> = std::result::Result<T, PipelineError>;

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PipelineError::DatasetNotFound(path) => {
                write!(f, "Dataset not found: {}", path.display())
            }
            PipelineError::SchemaError(msg) => write!(f, "Schema error: {}", msg),
            PipelineError::ArtifactNotFound(path) => {
                write!(f, "Model artifact not found: {}", path.display())
            }
            PipelineError::FieldMismatch(msg) => write!(f, "Record field mismatch: {}", msg),
            PipelineError::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
            PipelineError::Io(e) => write!(f, "I/O error: {}", e),
            PipelineError::Csv(e) => write!(f, "CSV error: {}", e),
            PipelineError::Json(e) => write!(f, "JSON error: {}", e),
            PipelineError::Model(msg) => write!(f, "Model failure: {}", msg),
        }
    }
}

impl Error for PipelineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PipelineError::Io(e) => Some(e),
            PipelineError::Csv(e) => Some(e),
            PipelineError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for PipelineError {
    fn from(e: std::io::Error) -> Self {
        PipelineError::Io(e)
    }
}

impl From<csv::Error> for PipelineError {
    fn from(e: csv::Error) -> Self {
        PipelineError::Csv(e)
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(e: serde_json::Error) -> Self {
        PipelineError::Json(e)
    }
}
