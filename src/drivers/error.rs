use std::path::PathBuf;
use thiserror::Error;
#[derive(Debug, Error)]
pub enum TraceError {
    #[error("failed to read trace file {path}: {source}")]
    FileLoad {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed trace data at line {line}: {reason}")]
    Malformed { line: usize, reason: String },
    #[error("sample rate must be greater than zero")]
    InvalidSampleRate,
    #[error("insufficient samples: need at least {required}, got {actual}")]
    InsufficientSamples { required: usize, actual: usize },
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("spectrum length mismatch: {frequencies} frequencies vs {amplitudes} amplitudes")]
    SpectrumLengthMismatch {
        frequencies: usize,
        amplitudes: usize,
    },
    #[error("worker task {task} panicked")]
    TaskPanicked { task: usize },
    #[error("failed to build worker pool: {0}")]
    WorkerPool(String),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("failed to render plot: {0}")]
    Plot(String),
}
impl<E: std::error::Error + Send + Sync + 'static> From<plotters::drawing::DrawingAreaErrorKind<E>>
    for TraceError
{
    fn from(value: plotters::drawing::DrawingAreaErrorKind<E>) -> Self {
        TraceError::Plot(format!("{value:?}"))
    }
}
impl From<image::ImageError> for TraceError {
    fn from(value: image::ImageError) -> Self {
        TraceError::Plot(value.to_string())
    }
}
impl From<ndarray::ShapeError> for TraceError {
    fn from(value: ndarray::ShapeError) -> Self {
        TraceError::InvalidArgument(value.to_string())
    }
}
impl From<serde_json::Error> for TraceError {
    fn from(value: serde_json::Error) -> Self {
        TraceError::Config(value.to_string())
    }
}
impl From<csv::Error> for TraceError {
    fn from(value: csv::Error) -> Self {
        let line = value.position().map(|pos| pos.line() as usize).unwrap_or(0);
        match value.into_kind() {
            csv::ErrorKind::Io(source) => TraceError::FileLoad {
                path: PathBuf::new(),
                source,
            },
            kind => TraceError::Malformed {
                line,
                reason: format!("{kind:?}"),
            },
        }
    }
}
impl From<rayon::ThreadPoolBuildError> for TraceError {
    fn from(value: rayon::ThreadPoolBuildError) -> Self {
        TraceError::WorkerPool(value.to_string())
    }
}
