use thiserror::Error;

/// Failure reported by a [`MatrixSink`](super::MatrixSink).
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum SinkError {
    #[error("sink rejected the write: {0}")]
    Rejected(String),
}

/// Render object failures.
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum RenderError {
    #[error("render object `{label}` used after release")]
    UseAfterRelease { label: String },

    #[error("sink write for `{label}` failed")]
    SinkWriteFailed {
        label: String,
        #[source]
        source: SinkError,
    },
}
