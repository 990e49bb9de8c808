use thiserror::Error;

/// Why a single document was skipped. Never aborts the batch.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("unsupported file type: {0}")]
    Unsupported(String),

    #[error("cannot read file: {0}")]
    Read(#[from] std::io::Error),

    #[error("cannot extract PDF text: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("no extractable text")]
    NoText,

    #[error("processing panicked: {0}")]
    Panicked(String),
}
