use std::path::PathBuf;

use thiserror::Error;

/// All errors the crate can surface. Font problems are not here: a font that
/// cannot be registered degrades to the builtin family and is only logged.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A record rejected by entry validation
    #[error("invalid record: {0}")]
    InvalidRecord(String),

    /// Text could not be measured, so it cannot be positioned
    #[error("cannot measure text: {0}")]
    Measurement(String),

    #[error("PDF generation failed: {0}")]
    Pdf(String),

    /// Writing the finished document failed; nothing is left at `path`
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Two or more records derive the same output file name (1-based indices)
    #[error("output name collision: {name} is derived by records {indices:?}")]
    Collision { name: String, indices: Vec<usize> },

    #[error("refusing to overwrite existing file {}", .0.display())]
    Exists(PathBuf),
}

impl Error {
    /// True for the pre-flight checks that run before anything is written.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::InvalidRecord(_) | Error::Collision { .. } | Error::Exists(_)
        )
    }
}
