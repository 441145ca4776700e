use std::path::PathBuf;

use thiserror::Error;

/// Error types for catalog loading, saving and editing
#[derive(Debug, Error)]
pub enum LinguistError {
    /// The file could not be read or written
    #[error("Cannot access '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The file was read but its content is not valid for the format
    #[error("Cannot parse '{}': {message}", path.display())]
    Parse { path: PathBuf, message: String },
    /// The file parsed fine but holds no messages
    #[error(
        "The translation file '{}' will not be loaded because it is empty.",
        path.display()
    )]
    EmptyCatalog { path: PathBuf },
    /// No registered format handles this file (or this direction)
    #[error("Unknown or unsupported file format for '{}'", path.display())]
    UnsupportedFormat { path: PathBuf },
    /// A model, context or message index is out of range
    #[error("Invalid index: {0}")]
    InvalidIndex(String),
    /// The file at this slot was opened read-only
    #[error("File #{0} is opened read-only")]
    ReadOnlyModel(usize),
}

impl LinguistError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        LinguistError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        LinguistError::Parse {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Result type for catalog operations
pub type Result<T> = std::result::Result<T, LinguistError>;
