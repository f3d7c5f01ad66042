use std::path::PathBuf;

/// Errors surfaced by the dataset store and the query engine.
///
/// An empty result is never an error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The source file is missing, unreadable or does not match the schema.
    #[error("dataset unavailable ({}): {reason}", .path.display())]
    DataUnavailable { path: PathBuf, reason: String },

    /// A sort or group field outside the permitted set.
    #[error("invalid field '{0}'")]
    InvalidField(String),

    /// A sort direction other than ascending/descending.
    #[error("invalid sort order '{0}', expected 'asc' or 'desc'")]
    InvalidSortOrder(String),

    /// A query string that does not decode into the expected parameters.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

impl Error {
    /// Whether the error was caused by the caller's parameters rather than
    /// by the dataset.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidField(_) | Error::InvalidSortOrder(_) | Error::InvalidParameter(_)
        )
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
