use pmodidl::DidlError;

/// Erreurs de navigation.
#[derive(Debug, thiserror::Error)]
pub enum BrowseError {
    #[error("Object not found: {0}")]
    ObjectNotFound(String),

    #[error("Invalid BrowseFlag: {0}")]
    InvalidBrowseFlag(String),

    #[error(transparent)]
    Didl(#[from] DidlError),
}

/// Result type for browse operations
pub type Result<T> = std::result::Result<T, BrowseError>;
