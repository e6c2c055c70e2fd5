/// Erreurs du catalogue.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IndexError {
    #[error("Element not found: {0}")]
    NotFound(String),

    #[error("Element already indexed under {parent_id}: {path}")]
    DuplicateElement { parent_id: String, path: String },

    #[error("Root node {root_id} is already bound to another share")]
    RootAlreadyBound { root_id: String },
}

/// Result type for catalog operations
pub type Result<T> = std::result::Result<T, IndexError>;
