use thiserror::Error;

#[derive(Debug, Error)]
pub enum PickerError {
    #[error("not initialized: run 'picker init'")]
    NotInitialized,

    #[error("invalid catalogue: {0}")]
    CatalogueShape(String),

    #[error("invalid tag file: {0}")]
    TagsShape(String),

    #[error("commander not found: {0}")]
    CommanderNotFound(String),

    #[error("commander already exists: {0}")]
    CommanderExists(String),

    #[error("invalid commander: {0}")]
    InvalidCommander(String),

    #[error("invalid colour identity '{0}': expected symbols from W, U, B, R, G, C")]
    InvalidColourIdentity(String),

    #[error("invalid partner kind: {0}")]
    InvalidPartnerKind(String),

    #[error("invalid assignment: {0}")]
    InvalidAssignment(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PickerError>;
