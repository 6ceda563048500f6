use thiserror::Error;

/// Failures reported by the collaborators behind the editor
/// (token provider, inpainting backend).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("Failed to obtain an auth token: {0}")]
    Token(String),

    #[error("Inpainting request failed: {0}")]
    Request(String),

    #[error("Inpainting service returned no image")]
    EmptyResponse,
}

/// Errors that can occur while editing, rendering or exporting
#[derive(Error, Debug)]
pub enum EditorError {
    /// No file has been loaded, so there is nothing to draw on
    #[error("No canvas: load an image first")]
    NoCanvas,

    #[error("Canvas has zero size")]
    ZeroSizeCanvas,

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

/// Result type for editor operations
pub type EditorResult<T> = Result<T, EditorError>;
