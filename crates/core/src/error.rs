//! Error types for the scaffold harness.

use thiserror::Error;

/// Result type alias using the harness's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the scaffold harness.
#[derive(Error, Debug)]
pub enum Error {
    // =========================================================================
    // Packaging
    // =========================================================================
    #[error("Packaging error: {0}")]
    Packaging(String),

    // =========================================================================
    // Image lifecycle
    // =========================================================================
    #[error("Image build failed: {0}")]
    ImageBuild(String),

    // =========================================================================
    // Sandbox launch
    // =========================================================================
    #[error("Sandbox error: {0}")]
    Sandbox(String),

    // =========================================================================
    // Bridge
    // =========================================================================
    #[error("Bridge transport error: {0}")]
    Transport(String),

    #[error("Bridge server error: {0}")]
    Server(String),

    #[error("Model provider error: {0}")]
    ModelProvider(String),

    // =========================================================================
    // Generic
    // =========================================================================
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Create a packaging error.
    pub fn packaging(msg: impl Into<String>) -> Self {
        Self::Packaging(msg.into())
    }

    /// Create an image build error.
    pub fn image_build(msg: impl Into<String>) -> Self {
        Self::ImageBuild(msg.into())
    }

    /// Create a sandbox error.
    pub fn sandbox(msg: impl Into<String>) -> Self {
        Self::Sandbox(msg.into())
    }

    /// Create a bridge transport error.
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a bridge server error.
    pub fn server(msg: impl Into<String>) -> Self {
        Self::Server(msg.into())
    }

    /// Create a model provider error.
    pub fn model_provider(msg: impl Into<String>) -> Self {
        Self::ModelProvider(msg.into())
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
