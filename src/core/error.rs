//! Error types for the grid painter

use thiserror::Error;

/// Main error type for the painter
///
/// Only recoverable conditions live here. A non-positive cell size is
/// asserted at construction instead.
#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Palette error: {0}")]
    Palette(String),

    #[error("Scene error: {0}")]
    Scene(String),

    #[error("Settings error: {0}")]
    Settings(String),
}
