//! Error types for U-Floorplan.

use thiserror::Error;

/// Result type alias for U-Floorplan operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or evaluating a floorplan.
#[derive(Debug, Error)]
pub enum Error {
    /// Module with unusable dimensions (non-positive or non-finite area/aspect ratio).
    #[error("Invalid module: {0}")]
    InvalidModule(String),

    /// Two modules share the same name.
    #[error("Duplicate module name: {0}")]
    DuplicateModule(String),

    /// An expression references a module that is not in the catalog.
    #[error("Unknown module: {0}")]
    UnknownModule(String),

    /// A partition token other than `H` or `V`.
    #[error("Invalid partition token: {0:?}")]
    InvalidToken(String),

    /// Expression violates a structural invariant.
    #[error("Invalid expression: {0}")]
    InvalidExpression(String),

    /// Search requested over a catalog with no modules.
    #[error("Module catalog is empty")]
    EmptyCatalog,

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}
