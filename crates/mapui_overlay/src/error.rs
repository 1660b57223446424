//! Overlay error types

use thiserror::Error;

/// Errors raised while loading overlay configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Malformed JSON option document
    #[error("Invalid JSON overlay options: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed TOML option document
    #[error("Invalid TOML overlay options: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Overlay engine errors
///
/// Lifecycle entry points never surface these; they log and degrade to a
/// no-op. Lower-level helpers return them so the degradation is explicit.
#[derive(Error, Debug)]
pub enum OverlayError {
    /// No owner, or the owner is not on a map
    #[error("Overlay has no map")]
    NoMap,

    /// The overlay is not attached to an owner
    #[error("Overlay is detached")]
    Detached,

    /// No coordinate given, none remembered and the owner has no center
    #[error("Overlay has no coordinate to show at")]
    NoCoordinate,

    /// The map has no panel with the configured name
    #[error("Map has no panel named {0:?}")]
    MissingPanel(String),

    /// Option document could not be loaded
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type for overlay operations
pub type Result<T> = std::result::Result<T, OverlayError>;
