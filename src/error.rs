use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while setting a sketch up.
///
/// Once a session is running nothing in the frame path returns an error; every
/// variant here is a startup or configuration failure.
#[derive(Debug, Error)]
pub enum SketchError {
    /// Missing rendering context, unusable viewport, or window creation failure.
    #[error("initialization failed: {0}")]
    Initialization(String),

    #[error("unknown geometry kind '{0}'")]
    UnknownGeometryKind(String),

    /// A geometry generator produced buffers that break the provider contract.
    #[error("invalid geometry for '{kind}': {reason}")]
    InvalidGeometry { kind: String, reason: String },

    #[error("unknown fill style '{0}' (expected fill, wireframe or fillwireframe)")]
    UnknownFillStyle(String),

    #[error("invalid key binding: {0}")]
    InvalidBinding(String),

    #[error("failed to read config file '{}': {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SketchError>;
