//! Crate-wide error handling
//!
//! Each subsystem keeps its own error enum; `SimError` wraps them for the
//! water facade and the configuration loader.

use crate::terrain::TerrainError;
use crate::trapezoidal_map::MapError;

/// Result type for simulation setup
pub type SimResult<T> = Result<T, SimError>;

#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error("Point-location index error: {0}")]
    Map(#[from] MapError),

    #[error("Terrain error: {0}")]
    Terrain(#[from] TerrainError),

    #[error("Invalid parameter `{name}`: {message}")]
    InvalidParameter { name: &'static str, message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<toml::de::Error> for SimError {
    fn from(err: toml::de::Error) -> Self {
        SimError::Config {
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for SimError {
    fn from(err: toml::ser::Error) -> Self {
        SimError::Config {
            message: err.to_string(),
        }
    }
}
