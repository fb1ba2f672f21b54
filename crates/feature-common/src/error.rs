//! Error types for feature geometry handling.

use thiserror::Error;

/// Result type alias using FeatureError.
pub type FeatureResult<T> = Result<T, FeatureError>;

#[derive(Debug, Error, PartialEq)]
pub enum FeatureError {
    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Coordinate ring is empty")]
    EmptyRing,

    #[error("Unsupported geometry type for extent: {0}")]
    UnsupportedGeometry(String),
}
