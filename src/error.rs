// src/error.rs
use thiserror::Error;

/// Which device sensor a permission or availability problem refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sensor {
    Position,
    Heading,
}

impl std::fmt::Display for Sensor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Sensor::Position => write!(f, "position"),
            Sensor::Heading => write!(f, "heading"),
        }
    }
}

#[derive(Error, Debug)]
pub enum WayfindError {
    #[error("Invalid coordinates: ({latitude}, {longitude})")]
    InvalidCoordinates { latitude: f64, longitude: f64 },

    #[error("Degenerate input: {0}")]
    DegenerateInput(String),

    #[error("Permission denied for {0} sensor")]
    SensorPermissionDenied(Sensor),

    #[error("Invalid query type: {0}")]
    InvalidQueryType(String),

    #[error("Sensor source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("JSON processing error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl WayfindError {
    /// Creates an `InvalidCoordinates` error for the given pair.
    pub(crate) fn invalid_coordinates(latitude: f64, longitude: f64) -> Self {
        WayfindError::InvalidCoordinates {
            latitude,
            longitude,
        }
    }

    /// Returns true for errors that indicate a caller/core contract violation.
    ///
    /// These are programming errors and should be surfaced as hard failures.
    /// Everything else comes from noisy external input and is recovered locally.
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, WayfindError::InvalidQueryType(_))
    }
}
