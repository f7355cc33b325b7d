//! Error taxonomy shared by the store, the engine and the service facade.

use thiserror::Error;

/// Failures raised by a [`crate::store::LocationStore`] implementation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    #[error("coordinate out of range: latitude {latitude}, longitude {longitude}")]
    InvalidCoordinate { latitude: f64, longitude: f64 },

    /// Rendered verbatim in HTTP 500 bodies.
    #[error("ERR value is not a valid float")]
    InvalidFloat { field: &'static str, value: String },

    #[error("location store unavailable: {0}")]
    Unavailable(String),

    #[error("location journal error: {0}")]
    Journal(String),
}

/// Every outcome a core operation can fail with.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProximityError {
    /// Required input missing or malformed; nothing was read or written.
    #[error("{0}")]
    Validation(String),

    /// The reference entity has no sample at the current second.
    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ProximityError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }
}

pub type ProximityResult<T> = Result<T, ProximityError>;
