use crate::foundation::time::MediaTime;

/// Convenience result type used across strata.
pub type StrataResult<T> = Result<T, StrataError>;

/// Top-level error taxonomy used by layout and dispatch APIs.
#[derive(thiserror::Error, Debug)]
pub enum StrataError {
    /// Invalid user-provided timeline data.
    #[error("validation error: {0}")]
    Validation(String),

    /// A leaf layer whose end is not after its start.
    #[error("invalid layer range: layer '{layer}' spans {start} - {end}")]
    InvalidLayerRange {
        /// Id of the offending layer.
        layer: String,
        /// Declared start.
        start: MediaTime,
        /// Declared end.
        end: MediaTime,
    },

    /// Errors while configuring or running render dispatch.
    #[error("dispatch error: {0}")]
    Dispatch(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StrataError {
    /// Build a [`StrataError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`StrataError::Dispatch`] value.
    pub fn dispatch(msg: impl Into<String>) -> Self {
        Self::Dispatch(msg.into())
    }

    /// Build a [`StrataError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
