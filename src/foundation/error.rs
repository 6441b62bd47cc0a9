//! Crate-wide error taxonomy and result alias.

/// Convenience result type used across lumatile.
pub type LumatileResult<T> = Result<T, LumatileError>;

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum LumatileError {
    /// Invalid user-provided argument or out-of-range index.
    #[error("validation error: {0}")]
    Validation(String),

    /// Unknown pixel format, unsupported conversion, or unsupported
    /// component width.
    #[error("format error: {0}")]
    Format(String),

    /// Ownership violation: attaching an already-owned chain, re-parenting
    /// a linked tile, or detaching through the wrong owner.
    #[error("ownership error: {0}")]
    Ownership(String),

    /// Errors when serializing or deserializing preference trees.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LumatileError {
    /// Build a [`LumatileError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`LumatileError::Format`] value.
    pub fn format(msg: impl Into<String>) -> Self {
        Self::Format(msg.into())
    }

    /// Build a [`LumatileError::Ownership`] value.
    pub fn ownership(msg: impl Into<String>) -> Self {
        Self::Ownership(msg.into())
    }

    /// Build a [`LumatileError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
