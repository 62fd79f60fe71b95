//! Session identifiers and the generators that produce them.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque session identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Wrap an identifier string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for SessionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for SessionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl AsRef<str> for SessionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Failure to produce a session identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Failed to generate session ID: {0}")]
pub struct IdGenerationError(String);

impl IdGenerationError {
    /// Create an error with the given reason.
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }

    /// The reason the generator gave.
    pub fn reason(&self) -> &str {
        &self.0
    }
}

/// Source of session identifiers.
///
/// Identifiers must be unique with overwhelming probability for the lifetime
/// of the process. Any closure `Fn() -> Result<String, IdGenerationError>`
/// is a generator.
pub trait IdGenerator: Send + Sync + 'static {
    /// Produce a fresh identifier.
    fn generate(&self) -> Result<String, IdGenerationError>;
}

impl<F> IdGenerator for F
where
    F: Fn() -> Result<String, IdGenerationError> + Send + Sync + 'static,
{
    fn generate(&self) -> Result<String, IdGenerationError> {
        self()
    }
}

/// Generates random v4 UUIDs from the OS random source.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn generate(&self) -> Result<String, IdGenerationError> {
        Ok(Uuid::new_v4().to_string())
    }
}
