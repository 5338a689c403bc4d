//! Shared primitives used across Sprinkle crates.

use thiserror::Error;

/// Result alias used across the workspace.
pub type SprinkleResult<T> = Result<T, SprinkleError>;

/// Workspace error: a stable dotted code plus a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code}: {message}")]
pub struct SprinkleError {
    pub code: &'static str,
    pub message: String,
}

impl SprinkleError {
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// True when the code belongs to the given dotted namespace (`"dom"`, `"dom.selector"`).
    pub fn is_in(&self, namespace: &str) -> bool {
        self.code == namespace
            || self
                .code
                .strip_prefix(namespace)
                .is_some_and(|rest| rest.starts_with('.'))
    }
}

/// Milliseconds on the page's virtual clock.
pub type Millis = u64;
