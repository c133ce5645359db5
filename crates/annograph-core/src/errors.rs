//! Error types for annograph-core.
//!
//! All failures in this crate are final: inputs are either well-formed and
//! the operation proceeds, or malformed and the operation fails with a
//! descriptive message. No operation retries, and no operation leaves a
//! partially mutated engine behind.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type AnnographResult<T> = Result<T, AnnographError>;

/// All error conditions produced by annograph-core.
#[derive(Debug, Error)]
pub enum AnnographError {
    /// The load specification violates the recognized-section/shape rules.
    ///
    /// The report lists every violation found, one per line, not just the
    /// first.
    #[error("load spec is invalid:\n{report}")]
    SpecShape { report: String },

    /// A serialized data key failed to decompose, or a component contains
    /// a reserved character. Indicates a catalog-integrity or programming
    /// error.
    #[error("malformed data key: {0}")]
    KeyFormat(String),

    /// A lookup missed both the full key and its minimal-key fallback in
    /// the item catalog.
    #[error("unknown data key: {0}")]
    UnknownKey(String),

    /// A per-origin compiled-data directory was needed but not configured.
    #[error("data environment incomplete: {0}")]
    Environment(String),
}

impl AnnographError {
    /// Build a [`AnnographError::SpecShape`] from a list of violations.
    pub fn spec_shape<I, S>(violations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let report = violations
            .into_iter()
            .map(Into::into)
            .collect::<Vec<_>>()
            .join("\n");
        Self::SpecShape { report }
    }

    /// Build a [`AnnographError::KeyFormat`].
    pub fn key_format(msg: impl Into<String>) -> Self {
        Self::KeyFormat(msg.into())
    }

    /// Build a [`AnnographError::UnknownKey`].
    pub fn unknown_key(key: impl Into<String>) -> Self {
        Self::UnknownKey(key.into())
    }

    /// Build a [`AnnographError::Environment`].
    pub fn environment(msg: impl Into<String>) -> Self {
        Self::Environment(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_shape_joins_violations() {
        let e = AnnographError::spec_shape(["first problem", "second problem"]);
        let msg = e.to_string();
        assert!(msg.contains("first problem\nsecond problem"));
    }

    #[test]
    fn key_format_message() {
        let e = AnnographError::key_format("too short");
        assert!(e.to_string().contains("malformed data key: too short"));
    }
}
