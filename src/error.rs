//! Error types for seqshape.
//!
//! All errors are strongly typed using thiserror. Bind and encode errors
//! always carry the [`PropertyPath`] of the offending value so the
//! top-level call can report where a document went wrong.

use thiserror::Error;

use crate::codec::TokenKind;
use crate::feature::FeatureFlag;
use crate::path::PropertyPath;
use crate::schema::SequenceKind;

/// Errors raised while building configuration or schemas.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unknown format feature '{name}'")]
    UnknownFeature {
        name: String,
    },

    #[error("Schema '{schema}' declares property '{property}' more than once")]
    DuplicateProperty {
        schema: String,
        property: String,
    },

    #[error("Property '{property}' of schema '{schema}' is an enum set but its element is not an enum")]
    InvalidEnumSet {
        schema: String,
        property: String,
    },
}

/// A flag forced both on and off for one property.
///
/// Not fatal: resolution lets the forced-off entry win. Reported by
/// [`crate::TypeSchema::conflicts`] and logged when a schema is built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Feature '{flag}' is forced both on and off for property '{property}'; forced-off wins")]
pub struct FeatureConflict {
    /// Property carrying the conflicting override.
    pub property: String,
    /// The conflicting flag.
    pub flag: FeatureFlag,
}

/// Errors raised while decoding JSON into values.
#[derive(Debug, Error)]
pub enum BindError {
    /// A sequence was expected but a bare scalar or object was found and
    /// single values are not accepted for this property.
    #[error("Type mismatch at '{path}': expected {expected} (JSON array), found {actual}")]
    TypeMismatch {
        path: PropertyPath,
        expected: SequenceKind,
        actual: TokenKind,
    },

    #[error("Cannot bind {actual} at '{path}' as {expected}")]
    ElementMismatch {
        path: PropertyPath,
        expected: String,
        actual: TokenKind,
    },

    #[error("Unknown variant '{value}' of enum {enum_name} at '{path}'")]
    UnknownEnumVariant {
        path: PropertyPath,
        enum_name: String,
        value: String,
    },

    #[error("Number {value} at '{path}' is out of range for int")]
    NumberOutOfRange {
        path: PropertyPath,
        value: String,
    },

    #[error("Unknown property '{path}'")]
    UnknownProperty {
        path: PropertyPath,
    },
}

impl BindError {
    /// The location of the failure.
    #[must_use]
    pub const fn path(&self) -> &PropertyPath {
        match self {
            Self::TypeMismatch { path, .. }
            | Self::ElementMismatch { path, .. }
            | Self::UnknownEnumVariant { path, .. }
            | Self::NumberOutOfRange { path, .. }
            | Self::UnknownProperty { path } => path,
        }
    }

    /// Returns true for a sequence-shape mismatch.
    #[must_use]
    pub const fn is_type_mismatch(&self) -> bool {
        matches!(self, Self::TypeMismatch { .. })
    }
}

/// Errors raised while encoding values to JSON.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("Value at '{path}' is {actual}, expected {expected}")]
    ElementMismatch {
        path: PropertyPath,
        expected: String,
        actual: &'static str,
    },

    #[error("Unknown variant '{value}' of enum {enum_name} at '{path}'")]
    UnknownEnumVariant {
        path: PropertyPath,
        enum_name: String,
        value: String,
    },

    #[error("Float at '{path}' is not finite")]
    NonFiniteFloat {
        path: PropertyPath,
    },

    #[error("Record at '{path}' has schema '{actual}', expected '{expected}'")]
    SchemaMismatch {
        path: PropertyPath,
        expected: String,
        actual: String,
    },

    #[error("Schema '{schema}' has no property '{property}'")]
    UnknownProperty {
        schema: String,
        property: String,
    },
}

/// Top-level error type for seqshape.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Bind error: {0}")]
    Bind(#[from] BindError),

    #[error("Encode error: {0}")]
    Encode(#[from] EncodeError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CodecError {
    /// Returns true if this is a bind error.
    #[must_use]
    pub const fn is_bind(&self) -> bool {
        matches!(self, Self::Bind(_))
    }

    /// Returns true if this is an encode error.
    #[must_use]
    pub const fn is_encode(&self) -> bool {
        matches!(self, Self::Encode(_))
    }

    /// Returns true if this is a configuration error.
    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Returns true if this is a JSON syntax or I/O error.
    #[must_use]
    pub const fn is_json(&self) -> bool {
        matches!(self, Self::Json(_))
    }

    /// Returns true for a sequence-shape mismatch during decode.
    #[must_use]
    pub const fn is_type_mismatch(&self) -> bool {
        matches!(self, Self::Bind(e) if e.is_type_mismatch())
    }

    /// Returns true if this error is retryable.
    ///
    /// Every outcome is a pure function of fixed configuration and input,
    /// so retrying with the same arguments cannot succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        false
    }
}

/// Result type alias for seqshape operations.
pub type CodecResult<T> = Result<T, CodecError>;
