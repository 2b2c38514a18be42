//! Codec seams and the sequence coercers.
//!
//! The coercers talk to the rest of the codec through three small
//! capabilities:
//! - [`OutputSink`]: receives either one bare encoded value or an array
//! - [`ElementEncoder`]: encodes one element of a declared type
//! - [`ElementBinder`]: binds one JSON token/subtree as a declared type
//!
//! [`JsonCodec`] implements the encoder and binder on top of `serde_json`
//! and drives the per-property loop for records.

mod json;
mod read;
mod write;

use std::fmt;

pub use json::JsonCodec;
pub use read::{ReadState, SequenceReadCoercer};
pub use write::{SequenceWriteCoercer, WriteShape};

use crate::error::{BindError, EncodeError};
use crate::path::PropertyPath;
use crate::schema::ElementType;
use crate::value::Value;

/// Kind of the next input token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// `null`.
    Null,
    /// `true` or `false`.
    Bool,
    /// Any JSON number.
    Number,
    /// A string.
    String,
    /// Start of an array.
    Array,
    /// Start of an object.
    Object,
}

impl TokenKind {
    /// Classifies a parsed JSON token.
    #[must_use]
    pub const fn of(token: &serde_json::Value) -> Self {
        match token {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(_) => Self::Bool,
            serde_json::Value::Number(_) => Self::Number,
            serde_json::Value::String(_) => Self::String,
            serde_json::Value::Array(_) => Self::Array,
            serde_json::Value::Object(_) => Self::Object,
        }
    }

    /// Returns true for booleans, numbers and strings.
    #[must_use]
    pub const fn is_scalar(self) -> bool {
        matches!(self, Self::Bool | Self::Number | Self::String)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Null => "null",
            Self::Bool => "boolean",
            Self::Number => "number",
            Self::String => "string",
            Self::Array => "array",
            Self::Object => "object",
        };
        f.write_str(name)
    }
}

/// Destination for one encoded property value.
pub trait OutputSink {
    /// Writes a single encoded value with no enclosing array.
    fn write_value(&mut self, encoded: serde_json::Value);

    /// Writes already-encoded elements as one array.
    fn write_array(&mut self, elements: Vec<serde_json::Value>);
}

/// Encodes one element of a declared type.
pub trait ElementEncoder {
    /// Encodes `value` as `element`.
    fn encode_element(
        &self,
        element: &ElementType,
        value: &Value,
        path: &PropertyPath,
    ) -> Result<serde_json::Value, EncodeError>;
}

/// Binds one token/subtree to a declared type.
pub trait ElementBinder {
    /// Binds `token` as `element`.
    fn bind_element(
        &self,
        element: &ElementType,
        token: &serde_json::Value,
        path: &PropertyPath,
    ) -> Result<Value, BindError>;
}

/// An [`OutputSink`] that keeps the last value written.
#[derive(Debug, Default)]
pub struct JsonSink {
    value: Option<serde_json::Value>,
}

impl JsonSink {
    /// Creates an empty sink.
    #[must_use]
    pub const fn new() -> Self {
        Self { value: None }
    }

    /// Returns the written value, or `null` if nothing was written.
    #[must_use]
    pub fn into_value(self) -> serde_json::Value {
        self.value.unwrap_or(serde_json::Value::Null)
    }
}

impl OutputSink for JsonSink {
    fn write_value(&mut self, encoded: serde_json::Value) {
        self.value = Some(encoded);
    }

    fn write_array(&mut self, elements: Vec<serde_json::Value>) {
        self.value = Some(serde_json::Value::Array(elements));
    }
}
