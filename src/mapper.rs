//! Mapper, writer and reader front ends.
//!
//! An [`ObjectMapper`] owns the global feature defaults. [`ObjectWriter`]
//! and [`ObjectReader`] are derived from it and can adjust features per
//! call site. Every derivation returns a new value; none of these types
//! has interior mutability, so one instance can be shared freely across
//! threads.

use std::sync::Arc;

use crate::codec::JsonCodec;
use crate::config::{GlobalFeatureState, MapperConfig};
use crate::error::CodecResult;
use crate::feature::{FeatureFlag, Operation};
use crate::path::PropertyPath;
use crate::schema::TypeSchema;
use crate::value::Record;

/// Entry point holding the global feature defaults.
///
/// # Examples
///
/// ```
/// use seqshape::{ElementType, FeatureFlag, ObjectMapper, PropertyDescriptor, Record, Sequence, TypeSchema};
///
/// let schema = TypeSchema::builder("Wrapper")
///     .property(PropertyDescriptor::list("bools", ElementType::Bool))
///     .build()
///     .unwrap();
/// let record = Record::new(schema)
///     .with("bools", Sequence::list([true]))
///     .unwrap();
///
/// let mapper = ObjectMapper::new();
/// assert_eq!(mapper.write_value_as_string(&record).unwrap(), r#"{"bools":[true]}"#);
///
/// let unwrapping = mapper.writer().with(FeatureFlag::UnwrapSingleElementSequences);
/// assert_eq!(unwrapping.write_value_as_string(&record).unwrap(), r#"{"bools":true}"#);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ObjectMapper {
    features: GlobalFeatureState,
}

impl ObjectMapper {
    /// Creates a mapper with default features.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mapper from a loaded configuration.
    #[must_use]
    pub fn from_config(config: &MapperConfig) -> Self {
        Self::with_features(config.to_state())
    }

    /// Creates a mapper with explicit global features.
    #[must_use]
    pub const fn with_features(features: GlobalFeatureState) -> Self {
        Self { features }
    }

    /// The mapper's global feature state.
    #[must_use]
    pub const fn features(&self) -> GlobalFeatureState {
        self.features
    }

    /// Returns a new mapper with `flag` set to `state`.
    #[must_use]
    pub const fn configure(&self, flag: FeatureFlag, state: bool) -> Self {
        Self {
            features: self.features.configure(flag, state),
        }
    }

    /// Returns a new mapper with `flag` enabled.
    #[must_use]
    pub const fn enable(&self, flag: FeatureFlag) -> Self {
        self.configure(flag, true)
    }

    /// Returns a new mapper with `flag` disabled.
    #[must_use]
    pub const fn disable(&self, flag: FeatureFlag) -> Self {
        self.configure(flag, false)
    }

    /// A writer sharing this mapper's features.
    #[must_use]
    pub const fn writer(&self) -> ObjectWriter {
        ObjectWriter {
            features: self.features,
        }
    }

    /// A reader for records of `schema` sharing this mapper's features.
    #[must_use]
    pub fn reader(&self, schema: Arc<TypeSchema>) -> ObjectReader {
        ObjectReader {
            features: self.features,
            schema,
            lenient: false,
        }
    }

    /// Encodes `record` to a JSON string.
    ///
    /// # Errors
    /// See [`ObjectWriter::write_value`].
    pub fn write_value_as_string(&self, record: &Record) -> CodecResult<String> {
        self.writer().write_value_as_string(record)
    }

    /// Decodes a JSON string into a record of `schema`.
    ///
    /// # Errors
    /// See [`ObjectReader::read_value`].
    pub fn read_value(&self, json: &str, schema: &Arc<TypeSchema>) -> CodecResult<Record> {
        self.reader(Arc::clone(schema)).read_value(json)
    }
}

fn note_operation(flag: FeatureFlag, side: Operation) {
    if flag.operation() != side {
        tracing::debug!(%flag, %side, "feature does not apply to this side of the codec");
    }
}

/// Encodes records with a fixed feature state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectWriter {
    features: GlobalFeatureState,
}

impl ObjectWriter {
    /// Returns a new writer with `flag` enabled.
    #[must_use]
    pub fn with(&self, flag: FeatureFlag) -> Self {
        note_operation(flag, Operation::Write);
        Self {
            features: self.features.with(flag),
        }
    }

    /// Returns a new writer with `flag` disabled.
    #[must_use]
    pub fn without(&self, flag: FeatureFlag) -> Self {
        note_operation(flag, Operation::Write);
        Self {
            features: self.features.without(flag),
        }
    }

    /// The writer's global feature state.
    #[must_use]
    pub const fn features(&self) -> GlobalFeatureState {
        self.features
    }

    /// Encodes `record` as a JSON value.
    ///
    /// # Errors
    /// Returns an encode error naming the offending property path.
    #[tracing::instrument(level = "debug", skip_all, fields(schema = record.schema().name()))]
    pub fn write_value(&self, record: &Record) -> CodecResult<serde_json::Value> {
        let json = JsonCodec::new(self.features).encode_record(record, &PropertyPath::root())?;
        Ok(json)
    }

    /// Encodes `record` as compact JSON text.
    ///
    /// # Errors
    /// See [`ObjectWriter::write_value`].
    pub fn write_value_as_string(&self, record: &Record) -> CodecResult<String> {
        let json = self.write_value(record)?;
        Ok(serde_json::to_string(&json)?)
    }

    /// Encodes `record` as pretty-printed JSON text.
    ///
    /// # Errors
    /// See [`ObjectWriter::write_value`].
    pub fn write_value_as_pretty_string(&self, record: &Record) -> CodecResult<String> {
        let json = self.write_value(record)?;
        Ok(serde_json::to_string_pretty(&json)?)
    }
}

/// Decodes records of one schema with a fixed feature state.
#[derive(Debug, Clone)]
pub struct ObjectReader {
    features: GlobalFeatureState,
    schema: Arc<TypeSchema>,
    lenient: bool,
}

impl ObjectReader {
    /// Returns a new reader with `flag` enabled.
    #[must_use]
    pub fn with(&self, flag: FeatureFlag) -> Self {
        note_operation(flag, Operation::Read);
        Self {
            features: self.features.with(flag),
            ..self.clone()
        }
    }

    /// Returns a new reader with `flag` disabled.
    #[must_use]
    pub fn without(&self, flag: FeatureFlag) -> Self {
        note_operation(flag, Operation::Read);
        Self {
            features: self.features.without(flag),
            ..self.clone()
        }
    }

    /// Returns a new reader that skips properties failing to bind instead of
    /// failing the whole record.
    #[must_use]
    pub fn lenient(&self, lenient: bool) -> Self {
        Self {
            lenient,
            ..self.clone()
        }
    }

    /// The reader's global feature state.
    #[must_use]
    pub const fn features(&self) -> GlobalFeatureState {
        self.features
    }

    /// The schema records are bound to.
    #[must_use]
    pub fn schema(&self) -> &Arc<TypeSchema> {
        &self.schema
    }

    /// Decodes JSON text.
    ///
    /// # Errors
    /// - `Json` for malformed input
    /// - `Bind` naming the offending property path
    pub fn read_value(&self, json: &str) -> CodecResult<Record> {
        let token: serde_json::Value = serde_json::from_str(json)?;
        self.read_json(&token)
    }

    /// Decodes JSON bytes.
    ///
    /// # Errors
    /// See [`ObjectReader::read_value`].
    pub fn read_slice(&self, json: &[u8]) -> CodecResult<Record> {
        let token: serde_json::Value = serde_json::from_slice(json)?;
        self.read_json(&token)
    }

    /// Binds an already-parsed JSON value.
    ///
    /// # Errors
    /// Returns a bind error naming the offending property path.
    #[tracing::instrument(level = "debug", skip_all, fields(schema = self.schema.name()))]
    pub fn read_json(&self, token: &serde_json::Value) -> CodecResult<Record> {
        let record = JsonCodec::new(self.features)
            .lenient(self.lenient)
            .bind_record(&self.schema, token, &PropertyPath::root())?;
        Ok(record)
    }
}
