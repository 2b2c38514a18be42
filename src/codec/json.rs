//! `serde_json`-backed element codec and the per-property record loop.

use std::sync::Arc;

use serde_json::{Map, Number};

use crate::config::GlobalFeatureState;
use crate::error::{BindError, EncodeError};
use crate::path::PropertyPath;
use crate::schema::{ElementType, PropertyDescriptor, TypeSchema};
use crate::value::{Record, Value};

use super::{
    ElementBinder, ElementEncoder, JsonSink, SequenceReadCoercer, SequenceWriteCoercer, TokenKind,
};

/// Encodes and binds records against their schemas.
///
/// Sequence-valued properties go through [`SequenceWriteCoercer`] and
/// [`SequenceReadCoercer`]; everything else is bound element by element.
///
/// In lenient mode a property that fails to bind, or that the schema does
/// not declare, is skipped with a warning instead of failing the record.
#[derive(Debug, Clone, Copy)]
pub struct JsonCodec {
    features: GlobalFeatureState,
    lenient: bool,
}

impl JsonCodec {
    /// Creates a strict codec.
    #[must_use]
    pub const fn new(features: GlobalFeatureState) -> Self {
        Self {
            features,
            lenient: false,
        }
    }

    /// Returns a copy with lenient binding switched on or off.
    #[must_use]
    pub const fn lenient(self, lenient: bool) -> Self {
        Self { lenient, ..self }
    }

    /// The global feature state in use.
    #[must_use]
    pub const fn features(&self) -> GlobalFeatureState {
        self.features
    }

    /// Encodes `record` as a JSON object, properties in schema order.
    ///
    /// Unset properties are written as `null`.
    ///
    /// # Errors
    /// Returns the first element encoding error.
    pub fn encode_record(
        &self,
        record: &Record,
        path: &PropertyPath,
    ) -> Result<serde_json::Value, EncodeError> {
        let mut object = Map::with_capacity(record.schema().properties().len());
        for (property, value) in record.fields() {
            let encoded = self.encode_property(property, value, &path.property(property.name()))?;
            object.insert(property.name().to_string(), encoded);
        }
        Ok(serde_json::Value::Object(object))
    }

    fn encode_property(
        &self,
        property: &PropertyDescriptor,
        value: Option<&Value>,
        path: &PropertyPath,
    ) -> Result<serde_json::Value, EncodeError> {
        let value = match value {
            None | Some(Value::Null) => return Ok(serde_json::Value::Null),
            Some(value) => value,
        };

        let Some(sequence_property) = property.as_sequence() else {
            return self.encode_element(property.element(), value, path);
        };

        let Value::Sequence(sequence) = value else {
            return Err(EncodeError::ElementMismatch {
                path: path.clone(),
                expected: sequence_property.kind().to_string(),
                actual: value.type_name(),
            });
        };

        let sequence = sequence.conformed(sequence_property.kind(), sequence_property.element());
        let mut sink = JsonSink::new();
        SequenceWriteCoercer::new(self.features).write(
            sequence_property,
            &sequence,
            path,
            self,
            &mut sink,
        )?;
        Ok(sink.into_value())
    }

    /// Binds a JSON object as a record of `schema`.
    ///
    /// # Errors
    /// - `ElementMismatch` if `token` is not an object
    /// - `UnknownProperty` for undeclared members (strict mode)
    /// - any property bind error (strict mode)
    pub fn bind_record(
        &self,
        schema: &Arc<TypeSchema>,
        token: &serde_json::Value,
        path: &PropertyPath,
    ) -> Result<Record, BindError> {
        let serde_json::Value::Object(members) = token else {
            return Err(BindError::ElementMismatch {
                path: path.clone(),
                expected: format!("record {}", schema.name()),
                actual: TokenKind::of(token),
            });
        };

        let mut record = Record::new(Arc::clone(schema));
        for (name, member) in members {
            let member_path = path.property(name.as_str());
            let Some(index) = schema.position(name) else {
                if self.lenient {
                    tracing::warn!(path = %member_path, "skipping unknown property");
                    continue;
                }
                return Err(BindError::UnknownProperty { path: member_path });
            };

            match self.bind_property(&schema.properties()[index], member, &member_path) {
                Ok(value) => record.set_at(index, value),
                Err(e) if self.lenient => {
                    tracing::warn!(
                        path = %member_path,
                        error = %e,
                        "skipping property that failed to bind"
                    );
                }
                Err(e) => return Err(e),
            }
        }
        Ok(record)
    }

    fn bind_property(
        &self,
        property: &PropertyDescriptor,
        token: &serde_json::Value,
        path: &PropertyPath,
    ) -> Result<Value, BindError> {
        match property.as_sequence() {
            None => self.bind_element(property.element(), token, path),
            Some(sequence_property) => {
                let sequence = SequenceReadCoercer::new(self.features).read(
                    sequence_property,
                    token,
                    path,
                    self,
                )?;
                Ok(sequence.map_or(Value::Null, Value::Sequence))
            }
        }
    }
}

impl ElementEncoder for JsonCodec {
    fn encode_element(
        &self,
        element: &ElementType,
        value: &Value,
        path: &PropertyPath,
    ) -> Result<serde_json::Value, EncodeError> {
        let mismatch = || EncodeError::ElementMismatch {
            path: path.clone(),
            expected: element.describe(),
            actual: value.type_name(),
        };

        match (element, value) {
            (_, Value::Null) => Ok(serde_json::Value::Null),
            (ElementType::Bool, Value::Bool(b)) => Ok(serde_json::Value::Bool(*b)),
            (ElementType::Int, Value::Int(i)) => Ok(serde_json::Value::from(*i)),
            (ElementType::Float, Value::Float(f)) => encode_float(*f, path),
            (ElementType::Float, Value::Int(i)) => Ok(serde_json::Value::from(*i)),
            (ElementType::String, Value::String(s)) => Ok(serde_json::Value::String(s.clone())),
            (ElementType::Enum(enum_type), Value::Enum(variant)) => {
                if enum_type.ordinal(variant).is_none() {
                    return Err(EncodeError::UnknownEnumVariant {
                        path: path.clone(),
                        enum_name: enum_type.name().to_string(),
                        value: variant.clone(),
                    });
                }
                Ok(serde_json::Value::String(variant.clone()))
            }
            (ElementType::Record(schema), Value::Record(record)) => {
                let same_schema =
                    Arc::ptr_eq(schema, record.schema()) || **schema == **record.schema();
                if !same_schema {
                    return Err(EncodeError::SchemaMismatch {
                        path: path.clone(),
                        expected: schema.name().to_string(),
                        actual: record.schema().name().to_string(),
                    });
                }
                self.encode_record(record, path)
            }
            (ElementType::Any, Value::Json(json)) => Ok(json.clone()),
            (ElementType::Any, Value::Bool(b)) => Ok(serde_json::Value::Bool(*b)),
            (ElementType::Any, Value::Int(i)) => Ok(serde_json::Value::from(*i)),
            (ElementType::Any, Value::Float(f)) => encode_float(*f, path),
            (ElementType::Any, Value::String(s) | Value::Enum(s)) => {
                Ok(serde_json::Value::String(s.clone()))
            }
            _ => Err(mismatch()),
        }
    }
}

impl ElementBinder for JsonCodec {
    fn bind_element(
        &self,
        element: &ElementType,
        token: &serde_json::Value,
        path: &PropertyPath,
    ) -> Result<Value, BindError> {
        let mismatch = || BindError::ElementMismatch {
            path: path.clone(),
            expected: element.describe(),
            actual: TokenKind::of(token),
        };

        match (element, token) {
            (_, serde_json::Value::Null) => Ok(Value::Null),
            (ElementType::Any, json) => Ok(Value::Json(json.clone())),
            (ElementType::Bool, serde_json::Value::Bool(b)) => Ok(Value::Bool(*b)),
            (ElementType::Int, serde_json::Value::Number(n)) => {
                if let Some(i) = n.as_i64() {
                    Ok(Value::Int(i))
                } else if n.is_u64() {
                    Err(BindError::NumberOutOfRange {
                        path: path.clone(),
                        value: n.to_string(),
                    })
                } else {
                    Err(mismatch())
                }
            }
            (ElementType::Float, serde_json::Value::Number(n)) => {
                n.as_f64().map(Value::Float).ok_or_else(mismatch)
            }
            (ElementType::String, serde_json::Value::String(s)) => Ok(Value::String(s.clone())),
            (ElementType::Enum(enum_type), serde_json::Value::String(s)) => {
                if enum_type.ordinal(s).is_none() {
                    return Err(BindError::UnknownEnumVariant {
                        path: path.clone(),
                        enum_name: enum_type.name().to_string(),
                        value: s.clone(),
                    });
                }
                Ok(Value::Enum(s.clone()))
            }
            (ElementType::Record(schema), serde_json::Value::Object(_)) => {
                self.bind_record(schema, token, path).map(Value::Record)
            }
            _ => Err(mismatch()),
        }
    }
}

fn encode_float(f: f64, path: &PropertyPath) -> Result<serde_json::Value, EncodeError> {
    Number::from_f64(f)
        .map(serde_json::Value::Number)
        .ok_or_else(|| EncodeError::NonFiniteFloat { path: path.clone() })
}
