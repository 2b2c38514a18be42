//! Scalar-vs-array decision on encode.

use crate::config::GlobalFeatureState;
use crate::error::EncodeError;
use crate::feature::FeatureFlag;
use crate::path::PropertyPath;
use crate::schema::SequenceProperty;
use crate::value::Sequence;

use super::{ElementEncoder, OutputSink};

/// How a sequence ends up on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteShape {
    /// Bracketed JSON array.
    Array,
    /// The single element's own encoding, no brackets.
    Unwrapped,
}

impl WriteShape {
    /// Picks the shape for a sequence of `len` elements.
    ///
    /// Only a sequence of exactly one element is ever unwrapped.
    #[must_use]
    pub const fn decide(len: usize, unwrap: bool) -> Self {
        if len == 1 && unwrap {
            Self::Unwrapped
        } else {
            Self::Array
        }
    }
}

/// Writes sequence-valued properties, collapsing single elements when the
/// unwrap feature is effective for the property.
#[derive(Debug, Clone, Copy)]
pub struct SequenceWriteCoercer {
    global: GlobalFeatureState,
}

impl SequenceWriteCoercer {
    /// Creates a coercer over the writer's global feature state.
    #[must_use]
    pub const fn new(global: GlobalFeatureState) -> Self {
        Self { global }
    }

    /// Encodes `sequence` for `property` into `sink`.
    ///
    /// Elements are encoded in the sequence's own order. Element encodings
    /// are never re-examined, so nested sequences are not unwrapped.
    ///
    /// # Errors
    /// Propagates the first element encoding error unchanged.
    pub fn write<E, S>(
        &self,
        property: SequenceProperty<'_>,
        sequence: &Sequence,
        path: &PropertyPath,
        encoder: &E,
        sink: &mut S,
    ) -> Result<WriteShape, EncodeError>
    where
        E: ElementEncoder + ?Sized,
        S: OutputSink + ?Sized,
    {
        let unwrap = property.effective(FeatureFlag::UnwrapSingleElementSequences, &self.global);
        let element = property.element();

        match WriteShape::decide(sequence.len(), unwrap) {
            WriteShape::Unwrapped => {
                tracing::trace!(property = property.name(), "unwrapping single-element sequence");
                let encoded =
                    encoder.encode_element(element, &sequence.elements()[0], &path.index(0))?;
                sink.write_value(encoded);
                Ok(WriteShape::Unwrapped)
            }
            WriteShape::Array => {
                let encoded = sequence
                    .iter()
                    .enumerate()
                    .map(|(i, value)| encoder.encode_element(element, value, &path.index(i)))
                    .collect::<Result<Vec<_>, _>>()?;
                sink.write_array(encoded);
                Ok(WriteShape::Array)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::JsonSink;
    use crate::schema::{ElementType, PropertyDescriptor};
    use crate::value::Value;
    use serde_json::json;

    const UNWRAP: FeatureFlag = FeatureFlag::UnwrapSingleElementSequences;

    /// Encodes strings and ints only; anything else is a mismatch.
    struct PlainEncoder;

    impl ElementEncoder for PlainEncoder {
        fn encode_element(
            &self,
            element: &ElementType,
            value: &Value,
            path: &PropertyPath,
        ) -> Result<serde_json::Value, EncodeError> {
            match value {
                Value::String(s) => Ok(json!(s)),
                Value::Int(i) => Ok(json!(i)),
                other => Err(EncodeError::ElementMismatch {
                    path: path.clone(),
                    expected: element.describe(),
                    actual: other.type_name(),
                }),
            }
        }
    }

    fn write(
        property: &PropertyDescriptor,
        global: GlobalFeatureState,
        sequence: &Sequence,
    ) -> (WriteShape, serde_json::Value) {
        let mut sink = JsonSink::new();
        let shape = SequenceWriteCoercer::new(global)
            .write(
                property.as_sequence().unwrap(),
                sequence,
                &PropertyPath::root().property(property.name()),
                &PlainEncoder,
                &mut sink,
            )
            .unwrap();
        (shape, sink.into_value())
    }

    #[test]
    fn test_decide() {
        assert_eq!(WriteShape::decide(0, true), WriteShape::Array);
        assert_eq!(WriteShape::decide(1, true), WriteShape::Unwrapped);
        assert_eq!(WriteShape::decide(1, false), WriteShape::Array);
        assert_eq!(WriteShape::decide(2, true), WriteShape::Array);
    }

    #[test]
    fn test_single_element_unwrapped_when_global_on() {
        let property = PropertyDescriptor::list("strings", ElementType::String);
        let global = GlobalFeatureState::new().with(UNWRAP);

        let (shape, out) = write(&property, global, &Sequence::list(["a"]));
        assert_eq!(shape, WriteShape::Unwrapped);
        assert_eq!(out, json!("a"));
    }

    #[test]
    fn test_single_element_wrapped_by_default() {
        let property = PropertyDescriptor::list("strings", ElementType::String);

        let (shape, out) = write(&property, GlobalFeatureState::new(), &Sequence::list(["a"]));
        assert_eq!(shape, WriteShape::Array);
        assert_eq!(out, json!(["a"]));
    }

    #[test]
    fn test_forced_on_overrides_global_off() {
        let property = PropertyDescriptor::array("strings", ElementType::String).with(UNWRAP);

        let (_, out) = write(&property, GlobalFeatureState::new(), &Sequence::array(["a"]));
        assert_eq!(out, json!("a"));
    }

    #[test]
    fn test_forced_off_overrides_global_on() {
        let property = PropertyDescriptor::array("ints", ElementType::Int).without(UNWRAP);
        let global = GlobalFeatureState::new().with(UNWRAP);

        let (_, out) = write(&property, global, &Sequence::array([1]));
        assert_eq!(out, json!([1]));
    }

    #[test]
    fn test_empty_and_multi_always_arrays() {
        let property = PropertyDescriptor::list("ints", ElementType::Int).with(UNWRAP);
        let global = GlobalFeatureState::new().with(UNWRAP);

        let (_, empty) = write(&property, global, &Sequence::list(Vec::<i64>::new()));
        assert_eq!(empty, json!([]));

        let (_, many) = write(&property, global, &Sequence::list([3, 1, 2]));
        assert_eq!(many, json!([3, 1, 2]));
    }

    #[test]
    fn test_element_error_propagates_with_index() {
        let property = PropertyDescriptor::list("ints", ElementType::Int);
        let mut sink = JsonSink::new();

        let err = SequenceWriteCoercer::new(GlobalFeatureState::new())
            .write(
                property.as_sequence().unwrap(),
                &Sequence::list([Value::Int(1), Value::Bool(true)]),
                &PropertyPath::root().property("ints"),
                &PlainEncoder,
                &mut sink,
            )
            .unwrap_err();

        match err {
            EncodeError::ElementMismatch { path, actual, .. } => {
                assert_eq!(path.to_string(), "ints[1]");
                assert_eq!(actual, "bool");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
