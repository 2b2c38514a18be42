//! # seqshape - sequence-shape format features for a JSON codec
//!
//! seqshape decides, per property, whether a sequence is written as a JSON
//! array or as its bare single element, and whether a bare scalar or object
//! is accepted where a sequence is declared.
//!
//! ## Core Concepts
//!
//! - **FeatureFlag**: a named toggle for one shape decision
//! - **GlobalFeatureState**: the mapper-wide default for every flag
//! - **PropertyFeatureOverride**: per-property forced-on/forced-off flags,
//!   compiled into the property's schema entry
//! - **resolve**: merges the two into one effective decision
//! - **SequenceWriteCoercer / SequenceReadCoercer**: apply that decision
//!   while encoding and decoding
//!
//! ## Usage
//!
//! ```rust
//! use seqshape::{ElementType, FeatureFlag, ObjectMapper, PropertyDescriptor, TypeSchema};
//!
//! let schema = TypeSchema::builder("StringListWrapper")
//!     .property(
//!         PropertyDescriptor::list("values", ElementType::String)
//!             .with(FeatureFlag::AcceptSingleValueAsSequence),
//!     )
//!     .build()?;
//!
//! let record = ObjectMapper::new().read_value(r#"{"values":"first"}"#, &schema)?;
//! let values = record.get("values").and_then(|v| v.as_sequence()).unwrap();
//! assert_eq!(values.len(), 1);
//! # Ok::<(), seqshape::CodecError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod codec;
pub mod config;
pub mod error;
pub mod feature;
pub mod mapper;
pub mod path;
pub mod resolve;
pub mod schema;
pub mod value;

// Re-export primary types at crate root for convenience
pub use codec::{
    ElementBinder, ElementEncoder, JsonCodec, JsonSink, OutputSink, ReadState,
    SequenceReadCoercer, SequenceWriteCoercer, TokenKind, WriteShape,
};
pub use config::{GlobalFeatureState, MapperConfig};
pub use error::{BindError, CodecError, CodecResult, ConfigError, EncodeError, FeatureConflict};
pub use feature::{FeatureFlag, FeatureSet, Operation};
pub use mapper::{ObjectMapper, ObjectReader, ObjectWriter};
pub use path::{PathSegment, PropertyPath};
pub use resolve::{resolve, PropertyFeatureOverride};
pub use schema::{
    ContainerKind, ElementType, EnumType, PropertyDescriptor, SequenceKind, SequenceProperty,
    TypeSchema, TypeSchemaBuilder,
};
pub use value::{Record, Sequence, Value};
