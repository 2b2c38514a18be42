//! Compiled type metadata.
//!
//! A [`TypeSchema`] lists the bindable properties of one record type. Each
//! [`PropertyDescriptor`] carries its container kind, element type and the
//! [`PropertyFeatureOverride`] compiled when the descriptor was built.
//! Schemas are immutable and shared behind `Arc`.

use std::fmt;
use std::sync::Arc;

use crate::config::GlobalFeatureState;
use crate::error::{ConfigError, FeatureConflict};
use crate::feature::FeatureFlag;
use crate::resolve::{resolve, PropertyFeatureOverride};

/// The kinds of sequence a property may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SequenceKind {
    /// Fixed-size array.
    Array,
    /// Ordered list.
    List,
    /// General collection.
    Collection,
    /// Unordered set of unique elements.
    Set,
    /// Set of enumerated values, iterated in variant order.
    EnumSet,
}

impl SequenceKind {
    /// Returns a human-readable name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Array => "array",
            Self::List => "list",
            Self::Collection => "collection",
            Self::Set => "set",
            Self::EnumSet => "enum set",
        }
    }

    /// Returns true if the kind holds each element at most once.
    #[must_use]
    pub const fn is_unique(self) -> bool {
        matches!(self, Self::Set | Self::EnumSet)
    }
}

impl fmt::Display for SequenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Declared container shape of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    /// A single element.
    Scalar,
    /// A sequence of elements.
    Sequence(SequenceKind),
}

/// An enumerated type: a name plus its variants in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnumType {
    name: String,
    variants: Vec<String>,
}

impl EnumType {
    /// Creates an enum type.
    pub fn new<I, S>(name: impl Into<String>, variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            variants: variants.into_iter().map(Into::into).collect(),
        }
    }

    /// The enum's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Variants in declaration order.
    #[must_use]
    pub fn variants(&self) -> &[String] {
        &self.variants
    }

    /// Position of `variant` in declaration order.
    #[must_use]
    pub fn ordinal(&self, variant: &str) -> Option<usize> {
        self.variants.iter().position(|v| v == variant)
    }
}

/// Type of a single element (or of a scalar property).
#[derive(Debug, Clone, PartialEq)]
pub enum ElementType {
    /// JSON boolean.
    Bool,
    /// Signed 64-bit integer.
    Int,
    /// Floating point number. Integers are accepted.
    Float,
    /// JSON string.
    String,
    /// One variant of an enumerated type, encoded by name.
    Enum(EnumType),
    /// A nested record.
    Record(Arc<TypeSchema>),
    /// Raw JSON, passed through untouched.
    Any,
}

impl ElementType {
    /// Returns a human-readable description used in error messages.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Bool => "bool".to_string(),
            Self::Int => "int".to_string(),
            Self::Float => "float".to_string(),
            Self::String => "string".to_string(),
            Self::Enum(e) => format!("enum {}", e.name()),
            Self::Record(schema) => format!("record {}", schema.name()),
            Self::Any => "any".to_string(),
        }
    }
}

/// Compiled metadata for one bindable property.
///
/// # Examples
///
/// ```
/// use seqshape::{ElementType, FeatureFlag, GlobalFeatureState, PropertyDescriptor};
///
/// let strings = PropertyDescriptor::array("strings", ElementType::String)
///     .with(FeatureFlag::UnwrapSingleElementSequences);
///
/// assert!(strings.effective(
///     FeatureFlag::UnwrapSingleElementSequences,
///     &GlobalFeatureState::default(),
/// ));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDescriptor {
    name: String,
    container: ContainerKind,
    element: ElementType,
    overrides: PropertyFeatureOverride,
}

impl PropertyDescriptor {
    /// Creates a descriptor with no overrides.
    pub fn new(name: impl Into<String>, container: ContainerKind, element: ElementType) -> Self {
        Self {
            name: name.into(),
            container,
            element,
            overrides: PropertyFeatureOverride::NONE,
        }
    }

    /// A single-valued property.
    pub fn scalar(name: impl Into<String>, element: ElementType) -> Self {
        Self::new(name, ContainerKind::Scalar, element)
    }

    /// A sequence-valued property of the given kind.
    pub fn sequence(name: impl Into<String>, kind: SequenceKind, element: ElementType) -> Self {
        Self::new(name, ContainerKind::Sequence(kind), element)
    }

    /// A fixed-array property.
    pub fn array(name: impl Into<String>, element: ElementType) -> Self {
        Self::sequence(name, SequenceKind::Array, element)
    }

    /// An ordered-list property.
    pub fn list(name: impl Into<String>, element: ElementType) -> Self {
        Self::sequence(name, SequenceKind::List, element)
    }

    /// A general-collection property.
    pub fn collection(name: impl Into<String>, element: ElementType) -> Self {
        Self::sequence(name, SequenceKind::Collection, element)
    }

    /// A set property.
    pub fn set(name: impl Into<String>, element: ElementType) -> Self {
        Self::sequence(name, SequenceKind::Set, element)
    }

    /// An enum-set property.
    pub fn enum_set(name: impl Into<String>, element: EnumType) -> Self {
        Self::sequence(name, SequenceKind::EnumSet, ElementType::Enum(element))
    }

    /// Forces `flag` on for this property.
    #[must_use]
    pub fn with(mut self, flag: FeatureFlag) -> Self {
        self.overrides = self.overrides.force_on(flag);
        self
    }

    /// Forces `flag` off for this property.
    #[must_use]
    pub fn without(mut self, flag: FeatureFlag) -> Self {
        self.overrides = self.overrides.force_off(flag);
        self
    }

    /// Replaces the override wholesale.
    #[must_use]
    pub fn with_overrides(mut self, overrides: PropertyFeatureOverride) -> Self {
        self.overrides = overrides;
        self
    }

    /// The property's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared container kind.
    #[must_use]
    pub const fn container(&self) -> ContainerKind {
        self.container
    }

    /// The sequence kind, if the property is sequence-valued.
    #[must_use]
    pub const fn sequence_kind(&self) -> Option<SequenceKind> {
        match self.container {
            ContainerKind::Sequence(kind) => Some(kind),
            ContainerKind::Scalar => None,
        }
    }

    /// Views this property as a sequence property, if it is one.
    #[must_use]
    pub const fn as_sequence(&self) -> Option<SequenceProperty<'_>> {
        match self.container {
            ContainerKind::Sequence(kind) => Some(SequenceProperty {
                descriptor: self,
                kind,
            }),
            ContainerKind::Scalar => None,
        }
    }

    /// The declared element type.
    #[must_use]
    pub const fn element(&self) -> &ElementType {
        &self.element
    }

    /// The compiled override.
    #[must_use]
    pub const fn overrides(&self) -> &PropertyFeatureOverride {
        &self.overrides
    }

    /// Effective state of `flag` for this property under `global`.
    #[must_use]
    pub const fn effective(&self, flag: FeatureFlag, global: &GlobalFeatureState) -> bool {
        resolve(flag, global, &self.overrides)
    }
}

/// A property known to be sequence-valued, paired with its sequence kind.
///
/// The sequence coercers only accept this view, so they never see a
/// scalar property.
#[derive(Debug, Clone, Copy)]
pub struct SequenceProperty<'a> {
    descriptor: &'a PropertyDescriptor,
    kind: SequenceKind,
}

impl<'a> SequenceProperty<'a> {
    /// The underlying descriptor.
    #[must_use]
    pub const fn descriptor(&self) -> &'a PropertyDescriptor {
        self.descriptor
    }

    /// The declared sequence kind.
    #[must_use]
    pub const fn kind(&self) -> SequenceKind {
        self.kind
    }

    /// The property's name.
    #[must_use]
    pub fn name(&self) -> &'a str {
        &self.descriptor.name
    }

    /// The declared element type.
    #[must_use]
    pub const fn element(&self) -> &'a ElementType {
        &self.descriptor.element
    }

    /// Effective state of `flag` for this property under `global`.
    #[must_use]
    pub const fn effective(&self, flag: FeatureFlag, global: &GlobalFeatureState) -> bool {
        self.descriptor.effective(flag, global)
    }
}

/// Compiled metadata for a record type.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeSchema {
    name: String,
    properties: Vec<PropertyDescriptor>,
}

impl TypeSchema {
    /// Starts building a schema.
    pub fn builder(name: impl Into<String>) -> TypeSchemaBuilder {
        TypeSchemaBuilder {
            name: name.into(),
            properties: Vec::new(),
        }
    }

    /// The type's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Properties in declaration order. This is also the write order.
    #[must_use]
    pub fn properties(&self) -> &[PropertyDescriptor] {
        &self.properties
    }

    /// Looks up a property by name.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Index of a property in declaration order.
    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.properties.iter().position(|p| p.name == name)
    }

    /// Flags forced both on and off, per property.
    #[must_use]
    pub fn conflicts(&self) -> Vec<FeatureConflict> {
        self.properties
            .iter()
            .flat_map(|p| {
                p.overrides.conflicts().iter().map(move |flag| FeatureConflict {
                    property: p.name.clone(),
                    flag,
                })
            })
            .collect()
    }
}

/// Builder for [`TypeSchema`].
#[derive(Debug)]
pub struct TypeSchemaBuilder {
    name: String,
    properties: Vec<PropertyDescriptor>,
}

impl TypeSchemaBuilder {
    /// Appends a property.
    #[must_use]
    pub fn property(mut self, property: PropertyDescriptor) -> Self {
        self.properties.push(property);
        self
    }

    /// Validates and freezes the schema.
    ///
    /// # Errors
    /// - `DuplicateProperty` if two properties share a name
    /// - `InvalidEnumSet` if an enum set's element is not an enum
    pub fn build(self) -> Result<Arc<TypeSchema>, ConfigError> {
        for (i, property) in self.properties.iter().enumerate() {
            if self.properties[..i].iter().any(|p| p.name == property.name) {
                return Err(ConfigError::DuplicateProperty {
                    schema: self.name.clone(),
                    property: property.name.clone(),
                });
            }
            if property.sequence_kind() == Some(SequenceKind::EnumSet)
                && !matches!(property.element, ElementType::Enum(_))
            {
                return Err(ConfigError::InvalidEnumSet {
                    schema: self.name.clone(),
                    property: property.name.clone(),
                });
            }
        }

        let schema = TypeSchema {
            name: self.name,
            properties: self.properties,
        };
        for conflict in schema.conflicts() {
            tracing::warn!(schema = %schema.name, %conflict, "conflicting feature override");
        }
        Ok(Arc::new(schema))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const UNWRAP: FeatureFlag = FeatureFlag::UnwrapSingleElementSequences;

    #[test]
    fn test_build_preserves_order() {
        let schema = TypeSchema::builder("Wrapper")
            .property(PropertyDescriptor::array("strings", ElementType::String))
            .property(PropertyDescriptor::array("ints", ElementType::Int))
            .property(PropertyDescriptor::array("bools", ElementType::Bool))
            .build()
            .unwrap();

        let names: Vec<_> = schema.properties().iter().map(PropertyDescriptor::name).collect();
        assert_eq!(names, vec!["strings", "ints", "bools"]);
        assert_eq!(schema.position("bools"), Some(2));
        assert!(schema.property("missing").is_none());
    }

    #[test]
    fn test_build_rejects_duplicates() {
        let err = TypeSchema::builder("Dup")
            .property(PropertyDescriptor::list("values", ElementType::String))
            .property(PropertyDescriptor::scalar("values", ElementType::Int))
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateProperty { .. }));
    }

    #[test]
    fn test_build_rejects_non_enum_enum_set() {
        let err = TypeSchema::builder("Bad")
            .property(PropertyDescriptor::sequence(
                "enums",
                SequenceKind::EnumSet,
                ElementType::String,
            ))
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnumSet { .. }));
    }

    #[test]
    fn test_conflicts_reported() {
        let schema = TypeSchema::builder("Conflicted")
            .property(
                PropertyDescriptor::list("a", ElementType::Int)
                    .with(UNWRAP)
                    .without(UNWRAP),
            )
            .property(PropertyDescriptor::list("b", ElementType::Int).with(UNWRAP))
            .build()
            .unwrap();

        let conflicts = schema.conflicts();
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].property, "a");
        assert_eq!(conflicts[0].flag, UNWRAP);
    }

    #[test]
    fn test_effective_uses_override() {
        let global = GlobalFeatureState::default().with(UNWRAP);
        let wrapped = PropertyDescriptor::array("ints", ElementType::Int).without(UNWRAP);
        let plain = PropertyDescriptor::array("bools", ElementType::Bool);

        assert!(!wrapped.effective(UNWRAP, &global));
        assert!(plain.effective(UNWRAP, &global));
    }

    #[test]
    fn test_as_sequence() {
        let list = PropertyDescriptor::list("values", ElementType::String);
        let scalar = PropertyDescriptor::scalar("name", ElementType::String);

        let view = list.as_sequence().unwrap();
        assert_eq!(view.kind(), SequenceKind::List);
        assert_eq!(view.name(), "values");
        assert!(scalar.as_sequence().is_none());
        assert_eq!(scalar.sequence_kind(), None);
    }

    #[test]
    fn test_enum_ordinal() {
        let abc = EnumType::new("ABC", ["A", "B", "C"]);
        assert_eq!(abc.ordinal("C"), Some(2));
        assert_eq!(abc.ordinal("D"), None);
        assert_eq!(ElementType::Enum(abc).describe(), "enum ABC");
    }

    #[test]
    fn test_sequence_kind_unique() {
        assert!(SequenceKind::Set.is_unique());
        assert!(SequenceKind::EnumSet.is_unique());
        assert!(!SequenceKind::List.is_unique());
    }
}
