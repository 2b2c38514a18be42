//! Dynamic values bound to schemas.
//!
//! [`Value`] is what the codec encodes from and decodes into. Sequence
//! properties hold a [`Sequence`] tagged with its [`SequenceKind`]; record
//! properties hold a [`Record`] tied to its [`TypeSchema`].

use std::borrow::Cow;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::error::EncodeError;
use crate::schema::{ElementType, EnumType, PropertyDescriptor, SequenceKind, TypeSchema};

/// A decoded or to-be-encoded value.
///
/// # Examples
///
/// ```
/// use seqshape::{Sequence, Value};
///
/// let flag = Value::Bool(true);
/// let names = Value::from(Sequence::list(["a", "b"]));
///
/// assert_eq!(flag.type_name(), "bool");
/// assert_eq!(names.as_sequence().map(Sequence::len), Some(2));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Explicit null.
    Null,
    /// Boolean.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Finite or non-finite float; only finite floats encode.
    Float(f64),
    /// String.
    String(String),
    /// Variant name of an enum value.
    Enum(String),
    /// Nested record.
    Record(Record),
    /// Sequence of elements.
    Sequence(Sequence),
    /// Raw JSON for `ElementType::Any`.
    Json(serde_json::Value),
}

impl Value {
    /// Returns true for `Null`.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the boolean, if this is one.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the integer, if this is one.
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the value as a float; integers are widened.
    #[must_use]
    pub const fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            Self::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Returns the string, if this is one.
    #[must_use]
    pub fn as_string(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the enum variant name, if this is one.
    #[must_use]
    pub fn as_enum(&self) -> Option<&str> {
        match self {
            Self::Enum(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the record, if this is one.
    #[must_use]
    pub const fn as_record(&self) -> Option<&Record> {
        match self {
            Self::Record(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the sequence, if this is one.
    #[must_use]
    pub const fn as_sequence(&self) -> Option<&Sequence> {
        match self {
            Self::Sequence(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the raw JSON, if this is one.
    #[must_use]
    pub const fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Json(v) => Some(v),
            _ => None,
        }
    }

    /// Returns a human-readable type name.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::Enum(_) => "enum",
            Self::Record(_) => "record",
            Self::Sequence(_) => "sequence",
            Self::Json(_) => "json",
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Self::Null
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::String(v) => write!(f, "{v:?}"),
            Self::Enum(v) => write!(f, "{v}"),
            Self::Record(v) => write!(f, "{}{{..}}", v.schema().name()),
            Self::Sequence(v) => write!(f, "{}[{}]", v.kind(), v.len()),
            Self::Json(v) => write!(f, "{v}"),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<Record> for Value {
    fn from(v: Record) -> Self {
        Self::Record(v)
    }
}

impl From<Sequence> for Value {
    fn from(v: Sequence) -> Self {
        Self::Sequence(v)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        Self::Json(v)
    }
}

/// An ordered run of elements tagged with the container kind it came from.
///
/// Set kinds drop repeated elements on construction, keeping the first
/// occurrence. Enum sets built through [`Sequence::typed`] or
/// [`Sequence::enum_set`] iterate in variant declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct Sequence {
    kind: SequenceKind,
    elements: Vec<Value>,
}

impl Sequence {
    /// Creates a sequence of `kind`.
    #[must_use]
    pub fn new(kind: SequenceKind, elements: Vec<Value>) -> Self {
        let elements = if kind.is_unique() {
            dedup(elements)
        } else {
            elements
        };
        Self { kind, elements }
    }

    /// Creates a sequence of `kind` normalized for `element`: enum sets are
    /// ordered by variant ordinal, unknown variants last.
    #[must_use]
    pub fn typed(kind: SequenceKind, element: &ElementType, elements: Vec<Value>) -> Self {
        let mut sequence = Self::new(kind, elements);
        if let (SequenceKind::EnumSet, ElementType::Enum(enum_type)) = (kind, element) {
            sequence.elements.sort_by_key(|v| variant_rank(enum_type, v));
        }
        sequence
    }

    /// Returns this sequence as `kind` normalized for `element`, borrowing
    /// when it already is.
    ///
    /// A sequence built as a list but stored in a set property comes back
    /// de-duplicated; an enum set out of variant order comes back sorted.
    #[must_use]
    pub fn conformed(&self, kind: SequenceKind, element: &ElementType) -> Cow<'_, Self> {
        let in_order = match (kind, element) {
            (SequenceKind::EnumSet, ElementType::Enum(enum_type)) => self
                .elements
                .windows(2)
                .all(|w| variant_rank(enum_type, &w[0]) <= variant_rank(enum_type, &w[1])),
            _ => true,
        };
        if self.kind == kind && in_order {
            Cow::Borrowed(self)
        } else {
            Cow::Owned(Self::typed(kind, element, self.elements.clone()))
        }
    }

    /// A fixed array.
    pub fn array<I, V>(elements: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::new(SequenceKind::Array, collect(elements))
    }

    /// An ordered list.
    pub fn list<I, V>(elements: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::new(SequenceKind::List, collect(elements))
    }

    /// A general collection.
    pub fn collection<I, V>(elements: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::new(SequenceKind::Collection, collect(elements))
    }

    /// A set.
    pub fn set<I, V>(elements: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::new(SequenceKind::Set, collect(elements))
    }

    /// An enum set of the named variants of `enum_type`.
    pub fn enum_set<I, S>(enum_type: &EnumType, variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let elements = variants.into_iter().map(|v| Value::Enum(v.into())).collect();
        Self::typed(
            SequenceKind::EnumSet,
            &ElementType::Enum(enum_type.clone()),
            elements,
        )
    }

    /// The container kind.
    #[must_use]
    pub const fn kind(&self) -> SequenceKind {
        self.kind
    }

    /// Elements in iteration order.
    #[must_use]
    pub fn elements(&self) -> &[Value] {
        &self.elements
    }

    /// Consumes the sequence, returning its elements.
    #[must_use]
    pub fn into_elements(self) -> Vec<Value> {
        self.elements
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Returns true if there are no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Iterates elements in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.elements.iter()
    }
}

impl<'a> IntoIterator for &'a Sequence {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}

fn collect<I, V>(elements: I) -> Vec<Value>
where
    I: IntoIterator<Item = V>,
    V: Into<Value>,
{
    elements.into_iter().map(Into::into).collect()
}

fn variant_rank(enum_type: &EnumType, value: &Value) -> usize {
    value
        .as_enum()
        .and_then(|name| enum_type.ordinal(name))
        .unwrap_or(usize::MAX)
}

fn dedup(elements: Vec<Value>) -> Vec<Value> {
    let keep: Vec<bool> = {
        let mut seen = HashSet::with_capacity(elements.len());
        elements.iter().map(|e| seen.insert(DedupKey::of(e))).collect()
    };
    elements
        .into_iter()
        .zip(keep)
        .filter_map(|(element, keep)| keep.then_some(element))
        .collect()
}

/// Hashable stand-in for a [`Value`], equal exactly when the values are.
///
/// Floats compare by bit pattern with both zeros folded together.
#[derive(PartialEq, Eq, Hash)]
enum DedupKey<'a> {
    Null,
    Bool(bool),
    Int(i64),
    Float(u64),
    String(&'a str),
    Enum(&'a str),
    Record(&'a str, Vec<Option<DedupKey<'a>>>),
    Sequence(SequenceKind, Vec<DedupKey<'a>>),
    Json(String),
}

impl<'a> DedupKey<'a> {
    fn of(value: &'a Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(*b),
            Value::Int(i) => Self::Int(*i),
            // -0.0 + 0.0 is +0.0
            Value::Float(f) => Self::Float((f + 0.0).to_bits()),
            Value::String(s) => Self::String(s),
            Value::Enum(v) => Self::Enum(v),
            Value::Record(r) => Self::Record(
                r.schema.name(),
                r.values.iter().map(|v| v.as_ref().map(Self::of)).collect(),
            ),
            Value::Sequence(s) => Self::Sequence(s.kind, s.elements.iter().map(Self::of).collect()),
            Value::Json(j) => Self::Json(j.to_string()),
        }
    }
}

/// A record instance: one optional value per schema property.
///
/// A property that was never set is absent, which is distinct from an
/// explicit [`Value::Null`].
#[derive(Debug, Clone)]
pub struct Record {
    schema: Arc<TypeSchema>,
    values: Vec<Option<Value>>,
}

impl Record {
    /// Creates an empty record of `schema`.
    #[must_use]
    pub fn new(schema: Arc<TypeSchema>) -> Self {
        let values = vec![None; schema.properties().len()];
        Self { schema, values }
    }

    /// Sets a property.
    ///
    /// # Errors
    /// Returns `UnknownProperty` if the schema does not declare `name`.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<(), EncodeError> {
        let index = self
            .schema
            .position(name)
            .ok_or_else(|| EncodeError::UnknownProperty {
                schema: self.schema.name().to_string(),
                property: name.to_string(),
            })?;
        self.values[index] = Some(value.into());
        Ok(())
    }

    /// Builder-style [`Record::set`].
    ///
    /// # Errors
    /// Returns `UnknownProperty` if the schema does not declare `name`.
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Result<Self, EncodeError> {
        self.set(name, value)?;
        Ok(self)
    }

    /// Returns the value of a property, if set.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.schema
            .position(name)
            .and_then(|index| self.values[index].as_ref())
    }

    /// The record's schema.
    #[must_use]
    pub fn schema(&self) -> &Arc<TypeSchema> {
        &self.schema
    }

    /// Every declared property with its value, in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&PropertyDescriptor, Option<&Value>)> {
        self.schema
            .properties()
            .iter()
            .zip(self.values.iter().map(Option::as_ref))
    }

    pub(crate) fn set_at(&mut self, index: usize, value: Value) {
        self.values[index] = Some(value);
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        (Arc::ptr_eq(&self.schema, &other.schema) || self.schema == other.schema)
            && self.values == other.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn role_schema() -> Arc<TypeSchema> {
        TypeSchema::builder("Role")
            .property(PropertyDescriptor::scalar("ID", ElementType::String))
            .property(PropertyDescriptor::scalar("Name", ElementType::String))
            .build()
            .unwrap()
    }

    #[test]
    fn test_value_accessors() {
        assert_eq!(Value::Bool(true).as_bool(), Some(true));
        assert_eq!(Value::Int(7).as_float(), Some(7.0));
        assert_eq!(Value::from("hi").as_string(), Some("hi"));
        assert_eq!(Value::Enum("B".into()).as_enum(), Some("B"));
        assert!(Value::default().is_null());
        assert!(Value::Bool(true).as_int().is_none());
    }

    #[test]
    fn test_value_display() {
        assert_eq!(Value::String("a".into()).to_string(), "\"a\"");
        assert_eq!(Value::from(Sequence::list([1, 2, 3])).to_string(), "list[3]");
        assert_eq!(Value::Null.to_string(), "null");
    }

    #[test]
    fn test_list_keeps_duplicates_and_order() {
        let list = Sequence::list(["b", "a", "b"]);
        let names: Vec<_> = list.iter().filter_map(Value::as_string).collect();
        assert_eq!(names, vec!["b", "a", "b"]);
    }

    #[test]
    fn test_set_drops_duplicates_keeps_first_order() {
        let set = Sequence::set(["b", "a", "b"]);
        let names: Vec<_> = set.iter().filter_map(Value::as_string).collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn test_enum_set_uses_variant_order() {
        let abc = EnumType::new("ABC", ["A", "B", "C"]);
        let set = Sequence::enum_set(&abc, ["C", "A", "C"]);
        let names: Vec<_> = set.iter().filter_map(Value::as_enum).collect();
        assert_eq!(names, vec!["A", "C"]);
        assert_eq!(set.kind(), SequenceKind::EnumSet);
    }

    #[test]
    fn test_large_set_dedup_keeps_first_order() {
        let n = 50_000_i64;
        let elements = (0..n).chain(0..n).map(Value::Int).collect();
        let set = Sequence::new(SequenceKind::Set, elements);

        assert_eq!(set.len(), 50_000);
        assert_eq!(set.elements()[0], Value::Int(0));
        assert_eq!(set.elements()[49_999], Value::Int(49_999));
    }

    #[test]
    fn test_set_dedup_folds_zeros_and_nested_values() {
        let set = Sequence::set([
            Value::Float(0.0),
            Value::Float(-0.0),
            Value::Int(0),
            Value::from(Sequence::list(["a"])),
            Value::from(Sequence::list(["a"])),
            Value::from(Sequence::set(["a"])),
        ]);
        assert_eq!(set.len(), 4);
        assert_eq!(set.elements()[0], Value::Float(0.0));
        assert_eq!(set.elements()[1], Value::Int(0));
    }

    #[test]
    fn test_conformed_borrows_when_normalized() {
        let abc = EnumType::new("ABC", ["A", "B", "C"]);
        let element = ElementType::Enum(abc.clone());
        let set = Sequence::enum_set(&abc, ["C", "A"]);

        assert!(matches!(set.conformed(SequenceKind::EnumSet, &element), Cow::Borrowed(_)));
    }

    #[test]
    fn test_conformed_normalizes_foreign_kind() {
        let abc = EnumType::new("ABC", ["A", "B", "C"]);
        let element = ElementType::Enum(abc);
        let list = Sequence::list([Value::Enum("C".into()), Value::Enum("A".into())]);

        let conformed = list.conformed(SequenceKind::EnumSet, &element);
        let names: Vec<_> = conformed.iter().filter_map(Value::as_enum).collect();
        assert_eq!(conformed.kind(), SequenceKind::EnumSet);
        assert_eq!(names, vec!["A", "C"]);

        let binding = Sequence::list(["a", "a"]);
        let tags = binding.conformed(SequenceKind::Set, &ElementType::String);
        assert_eq!(tags.len(), 1);
    }

    #[test]
    fn test_record_set_and_get() {
        let record = Record::new(role_schema())
            .with("ID", "333")
            .unwrap()
            .with("Name", "User")
            .unwrap();

        assert_eq!(record.get("ID").and_then(Value::as_string), Some("333"));
        assert_eq!(record.fields().count(), 2);
    }

    #[test]
    fn test_record_unknown_property() {
        let err = Record::new(role_schema()).with("Email", "x").unwrap_err();
        assert!(matches!(err, EncodeError::UnknownProperty { .. }));
    }

    #[test]
    fn test_record_absent_vs_null() {
        let mut record = Record::new(role_schema());
        assert!(record.get("ID").is_none());
        record.set("ID", Value::Null).unwrap();
        assert_eq!(record.get("ID"), Some(&Value::Null));
    }

    #[test]
    fn test_record_equality_across_schema_instances() {
        let a = Record::new(role_schema()).with("ID", "1").unwrap();
        let b = Record::new(role_schema()).with("ID", "1").unwrap();
        let c = Record::new(role_schema()).with("ID", "2").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
