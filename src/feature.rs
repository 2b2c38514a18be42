//! Format feature flags.
//!
//! A format feature is a named boolean toggle controlling one specific
//! encode/decode shape decision. Flags are collected into a [`FeatureSet`],
//! a small `Copy` bitset whose operations always return a new set.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Which side of the codec a feature influences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Encoding values to JSON.
    Write,
    /// Decoding JSON into values.
    Read,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Write => write!(f, "write"),
            Self::Read => write!(f, "read"),
        }
    }
}

/// A togglable sequence-shape behavior.
///
/// # Examples
///
/// ```
/// use seqshape::{FeatureFlag, Operation};
///
/// let flag: FeatureFlag = "unwrap_single_element_sequences".parse().unwrap();
/// assert_eq!(flag, FeatureFlag::UnwrapSingleElementSequences);
/// assert_eq!(flag.operation(), Operation::Write);
/// assert!(!flag.enabled_by_default());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureFlag {
    /// Encode a single-element sequence as its bare element.
    UnwrapSingleElementSequences,
    /// Decode a bare scalar or object into a one-element sequence.
    AcceptSingleValueAsSequence,
}

impl FeatureFlag {
    /// Every known flag, in declaration order.
    pub const ALL: [Self; 2] = [
        Self::UnwrapSingleElementSequences,
        Self::AcceptSingleValueAsSequence,
    ];

    /// Returns the operation this flag applies to.
    #[must_use]
    pub const fn operation(self) -> Operation {
        match self {
            Self::UnwrapSingleElementSequences => Operation::Write,
            Self::AcceptSingleValueAsSequence => Operation::Read,
        }
    }

    /// Returns true if the flag is enabled in a fresh configuration.
    #[must_use]
    pub const fn enabled_by_default(self) -> bool {
        match self {
            Self::UnwrapSingleElementSequences | Self::AcceptSingleValueAsSequence => false,
        }
    }

    /// Returns the snake_case name used in configuration files.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::UnwrapSingleElementSequences => "unwrap_single_element_sequences",
            Self::AcceptSingleValueAsSequence => "accept_single_value_as_sequence",
        }
    }

    const fn mask(self) -> u8 {
        match self {
            Self::UnwrapSingleElementSequences => 1 << 0,
            Self::AcceptSingleValueAsSequence => 1 << 1,
        }
    }
}

impl fmt::Display for FeatureFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FeatureFlag {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|flag| flag.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ConfigError::UnknownFeature {
                name: s.to_string(),
            })
    }
}

/// An immutable set of feature flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct FeatureSet(u8);

impl FeatureSet {
    /// The empty set.
    pub const EMPTY: Self = Self(0);

    /// Creates an empty set.
    #[must_use]
    pub const fn new() -> Self {
        Self::EMPTY
    }

    /// Creates a set holding the given flags.
    #[must_use]
    pub fn of(flags: &[FeatureFlag]) -> Self {
        flags.iter().fold(Self::EMPTY, |set, flag| set.with(*flag))
    }

    /// Returns a copy of this set with `flag` added.
    #[must_use]
    pub const fn with(self, flag: FeatureFlag) -> Self {
        Self(self.0 | flag.mask())
    }

    /// Returns a copy of this set with `flag` removed.
    #[must_use]
    pub const fn without(self, flag: FeatureFlag) -> Self {
        Self(self.0 & !flag.mask())
    }

    /// Returns true if `flag` is a member.
    #[must_use]
    pub const fn contains(self, flag: FeatureFlag) -> bool {
        self.0 & flag.mask() != 0
    }

    /// Returns the flags present in both sets.
    #[must_use]
    pub const fn intersection(self, other: Self) -> Self {
        Self(self.0 & other.0)
    }

    /// Returns true if no flag is set.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterates the members in declaration order.
    pub fn iter(self) -> impl Iterator<Item = FeatureFlag> {
        FeatureFlag::ALL
            .into_iter()
            .filter(move |flag| self.contains(*flag))
    }
}

impl FromIterator<FeatureFlag> for FeatureSet {
    fn from_iter<I: IntoIterator<Item = FeatureFlag>>(iter: I) -> Self {
        iter.into_iter().fold(Self::EMPTY, Self::with)
    }
}

impl fmt::Display for FeatureSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, flag) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{flag}")?;
        }
        f.write_str("}")
    }
}

impl Serialize for FeatureSet {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

impl<'de> Deserialize<'de> for FeatureSet {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let flags = Vec::<FeatureFlag>::deserialize(deserializer)?;
        Ok(flags.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_operations() {
        assert_eq!(
            FeatureFlag::UnwrapSingleElementSequences.operation(),
            Operation::Write
        );
        assert_eq!(
            FeatureFlag::AcceptSingleValueAsSequence.operation(),
            Operation::Read
        );
    }

    #[test]
    fn test_flags_default_off() {
        for flag in FeatureFlag::ALL {
            assert!(!flag.enabled_by_default(), "{flag} should default off");
        }
    }

    #[test]
    fn test_flag_parse() {
        let flag: FeatureFlag = "ACCEPT_SINGLE_VALUE_AS_SEQUENCE".parse().unwrap();
        assert_eq!(flag, FeatureFlag::AcceptSingleValueAsSequence);

        let err = "wrap_everything".parse::<FeatureFlag>().unwrap_err();
        assert!(err.to_string().contains("wrap_everything"));
    }

    #[test]
    fn test_flag_serde_names() {
        let json = serde_json::to_string(&FeatureFlag::UnwrapSingleElementSequences).unwrap();
        assert_eq!(json, "\"unwrap_single_element_sequences\"");
    }

    #[test]
    fn test_set_with_without() {
        let base = FeatureSet::new();
        let on = base.with(FeatureFlag::UnwrapSingleElementSequences);

        assert!(base.is_empty());
        assert!(on.contains(FeatureFlag::UnwrapSingleElementSequences));
        assert!(!on.contains(FeatureFlag::AcceptSingleValueAsSequence));
        assert!(on.without(FeatureFlag::UnwrapSingleElementSequences).is_empty());
    }

    #[test]
    fn test_set_intersection_and_iter() {
        let a = FeatureSet::of(&FeatureFlag::ALL);
        let b = FeatureSet::of(&[FeatureFlag::AcceptSingleValueAsSequence]);

        let both: Vec<_> = a.intersection(b).iter().collect();
        assert_eq!(both, vec![FeatureFlag::AcceptSingleValueAsSequence]);
        assert_eq!(a.iter().count(), 2);
    }

    #[test]
    fn test_set_serde() {
        let set = FeatureSet::of(&FeatureFlag::ALL);
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(
            json,
            "[\"unwrap_single_element_sequences\",\"accept_single_value_as_sequence\"]"
        );
        let back: FeatureSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, set);
    }

    #[test]
    fn test_set_display() {
        let set = FeatureSet::of(&[FeatureFlag::AcceptSingleValueAsSequence]);
        assert_eq!(set.to_string(), "{accept_single_value_as_sequence}");
        assert_eq!(FeatureSet::EMPTY.to_string(), "{}");
    }
}
