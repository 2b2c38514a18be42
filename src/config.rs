//! Global feature configuration.
//!
//! [`GlobalFeatureState`] is the mapper-wide default for every flag. It is a
//! persistent value: `with`, `without` and `configure` hand back a new state
//! and leave the receiver untouched, so a base configuration can be shared
//! across threads while callers derive variants from it.

use serde::{Deserialize, Serialize};

use crate::feature::{FeatureFlag, FeatureSet};

/// Immutable mapping from [`FeatureFlag`] to its global on/off state.
///
/// # Examples
///
/// ```
/// use seqshape::{FeatureFlag, GlobalFeatureState};
///
/// let base = GlobalFeatureState::default();
/// let unwrapping = base.with(FeatureFlag::UnwrapSingleElementSequences);
///
/// assert!(!base.is_enabled(FeatureFlag::UnwrapSingleElementSequences));
/// assert!(unwrapping.is_enabled(FeatureFlag::UnwrapSingleElementSequences));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GlobalFeatureState {
    enabled: FeatureSet,
}

impl GlobalFeatureState {
    /// Creates a state with every flag at its default.
    #[must_use]
    pub fn new() -> Self {
        Self {
            enabled: FeatureFlag::ALL
                .into_iter()
                .filter(|flag| flag.enabled_by_default())
                .collect(),
        }
    }

    /// Creates a state where exactly the given flags are enabled.
    #[must_use]
    pub const fn from_enabled(enabled: FeatureSet) -> Self {
        Self { enabled }
    }

    /// Returns the global value of `flag`.
    #[must_use]
    pub const fn is_enabled(&self, flag: FeatureFlag) -> bool {
        self.enabled.contains(flag)
    }

    /// Returns the set of enabled flags.
    #[must_use]
    pub const fn enabled(&self) -> FeatureSet {
        self.enabled
    }

    /// Returns a new state with `flag` enabled.
    #[must_use]
    pub const fn with(&self, flag: FeatureFlag) -> Self {
        Self {
            enabled: self.enabled.with(flag),
        }
    }

    /// Returns a new state with `flag` disabled.
    #[must_use]
    pub const fn without(&self, flag: FeatureFlag) -> Self {
        Self {
            enabled: self.enabled.without(flag),
        }
    }

    /// Returns a new state with `flag` set to `state`.
    #[must_use]
    pub const fn configure(&self, flag: FeatureFlag, state: bool) -> Self {
        if state {
            self.with(flag)
        } else {
            self.without(flag)
        }
    }
}

impl Default for GlobalFeatureState {
    fn default() -> Self {
        Self::new()
    }
}

/// Serializable mapper configuration.
///
/// Flags listed in `enable` are switched on, then flags listed in `disable`
/// are switched off, starting from the defaults.
///
/// ```json
/// { "enable": ["accept_single_value_as_sequence"], "disable": [] }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MapperConfig {
    /// Flags to switch on.
    pub enable: FeatureSet,
    /// Flags to switch off. Applied after `enable`.
    pub disable: FeatureSet,
}

impl MapperConfig {
    /// Parses a configuration from JSON text.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }

    /// Builds the global state described by this configuration.
    #[must_use]
    pub fn to_state(&self) -> GlobalFeatureState {
        let enabled = self
            .enable
            .iter()
            .fold(GlobalFeatureState::new(), |state, flag| state.with(flag));
        self.disable
            .iter()
            .fold(enabled, |state, flag| state.without(flag))
    }
}
