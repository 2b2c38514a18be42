//! Per-property feature overrides and their resolution.
//!
//! A property may force a flag on or off regardless of the global default.
//! The override is compiled once, when the property descriptor is built,
//! and never re-inspected per call.

use serde::{Deserialize, Serialize};

use crate::config::GlobalFeatureState;
use crate::feature::{FeatureFlag, FeatureSet};

/// Forced-on and forced-off flags attached to one property.
///
/// The two sets should be disjoint. When a flag appears in both, the
/// forced-off entry wins (see [`resolve`]).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct PropertyFeatureOverride {
    forced_on: FeatureSet,
    forced_off: FeatureSet,
}

impl PropertyFeatureOverride {
    /// An override that forces nothing.
    pub const NONE: Self = Self {
        forced_on: FeatureSet::EMPTY,
        forced_off: FeatureSet::EMPTY,
    };

    /// Creates an override from explicit sets.
    #[must_use]
    pub const fn new(forced_on: FeatureSet, forced_off: FeatureSet) -> Self {
        Self {
            forced_on,
            forced_off,
        }
    }

    /// Returns a copy that forces `flag` on.
    #[must_use]
    pub const fn force_on(self, flag: FeatureFlag) -> Self {
        Self {
            forced_on: self.forced_on.with(flag),
            forced_off: self.forced_off,
        }
    }

    /// Returns a copy that forces `flag` off.
    #[must_use]
    pub const fn force_off(self, flag: FeatureFlag) -> Self {
        Self {
            forced_on: self.forced_on,
            forced_off: self.forced_off.with(flag),
        }
    }

    /// Flags forced on.
    #[must_use]
    pub const fn forced_on(&self) -> FeatureSet {
        self.forced_on
    }

    /// Flags forced off.
    #[must_use]
    pub const fn forced_off(&self) -> FeatureSet {
        self.forced_off
    }

    /// Flags that are forced both on and off.
    #[must_use]
    pub const fn conflicts(&self) -> FeatureSet {
        self.forced_on.intersection(self.forced_off)
    }

    /// Returns true if this override forces nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.forced_on.is_empty() && self.forced_off.is_empty()
    }
}

/// Computes the effective state of `flag` for one property.
///
/// Forced-off beats forced-on, forced-on beats the global default.
///
/// # Examples
///
/// ```
/// use seqshape::{resolve, FeatureFlag, GlobalFeatureState, PropertyFeatureOverride};
///
/// let flag = FeatureFlag::UnwrapSingleElementSequences;
/// let global = GlobalFeatureState::default().with(flag);
/// let keep_wrapped = PropertyFeatureOverride::NONE.force_off(flag);
///
/// assert!(resolve(flag, &global, &PropertyFeatureOverride::NONE));
/// assert!(!resolve(flag, &global, &keep_wrapped));
/// ```
#[must_use]
pub const fn resolve(
    flag: FeatureFlag,
    global: &GlobalFeatureState,
    overrides: &PropertyFeatureOverride,
) -> bool {
    if overrides.forced_off.contains(flag) {
        false
    } else if overrides.forced_on.contains(flag) {
        true
    } else {
        global.is_enabled(flag)
    }
}
