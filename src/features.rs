//! Feature flags controlling optional pipeline behavior.
//!
//! A [`FeatureSet`] is configured once on the [`Deserializer`](crate::Deserializer)
//! and may be overridden for a single call. Each call snapshots the set it runs with.

use std::fmt::{self, Display};
use std::str::FromStr;

use serde_json::Value;

/// A recognized pipeline option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    /// Evaluate whole-object constraints after an object is built. Off by default.
    ValidateWholeObjectAfterConstruction,
    /// Treat non-null slots as carrying an implicit not-null obligation. On by default.
    ValidateImplicitNonNullProperties,
    /// Report never-assigned lateinit-like properties as `NotNull`. On by default.
    ValidateUnsetLateinitLikeProperties,
    /// Report missing required values with kind `NotNull` instead of `Required`. Off by default.
    ReportMissingRequiredAsNotNull,
    /// Abort on payload keys that match no parameter or property. Off by default.
    FailOnUnknownProperties,
    /// Name slots by member name rather than payload key in violation paths. Off by default.
    ReportMemberPathsInViolations,
}

impl Feature {
    /// All features, in declaration order.
    pub const ALL: [Feature; 6] = [
        Feature::ValidateWholeObjectAfterConstruction,
        Feature::ValidateImplicitNonNullProperties,
        Feature::ValidateUnsetLateinitLikeProperties,
        Feature::ReportMissingRequiredAsNotNull,
        Feature::FailOnUnknownProperties,
        Feature::ReportMemberPathsInViolations,
    ];

    /// Returns whether this feature is part of [`FeatureSet::default`].
    pub fn enabled_by_default(self) -> bool {
        matches!(
            self,
            Feature::ValidateImplicitNonNullProperties | Feature::ValidateUnsetLateinitLikeProperties
        )
    }

    /// The configuration name of this feature.
    pub fn name(self) -> &'static str {
        match self {
            Feature::ValidateWholeObjectAfterConstruction => "validateWholeObjectAfterConstruction",
            Feature::ValidateImplicitNonNullProperties => "validateImplicitNonNullProperties",
            Feature::ValidateUnsetLateinitLikeProperties => "validateUnsetLateinitLikeProperties",
            Feature::ReportMissingRequiredAsNotNull => "reportMissingRequiredAsNotNull",
            Feature::FailOnUnknownProperties => "failOnUnknownProperties",
            Feature::ReportMemberPathsInViolations => "reportMemberPathsInViolations",
        }
    }

    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

impl Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Feature {
    type Err = FeatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Feature::ALL
            .into_iter()
            .find(|feature| feature.name() == s)
            .ok_or_else(|| FeatureError::Unknown(s.to_string()))
    }
}

/// Errors raised while loading feature configuration.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FeatureError {
    /// The name does not match any [`Feature`].
    #[error("unknown feature '{0}'")]
    Unknown(String),

    /// A configuration entry was not a boolean.
    #[error("feature '{0}' must be set to a boolean")]
    NotBoolean(String),

    /// The configuration document was not a JSON object.
    #[error("feature configuration must be a JSON object")]
    NotAnObject,
}

/// A set of enabled [`Feature`]s.
///
/// # Example
///
/// ```rust
/// use intake::{Feature, FeatureSet};
///
/// let features = FeatureSet::default()
///     .enable(Feature::ValidateWholeObjectAfterConstruction)
///     .disable(Feature::ValidateUnsetLateinitLikeProperties);
///
/// assert!(features.is_enabled(Feature::ValidateWholeObjectAfterConstruction));
/// assert!(features.is_enabled(Feature::ValidateImplicitNonNullProperties));
/// assert!(!features.is_enabled(Feature::ValidateUnsetLateinitLikeProperties));
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct FeatureSet {
    bits: u8,
}

impl FeatureSet {
    /// A set with no feature enabled.
    pub fn empty() -> Self {
        Self { bits: 0 }
    }

    /// Returns whether `feature` is enabled.
    pub fn is_enabled(&self, feature: Feature) -> bool {
        self.bits & feature.bit() != 0
    }

    /// Returns a copy with `feature` enabled.
    pub fn enable(self, feature: Feature) -> Self {
        Self {
            bits: self.bits | feature.bit(),
        }
    }

    /// Returns a copy with `feature` disabled.
    pub fn disable(self, feature: Feature) -> Self {
        Self {
            bits: self.bits & !feature.bit(),
        }
    }

    /// Returns a copy with `feature` set to `enabled`.
    pub fn with(self, feature: Feature, enabled: bool) -> Self {
        if enabled {
            self.enable(feature)
        } else {
            self.disable(feature)
        }
    }

    /// Returns the enabled features in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = Feature> + '_ {
        Feature::ALL.into_iter().filter(|f| self.is_enabled(*f))
    }

    /// Applies overrides from a JSON object such as
    /// `{"validateWholeObjectAfterConstruction": true}`.
    ///
    /// # Errors
    ///
    /// Fails on unknown names, non-boolean values, or a non-object document.
    pub fn apply_json(self, config: &Value) -> Result<Self, FeatureError> {
        let entries = config.as_object().ok_or(FeatureError::NotAnObject)?;
        entries.iter().try_fold(self, |set, (name, value)| {
            let feature: Feature = name.parse()?;
            let enabled = value
                .as_bool()
                .ok_or_else(|| FeatureError::NotBoolean(name.clone()))?;
            Ok(set.with(feature, enabled))
        })
    }
}

impl Default for FeatureSet {
    fn default() -> Self {
        Feature::ALL
            .into_iter()
            .filter(|f| f.enabled_by_default())
            .fold(Self::empty(), FeatureSet::enable)
    }
}

impl fmt::Debug for FeatureSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
