//! Repository feature model
//!
//! Every toggleable repository feature is described by one entry of a static
//! table binding the feature to its GitHub field name, a getter on
//! [`FeatureFlags`] and a setter on [`FeaturePatch`]. Adding a feature means
//! adding a [`Feature`] variant and a table entry.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A toggleable repository feature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Feature {
    Issues,
    Wiki,
    Projects,
}

/// Desired state for a feature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureStatus {
    On,
    Off,
}

/// Current feature flags of a repository, as reported by GitHub
///
/// A flag GitHub omits or sends as `null` is unknown (`None`) and is never
/// reconciled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FeatureFlags {
    #[serde(default)]
    pub has_issues: Option<bool>,
    #[serde(default)]
    pub has_wiki: Option<bool>,
    #[serde(default)]
    pub has_projects: Option<bool>,
}

/// Partial repository update payload (`PATCH /repos/{owner}/{repo}`)
///
/// Only the fields that were set are serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FeaturePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_issues: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_wiki: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_projects: Option<bool>,
}

struct FeatureBinding {
    feature: Feature,
    name: &'static str,
    field: &'static str,
    get: fn(&FeatureFlags) -> Option<bool>,
    set: fn(&mut FeaturePatch, bool),
}

static FEATURES: [FeatureBinding; 3] = [
    FeatureBinding {
        feature: Feature::Issues,
        name: "issues",
        field: "has_issues",
        get: |flags| flags.has_issues,
        set: |patch, enabled| patch.has_issues = Some(enabled),
    },
    FeatureBinding {
        feature: Feature::Wiki,
        name: "wiki",
        field: "has_wiki",
        get: |flags| flags.has_wiki,
        set: |patch, enabled| patch.has_wiki = Some(enabled),
    },
    FeatureBinding {
        feature: Feature::Projects,
        name: "projects",
        field: "has_projects",
        get: |flags| flags.has_projects,
        set: |patch, enabled| patch.has_projects = Some(enabled),
    },
];

impl Feature {
    /// All supported features, in table order
    pub fn all() -> impl Iterator<Item = Feature> {
        FEATURES.iter().map(|binding| binding.feature)
    }

    fn binding(self) -> &'static FeatureBinding {
        // Table order matches variant order
        &FEATURES[self as usize]
    }

    /// Lowercase feature name ("issues", "wiki", "projects")
    pub fn name(self) -> &'static str {
        self.binding().name
    }

    /// GitHub repository field backing this feature
    pub fn field(self) -> &'static str {
        self.binding().field
    }

    /// Read this feature's current state from a repository's flags, if known
    pub fn is_enabled(self, flags: &FeatureFlags) -> Option<bool> {
        (self.binding().get)(flags)
    }

    /// Set this feature's field on an update payload
    pub fn set(self, patch: &mut FeaturePatch, enabled: bool) {
        (self.binding().set)(patch, enabled)
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Feature {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        FEATURES
            .iter()
            .find(|binding| binding.name == wanted)
            .map(|binding| binding.feature)
            .ok_or_else(|| anyhow!("Unknown feature '{}' (expected issues, wiki or projects)", s))
    }
}

impl FeatureStatus {
    /// Boolean value the GitHub field takes for this status
    pub fn enabled(self) -> bool {
        matches!(self, FeatureStatus::On)
    }

    /// Whether a feature in the `current` state must be updated to reach this status
    ///
    /// An unknown state never requires a change.
    pub fn requires_change(self, current: Option<bool>) -> bool {
        matches!(current, Some(enabled) if enabled != self.enabled())
    }
}

impl fmt::Display for FeatureStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureStatus::On => f.write_str("on"),
            FeatureStatus::Off => f.write_str("off"),
        }
    }
}

impl FromStr for FeatureStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "on" => Ok(FeatureStatus::On),
            "off" => Ok(FeatureStatus::Off),
            other => Err(anyhow!("Invalid feature status '{}' (expected on or off)", other)),
        }
    }
}

impl FeaturePatch {
    /// Payload setting a single feature
    pub fn single(feature: Feature, enabled: bool) -> Self {
        let mut patch = Self::default();
        feature.set(&mut patch, enabled);
        patch
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Desired feature states, in the order they were requested
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureRequest {
    entries: Vec<(Feature, FeatureStatus)>,
}

impl FeatureRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a status for a feature, replacing an earlier request for the same feature
    pub fn set(&mut self, feature: Feature, status: FeatureStatus) {
        match self.entries.iter_mut().find(|(existing, _)| *existing == feature) {
            Some(entry) => entry.1 = status,
            None => self.entries.push((feature, status)),
        }
    }

    /// Builder-style variant of [`FeatureRequest::set`]
    pub fn with(mut self, feature: Feature, status: FeatureStatus) -> Self {
        self.set(feature, status);
        self
    }

    pub fn get(&self, feature: Feature) -> Option<FeatureStatus> {
        self.entries
            .iter()
            .find(|(existing, _)| *existing == feature)
            .map(|(_, status)| *status)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Feature, FeatureStatus)> + '_ {
        self.entries.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(Feature, FeatureStatus)> for FeatureRequest {
    fn from_iter<I: IntoIterator<Item = (Feature, FeatureStatus)>>(iter: I) -> Self {
        let mut request = Self::new();
        for (feature, status) in iter {
            request.set(feature, status);
        }
        request
    }
}
