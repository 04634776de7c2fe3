use crate::pattern::{PackagePatterns, PatternError};

use super::{ApiDescription, Component, Visibility};

/// Re-tags packages as API or internal before any classification happens.
///
/// The modifier never mutates a description in place: `apply` returns a new
/// snapshot that the baseline swaps in while it is still exclusively owned.
#[derive(Debug, Clone, Default)]
pub struct DescriptionModifier {
    api: PackagePatterns,
    internal: PackagePatterns,
}

impl DescriptionModifier {
    pub fn new(api_patterns: &[String], internal_patterns: &[String]) -> Result<Self, PatternError> {
        Ok(Self {
            api: PackagePatterns::compile(api_patterns)?,
            internal: PackagePatterns::compile(internal_patterns)?,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.api.is_empty() && self.internal.is_empty()
    }

    /// Whether the pre-pass applies to this component at all
    pub fn applies_to(&self, component: &Component) -> bool {
        !component.is_system && !component.is_source
    }

    /// Updated description of `component`. API patterns win over internal ones.
    pub fn apply(&self, component: &Component) -> ApiDescription {
        let mut description = component.description.clone().unwrap_or_default();

        let mut packages = component.packages();
        packages.extend(description.packages.keys().cloned());

        for package in &packages {
            if self.api.matches(package) {
                description.set_package_visibility(package, Visibility::Api);
            } else if self.internal.matches(package) {
                description.set_package_visibility(package, Visibility::Internal);
            }
        }

        description
    }
}
