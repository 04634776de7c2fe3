//! Scope building: which components are scanned and which are usage targets

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use tracing::{debug, info};

use crate::model::{Component, ComponentKey, ResolverError};
use crate::pattern::IdPattern;

/// A component left out of the scope, with the resolver errors that caused it
#[derive(Debug, Clone, Serialize)]
pub struct SkippedComponent {
    pub id: String,
    pub version: String,
    pub errors: Vec<ResolverError>,
}

impl SkippedComponent {
    pub fn from_component(component: &Component) -> Self {
        Self {
            id: component.id.clone(),
            version: component.version.clone(),
            errors: component.errors.clone(),
        }
    }

    pub fn key(&self) -> ComponentKey {
        ComponentKey::new(self.id.clone(), self.version.clone())
    }

    /// Skipped because of resolver errors rather than a pattern mismatch
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

// Ordered and deduplicated by (id, version) only
impl PartialEq for SkippedComponent {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.version == other.version
    }
}

impl Eq for SkippedComponent {}

impl PartialOrd for SkippedComponent {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SkippedComponent {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (&self.id, &self.version).cmp(&(&other.id, &other.version))
    }
}

/// The components whose outward references are scanned, ordered by (id, version)
#[derive(Debug, Clone, Default)]
pub struct SearchScope<'a> {
    components: Vec<&'a Component>,
}

impl<'a> SearchScope<'a> {
    /// Build a scope, deduplicating by identity
    pub fn new(components: impl IntoIterator<Item = &'a Component>) -> Self {
        let unique: BTreeMap<ComponentKey, &'a Component> = components
            .into_iter()
            .map(|c| (c.key(), c))
            .collect();
        Self {
            components: unique.into_values().collect(),
        }
    }

    pub fn components(&self) -> &[&'a Component] {
        &self.components
    }

    pub fn contains(&self, component: &Component) -> bool {
        self.components.iter().any(|c| *c == component)
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

/// Result of scope building
#[derive(Debug, Clone, Default)]
pub struct SearchContext<'a> {
    /// Ids of components that count as usage targets
    pub ids: HashSet<String>,
    /// Components to scan
    pub scope: SearchScope<'a>,
    /// Components left out of the scope
    pub skipped: BTreeSet<SkippedComponent>,
}

impl SearchContext<'_> {
    /// Skipped components in their stable (id, version) order
    pub fn skipped_list(&self) -> Vec<SkippedComponent> {
        self.skipped.iter().cloned().collect()
    }
}

/// Partitions a universe of components into id-set, scope and skipped set
#[derive(Debug, Clone, Default)]
pub struct ScopeBuilder {
    reference_pattern: Option<IdPattern>,
    scope_pattern: Option<IdPattern>,
}

impl ScopeBuilder {
    pub fn new(reference_pattern: Option<IdPattern>, scope_pattern: Option<IdPattern>) -> Self {
        Self {
            reference_pattern,
            scope_pattern,
        }
    }

    /// Build the id-set, scope and skipped set in one pass
    pub fn build_context<'a>(&self, universe: &'a [Component]) -> SearchContext<'a> {
        let mut ids = HashSet::new();
        let mut in_scope = Vec::new();
        let mut skipped = BTreeSet::new();

        for component in universe {
            if Self::accept_component(component, self.reference_pattern.as_ref(), true) {
                ids.insert(component.id.clone());
            }

            if Self::accept_component(component, self.scope_pattern.as_ref(), false) {
                in_scope.push(component);
            } else if !component.is_system || component.has_errors() {
                debug!(
                    "Not searching {} ({} resolver errors)",
                    component.key(),
                    component.errors.len()
                );
                skipped.insert(SkippedComponent::from_component(component));
            }
        }

        let scope = SearchScope::new(in_scope);
        info!(
            "Scope: {} components to scan, {} reference targets, {} skipped",
            scope.len(),
            ids.len(),
            skipped.len()
        );

        SearchContext { ids, scope, skipped }
    }

    /// Whether `component` is accepted in a role.
    ///
    /// With `allow_resolve` (usage target role) resolver errors do not
    /// matter; without it (scan role) they reject the component.
    pub fn accept_component(
        component: &Component,
        pattern: Option<&IdPattern>,
        allow_resolve: bool,
    ) -> bool {
        if !allow_resolve && component.has_errors() {
            return false;
        }
        if component.is_system {
            return false;
        }
        match pattern {
            Some(pattern) => pattern.is_match(&component.id),
            None => true,
        }
    }
}
