use std::collections::HashSet;
use tracing::trace;

use super::{SearchMask, SearchRequestor};
use crate::baseline::{Baseline, ResolveError, ResolvedTarget};
use crate::model::{
    classify, Component, Container, Member, Reference, ReferenceKind, ReferenceKinds, Visibility,
};
use crate::pattern::ArchiveFilter;
use crate::scope::SearchScope;

/// Accepts references from the scope into components of the id-set,
/// filtered by the visibility of the referenced member
pub struct UseSearchRequestor<'a> {
    baseline: &'a Baseline,
    ids: HashSet<String>,
    mask: SearchMask,
    scope: SearchScope<'a>,
    archives: ArchiveFilter,
}

impl<'a> UseSearchRequestor<'a> {
    pub fn new(
        baseline: &'a Baseline,
        ids: HashSet<String>,
        scope: SearchScope<'a>,
        mask: SearchMask,
    ) -> Self {
        Self {
            baseline,
            ids,
            mask,
            scope,
            archives: ArchiveFilter::default(),
        }
    }

    /// Archive containers to leave out, as `componentId:suffix` patterns
    pub fn with_archive_patterns(mut self, patterns: &[String]) -> Self {
        self.archives = ArchiveFilter::new(patterns);
        self
    }

    pub fn includes_api(&self) -> bool {
        self.mask.include_api
    }

    pub fn includes_internal(&self) -> bool {
        self.mask.include_internal
    }

    pub fn ids(&self) -> &HashSet<String> {
        &self.ids
    }

    fn resolve<'r>(&'r self, reference: &'r Reference) -> Result<ResolvedTarget<'r>, ResolveError> {
        self.baseline.resolve(reference)
    }
}

impl SearchRequestor for UseSearchRequestor<'_> {
    fn accept_component(&self, _component: &Component) -> bool {
        true
    }

    fn accept_container(&self, container: &Container) -> bool {
        if self.archives.excludes(container) {
            trace!("Skipping archive {} of {}", container.name, container.component);
            return false;
        }
        true
    }

    fn accept_member(&self, member: &Member) -> bool {
        // nested and local types are covered by their enclosing type
        !member.is_nested_type()
    }

    fn reference_kinds(&self) -> ReferenceKinds {
        ReferenceKinds::all().without(ReferenceKind::ConstantPool)
    }

    fn accept_reference(&self, reference: &Reference) -> bool {
        let target = match self.resolve(reference) {
            Ok(target) => target,
            Err(e) => {
                trace!("Rejecting reference: {}", e);
                return false;
            }
        };

        let component = target.component;
        if !self.ids.contains(&component.id) {
            return false;
        }
        if component.key() == reference.source_component {
            return false;
        }
        if self.includes_api() && self.includes_internal() {
            return true;
        }

        match classify(component, target.handle) {
            Visibility::Api => self.includes_api(),
            Visibility::Internal => self.includes_internal(),
            Visibility::Unannotated => false,
        }
    }

    fn scope(&self) -> &SearchScope<'_> {
        &self.scope
    }

    fn visibility_of(&self, reference: &Reference) -> Visibility {
        self.resolve(reference)
            .map(|target| classify(target.component, target.handle))
            .unwrap_or_default()
    }
}
