//! Reference search: the requestor decides, the engine drives, the reporter receives
//!
//! The [`SearchEngine`] walks every component of a requestor's scope,
//! container by container and member by member, and hands each outward
//! reference to [`SearchRequestor::accept_reference`]. Accepted references
//! stream to a [`SearchReporter`], followed by the skipped components.

mod engine;
mod requestor;

pub use engine::{SearchEngine, SearchStats};
pub use requestor::UseSearchRequestor;

use serde::Serialize;
use thiserror::Error;

use crate::model::{
    Component, ComponentKey, Container, Member, MemberHandle, Reference, ReferenceKind,
    ReferenceKinds, Visibility,
};
use crate::scope::{SearchScope, SkippedComponent};

/// Errors raised by a reporter while the scan is running
#[derive(Error, Debug)]
pub enum ReporterError {
    #[error("Failed to write report: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("Reporter rejected the result: {0}")]
    Rejected(String),
}

/// Which kinds of usage to collect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SearchMask {
    pub include_api: bool,
    pub include_internal: bool,
}

impl SearchMask {
    pub fn new(include_api: bool, include_internal: bool) -> Self {
        Self {
            include_api,
            include_internal,
        }
    }

    pub fn both() -> Self {
        Self::new(true, true)
    }

    /// Nothing would ever be accepted
    pub fn is_empty(&self) -> bool {
        !self.include_api && !self.include_internal
    }
}

/// Decides what the engine scans and which references are reported
pub trait SearchRequestor {
    fn accept_component(&self, component: &Component) -> bool;

    fn accept_container(&self, container: &Container) -> bool;

    fn accept_member(&self, member: &Member) -> bool;

    /// Reference kinds the engine should hand to `accept_reference`
    fn reference_kinds(&self) -> ReferenceKinds;

    fn accept_reference(&self, reference: &Reference) -> bool;

    fn scope(&self) -> &SearchScope<'_>;

    /// Visibility label for an accepted reference
    fn visibility_of(&self, _reference: &Reference) -> Visibility {
        Visibility::Unannotated
    }
}

/// Receives search results
pub trait SearchReporter {
    /// Called once per accepted reference, in no guaranteed order
    fn report_accepted(&mut self, reference: AcceptedReference) -> Result<(), ReporterError>;

    /// Called exactly once, after the scan completed or failed
    fn report_skipped(&mut self, skipped: &[SkippedComponent]);
}

/// A reference that passed the requestor
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AcceptedReference {
    pub kind: ReferenceKind,
    /// Component holding the referring member
    pub source_component: ComponentKey,
    pub source: MemberHandle,
    /// Component owning the referenced member
    pub target_component: String,
    pub target: MemberHandle,
    pub visibility: Visibility,
    pub line: Option<u32>,
}

impl AcceptedReference {
    /// Build from a reference known to have a target
    pub fn new(reference: &Reference, visibility: Visibility) -> Option<Self> {
        let target = reference.target.as_ref()?;
        Some(Self {
            kind: reference.kind,
            source_component: reference.source_component.clone(),
            source: reference.source.clone(),
            target_component: target.component.clone(),
            target: target.handle.clone(),
            visibility,
            line: reference.line,
        })
    }
}
