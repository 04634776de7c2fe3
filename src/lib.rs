//! apiuse - Find which components use API or internal members of other components
//!
//! This library scans a baseline snapshot of a modular distribution and
//! reports the references that cross component boundaries, classified by
//! the declared visibility of the referenced member.
//!
//! # Architecture
//!
//! The scan pipeline consists of:
//! 1. **Configuration** - Validate settings and compile patterns
//! 2. **Baseline Loading** - Read the component snapshot
//! 3. **Description Overrides** - Optionally re-tag packages as API or internal
//! 4. **Scope Building** - Split components into targets, scope and skipped
//! 5. **Search** - Walk every reference of the scope through the requestor
//! 6. **Reporting** - Render accepted references and skipped components

pub mod baseline;
pub mod config;
pub mod model;
pub mod pattern;
pub mod report;
pub mod scope;
pub mod search;
pub mod task;

pub use baseline::{Baseline, BaselineError, BaselineGuard, ResolveError, SnapshotLoader};
pub use config::{ConfigError, UseConfig};
pub use model::{Component, Member, MemberHandle, Reference, ReferenceKind, Visibility};
pub use report::{ReportFormat, UseReporter};
pub use scope::{ScopeBuilder, SearchScope, SkippedComponent};
pub use search::{SearchEngine, SearchMask, SearchReporter, SearchRequestor, UseSearchRequestor};
pub use task::UseTask;
