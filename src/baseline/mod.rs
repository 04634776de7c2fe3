//! Baseline support for apiuse
//!
//! A baseline is the snapshot of every component of the distribution under
//! analysis. It is created before the search, read-only while the search
//! runs, and disposed exactly once afterwards through [`BaselineGuard`].

mod loader;

pub use loader::{SnapshotFormat, SnapshotLoader};

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info};

use crate::model::{Component, DescriptionModifier, MemberHandle, Reference};

/// Baseline errors
#[derive(Error, Debug)]
pub enum BaselineError {
    #[error("Baseline location does not exist: {0}")]
    NotFound(PathBuf),
    #[error("Failed to read snapshot {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse snapshot {path}: {message}")]
    ParseError { path: PathBuf, message: String },
    #[error("Unsupported snapshot format: {0}")]
    UnsupportedFormat(PathBuf),
    #[error("Snapshot format version {found} is not supported (expected {expected})")]
    VersionMismatch { found: u32, expected: u32 },
}

/// Why a reference target could not be resolved
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("reference from {from} has no resolved target")]
    Unresolved { from: MemberHandle },
    #[error("target component {id} is not part of the baseline")]
    UnknownComponent { id: String, version: Option<String> },
    #[error("baseline has been disposed")]
    Disposed,
}

/// A reference target resolved against the baseline
#[derive(Debug, Clone, Copy)]
pub struct ResolvedTarget<'a> {
    pub component: &'a Component,
    pub handle: &'a MemberHandle,
}

/// Current snapshot format version
pub const SNAPSHOT_VERSION: u32 = 1;

/// Serialized form of a whole baseline
#[derive(Debug, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub components: Vec<Component>,
}

fn default_version() -> u32 {
    SNAPSHOT_VERSION
}

/// An ordered set of components under analysis
#[derive(Debug)]
pub struct Baseline {
    name: String,
    components: Vec<Component>,
    index: HashMap<String, Vec<usize>>,
    disposed: bool,
}

impl Baseline {
    pub fn new(name: impl Into<String>, components: Vec<Component>) -> Self {
        let mut index: HashMap<String, Vec<usize>> = HashMap::new();
        for (i, component) in components.iter().enumerate() {
            index.entry(component.id.clone()).or_default().push(i);
        }

        Self {
            name: name.into(),
            components,
            index,
            disposed: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// All components, in baseline order
    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Find a component by id, and by version when one is given
    pub fn find_component(&self, id: &str, version: Option<&str>) -> Option<&Component> {
        self.index
            .get(id)?
            .iter()
            .map(|&i| &self.components[i])
            .find(|c| version.map_or(true, |v| c.version == v))
    }

    /// Resolve the target of `reference`. Failure is a normal outcome.
    pub fn resolve<'a>(&'a self, reference: &'a Reference) -> Result<ResolvedTarget<'a>, ResolveError> {
        if self.disposed {
            return Err(ResolveError::Disposed);
        }

        let target = reference
            .target
            .as_ref()
            .ok_or_else(|| ResolveError::Unresolved {
                from: reference.source.clone(),
            })?;

        let component = self
            .find_component(&target.component, target.version.as_deref())
            .ok_or_else(|| ResolveError::UnknownComponent {
                id: target.component.clone(),
                version: target.version.clone(),
            })?;

        Ok(ResolvedTarget {
            component,
            handle: &target.handle,
        })
    }

    /// Run the description pre-pass over every eligible component.
    ///
    /// Takes `&mut self`, so it always completes before any search can
    /// borrow the baseline. Returns the number of updated components.
    pub fn apply_modifier(&mut self, modifier: &DescriptionModifier) -> usize {
        let mut updated = 0;
        for component in &mut self.components {
            if !modifier.applies_to(component) {
                continue;
            }
            let description = modifier.apply(component);
            component.set_description(description);
            updated += 1;
        }
        debug!("Updated API descriptions of {} components", updated);
        updated
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Release all component memory. Returns `false` if already disposed.
    pub fn dispose(&mut self) -> bool {
        if self.disposed {
            return false;
        }
        info!("Disposing baseline '{}' ({} components)", self.name, self.components.len());
        self.components = Vec::new();
        self.index = HashMap::new();
        self.disposed = true;
        true
    }
}

/// Owns a baseline and disposes it exactly once when dropped
#[derive(Debug)]
pub struct BaselineGuard {
    baseline: Baseline,
}

impl BaselineGuard {
    pub fn new(baseline: Baseline) -> Self {
        Self { baseline }
    }
}

impl Deref for BaselineGuard {
    type Target = Baseline;

    fn deref(&self) -> &Self::Target {
        &self.baseline
    }
}

impl DerefMut for BaselineGuard {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.baseline
    }
}

impl Drop for BaselineGuard {
    fn drop(&mut self) {
        self.baseline.dispose();
    }
}
