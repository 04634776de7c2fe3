use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;
use tracing::trace;

use super::{Component, ComponentKey, MemberHandle};

/// Errors raised when the annotation table of a component cannot be used
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DescriptionError {
    #[error("component {0} has no API description")]
    Missing(ComponentKey),
}

/// Declared visibility of a member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Part of the component's public contract
    Api,
    /// Explicitly not part of the contract
    Internal,
    #[default]
    Unannotated,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Api => "api",
            Visibility::Internal => "internal",
            Visibility::Unannotated => "unannotated",
        }
    }
}

impl std::fmt::Display for Visibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Annotation table of a component.
///
/// Member entries are keyed by handle, package entries by package name.
/// A map holds at most one visibility per key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiDescription {
    pub members: HashMap<MemberHandle, Visibility>,
    pub packages: BTreeMap<String, Visibility>,
}

impl ApiDescription {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_member(mut self, handle: MemberHandle, visibility: Visibility) -> Self {
        self.members.insert(handle, visibility);
        self
    }

    pub fn with_package(mut self, package: impl Into<String>, visibility: Visibility) -> Self {
        self.packages.insert(package.into(), visibility);
        self
    }

    pub fn set_package_visibility(&mut self, package: &str, visibility: Visibility) {
        self.packages.insert(package.to_string(), visibility);
    }

    /// Nearest annotation for `handle`: the member itself, then its enclosing
    /// types, then its package.
    pub fn resolve(&self, handle: &MemberHandle) -> Option<Visibility> {
        let mut current = Some(handle.clone());
        while let Some(h) = current {
            if let Some(visibility) = self.members.get(&h) {
                return Some(*visibility);
            }
            current = h.parent();
        }
        self.packages.get(handle.package()).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty() && self.packages.is_empty()
    }
}

/// Visibility of `handle` as declared by `component`.
///
/// Pure lookup: a component without a description, or a handle with no
/// annotation, is `Unannotated`.
pub fn classify(component: &Component, handle: &MemberHandle) -> Visibility {
    match component.api_description() {
        Ok(description) => description.resolve(handle).unwrap_or_default(),
        Err(e) => {
            trace!("{}, treating {} as unannotated", e, handle);
            Visibility::Unannotated
        }
    }
}
