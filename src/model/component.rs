use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::{ApiDescription, DescriptionError, Member};

/// Identity of a component: id plus version
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ComponentKey {
    pub id: String,
    pub version: String,
}

impl ComponentKey {
    pub fn new(id: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            version: version.into(),
        }
    }
}

impl std::fmt::Display for ComponentKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.id, self.version)
    }
}

/// A problem reported by the resolver for a component
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResolverError {
    pub message: String,
}

impl ResolverError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ResolverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Kind of container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerKind {
    Archive,
    Directory,
}

/// A unit holding members within a component (a jar or a class folder)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Container {
    pub kind: ContainerKind,

    /// Path of the container inside its component
    pub name: String,

    /// Owning component, filled in when attached to a component
    #[serde(default, skip_serializing)]
    pub component: ComponentKey,

    #[serde(default)]
    pub members: Vec<Member>,
}

impl Container {
    pub fn archive(name: impl Into<String>) -> Self {
        Self::new(ContainerKind::Archive, name)
    }

    pub fn directory(name: impl Into<String>) -> Self {
        Self::new(ContainerKind::Directory, name)
    }

    fn new(kind: ContainerKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            component: ComponentKey::default(),
            members: Vec::new(),
        }
    }

    pub fn with_member(mut self, member: Member) -> Self {
        self.members.push(member);
        self
    }

    pub fn is_archive(&self) -> bool {
        self.kind == ContainerKind::Archive
    }

    fn attach(&mut self, key: &ComponentKey) {
        self.component = key.clone();
        for member in &mut self.members {
            member.attach(key);
        }
    }
}

/// One deployable unit of the baseline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Component {
    pub id: String,

    pub version: String,

    /// Provided by the platform (e.g. the execution environment)
    #[serde(default)]
    pub is_system: bool,

    /// Source bundle, carries no binary members of its own
    #[serde(default)]
    pub is_source: bool,

    /// Resolver errors, empty when the component resolved cleanly
    #[serde(default)]
    pub errors: Vec<ResolverError>,

    #[serde(default)]
    pub containers: Vec<Container>,

    /// API annotation table, `None` when the component has no description
    #[serde(default)]
    pub description: Option<ApiDescription>,
}

impl Component {
    pub fn new(id: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            version: version.into(),
            is_system: false,
            is_source: false,
            errors: Vec::new(),
            containers: Vec::new(),
            description: None,
        }
    }

    pub fn system(mut self) -> Self {
        self.is_system = true;
        self
    }

    pub fn source(mut self) -> Self {
        self.is_source = true;
        self
    }

    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.errors.push(ResolverError::new(message));
        self
    }

    pub fn with_container(mut self, mut container: Container) -> Self {
        container.attach(&self.key());
        self.containers.push(container);
        self
    }

    pub fn with_description(mut self, description: ApiDescription) -> Self {
        self.description = Some(description);
        self
    }

    pub fn key(&self) -> ComponentKey {
        ComponentKey::new(self.id.clone(), self.version.clone())
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// The annotation table of this component
    pub fn api_description(&self) -> Result<&ApiDescription, DescriptionError> {
        self.description
            .as_ref()
            .ok_or_else(|| DescriptionError::Missing(self.key()))
    }

    /// Replace the annotation table with an updated snapshot
    pub fn set_description(&mut self, description: ApiDescription) {
        self.description = Some(description);
    }

    /// Distinct package names of all members, sorted
    pub fn packages(&self) -> BTreeSet<String> {
        self.members()
            .map(|member| member.handle.package().to_string())
            .collect()
    }

    /// Iterate all members across all containers
    pub fn members(&self) -> impl Iterator<Item = &Member> {
        self.containers.iter().flat_map(|c| c.members.iter())
    }

    /// Propagate ownership into containers, members and references.
    /// Needed after deserializing, where ownership is implicit.
    pub fn attach_members(&mut self) {
        let key = self.key();
        for container in &mut self.containers {
            container.attach(&key);
        }
    }
}

impl PartialEq for Component {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.version == other.version
    }
}

impl Eq for Component {}
