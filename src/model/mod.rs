// In-memory model of a baseline: components, containers, members, references

mod component;
mod description;
mod member;
mod modifier;
pub mod reference;

pub use component::{Component, ComponentKey, Container, ContainerKind, ResolverError};
pub use description::{classify, ApiDescription, DescriptionError, Visibility};
pub use member::{HandleError, Member, MemberHandle, MemberKind};
pub use modifier::DescriptionModifier;
pub use reference::{Reference, ReferenceKind, ReferenceKinds, ReferenceTarget};
