use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

use super::{ComponentKey, Reference};

/// Errors raised when parsing a member handle from its string form
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HandleError {
    #[error("member handle is empty")]
    Empty,
    #[error("member handle '{0}' has no type name")]
    MissingType(String),
}

/// Structural key of a member: `pkg.Type`, `pkg.Type#field` or `pkg.Type#method(sig)`
///
/// Nested types use `$` as the separator from their enclosing type
/// (e.g. `org.demo.Outer$Inner`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MemberHandle {
    /// Fully qualified type name
    pub type_name: String,
    /// Field or method name, `None` for the type itself
    pub member: Option<String>,
    /// Method signature including parentheses
    pub signature: Option<String>,
}

impl MemberHandle {
    /// Handle for a type
    pub fn of_type(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            member: None,
            signature: None,
        }
    }

    /// Handle for a field of `type_name`
    pub fn field(type_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            member: Some(name.into()),
            signature: None,
        }
    }

    /// Handle for a method of `type_name`
    pub fn method(
        type_name: impl Into<String>,
        name: impl Into<String>,
        signature: impl Into<String>,
    ) -> Self {
        Self {
            type_name: type_name.into(),
            member: Some(name.into()),
            signature: Some(signature.into()),
        }
    }

    /// Whether this handle designates a type rather than one of its members
    pub fn is_type(&self) -> bool {
        self.member.is_none()
    }

    /// Package of the type, empty for the default package
    pub fn package(&self) -> &str {
        let outer = self.type_name.split('$').next().unwrap_or(&self.type_name);
        match outer.rfind('.') {
            Some(idx) => &outer[..idx],
            None => "",
        }
    }

    /// The handle one level up: member -> type, nested type -> enclosing type.
    /// Top-level types have no parent handle.
    pub fn parent(&self) -> Option<MemberHandle> {
        if self.member.is_some() {
            return Some(MemberHandle::of_type(self.type_name.clone()));
        }
        self.type_name
            .rfind('$')
            .map(|idx| MemberHandle::of_type(&self.type_name[..idx]))
    }
}

impl std::fmt::Display for MemberHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.type_name)?;
        if let Some(member) = &self.member {
            write!(f, "#{}", member)?;
        }
        if let Some(signature) = &self.signature {
            write!(f, "{}", signature)?;
        }
        Ok(())
    }
}

impl FromStr for MemberHandle {
    type Err = HandleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(HandleError::Empty);
        }

        let (type_name, rest) = match s.split_once('#') {
            Some((type_name, rest)) => (type_name, Some(rest)),
            None => (s, None),
        };
        if type_name.is_empty() {
            return Err(HandleError::MissingType(s.to_string()));
        }

        let (member, signature) = match rest {
            None => (None, None),
            Some(rest) => match rest.find('(') {
                Some(idx) => (
                    Some(rest[..idx].to_string()),
                    Some(rest[idx..].to_string()),
                ),
                None => (Some(rest.to_string()), None),
            },
        };

        Ok(Self {
            type_name: type_name.to_string(),
            member,
            signature,
        })
    }
}

impl TryFrom<String> for MemberHandle {
    type Error = HandleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MemberHandle> for String {
    fn from(handle: MemberHandle) -> Self {
        handle.to_string()
    }
}

/// Kind of member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberKind {
    Type,
    Method,
    Field,
}

impl MemberKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            MemberKind::Type => "type",
            MemberKind::Method => "method",
            MemberKind::Field => "field",
        }
    }
}

/// A resolvable program element inside a container
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    /// Structural key
    pub handle: MemberHandle,

    /// Kind of member
    pub kind: MemberKind,

    /// Owning component, filled in when the member is attached to a component
    #[serde(default, skip_serializing)]
    pub component: ComponentKey,

    /// Enclosing type, if any
    #[serde(default)]
    pub enclosing: Option<MemberHandle>,

    /// Type declared as a member of another type
    #[serde(default)]
    pub is_member_type: bool,

    /// Type declared inside a method body
    #[serde(default)]
    pub is_local: bool,

    /// Outward references of this member
    #[serde(default)]
    pub references: Vec<Reference>,
}

impl Member {
    pub fn new(handle: MemberHandle, kind: MemberKind) -> Self {
        Self {
            handle,
            kind,
            component: ComponentKey::default(),
            enclosing: None,
            is_member_type: false,
            is_local: false,
            references: Vec::new(),
        }
    }

    /// A top-level type
    pub fn type_member(type_name: impl Into<String>) -> Self {
        Self::new(MemberHandle::of_type(type_name), MemberKind::Type)
    }

    /// A type nested in `enclosing`
    pub fn nested_type(type_name: impl Into<String>, enclosing: impl Into<String>) -> Self {
        let mut member = Self::type_member(type_name);
        member.enclosing = Some(MemberHandle::of_type(enclosing));
        member.is_member_type = true;
        member
    }

    pub fn with_local(mut self, local: bool) -> Self {
        self.is_local = local;
        self
    }

    pub fn with_reference(mut self, reference: Reference) -> Self {
        self.references.push(reference);
        self
    }

    /// True for types declared inside another type or a method body
    pub fn is_nested_type(&self) -> bool {
        self.kind == MemberKind::Type && (self.is_member_type || self.is_local)
    }

    /// Propagate the owning component into this member and its references
    pub(crate) fn attach(&mut self, key: &ComponentKey) {
        self.component = key.clone();
        for reference in &mut self.references {
            reference.source = self.handle.clone();
            reference.source_component = key.clone();
        }
    }
}
