use serde::{Deserialize, Serialize};

use super::{ComponentKey, MemberHandle};

/// Kind of reference between members
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    /// Superclass declaration
    Extends,
    /// Implemented interface
    Implements,
    /// Constructor call on `super`/`this`
    SpecialMethod,
    StaticMethod,
    VirtualMethod,
    InterfaceMethod,
    ConstructorMethod,
    SuperConstructorMethod,
    GetField,
    PutField,
    GetStatic,
    PutStatic,
    /// Type of a declared field
    FieldDeclaration,
    /// Type of a local variable
    LocalVariable,
    Parameter,
    ReturnType,
    Throws,
    CatchException,
    CheckCast,
    InstanceOf,
    ArrayAllocation,
    Instantiate,
    /// Generic type argument in a declaration
    ParameterizedType,
    /// Method overriding a method of another type
    Override,
    /// Constant inlined into the constant pool
    ConstantPool,
}

impl ReferenceKind {
    /// Every reference kind, in declaration order
    pub const ALL: [ReferenceKind; 25] = [
        ReferenceKind::Extends,
        ReferenceKind::Implements,
        ReferenceKind::SpecialMethod,
        ReferenceKind::StaticMethod,
        ReferenceKind::VirtualMethod,
        ReferenceKind::InterfaceMethod,
        ReferenceKind::ConstructorMethod,
        ReferenceKind::SuperConstructorMethod,
        ReferenceKind::GetField,
        ReferenceKind::PutField,
        ReferenceKind::GetStatic,
        ReferenceKind::PutStatic,
        ReferenceKind::FieldDeclaration,
        ReferenceKind::LocalVariable,
        ReferenceKind::Parameter,
        ReferenceKind::ReturnType,
        ReferenceKind::Throws,
        ReferenceKind::CatchException,
        ReferenceKind::CheckCast,
        ReferenceKind::InstanceOf,
        ReferenceKind::ArrayAllocation,
        ReferenceKind::Instantiate,
        ReferenceKind::ParameterizedType,
        ReferenceKind::Override,
        ReferenceKind::ConstantPool,
    ];

    fn bit(self) -> u32 {
        1 << (self as u32)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ReferenceKind::Extends => "extends",
            ReferenceKind::Implements => "implements",
            ReferenceKind::SpecialMethod => "special method call",
            ReferenceKind::StaticMethod => "static method call",
            ReferenceKind::VirtualMethod => "virtual method call",
            ReferenceKind::InterfaceMethod => "interface method call",
            ReferenceKind::ConstructorMethod => "constructor call",
            ReferenceKind::SuperConstructorMethod => "super constructor call",
            ReferenceKind::GetField => "field read",
            ReferenceKind::PutField => "field write",
            ReferenceKind::GetStatic => "static field read",
            ReferenceKind::PutStatic => "static field write",
            ReferenceKind::FieldDeclaration => "field declaration",
            ReferenceKind::LocalVariable => "local variable",
            ReferenceKind::Parameter => "parameter",
            ReferenceKind::ReturnType => "return type",
            ReferenceKind::Throws => "throws",
            ReferenceKind::CatchException => "catch",
            ReferenceKind::CheckCast => "cast",
            ReferenceKind::InstanceOf => "instanceof",
            ReferenceKind::ArrayAllocation => "array allocation",
            ReferenceKind::Instantiate => "instantiation",
            ReferenceKind::ParameterizedType => "type argument",
            ReferenceKind::Override => "override",
            ReferenceKind::ConstantPool => "constant pool",
        }
    }
}

/// A set of reference kinds stored as a bit mask
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ReferenceKinds(u32);

impl ReferenceKinds {
    pub fn empty() -> Self {
        Self(0)
    }

    pub fn all() -> Self {
        ReferenceKind::ALL
            .iter()
            .fold(Self::empty(), |kinds, kind| kinds.with(*kind))
    }

    pub fn with(self, kind: ReferenceKind) -> Self {
        Self(self.0 | kind.bit())
    }

    pub fn without(self, kind: ReferenceKind) -> Self {
        Self(self.0 & !kind.bit())
    }

    pub fn contains(&self, kind: ReferenceKind) -> bool {
        self.0 & kind.bit() != 0
    }

    pub fn iter(&self) -> impl Iterator<Item = ReferenceKind> + '_ {
        ReferenceKind::ALL.into_iter().filter(|kind| self.contains(*kind))
    }
}

/// Where a reference points to, as recorded by the resolver
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceTarget {
    /// Id of the component owning the target member
    pub component: String,
    /// Version of that component, first match by id when absent
    #[serde(default)]
    pub version: Option<String>,
    /// Target member
    pub handle: MemberHandle,
}

/// A directed edge from a referring member to a (possibly unresolved) target
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reference {
    /// Kind of reference
    pub kind: ReferenceKind,

    /// Referring member, filled in when attached to a member
    #[serde(default, skip_serializing)]
    pub source: MemberHandle,

    /// Component of the referring member
    #[serde(default, skip_serializing)]
    pub source_component: ComponentKey,

    /// Resolved target, `None` when resolution failed
    #[serde(default)]
    pub target: Option<ReferenceTarget>,

    /// Line number in the referring member, if known
    #[serde(default)]
    pub line: Option<u32>,
}

impl Reference {
    pub fn new(kind: ReferenceKind) -> Self {
        Self {
            kind,
            source: MemberHandle::default(),
            source_component: ComponentKey::default(),
            target: None,
            line: None,
        }
    }

    /// Point this reference at `handle` in component `component`
    pub fn to(mut self, component: impl Into<String>, handle: MemberHandle) -> Self {
        self.target = Some(ReferenceTarget {
            component: component.into(),
            version: None,
            handle,
        });
        self
    }

    pub fn with_target_version(mut self, version: impl Into<String>) -> Self {
        if let Some(target) = &mut self.target {
            target.version = Some(version.into());
        }
        self
    }

    pub fn with_line(mut self, line: u32) -> Self {
        self.line = Some(line);
        self
    }
}
