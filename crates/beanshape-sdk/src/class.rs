//! Class descriptors
//!
//! A `ClassDescriptor` is the host's declaration of one raw class: what kind
//! of type it is, its superclass, and its members with their read/write
//! capabilities and resolved metadata. Descriptors are built once with
//! [`ClassBuilder`] and registered in a [`TypeRegistry`](crate::TypeRegistry).

use std::fmt;
use std::sync::Arc;

use crate::error::AccessResult;
use crate::scalar::ScalarKind;
use crate::ty::{TypeKey, TypeRef};
use crate::value::{HostObject, HostValue};

/// Read capability of a member
pub type ReadFn = Arc<dyn Fn(&dyn HostObject) -> AccessResult<HostValue> + Send + Sync>;

/// Write capability of a member
pub type WriteFn = Arc<dyn Fn(&dyn HostObject, HostValue) -> AccessResult<()> + Send + Sync>;

/// Creates a fresh instance of a class, used when decoding composite writes
pub type FactoryFn = Arc<dyn Fn() -> Arc<dyn HostObject> + Send + Sync>;

/// What sort of type a class is
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassKind {
    /// Built-in scalar
    Scalar(ScalarKind),
    /// Enumeration with the given variant names
    Enum(Vec<String>),
    /// Ordered iterable collection (single type parameter)
    Sequence,
    /// Key/value association (two type parameters)
    Table,
    /// Record with members
    Record,
}

/// Member visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    /// Public member
    #[default]
    Public,
    /// Visible inside the declaring package only
    Internal,
    /// Private member
    Private,
}

/// Resolved attribute metadata for a member
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AttributeMeta {
    /// Name override
    pub name: Option<String>,
    /// Description override
    pub description: Option<String>,
    /// Restrict an annotated member to reads even if it can be written
    pub read_only: bool,
}

/// Metadata attached to a member
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MemberAnnotations {
    /// Present when the member is explicitly marked as an attribute
    pub attribute: Option<AttributeMeta>,
    /// Member must never be exposed
    pub transient: bool,
}

/// How a member is accessed
#[derive(Clone)]
pub enum MemberKind {
    /// Data field; a field without a writer is read-only
    Field {
        /// Read capability
        read: ReadFn,
        /// Write capability
        write: Option<WriteFn>,
    },
    /// Read half of a property
    Getter(ReadFn),
    /// Write half of a property
    Setter(WriteFn),
}

impl fmt::Debug for MemberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberKind::Field { write, .. } => f
                .debug_struct("Field")
                .field("writable", &write.is_some())
                .finish(),
            MemberKind::Getter(_) => f.write_str("Getter"),
            MemberKind::Setter(_) => f.write_str("Setter"),
        }
    }
}

/// One declared member of a class
#[derive(Debug, Clone)]
pub struct MemberInfo {
    /// Member (property) name
    pub name: String,
    /// Declared value type
    pub value_type: TypeRef,
    /// Visibility
    pub visibility: Visibility,
    /// Access kind and capabilities
    pub kind: MemberKind,
    /// Resolved metadata
    pub annotations: MemberAnnotations,
}

impl MemberInfo {
    /// Returns true for public members
    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }

    /// Returns true if this member can be read
    pub fn is_readable(&self) -> bool {
        matches!(self.kind, MemberKind::Field { .. } | MemberKind::Getter(_))
    }

    /// Returns true if this member can be written
    pub fn is_writable(&self) -> bool {
        match &self.kind {
            MemberKind::Field { write, .. } => write.is_some(),
            MemberKind::Getter(_) => false,
            MemberKind::Setter(_) => true,
        }
    }

    /// Mark the member as an attribute with default metadata
    pub fn annotated(mut self) -> Self {
        self.annotations.attribute = Some(AttributeMeta::default());
        self
    }

    /// Mark the member as an attribute with the given name/description
    pub fn described(mut self, name: Option<&str>, description: Option<&str>) -> Self {
        let meta = self.annotations.attribute.get_or_insert_with(AttributeMeta::default);
        meta.name = name.map(str::to_string);
        meta.description = description.map(str::to_string);
        self
    }

    /// Mark the member transient
    pub fn transient(mut self) -> Self {
        self.annotations.transient = true;
        self
    }

    /// Change visibility
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }
}

/// Resolved metadata for an operation
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OperationAnnotations {
    /// Present when the operation is explicitly marked as managed; holds the
    /// description override
    pub operation: Option<Option<String>>,
    /// Operation must never be exposed
    pub transient: bool,
}

/// One declared parameter of an operation
#[derive(Debug, Clone, PartialEq)]
pub struct ParamInfo {
    /// Declared name; unnamed parameters are published as `arg<index>`
    pub name: Option<String>,
    /// Description override
    pub description: Option<String>,
    /// Declared type
    pub value_type: TypeRef,
}

/// One declared operation: a callable member that is not half of a property
#[derive(Debug, Clone, PartialEq)]
pub struct OperationInfo {
    /// Operation name
    pub name: String,
    /// Parameters in declaration order
    pub params: Vec<ParamInfo>,
    /// Declared return type, `Void` for none
    pub return_type: TypeRef,
    /// Visibility
    pub visibility: Visibility,
    /// Resolved metadata
    pub annotations: OperationAnnotations,
}

impl OperationInfo {
    /// Add a named parameter
    pub fn param(mut self, name: &str, value_type: TypeRef) -> Self {
        self.params.push(ParamInfo {
            name: Some(name.to_string()),
            description: None,
            value_type,
        });
        self
    }

    /// Add a named parameter with a description
    pub fn described_param(mut self, name: &str, description: &str, value_type: TypeRef) -> Self {
        self.params.push(ParamInfo {
            name: Some(name.to_string()),
            description: Some(description.to_string()),
            value_type,
        });
        self
    }

    /// Add a parameter without a declared name
    pub fn arg(mut self, value_type: TypeRef) -> Self {
        self.params.push(ParamInfo {
            name: None,
            description: None,
            value_type,
        });
        self
    }

    /// Mark the operation as managed
    pub fn annotated(mut self) -> Self {
        self.annotations.operation.get_or_insert(None);
        self
    }

    /// Mark the operation as managed with a description
    pub fn described(mut self, description: &str) -> Self {
        self.annotations.operation = Some(Some(description.to_string()));
        self
    }

    /// Mark the operation transient
    pub fn transient(mut self) -> Self {
        self.annotations.transient = true;
        self
    }

    /// Change visibility
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Parameter types in order
    pub fn signature(&self) -> impl Iterator<Item = &TypeRef> {
        self.params.iter().map(|p| &p.value_type)
    }
}

/// Declaration of one raw host class
#[derive(Clone)]
pub struct ClassDescriptor {
    /// Key in the owning registry
    pub key: TypeKey,
    /// Fully qualified class name
    pub name: String,
    /// Display name override
    pub display_name: Option<String>,
    /// Description override
    pub description: Option<String>,
    /// Kind of type
    pub kind: ClassKind,
    /// Superclass, if any
    pub superclass: Option<TypeKey>,
    /// Platform root type; its members are never collected
    pub foundational: bool,
    /// Type must never be exposed
    pub transient: bool,
    /// Expose the whole type as its display string
    pub expose_as_string: bool,
    /// Members in declaration order
    pub members: Vec<MemberInfo>,
    /// Operations in declaration order
    pub operations: Vec<OperationInfo>,
    /// Instance factory for composite writes
    pub factory: Option<FactoryFn>,
}

impl ClassDescriptor {
    /// Short name: last path segment of the class name
    pub fn simple_name(&self) -> &str {
        self.name.rsplit("::").next().unwrap_or(&self.name)
    }

    /// Name used in schemas: the override if present, else the simple name
    pub fn schema_name(&self) -> &str {
        match &self.display_name {
            Some(n) if !n.trim().is_empty() => n,
            _ => self.simple_name(),
        }
    }

    /// Description used in schemas: the override if present, else the schema name
    pub fn schema_description(&self) -> &str {
        match &self.description {
            Some(d) if !d.trim().is_empty() => d,
            _ => self.schema_name(),
        }
    }

    /// Look up a declared member
    pub fn member(&self, name: &str) -> Option<&MemberInfo> {
        self.members.iter().find(|m| m.name == name)
    }
}

impl fmt::Debug for ClassDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassDescriptor")
            .field("key", &self.key)
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("superclass", &self.superclass)
            .field("members", &self.members)
            .field("operations", &self.operations)
            .field("factory", &self.factory.is_some())
            .finish()
    }
}

// ============================================================================
// ClassBuilder
// ============================================================================

/// Builder for class descriptors.
///
/// The key is assigned when the builder is handed to the registry.
pub struct ClassBuilder {
    name: String,
    display_name: Option<String>,
    description: Option<String>,
    kind: ClassKind,
    superclass: Option<TypeKey>,
    foundational: bool,
    transient: bool,
    expose_as_string: bool,
    members: Vec<MemberInfo>,
    operations: Vec<OperationInfo>,
    factory: Option<FactoryFn>,
}

impl ClassBuilder {
    /// Start a record class
    pub fn record(name: &str) -> Self {
        Self::with_kind(name, ClassKind::Record)
    }

    /// Start an enumeration
    pub fn enumeration(name: &str, variants: &[&str]) -> Self {
        Self::with_kind(
            name,
            ClassKind::Enum(variants.iter().map(|v| v.to_string()).collect()),
        )
    }

    /// Start a class of any kind
    pub fn with_kind(name: &str, kind: ClassKind) -> Self {
        Self {
            name: name.to_string(),
            display_name: None,
            description: None,
            kind,
            superclass: None,
            foundational: false,
            transient: false,
            expose_as_string: false,
            members: Vec::new(),
            operations: Vec::new(),
            factory: None,
        }
    }

    /// Override the schema name and description
    pub fn display(mut self, name: Option<&str>, description: Option<&str>) -> Self {
        self.display_name = name.map(str::to_string);
        self.description = description.map(str::to_string);
        self
    }

    /// Set the superclass
    pub fn extends(mut self, superclass: TypeKey) -> Self {
        self.superclass = Some(superclass);
        self
    }

    /// Mark as a platform root type
    pub fn foundational(mut self) -> Self {
        self.foundational = true;
        self
    }

    /// Mark the type transient
    pub fn transient(mut self) -> Self {
        self.transient = true;
        self
    }

    /// Expose the type as its display string
    pub fn expose_as_string(mut self) -> Self {
        self.expose_as_string = true;
        self
    }

    /// Register an instance factory
    pub fn factory<F>(mut self, f: F) -> Self
    where
        F: Fn() -> Arc<dyn HostObject> + Send + Sync + 'static,
    {
        self.factory = Some(Arc::new(f));
        self
    }

    /// Add a prepared member
    pub fn member(mut self, member: MemberInfo) -> Self {
        self.members.push(member);
        self
    }

    /// Add a prepared operation
    pub fn operation(mut self, operation: OperationInfo) -> Self {
        self.operations.push(operation);
        self
    }

    /// Add a public read-only field
    pub fn field<R>(self, name: &str, value_type: TypeRef, read: R) -> Self
    where
        R: Fn(&dyn HostObject) -> AccessResult<HostValue> + Send + Sync + 'static,
    {
        self.member(field(name, value_type, read, None))
    }

    /// Add a public read/write field
    pub fn mutable_field<R, W>(self, name: &str, value_type: TypeRef, read: R, write: W) -> Self
    where
        R: Fn(&dyn HostObject) -> AccessResult<HostValue> + Send + Sync + 'static,
        W: Fn(&dyn HostObject, HostValue) -> AccessResult<()> + Send + Sync + 'static,
    {
        self.member(field(name, value_type, read, Some(Arc::new(write))))
    }

    /// Add a public getter for property `name`
    pub fn getter<R>(self, name: &str, value_type: TypeRef, read: R) -> Self
    where
        R: Fn(&dyn HostObject) -> AccessResult<HostValue> + Send + Sync + 'static,
    {
        self.member(getter(name, value_type, read))
    }

    /// Add a public setter for property `name`
    pub fn setter<W>(self, name: &str, value_type: TypeRef, write: W) -> Self
    where
        W: Fn(&dyn HostObject, HostValue) -> AccessResult<()> + Send + Sync + 'static,
    {
        self.member(setter(name, value_type, write))
    }

    pub(crate) fn build(self, key: TypeKey) -> ClassDescriptor {
        ClassDescriptor {
            key,
            name: self.name,
            display_name: self.display_name,
            description: self.description,
            kind: self.kind,
            superclass: self.superclass,
            foundational: self.foundational,
            transient: self.transient,
            expose_as_string: self.expose_as_string,
            members: self.members,
            operations: self.operations,
            factory: self.factory,
        }
    }

    /// Class name being built
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A public field member
pub fn field<R>(name: &str, value_type: TypeRef, read: R, write: Option<WriteFn>) -> MemberInfo
where
    R: Fn(&dyn HostObject) -> AccessResult<HostValue> + Send + Sync + 'static,
{
    MemberInfo {
        name: name.to_string(),
        value_type,
        visibility: Visibility::Public,
        kind: MemberKind::Field {
            read: Arc::new(read),
            write,
        },
        annotations: MemberAnnotations::default(),
    }
}

/// A public getter member
pub fn getter<R>(name: &str, value_type: TypeRef, read: R) -> MemberInfo
where
    R: Fn(&dyn HostObject) -> AccessResult<HostValue> + Send + Sync + 'static,
{
    MemberInfo {
        name: name.to_string(),
        value_type,
        visibility: Visibility::Public,
        kind: MemberKind::Getter(Arc::new(read)),
        annotations: MemberAnnotations::default(),
    }
}

/// A public setter member
pub fn setter<W>(name: &str, value_type: TypeRef, write: W) -> MemberInfo
where
    W: Fn(&dyn HostObject, HostValue) -> AccessResult<()> + Send + Sync + 'static,
{
    MemberInfo {
        name: name.to_string(),
        value_type,
        visibility: Visibility::Public,
        kind: MemberKind::Setter(Arc::new(write)),
        annotations: MemberAnnotations::default(),
    }
}

/// A public operation with no parameters yet
pub fn operation(name: &str, return_type: TypeRef) -> OperationInfo {
    OperationInfo {
        name: name.to_string(),
        params: Vec::new(),
        return_type,
        visibility: Visibility::Public,
        annotations: OperationAnnotations::default(),
    }
}
