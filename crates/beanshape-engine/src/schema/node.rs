//! Schema node definitions

use std::fmt;
use std::sync::Arc;

use beanshape_sdk::{FactoryFn, ScalarKind, TypeKey};
use serde::Serialize;

use crate::reflect::MemberAccessor;

/// Name of the key column of a table row
pub const ROW_KEY: &str = "key";
/// Name of the value column of a table row
pub const ROW_VALUE: &str = "value";

/// One node of a schema tree.
///
/// Nodes are immutable once built and shared by `Arc`; primitive nodes for
/// built-in scalars are process-wide singletons.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaNode {
    name: String,
    description: String,
    #[serde(flatten)]
    kind: NodeKind,
}

impl SchemaNode {
    /// Create a node; blank metadata falls back to `fallback`
    pub fn new(name: &str, description: &str, fallback: &str, kind: NodeKind) -> Self {
        let name = non_blank(name).unwrap_or(fallback).to_string();
        let description = non_blank(description).unwrap_or(&name).to_string();
        Self {
            name,
            description,
            kind,
        }
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Description
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Payload
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Primitive payload, if this is a primitive node
    pub fn as_primitive(&self) -> Option<&PrimitiveType> {
        match &self.kind {
            NodeKind::Primitive(p) => Some(p),
            _ => None,
        }
    }

    /// Array payload, if this is an array node
    pub fn as_array(&self) -> Option<&ArrayType> {
        match &self.kind {
            NodeKind::ArrayLike(a) => Some(a),
            _ => None,
        }
    }

    /// Table payload, if this is a table node
    pub fn as_table(&self) -> Option<&TableType> {
        match &self.kind {
            NodeKind::TableLike(t) => Some(t),
            _ => None,
        }
    }

    /// Composite payload, if this is a composite node
    pub fn as_composite(&self) -> Option<&CompositeType> {
        match &self.kind {
            NodeKind::Composite(c) => Some(c),
            _ => None,
        }
    }

    /// Returns true for primitive nodes of the string kind
    pub fn is_string(&self) -> bool {
        matches!(self.as_primitive(), Some(p) if p.scalar == ScalarKind::String)
    }

    /// Short label of the node's shape, used in error messages
    pub fn shape(&self) -> String {
        match &self.kind {
            NodeKind::Primitive(p) => p.scalar.type_name().to_string(),
            NodeKind::ArrayLike(a) => format!("{}{}", a.element.shape(), "[]".repeat(a.dimensions)),
            NodeKind::TableLike(_) => "table".to_string(),
            NodeKind::Composite(_) => format!("composite {}", self.name),
        }
    }
}

fn non_blank(s: &str) -> Option<&str> {
    (!s.trim().is_empty()).then_some(s)
}

/// Node payload
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeKind {
    /// Leaf scalar
    Primitive(PrimitiveType),
    /// Native array or ordered collection
    ArrayLike(ArrayType),
    /// Associative type, as `{key, value}` rows
    TableLike(TableType),
    /// Named-attribute aggregate
    Composite(CompositeType),
}

/// Primitive payload
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrimitiveType {
    /// Canonical scalar kind
    pub scalar: ScalarKind,
    /// Native type the canonical value round trips to
    pub native: NativeType,
}

/// Native representation behind a primitive node
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "native", rename_all = "snake_case")]
pub enum NativeType {
    /// A built-in scalar
    Scalar {
        /// Scalar kind
        kind: ScalarKind,
    },
    /// An enumeration rendered by variant name
    Enum {
        /// Enum type name
        type_name: String,
        /// Declared variants
        variants: Vec<String>,
    },
    /// Any value degraded to its display string; not writable
    Display,
}

/// Where an array node came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArrayOrigin {
    /// Native array
    NativeArray,
    /// Ordered collection
    Sequence,
}

/// Array payload
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArrayType {
    /// Element node after unwrapping every dimension
    pub element: Arc<SchemaNode>,
    /// Number of dimensions, at least 1
    pub dimensions: usize,
    /// Source kind
    pub origin: ArrayOrigin,
}

/// Table payload. Rows always have the shape `{key, value}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableType {
    /// Key column node
    pub key: Arc<SchemaNode>,
    /// Value column node
    pub value: Arc<SchemaNode>,
}

impl TableType {
    /// Row column names in order
    pub fn row_columns(&self) -> [&'static str; 2] {
        [ROW_KEY, ROW_VALUE]
    }
}

/// Composite payload
#[derive(Clone, Serialize)]
pub struct CompositeType {
    /// Host class this composite was built from
    #[serde(skip)]
    pub type_key: TypeKey,
    /// Attributes in declaration order, names unique
    pub attributes: Vec<CompositeAttribute>,
    /// Factory used when decoding a composite back into a fresh instance
    #[serde(skip)]
    pub factory: Option<FactoryFn>,
}

impl CompositeType {
    /// Look up an attribute by name
    pub fn attribute(&self, name: &str) -> Option<&CompositeAttribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Attribute names in order
    pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
        self.attributes.iter().map(|a| a.name.as_str())
    }
}

impl fmt::Debug for CompositeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeType")
            .field("type_key", &self.type_key)
            .field("attributes", &self.attributes)
            .field("factory", &self.factory.is_some())
            .finish()
    }
}

impl PartialEq for CompositeType {
    fn eq(&self, other: &Self) -> bool {
        self.type_key == other.type_key && self.attributes == other.attributes
    }
}

/// One attribute of a composite
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompositeAttribute {
    /// Attribute name
    pub name: String,
    /// Attribute description
    pub description: String,
    /// Bound capabilities
    #[serde(skip)]
    pub accessor: Arc<MemberAccessor>,
    /// Attribute schema
    #[serde(rename = "type")]
    pub node: Arc<SchemaNode>,
}

impl CompositeAttribute {
    /// Returns true if the attribute can be read
    pub fn is_readable(&self) -> bool {
        self.accessor.is_readable()
    }

    /// Returns true if the attribute can be written
    pub fn is_writable(&self) -> bool {
        self.accessor.is_writable()
    }
}
