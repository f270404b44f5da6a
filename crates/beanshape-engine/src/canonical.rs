//! Canonical values
//!
//! The converter's output: plain data in the schema's shape, independent of
//! the host object's layout. The protocol layer owns the wire encoding, so
//! everything here is `Serialize`.

use std::sync::Arc;

use beanshape_sdk::{HostValue, ScalarValue};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

/// A canonical value
#[derive(Debug, Clone, PartialEq)]
pub enum CanonicalValue {
    /// Absent value
    Null,
    /// Scalar
    Scalar(ScalarValue),
    /// Array or sequence
    Array(CanonicalArray),
    /// Table of `{key, value}` rows
    Table(TabularData),
    /// Named attributes
    Composite(CompositeData),
}

impl CanonicalValue {
    /// Returns true for the absent value
    pub fn is_null(&self) -> bool {
        matches!(self, CanonicalValue::Null)
    }

    /// Get as scalar
    pub fn as_scalar(&self) -> Option<&ScalarValue> {
        match self {
            CanonicalValue::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// Get as composite
    pub fn as_composite(&self) -> Option<&CompositeData> {
        match self {
            CanonicalValue::Composite(c) => Some(c),
            _ => None,
        }
    }

    /// Get as table
    pub fn as_table(&self) -> Option<&TabularData> {
        match self {
            CanonicalValue::Table(t) => Some(t),
            _ => None,
        }
    }

    /// Get as array
    pub fn as_array(&self) -> Option<&CanonicalArray> {
        match self {
            CanonicalValue::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Short label of the value's shape, used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            CanonicalValue::Null => "null",
            CanonicalValue::Scalar(s) => s.kind().type_name(),
            CanonicalValue::Array(_) => "array",
            CanonicalValue::Table(_) => "table",
            CanonicalValue::Composite(_) => "composite",
        }
    }
}

impl From<ScalarValue> for CanonicalValue {
    fn from(v: ScalarValue) -> Self {
        CanonicalValue::Scalar(v)
    }
}

/// Canonical array storage
#[derive(Debug, Clone)]
pub enum CanonicalArray {
    /// Native primitive array passed through by reference
    Shared(Arc<[HostValue]>),
    /// Converted elements
    Owned(Vec<CanonicalValue>),
}

impl CanonicalArray {
    /// Number of elements
    pub fn len(&self) -> usize {
        match self {
            CanonicalArray::Shared(items) => items.len(),
            CanonicalArray::Owned(items) => items.len(),
        }
    }

    /// Returns true if there are no elements
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element at `index` as a canonical value.
    ///
    /// Shared elements are viewed through [`shared_element`].
    pub fn get(&self, index: usize) -> Option<CanonicalValue> {
        match self {
            CanonicalArray::Shared(items) => items.get(index).map(shared_element),
            CanonicalArray::Owned(items) => items.get(index).cloned(),
        }
    }

    /// All elements as canonical values
    pub fn to_vec(&self) -> Vec<CanonicalValue> {
        match self {
            CanonicalArray::Shared(items) => items.iter().map(shared_element).collect(),
            CanonicalArray::Owned(items) => items.clone(),
        }
    }
}

impl PartialEq for CanonicalArray {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (CanonicalArray::Owned(a), CanonicalArray::Owned(b)) => a == b,
            (CanonicalArray::Shared(a), CanonicalArray::Shared(b)) => a == b,
            _ => self.to_vec() == other.to_vec(),
        }
    }
}

/// Canonical view of an element of a shared primitive array.
///
/// Shared arrays only ever hold scalars, absent values or nested arrays of
/// those; anything else renders through its display string.
pub fn shared_element(value: &HostValue) -> CanonicalValue {
    match value {
        HostValue::Null => CanonicalValue::Null,
        HostValue::Scalar(s) => CanonicalValue::Scalar(s.clone()),
        HostValue::Array(items) => CanonicalValue::Array(CanonicalArray::Shared(Arc::clone(items))),
        other => match other.display_string() {
            Some(s) => CanonicalValue::Scalar(ScalarValue::String(s)),
            None => CanonicalValue::Null,
        },
    }
}

/// Named attribute values, in schema order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompositeData {
    /// Composite type name
    pub type_name: String,
    /// Attribute values
    pub items: Vec<(String, CanonicalValue)>,
}

impl CompositeData {
    /// Create empty data for `type_name`
    pub fn new(type_name: &str) -> Self {
        Self {
            type_name: type_name.to_string(),
            items: Vec::new(),
        }
    }

    /// Append an attribute value
    pub fn push(&mut self, name: &str, value: CanonicalValue) {
        self.items.push((name.to_string(), value));
    }

    /// Look up an attribute value
    pub fn get(&self, name: &str) -> Option<&CanonicalValue> {
        self.items.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Returns true if an attribute of this name is present
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }
}

/// Rows of a table, each a `{key, value}` composite
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TabularData {
    /// Table type name
    pub type_name: String,
    /// Rows in source iteration order
    pub rows: Vec<CompositeData>,
}

impl TabularData {
    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if there are no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ============================================================================
// Serialization
// ============================================================================

impl Serialize for CanonicalValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CanonicalValue::Null => serializer.serialize_none(),
            CanonicalValue::Scalar(s) => s.serialize(serializer),
            CanonicalValue::Array(a) => a.serialize(serializer),
            CanonicalValue::Table(t) => t.serialize(serializer),
            CanonicalValue::Composite(c) => c.serialize(serializer),
        }
    }
}

impl Serialize for CanonicalArray {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        match self {
            CanonicalArray::Shared(items) => {
                for item in items.iter() {
                    seq.serialize_element(&shared_element(item))?;
                }
            }
            CanonicalArray::Owned(items) => {
                for item in items {
                    seq.serialize_element(item)?;
                }
            }
        }
        seq.end()
    }
}

impl Serialize for CompositeData {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.items.len()))?;
        for (name, value) in &self.items {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl Serialize for TabularData {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.rows.len()))?;
        for row in &self.rows {
            seq.serialize_element(row)?;
        }
        seq.end()
    }
}
