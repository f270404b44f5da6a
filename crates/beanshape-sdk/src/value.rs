//! Live host values
//!
//! `HostValue` is what member capabilities hand out and accept. Objects are
//! shared trait objects; everything else is plain data.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::scalar::ScalarValue;
use crate::ty::TypeKey;

/// A live host object.
///
/// Member closures registered on a class downcast through `as_any` to reach
/// the concrete type. Implementations that support writes must use interior
/// mutability; capabilities only ever receive `&self`.
pub trait HostObject: Send + Sync {
    /// Class of this instance
    fn type_key(&self) -> TypeKey;

    /// Upcast for downcasting in member closures
    fn as_any(&self) -> &dyn Any;

    /// Display rendering used when the object degrades to a string
    fn display(&self) -> String {
        format!("{}@{:p}", self.type_key(), self.as_any())
    }
}

/// An enumerant
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnumValue {
    /// Enum type name
    pub type_name: String,
    /// Variant name
    pub variant: String,
}

/// A live host value
#[derive(Clone)]
pub enum HostValue {
    /// Absent value
    Null,
    /// Scalar
    Scalar(ScalarValue),
    /// Enumerant
    Enum(EnumValue),
    /// Native array; nested arrays are further dimensions
    Array(Arc<[HostValue]>),
    /// Ordered collection
    Sequence(Vec<HostValue>),
    /// Associative collection, entries in natural iteration order
    Map(Vec<(HostValue, HostValue)>),
    /// Object instance
    Object(Arc<dyn HostObject>),
}

impl HostValue {
    /// Build a native array
    pub fn array(items: Vec<HostValue>) -> Self {
        HostValue::Array(items.into())
    }

    /// Build an enumerant
    pub fn enumerant(type_name: &str, variant: &str) -> Self {
        HostValue::Enum(EnumValue {
            type_name: type_name.to_string(),
            variant: variant.to_string(),
        })
    }

    /// Wrap an object
    pub fn object<T: HostObject + 'static>(obj: T) -> Self {
        HostValue::Object(Arc::new(obj))
    }

    /// Check if this is the absent value
    pub fn is_null(&self) -> bool {
        matches!(self, HostValue::Null)
    }

    /// Get as scalar
    pub fn as_scalar(&self) -> Option<&ScalarValue> {
        match self {
            HostValue::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// Get as object
    pub fn as_object(&self) -> Option<&Arc<dyn HostObject>> {
        match self {
            HostValue::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Short name of the value's shape, for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            HostValue::Null => "null",
            HostValue::Scalar(s) => s.kind().type_name(),
            HostValue::Enum(_) => "enum",
            HostValue::Array(_) => "array",
            HostValue::Sequence(_) => "sequence",
            HostValue::Map(_) => "map",
            HostValue::Object(_) => "object",
        }
    }

    /// Display rendering used for string coercion.
    ///
    /// Returns `None` for the absent value.
    pub fn display_string(&self) -> Option<String> {
        match self {
            HostValue::Null => None,
            HostValue::Scalar(s) => Some(s.to_string()),
            HostValue::Enum(e) => Some(e.variant.clone()),
            HostValue::Object(o) => Some(o.display()),
            HostValue::Array(items) => Some(render_list(items.iter())),
            HostValue::Sequence(items) => Some(render_list(items.iter())),
            HostValue::Map(entries) => {
                let parts: Vec<String> = entries
                    .iter()
                    .map(|(k, v)| {
                        format!(
                            "{}={}",
                            k.display_string().unwrap_or_else(|| "null".into()),
                            v.display_string().unwrap_or_else(|| "null".into())
                        )
                    })
                    .collect();
                Some(format!("{{{}}}", parts.join(", ")))
            }
        }
    }
}

fn render_list<'a>(items: impl Iterator<Item = &'a HostValue>) -> String {
    let parts: Vec<String> = items
        .map(|v| v.display_string().unwrap_or_else(|| "null".into()))
        .collect();
    format!("[{}]", parts.join(", "))
}

impl fmt::Debug for HostValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostValue::Null => f.write_str("Null"),
            HostValue::Scalar(s) => write!(f, "Scalar({:?})", s),
            HostValue::Enum(e) => write!(f, "Enum({}::{})", e.type_name, e.variant),
            HostValue::Array(items) => f.debug_tuple("Array").field(&&items[..]).finish(),
            HostValue::Sequence(items) => f.debug_tuple("Sequence").field(items).finish(),
            HostValue::Map(entries) => f.debug_tuple("Map").field(entries).finish(),
            HostValue::Object(o) => write!(f, "Object({})", o.type_key()),
        }
    }
}

impl PartialEq for HostValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (HostValue::Null, HostValue::Null) => true,
            (HostValue::Scalar(a), HostValue::Scalar(b)) => a == b,
            (HostValue::Enum(a), HostValue::Enum(b)) => a == b,
            (HostValue::Array(a), HostValue::Array(b)) => a == b,
            (HostValue::Sequence(a), HostValue::Sequence(b)) => a == b,
            (HostValue::Map(a), HostValue::Map(b)) => a == b,
            // Objects compare by identity
            (HostValue::Object(a), HostValue::Object(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

macro_rules! host_from_scalar {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for HostValue {
                fn from(v: $ty) -> Self {
                    HostValue::Scalar(v.into())
                }
            }
        )*
    };
}

host_from_scalar!(
    ScalarValue,
    String,
    &str,
    bool,
    i8,
    i16,
    i32,
    i64,
    f32,
    f64,
    char,
    i128,
    rust_decimal::Decimal,
    chrono::DateTime<chrono::Utc>,
);

impl HostValue {
    /// Map `None` to the absent value
    pub fn optional<T: Into<HostValue>>(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(HostValue::Null)
    }
}
