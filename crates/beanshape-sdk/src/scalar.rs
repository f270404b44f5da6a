//! Scalar kinds and values
//!
//! The closed set of leaf values a schema can describe. Every host type that
//! is not decomposed further ends up as one of these.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Canonical scalar kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarKind {
    /// UTF-8 string
    String,
    /// Boolean
    Boolean,
    /// 8-bit signed integer
    Byte,
    /// 16-bit signed integer
    Short,
    /// 32-bit signed integer
    Integer,
    /// 64-bit signed integer
    Long,
    /// 32-bit float
    Float,
    /// 64-bit float
    Double,
    /// Single unicode scalar
    Character,
    /// Arbitrary precision integer (bounded to 128 bits here)
    BigInteger,
    /// Exact decimal
    BigDecimal,
    /// Point in time
    Date,
    /// Opaque handle naming another managed object
    ObjectName,
    /// No value
    Void,
}

impl ScalarKind {
    /// Name used in schema descriptions
    pub fn type_name(&self) -> &'static str {
        match self {
            ScalarKind::String => "string",
            ScalarKind::Boolean => "boolean",
            ScalarKind::Byte => "byte",
            ScalarKind::Short => "short",
            ScalarKind::Integer => "integer",
            ScalarKind::Long => "long",
            ScalarKind::Float => "float",
            ScalarKind::Double => "double",
            ScalarKind::Character => "character",
            ScalarKind::BigInteger => "biginteger",
            ScalarKind::BigDecimal => "bigdecimal",
            ScalarKind::Date => "date",
            ScalarKind::ObjectName => "objectname",
            ScalarKind::Void => "void",
        }
    }

    /// Returns true for the integer family (byte through biginteger)
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            ScalarKind::Byte
                | ScalarKind::Short
                | ScalarKind::Integer
                | ScalarKind::Long
                | ScalarKind::BigInteger
        )
    }

    /// Returns true for the floating family
    pub fn is_float(&self) -> bool {
        matches!(self, ScalarKind::Float | ScalarKind::Double)
    }

    /// All kinds, in declaration order
    pub fn all() -> &'static [ScalarKind] {
        &[
            ScalarKind::String,
            ScalarKind::Boolean,
            ScalarKind::Byte,
            ScalarKind::Short,
            ScalarKind::Integer,
            ScalarKind::Long,
            ScalarKind::Float,
            ScalarKind::Double,
            ScalarKind::Character,
            ScalarKind::BigInteger,
            ScalarKind::BigDecimal,
            ScalarKind::Date,
            ScalarKind::ObjectName,
            ScalarKind::Void,
        ]
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// A scalar value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ScalarValue {
    /// String value
    String(String),
    /// Boolean value
    Boolean(bool),
    /// 8-bit integer
    Byte(i8),
    /// 16-bit integer
    Short(i16),
    /// 32-bit integer
    Integer(i32),
    /// 64-bit integer
    Long(i64),
    /// 32-bit float
    Float(f32),
    /// 64-bit float
    Double(f64),
    /// Character
    Character(char),
    /// Big integer
    BigInteger(i128),
    /// Exact decimal
    BigDecimal(Decimal),
    /// Timestamp
    Date(DateTime<Utc>),
    /// Object name handle
    ObjectName(String),
    /// Unit
    Void,
}

impl ScalarValue {
    /// Kind of this value
    pub fn kind(&self) -> ScalarKind {
        match self {
            ScalarValue::String(_) => ScalarKind::String,
            ScalarValue::Boolean(_) => ScalarKind::Boolean,
            ScalarValue::Byte(_) => ScalarKind::Byte,
            ScalarValue::Short(_) => ScalarKind::Short,
            ScalarValue::Integer(_) => ScalarKind::Integer,
            ScalarValue::Long(_) => ScalarKind::Long,
            ScalarValue::Float(_) => ScalarKind::Float,
            ScalarValue::Double(_) => ScalarKind::Double,
            ScalarValue::Character(_) => ScalarKind::Character,
            ScalarValue::BigInteger(_) => ScalarKind::BigInteger,
            ScalarValue::BigDecimal(_) => ScalarKind::BigDecimal,
            ScalarValue::Date(_) => ScalarKind::Date,
            ScalarValue::ObjectName(_) => ScalarKind::ObjectName,
            ScalarValue::Void => ScalarKind::Void,
        }
    }

    /// Widen any integer-family value to i128
    pub fn as_i128(&self) -> Option<i128> {
        match self {
            ScalarValue::Byte(v) => Some(*v as i128),
            ScalarValue::Short(v) => Some(*v as i128),
            ScalarValue::Integer(v) => Some(*v as i128),
            ScalarValue::Long(v) => Some(*v as i128),
            ScalarValue::BigInteger(v) => Some(*v),
            _ => None,
        }
    }

    /// Widen any numeric value to f64 (may lose precision for big integers)
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ScalarValue::Float(v) => Some(*v as f64),
            ScalarValue::Double(v) => Some(*v),
            other => other.as_i128().map(|i| i as f64),
        }
    }

    /// Get as string slice if this is a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ScalarValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::String(s) => f.write_str(s),
            ScalarValue::Boolean(b) => write!(f, "{}", b),
            ScalarValue::Byte(v) => write!(f, "{}", v),
            ScalarValue::Short(v) => write!(f, "{}", v),
            ScalarValue::Integer(v) => write!(f, "{}", v),
            ScalarValue::Long(v) => write!(f, "{}", v),
            ScalarValue::Float(v) => write!(f, "{}", v),
            ScalarValue::Double(v) => write!(f, "{}", v),
            ScalarValue::Character(c) => write!(f, "{}", c),
            ScalarValue::BigInteger(v) => write!(f, "{}", v),
            ScalarValue::BigDecimal(d) => write!(f, "{}", d),
            ScalarValue::Date(d) => write!(f, "{}", d.to_rfc3339()),
            ScalarValue::ObjectName(n) => f.write_str(n),
            ScalarValue::Void => f.write_str("void"),
        }
    }
}

macro_rules! scalar_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for ScalarValue {
                fn from(v: $ty) -> Self {
                    ScalarValue::$variant(v)
                }
            }
        )*
    };
}

scalar_from! {
    String => String,
    bool => Boolean,
    i8 => Byte,
    i16 => Short,
    i32 => Integer,
    i64 => Long,
    f32 => Float,
    f64 => Double,
    char => Character,
    i128 => BigInteger,
    Decimal => BigDecimal,
    DateTime<Utc> => Date,
}

impl From<&str> for ScalarValue {
    fn from(s: &str) -> Self {
        ScalarValue::String(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_families() {
        assert!(ScalarKind::Short.is_integer());
        assert!(ScalarKind::BigInteger.is_integer());
        assert!(!ScalarKind::Double.is_integer());
        assert!(ScalarKind::Float.is_float());
        assert!(!ScalarKind::String.is_float());
    }

    #[test]
    fn test_value_kind() {
        assert_eq!(ScalarValue::from(7i32).kind(), ScalarKind::Integer);
        assert_eq!(ScalarValue::from("x").kind(), ScalarKind::String);
        assert_eq!(ScalarValue::from('c').kind(), ScalarKind::Character);
    }

    #[test]
    fn test_display() {
        assert_eq!(ScalarValue::Long(-12).to_string(), "-12");
        assert_eq!(ScalarValue::Boolean(true).to_string(), "true");
        assert_eq!(ScalarValue::ObjectName("app:type=Cache".into()).to_string(), "app:type=Cache");
    }

    #[test]
    fn test_widening() {
        assert_eq!(ScalarValue::Byte(-3).as_i128(), Some(-3));
        assert_eq!(ScalarValue::Integer(5).as_f64(), Some(5.0));
        assert_eq!(ScalarValue::String("5".into()).as_i128(), None);
    }

    #[test]
    fn test_serialize_untagged() {
        let json = serde_json::to_value(ScalarValue::Integer(3)).unwrap();
        assert_eq!(json, serde_json::json!(3));
        let json = serde_json::to_value(ScalarValue::String("a".into())).unwrap();
        assert_eq!(json, serde_json::json!("a"));
    }
}
