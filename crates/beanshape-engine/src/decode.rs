//! Value decoder
//!
//! The inverse walk of the converter: a canonical value is decoded against
//! the schema node of its target into the host value a write capability
//! accepts.

use beanshape_sdk::{HostObject, HostValue, ScalarKind, ScalarValue};
use rust_decimal::Decimal;
use tracing::trace;

use crate::canonical::CanonicalValue;
use crate::error::WriteError;
use crate::reflect::MemberAccessor;
use crate::schema::{
    ArrayOrigin, ArrayType, CompositeAttribute, CompositeType, NativeType, NodeKind,
    OperationSignature, SchemaNode, TableType, ROW_KEY, ROW_VALUE,
};

/// Result of decoding
pub type DecodeResult = Result<HostValue, WriteError>;

/// Decode `canonical` and hand it to the write capability of `accessor`
pub fn write(
    instance: &dyn HostObject,
    accessor: &MemberAccessor,
    canonical: &CanonicalValue,
    node: &SchemaNode,
) -> Result<(), WriteError> {
    if !accessor.is_writable() {
        return Err(WriteError::NotWritable {
            attribute: accessor.name().to_string(),
        });
    }
    let value = decode(canonical, node)?;
    trace!(owner = accessor.owner_name(), attribute = accessor.name(), "write");
    match accessor.try_write(instance, value) {
        Some(Ok(())) => Ok(()),
        Some(Err(source)) => Err(WriteError::Accessor {
            attribute: accessor.name().to_string(),
            owner: accessor.owner_name().to_string(),
            source,
        }),
        None => Err(WriteError::NotWritable {
            attribute: accessor.name().to_string(),
        }),
    }
}

/// Decode and write one composite attribute, reporting errors under the
/// attribute's exposed name
pub fn write_attribute(
    instance: &dyn HostObject,
    attribute: &CompositeAttribute,
    canonical: &CanonicalValue,
) -> Result<(), WriteError> {
    write(instance, &attribute.accessor, canonical, &attribute.node).map_err(|err| match err {
        WriteError::NotWritable { .. } => WriteError::NotWritable {
            attribute: attribute.name.clone(),
        },
        WriteError::Accessor { owner, source, .. } => WriteError::Accessor {
            attribute: attribute.name.clone(),
            owner,
            source,
        },
        other => other,
    })
}

/// Decode the arguments of an invocation of `operation`, in parameter order
pub fn decode_arguments(operation: &OperationSignature, arguments: &[CanonicalValue]) -> Result<Vec<HostValue>, WriteError> {
    if arguments.len() != operation.arity() {
        return Err(WriteError::Mismatch {
            expected: format!("{} arguments", operation.arity()),
            received: format!("{} arguments", arguments.len()),
        });
    }
    trace!(operation = %operation.name, "decode arguments");
    operation
        .params
        .iter()
        .zip(arguments)
        .map(|(param, argument)| decode(argument, &param.node))
        .collect()
}

/// Decode `canonical` as described by `node`
pub fn decode(canonical: &CanonicalValue, node: &SchemaNode) -> DecodeResult {
    if canonical.is_null() {
        return Ok(HostValue::Null);
    }
    match node.kind() {
        NodeKind::Primitive(p) => decode_primitive(canonical, node, &p.native),
        NodeKind::ArrayLike(a) => decode_array(canonical, node, a, a.dimensions),
        NodeKind::TableLike(t) => decode_table(canonical, node, t),
        NodeKind::Composite(c) => decode_composite(canonical, node, c),
    }
}

fn decode_primitive(canonical: &CanonicalValue, node: &SchemaNode, native: &NativeType) -> DecodeResult {
    match native {
        NativeType::Display => Err(WriteError::NotWritable {
            attribute: node.name().to_string(),
        }),
        NativeType::Enum {
            type_name,
            variants,
        } => {
            let name = match canonical.as_scalar() {
                Some(ScalarValue::String(s)) => s,
                _ => return Err(mismatch("string", canonical)),
            };
            if variants.iter().any(|v| v == name) {
                Ok(HostValue::enumerant(type_name, name))
            } else {
                Err(WriteError::UnknownVariant {
                    type_name: type_name.clone(),
                    variant: name.clone(),
                })
            }
        }
        NativeType::Scalar { kind } => match canonical.as_scalar() {
            Some(scalar) => coerce(scalar, *kind).map(HostValue::Scalar),
            None => Err(mismatch(kind.type_name(), canonical)),
        },
    }
}

/// Coerce a scalar to the target kind
pub fn coerce(value: &ScalarValue, target: ScalarKind) -> Result<ScalarValue, WriteError> {
    if value.kind() == target {
        return Ok(value.clone());
    }

    if target.is_integer() {
        let Some(wide) = value.as_i128() else {
            return Err(scalar_mismatch(target, value));
        };
        let out_of_range = || WriteError::OutOfRange {
            value: value.to_string(),
            target: target.type_name().to_string(),
        };
        return match target {
            ScalarKind::Byte => i8::try_from(wide).map(ScalarValue::Byte).map_err(|_| out_of_range()),
            ScalarKind::Short => i16::try_from(wide).map(ScalarValue::Short).map_err(|_| out_of_range()),
            ScalarKind::Integer => i32::try_from(wide).map(ScalarValue::Integer).map_err(|_| out_of_range()),
            ScalarKind::Long => i64::try_from(wide).map(ScalarValue::Long).map_err(|_| out_of_range()),
            _ => Ok(ScalarValue::BigInteger(wide)),
        };
    }

    if target.is_float() {
        let Some(f) = value.as_f64() else {
            return Err(scalar_mismatch(target, value));
        };
        if target == ScalarKind::Float {
            let narrowed = f as f32;
            if f.is_finite() && !narrowed.is_finite() {
                return Err(WriteError::OutOfRange {
                    value: value.to_string(),
                    target: target.type_name().to_string(),
                });
            }
            return Ok(ScalarValue::Float(narrowed));
        }
        return Ok(ScalarValue::Double(f));
    }

    match (target, value) {
        (ScalarKind::BigDecimal, v) => {
            let decimal = if let Some(wide) = v.as_i128() {
                Decimal::try_from_i128_with_scale(wide, 0).ok()
            } else if let Some(f) = v.as_f64() {
                Decimal::try_from(f).ok()
            } else {
                return Err(scalar_mismatch(target, value));
            };
            decimal.map(ScalarValue::BigDecimal).ok_or_else(|| WriteError::OutOfRange {
                value: value.to_string(),
                target: target.type_name().to_string(),
            })
        }
        (ScalarKind::Character, ScalarValue::String(s)) => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(ScalarValue::Character(c)),
                _ => Err(WriteError::Mismatch {
                    expected: "single-character string".to_string(),
                    received: format!("string of length {}", s.chars().count()),
                }),
            }
        }
        (ScalarKind::ObjectName, ScalarValue::String(s)) => Ok(ScalarValue::ObjectName(s.clone())),
        _ => Err(scalar_mismatch(target, value)),
    }
}

fn decode_array(canonical: &CanonicalValue, node: &SchemaNode, array: &ArrayType, remaining: usize) -> DecodeResult {
    if remaining == 0 {
        return decode(canonical, &array.element);
    }
    let items = match canonical {
        CanonicalValue::Null => return Ok(HostValue::Null),
        CanonicalValue::Array(items) => items.to_vec(),
        other => return Err(mismatch(&node.shape(), other)),
    };

    let mut decoded = Vec::with_capacity(items.len());
    for item in &items {
        decoded.push(decode_array(item, node, array, remaining - 1)?);
    }
    Ok(match array.origin {
        ArrayOrigin::NativeArray => HostValue::array(decoded),
        ArrayOrigin::Sequence => HostValue::Sequence(decoded),
    })
}

fn decode_table(canonical: &CanonicalValue, node: &SchemaNode, table: &TableType) -> DecodeResult {
    let Some(data) = canonical.as_table() else {
        return Err(mismatch(&node.shape(), canonical));
    };
    let mut entries = Vec::with_capacity(data.rows.len());
    for row in &data.rows {
        let key = row.get(ROW_KEY).unwrap_or(&CanonicalValue::Null);
        let value = row.get(ROW_VALUE).unwrap_or(&CanonicalValue::Null);
        entries.push((decode(key, &table.key)?, decode(value, &table.value)?));
    }
    Ok(HostValue::Map(entries))
}

fn decode_composite(canonical: &CanonicalValue, node: &SchemaNode, composite: &CompositeType) -> DecodeResult {
    let Some(data) = canonical.as_composite() else {
        return Err(mismatch(&node.shape(), canonical));
    };
    let Some(factory) = &composite.factory else {
        return Err(WriteError::NotConstructible {
            type_name: node.name().to_string(),
        });
    };

    let instance = factory();
    for attribute in composite.attributes.iter().filter(|a| a.is_writable()) {
        if let Some(value) = data.get(&attribute.name) {
            write_attribute(instance.as_ref(), attribute, value)?;
        }
    }
    Ok(HostValue::Object(instance))
}

fn mismatch(expected: &str, received: &CanonicalValue) -> WriteError {
    WriteError::Mismatch {
        expected: expected.to_string(),
        received: received.type_name().to_string(),
    }
}

fn scalar_mismatch(target: ScalarKind, received: &ScalarValue) -> WriteError {
    WriteError::Mismatch {
        expected: target.type_name().to_string(),
        received: received.kind().type_name().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canonical::CanonicalArray;
    use crate::schema::primitives;
    use std::sync::Arc;

    fn s(v: impl Into<ScalarValue>) -> ScalarValue {
        v.into()
    }

    #[test]
    fn test_integer_widening_and_range() {
        assert_eq!(coerce(&s(7i8), ScalarKind::Long), Ok(ScalarValue::Long(7)));
        assert_eq!(coerce(&s(300i32), ScalarKind::Short), Ok(ScalarValue::Short(300)));
        assert_eq!(
            coerce(&s(300i32), ScalarKind::Byte),
            Err(WriteError::OutOfRange {
                value: "300".into(),
                target: "byte".into(),
            })
        );
        assert_eq!(coerce(&s(5i64), ScalarKind::BigInteger), Ok(ScalarValue::BigInteger(5)));
    }

    #[test]
    fn test_mismatch_reports_both_sides() {
        assert_eq!(
            coerce(&s("12"), ScalarKind::Integer),
            Err(WriteError::Mismatch {
                expected: "integer".into(),
                received: "string".into(),
            })
        );
        assert_eq!(
            coerce(&s(1.5f64), ScalarKind::Long),
            Err(WriteError::Mismatch {
                expected: "long".into(),
                received: "double".into(),
            })
        );
        assert!(coerce(&s(1i32), ScalarKind::String).is_err());
    }

    #[test]
    fn test_float_decimal_character() {
        assert_eq!(coerce(&s(2i32), ScalarKind::Double), Ok(ScalarValue::Double(2.0)));
        assert_eq!(coerce(&s(0.5f64), ScalarKind::Float), Ok(ScalarValue::Float(0.5)));
        assert_eq!(
            coerce(&s(3i32), ScalarKind::BigDecimal),
            Ok(ScalarValue::BigDecimal(Decimal::from(3)))
        );
        assert_eq!(coerce(&s("x"), ScalarKind::Character), Ok(ScalarValue::Character('x')));
        assert!(coerce(&s("xy"), ScalarKind::Character).is_err());
    }

    #[test]
    fn test_float_narrowing_range() {
        let err = coerce(&s(1e300f64), ScalarKind::Float).unwrap_err();
        assert!(matches!(err, WriteError::OutOfRange { ref target, .. } if target == "float"));
        assert!(coerce(&s(-1e300f64), ScalarKind::Float).is_err());

        // Non-finite doubles stay non-finite
        assert_eq!(
            coerce(&s(f64::INFINITY), ScalarKind::Float),
            Ok(ScalarValue::Float(f32::INFINITY))
        );
        assert_eq!(coerce(&s(f32::MAX as f64), ScalarKind::Float), Ok(ScalarValue::Float(f32::MAX)));
    }

    #[test]
    fn test_display_not_writable() {
        let err = decode(&CanonicalValue::Scalar(s("a")), &primitives::display_string()).unwrap_err();
        assert!(matches!(err, WriteError::NotWritable { .. }));
    }

    #[test]
    fn test_shared_array_round_trip() {
        let node = SchemaNode::new(
            "integer[]",
            "",
            "array",
            NodeKind::ArrayLike(ArrayType {
                element: primitives::scalar(ScalarKind::Integer),
                dimensions: 1,
                origin: ArrayOrigin::NativeArray,
            }),
        );
        let items: Arc<[HostValue]> = vec![HostValue::from(1i32)].into();
        let decoded = decode(
            &CanonicalValue::Array(CanonicalArray::Shared(Arc::clone(&items))),
            &node,
        )
        .unwrap();
        assert_eq!(decoded, HostValue::Array(items));
    }

    #[test]
    fn test_decode_arguments() {
        use crate::schema::OperationParam;

        let param = |name: &str, kind: ScalarKind| OperationParam {
            name: name.into(),
            description: name.into(),
            node: primitives::scalar(kind),
        };
        let op = OperationSignature {
            name: "resize".into(),
            description: "resize".into(),
            params: vec![param("size", ScalarKind::Long), param("label", ScalarKind::String)],
            returns: primitives::scalar(ScalarKind::Void),
        };

        let decoded = decode_arguments(
            &op,
            &[CanonicalValue::Scalar(s(4i32)), CanonicalValue::Null],
        )
        .unwrap();
        assert_eq!(decoded, vec![HostValue::Scalar(ScalarValue::Long(4)), HostValue::Null]);

        assert_eq!(
            decode_arguments(&op, &[CanonicalValue::Null]),
            Err(WriteError::Mismatch {
                expected: "2 arguments".into(),
                received: "1 arguments".into(),
            })
        );
    }
}
