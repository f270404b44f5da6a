//! Value converter
//!
//! Walks a live host value along the schema node that describes its type and
//! produces the canonical value. The absent value converts to the absent
//! value at every node kind.

use std::sync::Arc;

use beanshape_sdk::{AccessError, HostObject, HostValue, ScalarValue};
use tracing::trace;

use crate::canonical::{CanonicalArray, CanonicalValue, CompositeData, TabularData};
use crate::error::ConversionError;
use crate::schema::{
    ArrayOrigin, ArrayType, CompositeAttribute, CompositeType, NativeType, NodeKind,
    OperationSignature, PrimitiveType, SchemaNode, TableType, ROW_KEY, ROW_VALUE,
};

/// Result of a conversion
pub type ConvertResult = Result<CanonicalValue, ConversionError>;

/// Converts live values to canonical values
#[derive(Debug, Clone, Copy)]
pub struct Converter {
    share_primitive_arrays: bool,
}

impl Default for Converter {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Converter {
    /// Create a converter. With `share_primitive_arrays`, native arrays of
    /// plain scalars are handed out by reference instead of copied.
    pub fn new(share_primitive_arrays: bool) -> Self {
        Self {
            share_primitive_arrays,
        }
    }

    /// Read `instance` as described by `node`
    pub fn read(&self, instance: &dyn HostObject, node: &SchemaNode) -> ConvertResult {
        match node.kind() {
            NodeKind::Composite(composite) => self.convert_composite(instance, node, composite),
            NodeKind::Primitive(_) if node.is_string() => Ok(string_value(instance.display())),
            _ => Err(mismatch(node, "object")),
        }
    }

    /// Read a single attribute of `instance`
    pub fn read_attribute(&self, instance: &dyn HostObject, attribute: &CompositeAttribute) -> ConvertResult {
        let accessor = &attribute.accessor;
        let raw = match accessor.try_read(instance) {
            Some(Ok(raw)) => raw,
            Some(Err(source)) => {
                return Err(ConversionError::Accessor {
                    attribute: attribute.name.clone(),
                    owner: accessor.owner_name().to_string(),
                    source,
                })
            }
            None => {
                return Err(ConversionError::Accessor {
                    attribute: attribute.name.clone(),
                    owner: accessor.owner_name().to_string(),
                    source: AccessError::Unsupported("attribute is write-only".into()),
                })
            }
        };
        self.convert(&raw, &attribute.node)
    }

    /// Convert `value` as described by `node`
    pub fn convert(&self, value: &HostValue, node: &SchemaNode) -> ConvertResult {
        if value.is_null() {
            return Ok(CanonicalValue::Null);
        }
        match node.kind() {
            NodeKind::Primitive(_) => self.convert_primitive(value, node),
            NodeKind::ArrayLike(a) => self.convert_array(value, node, a),
            NodeKind::TableLike(t) => self.convert_table(value, node, t),
            NodeKind::Composite(c) => match value {
                HostValue::Object(obj) => self.convert_composite(obj.as_ref(), node, c),
                other => Err(mismatch(node, other.type_name())),
            },
        }
    }

    /// Convert what an invocation of `operation` returned. Void operations
    /// yield the absent value whatever the host handed back.
    pub fn convert_return(&self, operation: &OperationSignature, value: &HostValue) -> ConvertResult {
        if operation.is_void() {
            return Ok(CanonicalValue::Null);
        }
        self.convert(value, &operation.returns)
    }

    fn convert_primitive(&self, value: &HostValue, node: &SchemaNode) -> ConvertResult {
        if node.is_string() {
            return Ok(match value.display_string() {
                Some(s) => string_value(s),
                None => CanonicalValue::Null,
            });
        }
        match value {
            HostValue::Scalar(s) => Ok(CanonicalValue::Scalar(s.clone())),
            other => Err(mismatch(node, other.type_name())),
        }
    }

    fn convert_array(&self, value: &HostValue, node: &SchemaNode, array: &ArrayType) -> ConvertResult {
        if let HostValue::Array(items) = value {
            if array.origin == ArrayOrigin::NativeArray && self.shares(array) {
                trace!(len = items.len(), "sharing primitive array");
                return Ok(CanonicalValue::Array(CanonicalArray::Shared(Arc::clone(items))));
            }
        }
        self.convert_dimension(value, node, array, array.dimensions)
    }

    fn convert_dimension(
        &self,
        value: &HostValue,
        node: &SchemaNode,
        array: &ArrayType,
        remaining: usize,
    ) -> ConvertResult {
        if remaining == 0 {
            return self.convert(value, &array.element);
        }
        let items: &[HostValue] = match value {
            HostValue::Null => return Ok(CanonicalValue::Null),
            HostValue::Array(items) => &items[..],
            HostValue::Sequence(items) => &items[..],
            other => return Err(mismatch(node, other.type_name())),
        };

        // Rows of a jagged array keep their own lengths
        let mut converted = Vec::with_capacity(items.len());
        for item in items {
            converted.push(self.convert_dimension(item, node, array, remaining - 1)?);
        }
        Ok(CanonicalValue::Array(CanonicalArray::Owned(converted)))
    }

    fn convert_table(&self, value: &HostValue, node: &SchemaNode, table: &TableType) -> ConvertResult {
        let HostValue::Map(entries) = value else {
            return Err(mismatch(node, value.type_name()));
        };

        let row_type = format!("{}.Entry", node.name());
        let mut rows = Vec::with_capacity(entries.len());
        for (key, value) in entries {
            let mut row = CompositeData::new(&row_type);
            row.push(ROW_KEY, self.convert(key, &table.key)?);
            row.push(ROW_VALUE, self.convert(value, &table.value)?);
            rows.push(row);
        }
        Ok(CanonicalValue::Table(TabularData {
            type_name: node.name().to_string(),
            rows,
        }))
    }

    fn convert_composite(
        &self,
        instance: &dyn HostObject,
        node: &SchemaNode,
        composite: &CompositeType,
    ) -> ConvertResult {
        let mut data = CompositeData::new(node.name());
        for attribute in composite.attributes.iter().filter(|a| a.is_readable()) {
            let value = self.read_attribute(instance, attribute)?;
            data.push(&attribute.name, value);
        }
        Ok(CanonicalValue::Composite(data))
    }

    fn shares(&self, array: &ArrayType) -> bool {
        self.share_primitive_arrays
            && matches!(
                array.element.as_primitive(),
                Some(PrimitiveType {
                    native: NativeType::Scalar { .. },
                    ..
                })
            )
    }
}

fn string_value(s: String) -> CanonicalValue {
    CanonicalValue::Scalar(ScalarValue::String(s))
}

fn mismatch(node: &SchemaNode, got: &str) -> ConversionError {
    ConversionError::ShapeMismatch {
        expected: node.shape(),
        got: got.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::primitives;
    use beanshape_sdk::ScalarKind;

    fn int_matrix(dimensions: usize) -> SchemaNode {
        SchemaNode::new(
            "integer[][]",
            "",
            "array",
            NodeKind::ArrayLike(ArrayType {
                element: primitives::scalar(ScalarKind::Integer),
                dimensions,
                origin: ArrayOrigin::NativeArray,
            }),
        )
    }

    fn row(values: &[i32]) -> HostValue {
        HostValue::array(values.iter().map(|v| HostValue::from(*v)).collect())
    }

    #[test]
    fn test_null_everywhere() {
        let converter = Converter::default();
        assert!(converter.convert(&HostValue::Null, &primitives::string()).unwrap().is_null());
        assert!(converter.convert(&HostValue::Null, &int_matrix(2)).unwrap().is_null());
    }

    #[test]
    fn test_string_coercion() {
        let converter = Converter::default();
        let node = primitives::string();
        assert_eq!(
            converter.convert(&HostValue::from(42i64), &node).unwrap(),
            CanonicalValue::Scalar(ScalarValue::String("42".into()))
        );
        assert_eq!(
            converter.convert(&HostValue::enumerant("Color", "RED"), &node).unwrap(),
            CanonicalValue::Scalar(ScalarValue::String("RED".into()))
        );
    }

    #[test]
    fn test_scalar_pass_through_and_mismatch() {
        let converter = Converter::default();
        let node = primitives::scalar(ScalarKind::Integer);
        assert_eq!(
            converter.convert(&HostValue::from(7i32), &node).unwrap(),
            CanonicalValue::Scalar(ScalarValue::Integer(7))
        );
        let err = converter.convert(&HostValue::Sequence(vec![]), &node).unwrap_err();
        assert_eq!(
            err,
            ConversionError::ShapeMismatch {
                expected: "integer".into(),
                got: "sequence".into(),
            }
        );
    }

    #[test]
    fn test_primitive_array_shared() {
        let converter = Converter::default();
        let value = row(&[1, 2, 3]);
        let node = int_matrix(1);
        let HostValue::Array(source) = &value else { unreachable!() };
        match converter.convert(&value, &node).unwrap() {
            CanonicalValue::Array(CanonicalArray::Shared(items)) => assert!(Arc::ptr_eq(&items, source)),
            other => panic!("expected shared array, got {:?}", other),
        }

        let copying = Converter::new(false);
        match copying.convert(&value, &node).unwrap() {
            CanonicalValue::Array(CanonicalArray::Owned(items)) => assert_eq!(items.len(), 3),
            other => panic!("expected owned array, got {:?}", other),
        }
    }

    #[test]
    fn test_jagged_rows_read_as_is() {
        let converter = Converter::new(false);
        let value = HostValue::array(vec![row(&[1, 2, 3]), row(&[4]), HostValue::Null]);
        let converted = converter.convert(&value, &int_matrix(2)).unwrap();
        let rows = converted.as_array().unwrap().to_vec();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].as_array().unwrap().len(), 3);
        assert_eq!(rows[1].as_array().unwrap().len(), 1);
        assert!(rows[2].is_null());
    }

    #[test]
    fn test_convert_return() {
        let converter = Converter::default();
        let mut op = OperationSignature {
            name: "count".into(),
            description: "count".into(),
            params: vec![],
            returns: primitives::scalar(ScalarKind::Long),
        };
        assert_eq!(
            converter.convert_return(&op, &HostValue::from(3i64)).unwrap(),
            CanonicalValue::Scalar(ScalarValue::Long(3))
        );
        assert!(converter.convert_return(&op, &HostValue::from("x")).is_err());

        op.returns = primitives::scalar(ScalarKind::Void);
        assert!(converter.convert_return(&op, &HostValue::from(3i64)).unwrap().is_null());
    }
}
