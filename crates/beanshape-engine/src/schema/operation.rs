//! Operation signatures

use std::sync::Arc;

use serde::Serialize;

use super::node::SchemaNode;

/// One mapped parameter of an operation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationParam {
    /// Parameter name
    pub name: String,
    /// Parameter description
    pub description: String,
    /// Open type of the argument
    #[serde(rename = "type")]
    pub node: Arc<SchemaNode>,
}

/// A managed operation whose parameters and return value all map to open
/// types. Void operations return the `void` primitive.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationSignature {
    /// Operation name
    pub name: String,
    /// Operation description
    pub description: String,
    /// Parameters in declaration order
    pub params: Vec<OperationParam>,
    /// Open type of the return value
    pub returns: Arc<SchemaNode>,
}

impl OperationSignature {
    /// Number of parameters
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// True if the operation returns nothing
    pub fn is_void(&self) -> bool {
        self.returns
            .as_primitive()
            .is_some_and(|p| p.scalar == beanshape_sdk::ScalarKind::Void)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::primitives;
    use beanshape_sdk::ScalarKind;

    #[test]
    fn test_signature_shape() {
        let op = OperationSignature {
            name: "resize".into(),
            description: "Resize the pool".into(),
            params: vec![OperationParam {
                name: "size".into(),
                description: "size".into(),
                node: primitives::scalar(ScalarKind::Integer),
            }],
            returns: primitives::scalar(ScalarKind::Void),
        };
        assert_eq!(op.arity(), 1);
        assert!(op.is_void());

        let json = serde_json::to_value(&op).unwrap();
        assert_eq!(json["name"], "resize");
        assert_eq!(json["params"][0]["type"]["name"], "integer");
    }
}
