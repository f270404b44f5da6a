//! Primitive singleton table
//!
//! Built on first use and never mutated afterwards. Every primitive node for a
//! built-in scalar kind handed out by the classifier is one of these `Arc`s.

use std::sync::{Arc, LazyLock};

use beanshape_sdk::ScalarKind;
use rustc_hash::FxHashMap;

use super::node::{NativeType, NodeKind, PrimitiveType, SchemaNode};

struct PrimitiveTable {
    scalars: FxHashMap<ScalarKind, Arc<SchemaNode>>,
    display_string: Arc<SchemaNode>,
}

static TABLE: LazyLock<PrimitiveTable> = LazyLock::new(|| {
    let scalars = ScalarKind::all()
        .iter()
        .map(|kind| {
            let node = SchemaNode::new(
                kind.type_name(),
                kind.type_name(),
                kind.type_name(),
                NodeKind::Primitive(PrimitiveType {
                    scalar: *kind,
                    native: NativeType::Scalar { kind: *kind },
                }),
            );
            (*kind, Arc::new(node))
        })
        .collect();

    PrimitiveTable {
        scalars,
        display_string: Arc::new(display_node()),
    }
});

fn display_node() -> SchemaNode {
    SchemaNode::new(
        ScalarKind::String.type_name(),
        ScalarKind::String.type_name(),
        ScalarKind::String.type_name(),
        NodeKind::Primitive(PrimitiveType {
            scalar: ScalarKind::String,
            native: NativeType::Display,
        }),
    )
}

/// Shared node for a built-in scalar kind
pub fn scalar(kind: ScalarKind) -> Arc<SchemaNode> {
    match TABLE.scalars.get(&kind) {
        Some(node) => Arc::clone(node),
        // Unreachable: the table covers every kind
        None => Arc::new(display_node()),
    }
}

/// Shared string node used for the root object type and for cycle-broken
/// composites. Values are rendered through their display string.
pub fn display_string() -> Arc<SchemaNode> {
    Arc::clone(&TABLE.display_string)
}

/// Shared node for plain strings
pub fn string() -> Arc<SchemaNode> {
    scalar(ScalarKind::String)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_singletons() {
        assert!(Arc::ptr_eq(&scalar(ScalarKind::Long), &scalar(ScalarKind::Long)));
        assert!(Arc::ptr_eq(&display_string(), &display_string()));
        assert!(!Arc::ptr_eq(&string(), &display_string()));
    }

    #[test]
    fn test_every_kind_present() {
        for kind in ScalarKind::all() {
            let node = scalar(*kind);
            let p = node.as_primitive().unwrap();
            assert_eq!(p.scalar, *kind);
            assert_eq!(p.native, NativeType::Scalar { kind: *kind });
            assert_eq!(node.name(), kind.type_name());
        }
        assert!(display_string().is_string());
    }
}
