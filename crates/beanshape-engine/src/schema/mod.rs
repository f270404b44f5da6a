//! Schema model
//!
//! The immutable {primitive, array, table, composite} tree produced by the
//! classifier and walked by the converter and decoder, plus the signatures of
//! managed operations built from the same nodes.

pub mod node;
pub mod operation;
pub mod primitives;

pub use node::{
    ArrayOrigin, ArrayType, CompositeAttribute, CompositeType, NativeType, NodeKind,
    PrimitiveType, SchemaNode, TableType, ROW_KEY, ROW_VALUE,
};
pub use operation::{OperationParam, OperationSignature};
