//! Beanshape Engine
//!
//! Structural schema inference and value conversion for managed host objects.
//!
//! Any registered host type is classified into a tree of schema nodes drawn
//! from a closed set (primitive, array, table, composite). Live values are
//! then converted into canonical values of that shape for a management
//! protocol to publish, and canonical values are decoded back for writes.
//!
//! # Example
//!
//! ```ignore
//! use beanshape_engine::{EngineConfig, Mapper};
//!
//! let mapper = Mapper::new(EngineConfig::default());
//! let schema = mapper.build_default(&registry, &point_key.into())?.expect("mappable");
//! let value = mapper.read(point.as_ref(), &schema)?;
//! ```

#![warn(missing_docs)]

pub mod cache;
pub mod canonical;
pub mod classify;
pub mod config;
pub mod convert;
pub mod decode;
pub mod error;
pub mod managed;
pub mod mapper;
pub mod reflect;
pub mod schema;

pub use cache::SchemaCache;
pub use canonical::{CanonicalArray, CanonicalValue, CompositeData, TabularData};
pub use classify::{build_operations, build_schema, ClassifyResult, TypeClassifier};
pub use config::EngineConfig;
pub use convert::Converter;
pub use decode::{decode, decode_arguments, write};
pub use error::{ConfigError, ConversionError, ManagedError, SchemaError, WriteError};
pub use managed::ManagedObject;
pub use mapper::Mapper;
pub use reflect::{
    Access, AnnotationDecider, ExposureDecider, ExposurePolicy, MemberAccessor, MemberDecision,
    NamedOperation, OperationDecision, Reflector, StructuralReflector,
};
pub use schema::{NodeKind, OperationParam, OperationSignature, SchemaNode};

/// Read `instance` as described by `node` with default conversion settings
pub fn read(
    instance: &dyn beanshape_sdk::HostObject,
    node: &SchemaNode,
) -> Result<CanonicalValue, ConversionError> {
    Converter::default().read(instance, node)
}
