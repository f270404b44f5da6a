//! Beanshape SDK - host object model
//!
//! Rust has no runtime reflection, so a host application describes the types
//! it wants to manage up front: each class is declared once with a
//! [`ClassBuilder`], registered in a [`TypeRegistry`], and its members carry
//! read/write closures that operate on live [`HostObject`]s.
//!
//! # Example
//!
//! ```ignore
//! use beanshape_sdk::{ClassBuilder, HostValue, TypeRegistry};
//!
//! let mut registry = TypeRegistry::new();
//! let point = registry.register(
//!     ClassBuilder::record("app::Point")
//!         .getter("x", TypeRegistry::INTEGER.into(), |obj| {
//!             let p = obj.as_any().downcast_ref::<Point>().ok_or("not a point")?;
//!             Ok(HostValue::from(p.x))
//!         }),
//! )?;
//! ```

#![warn(missing_docs)]

pub mod class;
pub mod error;
pub mod registry;
pub mod scalar;
pub mod ty;
pub mod value;

pub use class::{
    AttributeMeta, ClassBuilder, ClassDescriptor, ClassKind, FactoryFn, MemberAnnotations,
    MemberInfo, MemberKind, OperationAnnotations, OperationInfo, ParamInfo, ReadFn, Visibility,
    WriteFn,
};
pub use error::{AccessError, AccessResult};
pub use registry::{Ancestors, RegistryError, TypeRegistry};
pub use scalar::{ScalarKind, ScalarValue};
pub use ty::{TypeKey, TypeRef};
pub use value::{EnumValue, HostObject, HostValue};
