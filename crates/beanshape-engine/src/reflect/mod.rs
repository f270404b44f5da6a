//! Member discovery
//!
//! Turns class descriptors into the ordered list of named accessors a
//! composite schema is built from.

pub mod accessor;
pub mod exposure;
pub mod reflector;

pub use accessor::MemberAccessor;
pub use exposure::{
    Access, AnnotationDecider, Candidate, ExposureDecider, ExposurePolicy, MemberDecision,
    OperationDecision,
};
pub use reflector::{NamedAccessor, NamedOperation, NamedParam, Reflector, StructuralReflector};
