//! Exposure decisions
//!
//! Which members become attributes, and with which capabilities, is decided
//! outside the reflector. The same holds for operations. The [`ExposureDecider`] trait is that seam; the
//! default [`AnnotationDecider`] applies resolved member annotations under an
//! [`ExposurePolicy`].

use beanshape_sdk::{ClassDescriptor, MemberAnnotations, OperationInfo, TypeRef, Visibility};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Per-build exposure policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExposurePolicy {
    /// Only members explicitly marked as attributes
    AnnotatedOnly,
    /// Marked members as declared, plus every other public readable member read-only
    #[default]
    AnnotatedPlusReadOnly,
    /// Every public member with its natural capabilities
    AllPublic,
}

/// Capabilities granted to a member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Access {
    /// Not exposed
    Excluded,
    /// Read only
    ReadOnly,
    /// Write only
    WriteOnly,
    /// Read and write
    ReadWrite,
}

impl Access {
    /// Access from a pair of capability flags
    pub fn from_flags(read: bool, write: bool) -> Self {
        match (read, write) {
            (true, true) => Access::ReadWrite,
            (true, false) => Access::ReadOnly,
            (false, true) => Access::WriteOnly,
            (false, false) => Access::Excluded,
        }
    }

    /// Grants reads
    pub fn readable(self) -> bool {
        matches!(self, Access::ReadOnly | Access::ReadWrite)
    }

    /// Grants writes
    pub fn writable(self) -> bool {
        matches!(self, Access::WriteOnly | Access::ReadWrite)
    }

    /// Capabilities granted by both
    pub fn intersect(self, other: Access) -> Access {
        Access::from_flags(
            self.readable() && other.readable(),
            self.writable() && other.writable(),
        )
    }
}

/// Outcome of an exposure decision
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberDecision {
    /// Granted capabilities
    pub access: Access,
    /// Attribute name override
    pub name: Option<String>,
    /// Attribute description override
    pub description: Option<String>,
}

impl MemberDecision {
    /// Exclude the member
    pub fn excluded() -> Self {
        Self::with_access(Access::Excluded)
    }

    /// Grant `access` without overrides
    pub fn with_access(access: Access) -> Self {
        Self {
            access,
            name: None,
            description: None,
        }
    }
}

/// Outcome of an operation exposure decision
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationDecision {
    /// Operation is published
    pub exposed: bool,
    /// Description override
    pub description: Option<String>,
}

impl OperationDecision {
    /// Do not publish the operation
    pub fn excluded() -> Self {
        Self {
            exposed: false,
            description: None,
        }
    }
}

/// A member as seen by the decider: a data field, or a getter/setter pair
/// merged into one property.
#[derive(Debug, Clone)]
pub struct Candidate<'a> {
    /// Member or property name
    pub name: &'a str,
    /// Value type
    pub value_type: &'a TypeRef,
    /// Visibility of the member (the getter, for a property)
    pub visibility: Visibility,
    /// Capabilities the host actually provides
    pub natural: Access,
    /// Merged annotations
    pub annotations: MemberAnnotations,
}

/// Decides whether and how a member is exposed
pub trait ExposureDecider: Send + Sync {
    /// Decide for one candidate of `class`
    fn decide(
        &self,
        class: &ClassDescriptor,
        candidate: &Candidate<'_>,
        policy: ExposurePolicy,
    ) -> MemberDecision;

    /// Decide for one declared operation of `class`
    fn decide_operation(
        &self,
        class: &ClassDescriptor,
        operation: &OperationInfo,
        policy: ExposurePolicy,
    ) -> OperationDecision;
}

/// Default decider driven by member annotations.
///
/// Transient members are always excluded. A member marked both transient and
/// as an attribute, or a non-public member marked as an attribute, is a
/// conflict: it is excluded and logged.
///
/// Operations follow the same conflict rules. A public unmarked operation is
/// only published under [`ExposurePolicy::AllPublic`], since it has no
/// read-only form.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnnotationDecider;

impl ExposureDecider for AnnotationDecider {
    fn decide(
        &self,
        class: &ClassDescriptor,
        candidate: &Candidate<'_>,
        policy: ExposurePolicy,
    ) -> MemberDecision {
        let annotations = &candidate.annotations;
        let public = candidate.visibility == Visibility::Public;

        if let Some(meta) = &annotations.attribute {
            if annotations.transient {
                warn!(
                    class = %class.name,
                    member = candidate.name,
                    "member is marked both transient and attribute, skipping"
                );
                return MemberDecision::excluded();
            }
            if !public {
                warn!(
                    class = %class.name,
                    member = candidate.name,
                    "non-public member is marked as attribute, skipping"
                );
                return MemberDecision::excluded();
            }

            let access = if meta.read_only {
                candidate.natural.intersect(Access::ReadOnly)
            } else {
                candidate.natural
            };
            return MemberDecision {
                access,
                name: meta.name.clone(),
                description: meta.description.clone(),
            };
        }

        if annotations.transient || !public {
            return MemberDecision::excluded();
        }

        match policy {
            ExposurePolicy::AnnotatedOnly => MemberDecision::excluded(),
            ExposurePolicy::AnnotatedPlusReadOnly => {
                MemberDecision::with_access(candidate.natural.intersect(Access::ReadOnly))
            }
            ExposurePolicy::AllPublic => MemberDecision::with_access(candidate.natural),
        }
    }

    fn decide_operation(
        &self,
        class: &ClassDescriptor,
        operation: &OperationInfo,
        policy: ExposurePolicy,
    ) -> OperationDecision {
        let annotations = &operation.annotations;
        let public = operation.visibility == Visibility::Public;

        if let Some(description) = &annotations.operation {
            if annotations.transient {
                warn!(
                    class = %class.name,
                    operation = %operation.name,
                    "operation is marked both transient and managed, skipping"
                );
                return OperationDecision::excluded();
            }
            if !public {
                warn!(
                    class = %class.name,
                    operation = %operation.name,
                    "non-public operation is marked as managed, skipping"
                );
                return OperationDecision::excluded();
            }
            return OperationDecision {
                exposed: true,
                description: description.clone(),
            };
        }

        if annotations.transient || !public || policy != ExposurePolicy::AllPublic {
            return OperationDecision::excluded();
        }
        OperationDecision {
            exposed: true,
            description: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beanshape_sdk::{AttributeMeta, ClassBuilder, TypeRegistry};

    fn class() -> ClassDescriptor {
        let mut registry = TypeRegistry::new();
        let key = registry.register(ClassBuilder::record("app::Pool")).unwrap();
        registry.get(key).unwrap().clone()
    }

    fn candidate<'a>(ty: &'a TypeRef, natural: Access, annotations: MemberAnnotations) -> Candidate<'a> {
        Candidate {
            name: "size",
            value_type: ty,
            visibility: Visibility::Public,
            natural,
            annotations,
        }
    }

    fn annotated() -> MemberAnnotations {
        MemberAnnotations {
            attribute: Some(AttributeMeta::default()),
            transient: false,
        }
    }

    #[test]
    fn test_access_intersect() {
        assert_eq!(Access::ReadWrite.intersect(Access::ReadOnly), Access::ReadOnly);
        assert_eq!(Access::WriteOnly.intersect(Access::ReadOnly), Access::Excluded);
        assert_eq!(Access::from_flags(false, true), Access::WriteOnly);
    }

    #[test]
    fn test_policies_for_plain_member() {
        let ty = TypeRef::class(TypeRegistry::INTEGER);
        let c = candidate(&ty, Access::ReadWrite, MemberAnnotations::default());
        let class = class();
        let d = AnnotationDecider;

        assert_eq!(d.decide(&class, &c, ExposurePolicy::AnnotatedOnly).access, Access::Excluded);
        assert_eq!(
            d.decide(&class, &c, ExposurePolicy::AnnotatedPlusReadOnly).access,
            Access::ReadOnly
        );
        assert_eq!(d.decide(&class, &c, ExposurePolicy::AllPublic).access, Access::ReadWrite);
    }

    #[test]
    fn test_annotated_member() {
        let ty = TypeRef::class(TypeRegistry::INTEGER);
        let mut annotations = annotated();
        if let Some(meta) = annotations.attribute.as_mut() {
            meta.name = Some("Size".into());
        }
        let c = candidate(&ty, Access::ReadWrite, annotations);
        let decision = AnnotationDecider.decide(&class(), &c, ExposurePolicy::AnnotatedOnly);
        assert_eq!(decision.access, Access::ReadWrite);
        assert_eq!(decision.name.as_deref(), Some("Size"));
    }

    #[test]
    fn test_conflicts_excluded() {
        let ty = TypeRef::class(TypeRegistry::INTEGER);
        let mut annotations = annotated();
        annotations.transient = true;
        let c = candidate(&ty, Access::ReadOnly, annotations);
        assert_eq!(
            AnnotationDecider.decide(&class(), &c, ExposurePolicy::AllPublic).access,
            Access::Excluded
        );

        let mut c = candidate(&ty, Access::ReadOnly, annotated());
        c.visibility = Visibility::Private;
        assert_eq!(
            AnnotationDecider.decide(&class(), &c, ExposurePolicy::AllPublic).access,
            Access::Excluded
        );
    }

    #[test]
    fn test_operation_decisions() {
        let class = class();
        let d = AnnotationDecider;
        let void = TypeRef::class(TypeRegistry::VOID);

        let plain = beanshape_sdk::class::operation("flush", void.clone());
        assert!(!d.decide_operation(&class, &plain, ExposurePolicy::AnnotatedPlusReadOnly).exposed);
        assert!(d.decide_operation(&class, &plain, ExposurePolicy::AllPublic).exposed);

        let marked = plain.clone().described("Flush buffers");
        let decision = d.decide_operation(&class, &marked, ExposurePolicy::AnnotatedOnly);
        assert!(decision.exposed);
        assert_eq!(decision.description.as_deref(), Some("Flush buffers"));

        let conflicted = marked.clone().transient();
        assert!(!d.decide_operation(&class, &conflicted, ExposurePolicy::AllPublic).exposed);

        let hidden = marked.with_visibility(Visibility::Private);
        assert!(!d.decide_operation(&class, &hidden, ExposurePolicy::AllPublic).exposed);
    }

    #[test]
    fn test_policy_toml_names() {
        #[derive(Deserialize)]
        struct Wrapper {
            policy: ExposurePolicy,
        }
        let w: Wrapper = toml::from_str("policy = \"all-public\"").unwrap();
        assert_eq!(w.policy, ExposurePolicy::AllPublic);
        assert_eq!(ExposurePolicy::default(), ExposurePolicy::AnnotatedPlusReadOnly);
    }
}
