//! Structural reflector
//!
//! Walks a class and its superclasses, pairs getters with setters into
//! properties, asks the exposure decider about each candidate and binds the
//! survivors into named accessors. Declared operations are collected over the
//! same walk.

use std::sync::Arc;

use beanshape_sdk::{
    ClassDescriptor, MemberAnnotations, MemberInfo, MemberKind, OperationInfo, ReadFn, TypeKey,
    TypeRef, TypeRegistry, Visibility, WriteFn,
};
use rustc_hash::FxHashSet;
use tracing::{debug, trace};

use super::accessor::MemberAccessor;
use super::exposure::{Access, AnnotationDecider, Candidate, ExposureDecider, ExposurePolicy};

/// An exposed member, ready to be classified
#[derive(Debug, Clone)]
pub struct NamedAccessor {
    /// Final attribute name
    pub name: String,
    /// Final attribute description
    pub description: String,
    /// Declared value type
    pub value_type: TypeRef,
    /// Bound capabilities
    pub accessor: Arc<MemberAccessor>,
}

/// One parameter of an exposed operation
#[derive(Debug, Clone, PartialEq)]
pub struct NamedParam {
    /// Declared name, or `arg<index>`
    pub name: String,
    /// Description, defaulting to the name
    pub description: String,
    /// Declared type
    pub value_type: TypeRef,
}

/// An exposed operation, ready to be classified
#[derive(Debug, Clone, PartialEq)]
pub struct NamedOperation {
    /// Operation name
    pub name: String,
    /// Description, defaulting to the name
    pub description: String,
    /// Parameters in declaration order
    pub params: Vec<NamedParam>,
    /// Declared return type
    pub return_type: TypeRef,
}

/// Enumerates the exposable members of a host class
pub trait Reflector: Send + Sync {
    /// Ordered, deduplicated accessors for `key`. Unknown keys yield nothing.
    fn reflect(
        &self,
        registry: &TypeRegistry,
        key: TypeKey,
        policy: ExposurePolicy,
    ) -> Vec<NamedAccessor>;

    /// Exposed operations of `key`, nearest declaration first. An operation
    /// overridden with the same parameter types appears once.
    fn operations(
        &self,
        registry: &TypeRegistry,
        key: TypeKey,
        policy: ExposurePolicy,
    ) -> Vec<NamedOperation>;
}

/// Reflector over registered class descriptors
#[derive(Clone)]
pub struct StructuralReflector {
    decider: Arc<dyn ExposureDecider>,
}

impl StructuralReflector {
    /// Create a reflector using `decider` for exposure decisions
    pub fn new(decider: Arc<dyn ExposureDecider>) -> Self {
        Self { decider }
    }
}

impl Default for StructuralReflector {
    fn default() -> Self {
        Self::new(Arc::new(AnnotationDecider))
    }
}

impl std::fmt::Debug for StructuralReflector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StructuralReflector").finish_non_exhaustive()
    }
}

/// A field or a merged getter/setter pair
struct Property<'a> {
    name: &'a str,
    value_type: &'a TypeRef,
    visibility: Visibility,
    read: Option<ReadFn>,
    write: Option<WriteFn>,
    annotations: MemberAnnotations,
    is_field: bool,
}

impl Property<'_> {
    fn natural(&self) -> Access {
        Access::from_flags(self.read.is_some(), self.write.is_some())
    }
}

impl Reflector for StructuralReflector {
    fn reflect(
        &self,
        registry: &TypeRegistry,
        key: TypeKey,
        policy: ExposurePolicy,
    ) -> Vec<NamedAccessor> {
        let mut collected: Vec<NamedAccessor> = Vec::new();
        let mut member_names: FxHashSet<&str> = FxHashSet::default();
        let mut property_names: FxHashSet<String> = FxHashSet::default();

        for class in registry.ancestors(key) {
            if class.foundational {
                break;
            }

            let properties = collect_properties(class);
            for property in &properties {
                if !property.is_field {
                    property_names.insert(property.name.to_lowercase());
                }
            }

            for property in properties {
                if property.is_field && property_names.contains(&property.name.to_lowercase()) {
                    trace!(class = %class.name, field = property.name, "field shadowed by property");
                    continue;
                }

                let candidate = Candidate {
                    name: property.name,
                    value_type: property.value_type,
                    visibility: property.visibility,
                    natural: property.natural(),
                    annotations: property.annotations.clone(),
                };
                let decision = self.decider.decide(class, &candidate, policy);
                let access = decision.access.intersect(property.natural());
                if access == Access::Excluded {
                    trace!(class = %class.name, member = property.name, "member excluded");
                    continue;
                }

                // Nearest declaration wins; exposed-name clashes are settled
                // by the classifier once unmappable members are gone
                if !member_names.insert(property.name) {
                    debug!(class = %class.name, member = property.name, "overridden member, keeping nearest");
                    continue;
                }
                let name = decision
                    .name
                    .filter(|n| !n.trim().is_empty())
                    .unwrap_or_else(|| property.name.to_string());
                let description = decision
                    .description
                    .filter(|d| !d.trim().is_empty())
                    .unwrap_or_else(|| name.clone());

                let read = if access.readable() { property.read } else { None };
                let write = if access.writable() { property.write } else { None };
                let Some(accessor) =
                    MemberAccessor::new(class.key, &class.name, property.name, read, write)
                else {
                    continue;
                };

                collected.push(NamedAccessor {
                    name,
                    description,
                    value_type: property.value_type.clone(),
                    accessor: Arc::new(accessor),
                });
            }
        }

        collected
    }

    fn operations(
        &self,
        registry: &TypeRegistry,
        key: TypeKey,
        policy: ExposurePolicy,
    ) -> Vec<NamedOperation> {
        let mut collected: Vec<NamedOperation> = Vec::new();
        let mut signatures: Vec<(&str, Vec<&TypeRef>)> = Vec::new();

        for class in registry.ancestors(key) {
            if class.foundational {
                break;
            }

            for operation in &class.operations {
                let signature: Vec<&TypeRef> = operation.signature().collect();
                if signatures
                    .iter()
                    .any(|(name, params)| *name == operation.name && *params == signature)
                {
                    debug!(class = %class.name, operation = %operation.name, "overridden operation, keeping nearest");
                    continue;
                }
                signatures.push((operation.name.as_str(), signature));

                let decision = self.decider.decide_operation(class, operation, policy);
                if !decision.exposed {
                    trace!(class = %class.name, operation = %operation.name, "operation excluded");
                    continue;
                }

                let description = decision
                    .description
                    .filter(|d| !d.trim().is_empty())
                    .unwrap_or_else(|| operation.name.clone());
                collected.push(NamedOperation {
                    name: operation.name.clone(),
                    description,
                    params: named_params(operation),
                    return_type: operation.return_type.clone(),
                });
            }
        }

        collected
    }
}

fn named_params(operation: &OperationInfo) -> Vec<NamedParam> {
    operation
        .params
        .iter()
        .enumerate()
        .map(|(index, param)| {
            let name = param
                .name
                .clone()
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| format!("arg{index}"));
            let description = param
                .description
                .clone()
                .filter(|d| !d.trim().is_empty())
                .unwrap_or_else(|| name.clone());
            NamedParam {
                name,
                description,
                value_type: param.value_type.clone(),
            }
        })
        .collect()
}

/// Members of one class as properties, in declaration order. A getter/setter
/// pair sits at the position of whichever half is declared first.
fn collect_properties(class: &ClassDescriptor) -> Vec<Property<'_>> {
    let mut properties: Vec<Property<'_>> = Vec::new();
    let mut seen: FxHashSet<&str> = FxHashSet::default();

    for member in &class.members {
        match &member.kind {
            MemberKind::Field { read, write } => {
                properties.push(Property {
                    name: &member.name,
                    value_type: &member.value_type,
                    visibility: member.visibility,
                    read: Some(Arc::clone(read)),
                    write: write.clone(),
                    annotations: member.annotations.clone(),
                    is_field: true,
                });
            }
            MemberKind::Getter(_) | MemberKind::Setter(_) => {
                if !seen.insert(member.name.as_str()) {
                    continue;
                }
                if let Some(property) = pair(class, &member.name) {
                    properties.push(property);
                }
            }
        }
    }

    properties
}

fn pair<'a>(class: &'a ClassDescriptor, name: &str) -> Option<Property<'a>> {
    let getter = class
        .members
        .iter()
        .find(|m| m.name == name && matches!(m.kind, MemberKind::Getter(_)));
    let setter = class
        .members
        .iter()
        .find(|m| m.name == name && matches!(m.kind, MemberKind::Setter(_)));

    match (getter, setter) {
        (Some(g), Some(s)) if g.value_type == s.value_type => Some(Property {
            name: &g.name,
            value_type: &g.value_type,
            visibility: g.visibility,
            read: reader(g),
            write: writer(s),
            annotations: merge(&g.annotations, &s.annotations),
            is_field: false,
        }),
        (Some(g), setter) => {
            if setter.is_some() {
                debug!(class = %class.name, property = name, "setter type differs from getter, property is read-only");
            }
            Some(Property {
                name: &g.name,
                value_type: &g.value_type,
                visibility: g.visibility,
                read: reader(g),
                write: None,
                annotations: g.annotations.clone(),
                is_field: false,
            })
        }
        (None, Some(s)) => Some(Property {
            name: &s.name,
            value_type: &s.value_type,
            visibility: s.visibility,
            read: None,
            write: writer(s),
            annotations: s.annotations.clone(),
            is_field: false,
        }),
        (None, None) => None,
    }
}

fn reader(member: &MemberInfo) -> Option<ReadFn> {
    match &member.kind {
        MemberKind::Getter(read) | MemberKind::Field { read, .. } => Some(Arc::clone(read)),
        MemberKind::Setter(_) => None,
    }
}

fn writer(member: &MemberInfo) -> Option<WriteFn> {
    match &member.kind {
        MemberKind::Setter(write) => Some(Arc::clone(write)),
        MemberKind::Field { write, .. } => write.clone(),
        MemberKind::Getter(_) => None,
    }
}

fn merge(getter: &MemberAnnotations, setter: &MemberAnnotations) -> MemberAnnotations {
    MemberAnnotations {
        attribute: getter.attribute.clone().or_else(|| setter.attribute.clone()),
        transient: getter.transient || setter.transient,
    }
}
