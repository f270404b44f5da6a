//! Type classifier
//!
//! Recursively maps a host type onto the closed {primitive, array, table,
//! composite} schema model. First match wins:
//!
//! 1. transient classes are unmappable, string-exposed classes become strings
//! 2. built-in scalars and the root object type (primitive singleton table)
//! 3. enumerations, as strings
//! 4. native arrays and sequence classes, own or inherited
//! 5. table classes, own or inherited, as `{key, value}` rows
//! 6. everything else is a composite of its exposed members
//!
//! `Ok(None)` means "drop this member": the type exists but has nothing to
//! expose. `Err` means the shape itself is unknown and aborts the whole build.
//!
//! Operation signatures reuse the same rules for every parameter and for the
//! return type; one unmappable type drops the operation.

use std::sync::Arc;

use beanshape_sdk::{ClassDescriptor, ClassKind, ScalarKind, TypeKey, TypeRef, TypeRegistry};
use rustc_hash::FxHashSet;
use tracing::{debug, trace};

use crate::error::SchemaError;
use crate::reflect::{ExposurePolicy, Reflector, StructuralReflector};
use crate::schema::{
    primitives, ArrayOrigin, ArrayType, CompositeAttribute, CompositeType, NativeType, NodeKind,
    OperationParam, OperationSignature, PrimitiveType, SchemaNode, TableType,
};

/// Result of classifying one type
pub type ClassifyResult = Result<Option<Arc<SchemaNode>>, SchemaError>;

/// Build the schema of `ty` with the default reflector and annotation-driven
/// exposure decisions.
pub fn build_schema(registry: &TypeRegistry, ty: &TypeRef, policy: ExposurePolicy) -> ClassifyResult {
    let reflector = StructuralReflector::default();
    TypeClassifier::new(registry, &reflector, policy).classify_root(ty)
}

/// Build the operation signatures of `key` with the default reflector
pub fn build_operations(
    registry: &TypeRegistry,
    key: TypeKey,
    policy: ExposurePolicy,
) -> Result<Vec<OperationSignature>, SchemaError> {
    let reflector = StructuralReflector::default();
    TypeClassifier::new(registry, &reflector, policy).classify_operations(key)
}

/// Schema builder for one (type, policy) request.
///
/// Holds the cycle guard: the set of composite types currently being
/// expanded on the path from the root.
pub struct TypeClassifier<'a> {
    registry: &'a TypeRegistry,
    reflector: &'a dyn Reflector,
    policy: ExposurePolicy,
    visiting: FxHashSet<TypeKey>,
}

impl<'a> TypeClassifier<'a> {
    /// Create a classifier
    pub fn new(registry: &'a TypeRegistry, reflector: &'a dyn Reflector, policy: ExposurePolicy) -> Self {
        Self {
            registry,
            reflector,
            policy,
            visiting: FxHashSet::default(),
        }
    }

    /// Classify a root type
    pub fn classify_root(&mut self, ty: &TypeRef) -> ClassifyResult {
        let position = self.describe(ty);
        self.classify(ty, &position)
    }

    /// Classify `ty`, found at `position` (used in error messages)
    pub fn classify(&mut self, ty: &TypeRef, position: &str) -> ClassifyResult {
        trace!(position, "classify");
        let resolved = resolve_bounds(ty, position)?;
        let result = match resolved {
            TypeRef::Array(_) => self.classify_native_array(resolved, position),
            TypeRef::Class(key) => self.classify_class(*key, &[], position),
            TypeRef::Parameterized { raw, args } => self.classify_class(*raw, args, position),
            // resolve_bounds never returns a wildcard or a variable
            TypeRef::Wildcard { .. } | TypeRef::Variable { .. } => Err(unresolvable(position, "bound")),
        }?;
        trace!(position, mapped = result.is_some(), "classified");
        Ok(result)
    }

    /// Signatures of the exposed operations of `key`, nearest declaration
    /// first. Operations with an unmappable parameter or return type are
    /// dropped.
    pub fn classify_operations(&mut self, key: TypeKey) -> Result<Vec<OperationSignature>, SchemaError> {
        let class = self
            .registry
            .get(key)
            .ok_or_else(|| unresolvable(&key.to_string(), &format!("unknown class {}", key)))?;

        let mut signatures = Vec::new();
        'operations: for operation in self.reflector.operations(self.registry, key, self.policy) {
            let position = format!("{}.{}()", class.simple_name(), operation.name);
            let Some(returns) = self.classify(&operation.return_type, &position)? else {
                debug!(class = %class.name, operation = %operation.name, "return type unmappable, operation dropped");
                continue;
            };

            let mut params = Vec::with_capacity(operation.params.len());
            for param in operation.params {
                let position = format!("{}.{}({})", class.simple_name(), operation.name, param.name);
                let Some(node) = self.classify(&param.value_type, &position)? else {
                    debug!(
                        class = %class.name,
                        operation = %operation.name,
                        param = %param.name,
                        "parameter unmappable, operation dropped"
                    );
                    continue 'operations;
                };
                params.push(OperationParam {
                    name: param.name,
                    description: param.description,
                    node,
                });
            }

            signatures.push(OperationSignature {
                name: operation.name,
                description: operation.description,
                params,
                returns,
            });
        }
        Ok(signatures)
    }

    fn classify_class(&mut self, key: TypeKey, args: &[TypeRef], position: &str) -> ClassifyResult {
        let class = self
            .registry
            .get(key)
            .ok_or_else(|| unresolvable(position, &format!("unknown class {}", key)))?;

        if class.transient {
            debug!(class = %class.name, "transient type, unmappable");
            return Ok(None);
        }
        if class.expose_as_string || key == TypeRegistry::OBJECT {
            return Ok(Some(primitives::display_string()));
        }

        let kind = self.registry.structural_kind(key).unwrap_or(&class.kind);
        match kind {
            ClassKind::Scalar(kind) => Ok(Some(primitives::scalar(*kind))),
            ClassKind::Enum(variants) => Ok(Some(Arc::new(SchemaNode::new(
                class.schema_name(),
                class.schema_description(),
                &class.name,
                NodeKind::Primitive(PrimitiveType {
                    scalar: ScalarKind::String,
                    native: NativeType::Enum {
                        type_name: class.name.clone(),
                        variants: variants.clone(),
                    },
                }),
            )))),
            ClassKind::Sequence => self.classify_sequence(class, args, position),
            ClassKind::Table => self.classify_table(class, args, position),
            ClassKind::Record => self.classify_composite(class, position),
        }
    }

    fn classify_native_array(&mut self, ty: &TypeRef, position: &str) -> ClassifyResult {
        let mut dimensions = 0;
        let mut component = ty;
        while let TypeRef::Array(inner) = component {
            dimensions += 1;
            component = inner;
        }

        let element_position = format!("{}[]", position);
        let Some(element) = self.classify(component, &element_position)? else {
            debug!(position, "array element unmappable");
            return Ok(None);
        };
        let name = format!("{}{}", element.name(), "[]".repeat(dimensions));
        Ok(Some(Arc::new(SchemaNode::new(
            &name,
            &name,
            &name,
            NodeKind::ArrayLike(ArrayType {
                element,
                dimensions,
                origin: ArrayOrigin::NativeArray,
            }),
        ))))
    }

    fn classify_sequence(&mut self, class: &ClassDescriptor, args: &[TypeRef], position: &str) -> ClassifyResult {
        let element_position = format!("{}[]", position);
        let element = match args {
            [arg] => self.classify(arg, &element_position)?,
            _ => Some(primitives::string()),
        };
        let Some(element) = element else {
            debug!(position, "sequence element unmappable");
            return Ok(None);
        };
        Ok(Some(Arc::new(SchemaNode::new(
            class.schema_name(),
            class.schema_description(),
            &class.name,
            NodeKind::ArrayLike(ArrayType {
                element,
                dimensions: 1,
                origin: ArrayOrigin::Sequence,
            }),
        ))))
    }

    fn classify_table(&mut self, class: &ClassDescriptor, args: &[TypeRef], position: &str) -> ClassifyResult {
        let (key, value) = match args {
            [k, v] => (
                self.classify(k, &format!("{}<key>", position))?,
                self.classify(v, &format!("{}<value>", position))?,
            ),
            _ => (Some(primitives::string()), Some(primitives::string())),
        };
        let (Some(key), Some(value)) = (key, value) else {
            debug!(position, "table key or value unmappable");
            return Ok(None);
        };
        Ok(Some(Arc::new(SchemaNode::new(
            class.schema_name(),
            class.schema_description(),
            &class.name,
            NodeKind::TableLike(TableType { key, value }),
        ))))
    }

    fn classify_composite(&mut self, class: &ClassDescriptor, position: &str) -> ClassifyResult {
        if !self.visiting.insert(class.key) {
            debug!(class = %class.name, position, "cycle detected, mapping as string");
            return Ok(Some(primitives::display_string()));
        }
        let result = self.expand(class);
        self.visiting.remove(&class.key);
        result
    }

    fn expand(&mut self, class: &ClassDescriptor) -> ClassifyResult {
        let accessors = self.reflector.reflect(self.registry, class.key, self.policy);
        let mut attributes: Vec<CompositeAttribute> = Vec::with_capacity(accessors.len());
        let mut names: FxHashSet<String> = FxHashSet::default();

        for accessor in accessors {
            let position = format!("{}.{}", class.simple_name(), accessor.name);
            let Some(node) = self.classify(&accessor.value_type, &position)? else {
                debug!(class = %class.name, attribute = %accessor.name, "attribute unmappable, dropped");
                continue;
            };
            if !names.insert(accessor.name.clone()) {
                debug!(class = %class.name, attribute = %accessor.name, "duplicate attribute, dropped");
                continue;
            }
            attributes.push(CompositeAttribute {
                name: accessor.name,
                description: accessor.description,
                accessor: accessor.accessor,
                node,
            });
        }

        if attributes.is_empty() {
            debug!(class = %class.name, "no exposable attributes, unmappable");
            return Ok(None);
        }

        Ok(Some(Arc::new(SchemaNode::new(
            class.schema_name(),
            class.schema_description(),
            &class.name,
            NodeKind::Composite(CompositeType {
                type_key: class.key,
                attributes,
                factory: class.factory.clone(),
            }),
        ))))
    }

    fn describe(&self, ty: &TypeRef) -> String {
        match ty {
            TypeRef::Class(key) | TypeRef::Parameterized { raw: key, .. } => self
                .registry
                .get(*key)
                .map(|c| c.simple_name().to_string())
                .unwrap_or_else(|| key.to_string()),
            TypeRef::Array(inner) => format!("{}[]", self.describe(inner)),
            TypeRef::Wildcard { .. } => "?".to_string(),
            TypeRef::Variable { name, .. } => name.clone(),
        }
    }
}

/// Replace wildcards and type variables by their bound: lower bound first,
/// then upper bound. A type with no bound at all has no known shape.
fn resolve_bounds<'t>(ty: &'t TypeRef, position: &str) -> Result<&'t TypeRef, SchemaError> {
    match ty {
        TypeRef::Wildcard { lower, upper } => match lower.first().or_else(|| upper.first()) {
            Some(bound) => resolve_bounds(bound, position),
            None => Err(unresolvable(position, "wildcard has no bounds")),
        },
        TypeRef::Variable { name, bounds } => match bounds.first() {
            Some(bound) => resolve_bounds(bound, position),
            None => Err(unresolvable(position, &format!("type variable {} has no bounds", name))),
        },
        other => Ok(other),
    }
}

fn unresolvable(position: &str, detail: &str) -> SchemaError {
    SchemaError::UnresolvableType {
        position: position.to_string(),
        detail: detail.to_string(),
    }
}
