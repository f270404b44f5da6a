//! Mapper facade
//!
//! Bundles configuration, the reflector and the schema cache behind the
//! three entry points the protocol layer uses: build a schema, read a value,
//! write a value.

use std::sync::Arc;

use beanshape_sdk::{HostObject, TypeKey, TypeRef, TypeRegistry};
use tracing::warn;

use crate::cache::SchemaCache;
use crate::canonical::CanonicalValue;
use crate::classify::{ClassifyResult, TypeClassifier};
use crate::config::EngineConfig;
use crate::convert::{ConvertResult, Converter};
use crate::decode;
use crate::error::{ManagedError, SchemaError, WriteError};
use crate::managed::ManagedObject;
use crate::reflect::{ExposureDecider, ExposurePolicy, MemberAccessor, StructuralReflector};
use crate::schema::{OperationSignature, SchemaNode};

/// Schema builder and value converter with shared state
#[derive(Debug, Default)]
pub struct Mapper {
    config: EngineConfig,
    reflector: StructuralReflector,
    converter: Converter,
    cache: SchemaCache,
}

impl Mapper {
    /// Create a mapper using annotation-driven exposure decisions
    pub fn new(config: EngineConfig) -> Self {
        Self::with_reflector(config, StructuralReflector::default())
    }

    /// Create a mapper with a custom exposure decider
    pub fn with_decider(config: EngineConfig, decider: Arc<dyn ExposureDecider>) -> Self {
        Self::with_reflector(config, StructuralReflector::new(decider))
    }

    fn with_reflector(config: EngineConfig, reflector: StructuralReflector) -> Self {
        Self {
            config,
            reflector,
            converter: Converter::new(config.share_primitive_arrays),
            cache: SchemaCache::new(),
        }
    }

    /// Active configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Schema cache
    pub fn cache(&self) -> &SchemaCache {
        &self.cache
    }

    /// Build the schema of `ty` under `policy`.
    ///
    /// Plain classes go through the cache; generic instantiations and arrays
    /// are built on every call.
    pub fn build_schema(&self, registry: &TypeRegistry, ty: &TypeRef, policy: ExposurePolicy) -> ClassifyResult {
        if let TypeRef::Class(key) = ty {
            return self.cache.get_or_build(registry, &self.reflector, *key, policy);
        }
        let result = TypeClassifier::new(registry, &self.reflector, policy).classify_root(ty);
        if let Err(err) = &result {
            warn!(error = %err, "schema build failed");
        }
        result
    }

    /// Build the schema of `ty` under the configured policy
    pub fn build_default(&self, registry: &TypeRegistry, ty: &TypeRef) -> ClassifyResult {
        self.build_schema(registry, ty, self.config.exposure)
    }

    /// Build the operation signatures of `key` under `policy`. Not cached.
    pub fn build_operations(
        &self,
        registry: &TypeRegistry,
        key: TypeKey,
        policy: ExposurePolicy,
    ) -> Result<Vec<OperationSignature>, SchemaError> {
        let result = TypeClassifier::new(registry, &self.reflector, policy).classify_operations(key);
        if let Err(err) = &result {
            warn!(error = %err, "operation build failed");
        }
        result
    }

    /// Read `instance` as described by `node`
    pub fn read(&self, instance: &dyn HostObject, node: &SchemaNode) -> ConvertResult {
        self.converter.read(instance, node)
    }

    /// Decode `canonical` against `node` and write it through `accessor`
    pub fn write(
        &self,
        instance: &dyn HostObject,
        accessor: &MemberAccessor,
        canonical: &CanonicalValue,
        node: &SchemaNode,
    ) -> Result<(), WriteError> {
        decode::write(instance, accessor, canonical, node)
    }

    /// Bind `instance` to the schema and operations of its own class under
    /// the configured policy
    pub fn manage(&self, registry: &TypeRegistry, instance: Arc<dyn HostObject>) -> Result<ManagedObject, ManagedError> {
        let key = instance.type_key();
        let schema = self
            .build_default(registry, &TypeRef::Class(key))?
            .ok_or_else(|| {
                let name = registry.get(key).map(|c| c.name.clone()).unwrap_or_else(|| key.to_string());
                ManagedError::Unmappable(name)
            })?;
        let operations = self.build_operations(registry, key, self.config.exposure)?;
        Ok(ManagedObject::with_converter(instance, schema, self.converter)?.with_operations(operations))
    }
}
