//! Managed objects
//!
//! Binds one live instance to its root composite schema and exposes
//! attribute-level reads and writes, the surface a management protocol
//! dispatches against. Operation signatures ride along so the protocol can
//! decode arguments and convert results.

use std::sync::Arc;

use beanshape_sdk::HostObject;
use tracing::debug;

use crate::canonical::{CanonicalValue, CompositeData};
use crate::convert::Converter;
use crate::decode;
use crate::error::ManagedError;
use crate::schema::{CompositeAttribute, CompositeType, OperationSignature, SchemaNode};

/// A live instance paired with its composite schema
#[derive(Clone)]
pub struct ManagedObject {
    instance: Arc<dyn HostObject>,
    schema: Arc<SchemaNode>,
    converter: Converter,
    operations: Vec<OperationSignature>,
}

impl ManagedObject {
    /// Bind `instance` to `schema`, which must be a composite
    pub fn new(instance: Arc<dyn HostObject>, schema: Arc<SchemaNode>) -> Result<Self, ManagedError> {
        Self::with_converter(instance, schema, Converter::default())
    }

    /// Bind with a specific converter
    pub fn with_converter(
        instance: Arc<dyn HostObject>,
        schema: Arc<SchemaNode>,
        converter: Converter,
    ) -> Result<Self, ManagedError> {
        if schema.as_composite().is_none() {
            return Err(ManagedError::NotComposite(schema.name().to_string()));
        }
        Ok(Self {
            instance,
            schema,
            converter,
            operations: Vec::new(),
        })
    }

    /// Attach the signatures of the instance's exposed operations
    pub fn with_operations(mut self, operations: Vec<OperationSignature>) -> Self {
        self.operations = operations;
        self
    }

    /// Exposed operations
    pub fn operations(&self) -> &[OperationSignature] {
        &self.operations
    }

    /// Operation by name and parameter count
    pub fn operation(&self, name: &str, arity: usize) -> Option<&OperationSignature> {
        self.operations
            .iter()
            .find(|op| op.name == name && op.arity() == arity)
    }

    /// Root schema
    pub fn schema(&self) -> &Arc<SchemaNode> {
        &self.schema
    }

    /// Bound instance
    pub fn instance(&self) -> &Arc<dyn HostObject> {
        &self.instance
    }

    fn composite(&self) -> Result<&CompositeType, ManagedError> {
        self.schema
            .as_composite()
            .ok_or_else(|| ManagedError::NotComposite(self.schema.name().to_string()))
    }

    fn attribute(&self, name: &str) -> Result<&CompositeAttribute, ManagedError> {
        self.composite()?
            .attribute(name)
            .ok_or_else(|| ManagedError::AttributeNotFound(name.to_string()))
    }

    /// Attribute names in schema order
    pub fn attribute_names(&self) -> Vec<&str> {
        match self.schema.as_composite() {
            Some(c) => c.attribute_names().collect(),
            None => Vec::new(),
        }
    }

    /// Read the whole object
    pub fn read(&self) -> Result<CanonicalValue, ManagedError> {
        Ok(self.converter.read(self.instance.as_ref(), &self.schema)?)
    }

    /// Read one attribute
    pub fn get_attribute(&self, name: &str) -> Result<CanonicalValue, ManagedError> {
        let attribute = self.attribute(name)?;
        Ok(self.converter.read_attribute(self.instance.as_ref(), attribute)?)
    }

    /// Read several attributes; failures are skipped
    pub fn get_attributes(&self, names: &[&str]) -> CompositeData {
        let mut data = CompositeData::new(self.schema.name());
        for name in names {
            match self.get_attribute(name) {
                Ok(value) => data.push(name, value),
                Err(err) => debug!(attribute = *name, error = %err, "skipping attribute read"),
            }
        }
        data
    }

    /// Write one attribute
    pub fn set_attribute(&self, name: &str, value: &CanonicalValue) -> Result<(), ManagedError> {
        let attribute = self.attribute(name)?;
        decode::write_attribute(self.instance.as_ref(), attribute, value)?;
        Ok(())
    }

    /// Write several attributes; failures are skipped. Returns the pairs
    /// that were written.
    pub fn set_attributes(&self, values: &CompositeData) -> CompositeData {
        let mut updated = CompositeData::new(self.schema.name());
        for (name, value) in &values.items {
            match self.set_attribute(name, value) {
                Ok(()) => updated.push(name, value.clone()),
                Err(err) => debug!(attribute = %name, error = %err, "skipping attribute write"),
            }
        }
        updated
    }
}

impl std::fmt::Debug for ManagedObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManagedObject")
            .field("type", &self.schema.name())
            .field("attributes", &self.attribute_names())
            .field("operations", &self.operations.len())
            .finish()
    }
}
