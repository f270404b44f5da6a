//! Schema cache
//!
//! Memoizes schema builds per (class, exposure policy). Mapped schemas and
//! fatal build errors are kept; unmappable results are not, so they are
//! recomputed on every request.

use std::sync::Arc;

use beanshape_sdk::{TypeKey, TypeRef, TypeRegistry};
use dashmap::DashMap;
use tracing::{debug, warn};

use crate::classify::{ClassifyResult, TypeClassifier};
use crate::error::SchemaError;
use crate::reflect::{ExposurePolicy, Reflector};
use crate::schema::SchemaNode;

type Entry = Result<Arc<SchemaNode>, SchemaError>;

/// Concurrent schema cache
#[derive(Debug, Default)]
pub struct SchemaCache {
    entries: DashMap<(TypeKey, ExposurePolicy), Entry>,
}

impl SchemaCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached schema of `key` under `policy`, building it on a miss.
    ///
    /// Concurrent misses may build twice; the first insert wins and every
    /// caller gets the stored result.
    pub fn get_or_build(
        &self,
        registry: &TypeRegistry,
        reflector: &dyn Reflector,
        key: TypeKey,
        policy: ExposurePolicy,
    ) -> ClassifyResult {
        if let Some(entry) = self.entries.get(&(key, policy)) {
            return entry.value().clone().map(Some);
        }

        let built = TypeClassifier::new(registry, reflector, policy).classify_root(&TypeRef::Class(key));
        let entry = match built {
            Ok(Some(node)) => Ok(node),
            Ok(None) => {
                debug!(%key, ?policy, "type unmappable, not cached");
                return Ok(None);
            }
            Err(err) => Err(err),
        };

        let stored = self
            .entries
            .entry((key, policy))
            .or_insert_with(|| {
                if let Err(err) = &entry {
                    warn!(%key, ?policy, error = %err, "schema build failed");
                }
                entry
            })
            .value()
            .clone();
        stored.map(Some)
    }

    /// Drop every cached entry for `key`
    pub fn invalidate(&self, key: TypeKey) {
        self.entries.retain(|(k, _), _| *k != key);
    }

    /// Number of cached entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is cached
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
