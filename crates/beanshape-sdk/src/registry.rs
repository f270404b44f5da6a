//! Type registry
//!
//! Owns every class descriptor the engine can see. Built-in classes are
//! registered at construction in a fixed order, so their keys are the same
//! constants in every registry.

use rustc_hash::FxHashMap;

use crate::class::{ClassBuilder, ClassDescriptor, ClassKind};
use crate::scalar::ScalarKind;
use crate::ty::TypeKey;

/// Registry errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RegistryError {
    /// A class with this name is already registered
    #[error("Duplicate class name: {0}")]
    DuplicateName(String),

    /// The key does not belong to this registry
    #[error("Unknown type key: {0}")]
    UnknownKey(TypeKey),
}

/// Registry of host classes
#[derive(Debug)]
pub struct TypeRegistry {
    classes: Vec<ClassDescriptor>,
    by_name: FxHashMap<String, TypeKey>,
}

impl TypeRegistry {
    /// `String`
    pub const STRING: TypeKey = TypeKey(0);
    /// `Boolean`
    pub const BOOLEAN: TypeKey = TypeKey(1);
    /// `Byte`
    pub const BYTE: TypeKey = TypeKey(2);
    /// `Short`
    pub const SHORT: TypeKey = TypeKey(3);
    /// `Integer`
    pub const INTEGER: TypeKey = TypeKey(4);
    /// `Long`
    pub const LONG: TypeKey = TypeKey(5);
    /// `Float`
    pub const FLOAT: TypeKey = TypeKey(6);
    /// `Double`
    pub const DOUBLE: TypeKey = TypeKey(7);
    /// `Character`
    pub const CHARACTER: TypeKey = TypeKey(8);
    /// `BigInteger`
    pub const BIG_INTEGER: TypeKey = TypeKey(9);
    /// `BigDecimal`
    pub const BIG_DECIMAL: TypeKey = TypeKey(10);
    /// `Date`
    pub const DATE: TypeKey = TypeKey(11);
    /// `ObjectName`
    pub const OBJECT_NAME: TypeKey = TypeKey(12);
    /// `Void`
    pub const VOID: TypeKey = TypeKey(13);
    /// `Object`, the root of every class hierarchy
    pub const OBJECT: TypeKey = TypeKey(14);
    /// `List<T>`
    pub const LIST: TypeKey = TypeKey(15);
    /// `Set<T>`
    pub const SET: TypeKey = TypeKey(16);
    /// `Map<K, V>`
    pub const MAP: TypeKey = TypeKey(17);

    /// Create a registry holding only the built-in classes
    pub fn new() -> Self {
        let mut registry = Self {
            classes: Vec::new(),
            by_name: FxHashMap::default(),
        };

        for kind in ScalarKind::all() {
            registry.push(ClassBuilder::with_kind(
                builtin_name(*kind),
                ClassKind::Scalar(*kind),
            ));
        }
        registry.push(ClassBuilder::record("Object").foundational());
        registry.push(ClassBuilder::with_kind("List", ClassKind::Sequence));
        registry.push(ClassBuilder::with_kind("Set", ClassKind::Sequence));
        registry.push(ClassBuilder::with_kind("Map", ClassKind::Table));

        // Native spellings resolve to the same classes
        for (alias, key) in [
            ("str", Self::STRING),
            ("bool", Self::BOOLEAN),
            ("i8", Self::BYTE),
            ("i16", Self::SHORT),
            ("i32", Self::INTEGER),
            ("i64", Self::LONG),
            ("f32", Self::FLOAT),
            ("f64", Self::DOUBLE),
            ("char", Self::CHARACTER),
            ("i128", Self::BIG_INTEGER),
            ("Vec", Self::LIST),
            ("HashSet", Self::SET),
            ("HashMap", Self::MAP),
        ] {
            registry.by_name.insert(alias.to_string(), key);
        }

        registry
    }

    fn push(&mut self, builder: ClassBuilder) -> TypeKey {
        let key = TypeKey(self.classes.len() as u32);
        self.by_name.insert(builder.name().to_string(), key);
        self.classes.push(builder.build(key));
        key
    }

    /// Key of the built-in class for a scalar kind
    pub fn scalar_key(kind: ScalarKind) -> TypeKey {
        let index = ScalarKind::all()
            .iter()
            .position(|k| *k == kind)
            .unwrap_or_default();
        TypeKey(index as u32)
    }

    /// Register a fully built class
    pub fn register(&mut self, builder: ClassBuilder) -> Result<TypeKey, RegistryError> {
        if self.by_name.contains_key(builder.name()) {
            return Err(RegistryError::DuplicateName(builder.name().to_string()));
        }
        Ok(self.push(builder))
    }

    /// Reserve a key for a class whose members refer back to it.
    ///
    /// The placeholder is an empty record until [`define`](Self::define) is
    /// called.
    pub fn declare(&mut self, name: &str) -> Result<TypeKey, RegistryError> {
        self.register(ClassBuilder::record(name))
    }

    /// Replace a declared placeholder with its full definition
    pub fn define(&mut self, key: TypeKey, builder: ClassBuilder) -> Result<(), RegistryError> {
        let old_name = match self.classes.get(key.index()) {
            Some(class) => class.name.clone(),
            None => return Err(RegistryError::UnknownKey(key)),
        };
        if builder.name() != old_name {
            if self.by_name.contains_key(builder.name()) {
                return Err(RegistryError::DuplicateName(builder.name().to_string()));
            }
            self.by_name.remove(&old_name);
            self.by_name.insert(builder.name().to_string(), key);
        }
        self.classes[key.index()] = builder.build(key);
        Ok(())
    }

    /// Get a class by key
    pub fn get(&self, key: TypeKey) -> Option<&ClassDescriptor> {
        self.classes.get(key.index())
    }

    /// Look up a class by name
    pub fn by_name(&self, name: &str) -> Option<&ClassDescriptor> {
        self.by_name.get(name).and_then(|key| self.get(*key))
    }

    /// Iterate a class followed by its superclasses, nearest first.
    ///
    /// Stops at an unknown key and never yields a class twice.
    pub fn ancestors(&self, key: TypeKey) -> Ancestors<'_> {
        Ancestors {
            registry: self,
            next: Some(key),
            remaining: self.classes.len(),
        }
    }

    /// Returns true if `key` is `ancestor` or inherits from it
    pub fn is_subclass_of(&self, key: TypeKey, ancestor: TypeKey) -> bool {
        self.ancestors(key).any(|c| c.key == ancestor)
    }

    /// Structural kind of `key`: its own kind unless it is a plain record, in
    /// which case the nearest non-record kind up the superclass chain. A record
    /// extending `List` is a sequence.
    pub fn structural_kind(&self, key: TypeKey) -> Option<&ClassKind> {
        let own = &self.get(key)?.kind;
        let inherited = self
            .ancestors(key)
            .map(|c| &c.kind)
            .find(|kind| **kind != ClassKind::Record);
        Some(inherited.unwrap_or(own))
    }

    /// Number of registered classes, built-ins included
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Always false: built-ins are registered at construction
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over a superclass chain
pub struct Ancestors<'a> {
    registry: &'a TypeRegistry,
    next: Option<TypeKey>,
    remaining: usize,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a ClassDescriptor;

    fn next(&mut self) -> Option<Self::Item> {
        // A chain longer than the registry must loop
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let class = self.registry.get(self.next?)?;
        self.next = class.superclass;
        Some(class)
    }
}

fn builtin_name(kind: ScalarKind) -> &'static str {
    match kind {
        ScalarKind::String => "String",
        ScalarKind::Boolean => "Boolean",
        ScalarKind::Byte => "Byte",
        ScalarKind::Short => "Short",
        ScalarKind::Integer => "Integer",
        ScalarKind::Long => "Long",
        ScalarKind::Float => "Float",
        ScalarKind::Double => "Double",
        ScalarKind::Character => "Character",
        ScalarKind::BigInteger => "BigInteger",
        ScalarKind::BigDecimal => "BigDecimal",
        ScalarKind::Date => "Date",
        ScalarKind::ObjectName => "ObjectName",
        ScalarKind::Void => "Void",
    }
}
