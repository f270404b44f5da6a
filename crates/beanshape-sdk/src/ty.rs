//! Host type expressions
//!
//! A `TypeRef` is the static type of a member as the host declares it,
//! including generic arguments, wildcards and type variables. Raw classes are
//! referred to by their `TypeKey` in a [`TypeRegistry`](crate::TypeRegistry).

use std::fmt;

/// Identifier of a raw host class in a type registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeKey(pub(crate) u32);

impl TypeKey {
    /// Index of this key in its registry
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeKey({})", self.0)
    }
}

/// A declared host type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    /// A raw class with no type arguments
    Class(TypeKey),

    /// A native array: `T[]`. Nested arrays express extra dimensions.
    Array(Box<TypeRef>),

    /// A generic instantiation: `List<String>`, `Map<K, V>`
    Parameterized {
        /// The generic class
        raw: TypeKey,
        /// Actual type arguments, in declaration order
        args: Vec<TypeRef>,
    },

    /// A wildcard: `? super L` / `? extends U`
    Wildcard {
        /// Lower bounds (`super`)
        lower: Vec<TypeRef>,
        /// Upper bounds (`extends`)
        upper: Vec<TypeRef>,
    },

    /// A type variable: `T extends B`
    Variable {
        /// Variable name
        name: String,
        /// Declared bounds
        bounds: Vec<TypeRef>,
    },
}

impl TypeRef {
    /// Shorthand for a raw class
    pub fn class(key: TypeKey) -> Self {
        TypeRef::Class(key)
    }

    /// Shorthand for a one-dimensional array of `component`
    pub fn array(component: TypeRef) -> Self {
        TypeRef::Array(Box::new(component))
    }

    /// Shorthand for an array with `dimensions` levels of `component`
    pub fn array_of_dims(component: TypeRef, dimensions: usize) -> Self {
        (0..dimensions).fold(component, |inner, _| TypeRef::array(inner))
    }

    /// Shorthand for a generic instantiation
    pub fn generic(raw: TypeKey, args: Vec<TypeRef>) -> Self {
        TypeRef::Parameterized { raw, args }
    }

    /// Wildcard with an upper bound only
    pub fn extends(bound: TypeRef) -> Self {
        TypeRef::Wildcard {
            lower: Vec::new(),
            upper: vec![bound],
        }
    }

    /// Wildcard with a lower bound only
    pub fn super_of(bound: TypeRef) -> Self {
        TypeRef::Wildcard {
            lower: vec![bound],
            upper: Vec::new(),
        }
    }

    /// Unbounded type variable
    pub fn var(name: &str) -> Self {
        TypeRef::Variable {
            name: name.to_string(),
            bounds: Vec::new(),
        }
    }

    /// Returns true for native arrays
    pub fn is_array(&self) -> bool {
        matches!(self, TypeRef::Array(_))
    }

    /// Type arguments, if this is a generic instantiation
    pub fn type_args(&self) -> &[TypeRef] {
        match self {
            TypeRef::Parameterized { args, .. } => args,
            _ => &[],
        }
    }
}

impl From<TypeKey> for TypeRef {
    fn from(key: TypeKey) -> Self {
        TypeRef::Class(key)
    }
}
