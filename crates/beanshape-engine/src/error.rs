//! Engine errors
//!
//! Unmappable types are not errors: the classifier reports them as `Ok(None)`.
//! Everything here is a condition the caller has to see.

use beanshape_sdk::AccessError;
use thiserror::Error;

/// Fatal schema-build errors
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SchemaError {
    /// A generic bound resolved to nothing, so the shape itself is unknown
    #[error("Unresolvable type at {position}: {detail}")]
    UnresolvableType {
        /// Offending type position, e.g. `Holder.value`
        position: String,
        /// What could not be resolved
        detail: String,
    },
}

/// Errors raised while converting a live value to its canonical form
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConversionError {
    /// An attribute's read capability failed
    #[error("Failed to read attribute '{attribute}' of {owner}: {source}")]
    Accessor {
        /// Attribute name
        attribute: String,
        /// Declaring host type
        owner: String,
        /// Underlying failure
        source: AccessError,
    },

    /// The live value does not have the shape its schema describes
    #[error("Shape mismatch: expected {expected}, got {got}")]
    ShapeMismatch {
        /// Shape required by the schema node
        expected: String,
        /// Shape of the value
        got: String,
    },
}

/// Errors raised while decoding a canonical value and writing it back
#[derive(Debug, Clone, Error, PartialEq)]
pub enum WriteError {
    /// The canonical value cannot satisfy the native target type
    #[error("Write type mismatch: expected {expected}, received {received}")]
    Mismatch {
        /// Expected category
        expected: String,
        /// Received category
        received: String,
    },

    /// A numeric value does not fit the target type
    #[error("Value {value} out of range for {target}")]
    OutOfRange {
        /// Rendered value
        value: String,
        /// Target scalar kind
        target: String,
    },

    /// A string names no variant of the target enum
    #[error("Unknown variant '{variant}' for enum {type_name}")]
    UnknownVariant {
        /// Enum type
        type_name: String,
        /// Received name
        variant: String,
    },

    /// The attribute, or the target node, accepts no writes
    #[error("Attribute '{attribute}' is not writable")]
    NotWritable {
        /// Attribute name
        attribute: String,
    },

    /// A composite cannot be decoded because its class has no factory
    #[error("Cannot construct an instance of {type_name}")]
    NotConstructible {
        /// Host type
        type_name: String,
    },

    /// The write capability failed
    #[error("Failed to write attribute '{attribute}' of {owner}: {source}")]
    Accessor {
        /// Attribute name
        attribute: String,
        /// Declaring host type
        owner: String,
        /// Underlying failure
        source: AccessError,
    },
}

/// Errors raised by the managed-object facade
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ManagedError {
    /// No attribute with this name
    #[error("Attribute not found: {0}")]
    AttributeNotFound(String),

    /// The root schema of a managed object must be a composite
    #[error("Schema for {0} is not a composite")]
    NotComposite(String),

    /// The type has no exposable attributes at all
    #[error("Type {0} has no exposable attributes")]
    Unmappable(String),

    /// Schema build failure
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Read failure
    #[error(transparent)]
    Conversion(#[from] ConversionError),

    /// Write failure
    #[error(transparent)]
    Write(#[from] WriteError),
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file
    #[error("Failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed TOML or unknown values
    #[error("Invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
}
