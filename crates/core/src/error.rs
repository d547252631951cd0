//! Error types for entity mapping
//!
//! Only failures that prevent an instance from being produced surface as
//! [`VaultError`]. Per-property conversion problems are [`CoercionError`]s,
//! which the factories log and swallow so the rest of the fill continues.

use vault_sdk::NodeId;

use crate::config::ConfigError;

/// Error type for mapping operations
#[derive(Debug, thiserror::Error)]
pub enum VaultError {
    /// The entity type could not be constructed for the node
    #[error("No usable constructor for {type_name} (node {node_id})")]
    NoConstructor {
        type_name: &'static str,
        node_id: NodeId,
    },

    /// A node's construction requested the same node again on the same thread
    #[error("Cyclic reference while constructing {type_name} for node {node_id}")]
    CyclicReference {
        type_name: &'static str,
        node_id: NodeId,
    },

    /// A cache slot held an instance of an unexpected type
    #[error("Cached item for node {node_id} is not a {type_name}")]
    CacheTypeMismatch {
        type_name: &'static str,
        node_id: NodeId,
    },

    /// Configuration could not be loaded
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type for mapping operations
pub type VaultResult<T> = Result<T, VaultError>;

/// Failure converting one raw value into a property type
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CoercionError {
    /// The raw value has a shape the target type cannot accept
    #[error("Cannot convert {found} value into {target}")]
    Unsupported {
        target: &'static str,
        found: &'static str,
    },

    /// Text could not be parsed as the target type
    #[error("Cannot parse {value:?} as {target}")]
    Parse { target: &'static str, value: String },

    /// A numeric value does not fit the target type
    #[error("Value {value} is out of range for {target}")]
    OutOfRange { target: &'static str, value: String },

    /// Text did not name any variant of the target enum
    #[error("{value:?} is not a variant of {target}")]
    UnknownVariant { target: &'static str, value: String },

    /// Null or empty value where the target has no empty representation
    #[error("Empty value for {target}")]
    Empty { target: &'static str },
}
