//! Content Vault SDK - Host Content System Type Definitions
//!
//! This crate contains the types a host content-management system exposes
//! to the mapping core. It has no dependencies, so host adapters can
//! implement [`ContentSource`] without pulling in the mapping machinery.
//!
//! # Modules
//!
//! - [`node`] - Content and media node handles
//! - [`value`] - Weakly typed property values
//! - [`interfaces`] - The collaborator trait implemented by hosts

pub mod interfaces;
pub mod node;
pub mod value;

pub use interfaces::*;
pub use node::*;
pub use value::RawValue;
