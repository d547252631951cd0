//! content-vault core
//!
//! Maps host content nodes onto typed entities.
//!
//! # Re-exports
//!
//! - [`sdk`] - node handles, raw values and the [`sdk::ContentSource`] trait
//! - [`VaultEntity`] / [`VaultEnum`] - derive macros for mappable types
//!
//! # Example
//!
//! ```ignore
//! use vault_core::{Deferred, VaultContext, VaultEntity};
//!
//! #[derive(Default, VaultEntity)]
//! #[vault(entity(auto_map, alias = "textPage"))]
//! pub struct TextPageViewModel {
//!     pub introduction: String,
//!     pub button_text: Deferred<String>,
//!     #[vault(exclude)]
//!     pub ignore: String,
//! }
//!
//! let vault = VaultContext::new(source);
//! let page = vault.content_by_id::<TextPageViewModel>(1050)?;
//! ```

// Allow the crate to refer to itself as `vault_core` for proc macro compatibility
extern crate self as vault_core;

pub use vault_sdk as sdk;

pub mod cache;
pub mod coerce;
pub mod config;
pub mod context;
pub mod deferred;
pub mod error;
pub mod factory;
pub mod logging;
pub mod memory;
pub mod schema;

// Re-export commonly used items
pub use cache::ItemCache;
pub use coerce::{FromRaw, ItemCollection};
pub use config::{ConfigError, ConfigResult, VaultConfig};
pub use context::VaultContext;
pub use deferred::{Deferred, DeferredSource};
pub use error::{CoercionError, VaultError, VaultResult};
pub use factory::{create_instance, Accessor, DirectFactory, InstanceFactory, LazyFactory};
pub use logging::init_tracing;
pub use memory::MemoryContentSource;
pub use schema::{resolve_properties, Entity};

// Re-export macros
pub use vault_macros::{VaultEntity, VaultEnum};
