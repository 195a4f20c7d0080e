//! Vidrelay Store Library
//!
//! Persistence for the upload list. The whole list is stored as one JSON value,
//! most recent record first, either in a local file or in a remote JSON
//! document store.
//!
//! # Concurrency
//!
//! Every snapshot carries a version token. Writes that pass the version they
//! loaded are rejected with [`StoreError::Conflict`] when someone else wrote in
//! between, and [`MetadataStore::prepend`] retries from a fresh snapshot.

pub mod factory;
#[cfg(feature = "store-local")]
pub mod local;
#[cfg(feature = "store-remote")]
pub mod remote;
pub mod traits;

// Re-export commonly used types
pub use factory::create_store;
#[cfg(feature = "store-local")]
pub use local::LocalJsonStore;
#[cfg(feature = "store-remote")]
pub use remote::RemoteJsonStore;
pub use traits::{MetadataStore, Snapshot, StoreError, StoreResult};
pub use vidrelay_core::StoreBackend;
