//! Vidrelay Core Library
//!
//! This crate provides the domain model, error types and configuration shared by
//! the store, publisher and API crates.

pub mod config;
pub mod error;
pub mod ids;
pub mod models;
pub mod store_types;

// Re-export commonly used types
pub use config::{Config, FileHostConfig, RemoteStoreConfig, StoreConfig, VideoPlatformConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use ids::RecordIdGenerator;
pub use models::{BackupLink, PublishMode, PublishedMedia, ShopLinks, Source, UploadRecord};
pub use store_types::StoreBackend;
