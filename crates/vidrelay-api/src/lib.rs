//! Vidrelay API Library
//!
//! This crate provides the HTTP handlers, the upload orchestration service and
//! application setup.

// Module declarations
mod handlers;
mod telemetry;

// Public modules
pub mod error;
pub mod services;
pub mod setup;
pub mod state;
pub mod utils;

// Re-exports
pub use error::{ErrorResponse, HttpAppError};
pub use services::upload::{UploadService, UploadSettings};
pub use state::AppState;
