//! LearnHub Core Library
//!
//! Domain models, the authenticated actor, completion and grading rules, error
//! types and configuration shared by every LearnHub crate.

pub mod actor;
pub mod config;
pub mod constants;
pub mod error;
pub mod grading;
pub mod models;
pub mod stats;
pub mod store_types;

pub use actor::Actor;
pub use config::{BaseConfig, BootstrapAdmin, Config, LearnHubConfig, LogFormat};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use store_types::StoreBackend;
