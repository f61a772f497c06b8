//! LearnHub API Library
//!
//! HTTP handlers, bearer authentication, error rendering and application setup.

mod api_doc;
pub mod constants;
mod handlers;
pub mod setup;
mod telemetry;

pub mod auth;
pub mod error;
pub mod state;

pub use error::ErrorResponse;
