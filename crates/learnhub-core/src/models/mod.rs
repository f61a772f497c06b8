//! Data models for the application
//!
//! Entities, request DTOs and response views, organized by domain.

mod assignment;
mod course;
mod course_request;
mod interaction;
mod organization;
mod progress;
mod quiz;
mod statistics;
mod user;

pub use assignment::*;
pub use course::*;
pub use course_request::*;
pub use interaction::*;
pub use organization::*;
pub use progress::*;
pub use quiz::*;
pub use statistics::*;
pub use user::*;
