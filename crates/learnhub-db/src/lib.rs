//! LearnHub persistence layer
//!
//! Repository traits with a PostgreSQL implementation and an in-process memory
//! implementation. Every trait method is atomic: multi-step mutations either fully
//! apply or leave no trace.

pub mod db;

pub use db::*;
