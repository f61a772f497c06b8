//! HTTP handlers, one module per domain. Handlers pass the authenticated actor and
//! the decoded body straight to a service.

pub mod availability;
pub mod catalog;
pub mod course_requests;
pub mod health;
pub mod learning;
pub mod organizations;
pub mod statistics;
