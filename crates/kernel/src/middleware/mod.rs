//! HTTP middleware components.

pub mod bearer_auth;

pub use bearer_auth::{AdminUser, require_admin};
