//! HTTP route handlers.

pub mod banner;
pub mod branding;
pub mod health;
pub mod helpers;
pub mod section;
pub mod settings;
pub mod show;
pub mod static_files;
pub mod venue;
