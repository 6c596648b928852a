//! Uploaded image storage.
//!
//! Provides image validation, compression, storage, and cleanup.

pub mod service;
pub mod storage;

pub use service::{ImageUploadService, JPEG_QUALITY, StoredImage, UploadError};
pub use storage::{FileStorage, LocalFileStorage};
