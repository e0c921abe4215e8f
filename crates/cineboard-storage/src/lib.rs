//! Cloudflare R2 persistence for rendered panels.
//!
//! This crate provides:
//! - The `BlobStore` trait the orchestrator persists through
//! - The R2-backed production store and its env configuration
//! - The project/shot key layout
//! - An in-memory store for tests

pub mod client;
pub mod error;
pub mod keys;
pub mod store;

pub use client::{R2PanelStore, StorageConfig};
pub use error::{StorageError, StorageResult};
pub use keys::shot_key;
pub use store::{BlobStore, MemoryBlobStore};
