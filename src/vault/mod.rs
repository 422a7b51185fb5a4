//! Vault module: encrypted secret storage.
//!
//! This module provides:
//! - The `Storage` capability with file and in-memory backends (`storage`)
//! - The `Vault` with get/set/remove over an encrypted JSON map (`store`)

pub mod storage;
pub mod store;

// Re-export the most commonly used items.
pub use storage::{FileStorage, MemoryStorage, Storage};
pub use store::{SecretMap, Vault};
