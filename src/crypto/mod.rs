//! Cryptographic primitives for the secret store.
//!
//! This module provides:
//! - Passphrase-to-key derivation (`kdf`)
//! - AES-CFB stream cipher construction behind an injectable factory (`stream`)
//! - Encrypting `Write` and decrypting `Read` adapters (`io`)

pub mod io;
pub mod kdf;
pub mod stream;

// Re-export the most commonly used items so callers can write:
//   use crate::crypto::{derive_key, EncryptingWriter, ...};
pub use io::{DecryptingReader, EncryptingWriter};
pub use kdf::{derive_key, DerivedKey};
pub use stream::{
    new_decrypt_stream, new_encrypt_stream, AesCfb, KeyStream, StreamCipherFactory, BLOCK_SIZE,
};
