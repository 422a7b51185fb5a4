//! Passphrase-to-key derivation.
//!
//! The key is the MD5 digest of the raw passphrase bytes: 16 bytes,
//! which selects AES-128.  There is no salt and no work factor, so the
//! same passphrase always yields the same key.
//!
//! This is key stretching for convenience, not password hashing.  It is
//! kept because every existing `.secrets` file was written under this
//! scheme; moving to a salted, memory-hard KDF needs a file migration.

use md5::{Digest, Md5};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Length of the derived key in bytes (128 bits, for AES-128).
pub const KEY_LEN: usize = 16;

/// A derived symmetric key that zeroes its memory when dropped.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey {
    bytes: [u8; KEY_LEN],
}

impl DerivedKey {
    /// Access the raw key bytes (e.g. to pass to the cipher factory).
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DerivedKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// Derive the vault key from a passphrase.
///
/// Pure and infallible: any string, including the empty one, maps to a
/// fixed-length key.
pub fn derive_key(passphrase: &str) -> DerivedKey {
    let mut digest = Md5::digest(passphrase.as_bytes());
    let mut bytes = [0u8; KEY_LEN];
    bytes.copy_from_slice(&digest);
    digest.as_mut_slice().zeroize();
    DerivedKey { bytes }
}
