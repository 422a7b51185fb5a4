//! AES in cipher feedback (CFB) mode as a byte-stream transform.
//!
//! CFB turns the block cipher into a self-synchronizing stream cipher,
//! so plaintext of any length maps to ciphertext of the same length
//! with no padding.  The segment size is the full 128-bit block, which
//! matches the files written by earlier versions of this tool.
//!
//! There is no authentication tag.  Flipping a ciphertext bit flips the
//! same plaintext bit and garbles the following block; nothing detects
//! it.

use aes::{Aes128, Aes192, Aes256};
use cfb_mode::cipher::{BlockCipher, BlockEncryptMut, KeyInit, KeyIvInit};
use cfb_mode::{BufDecryptor, BufEncryptor};

use crate::errors::{SecretError, Result};

/// AES block size in bytes; also the IV length.
pub const BLOCK_SIZE: usize = 16;

/// A stateful keystream that transforms bytes in place.
///
/// Successive calls continue the same stream, so a message may be fed
/// through in chunks of any size.
pub trait KeyStream: Send {
    fn apply(&mut self, buf: &mut [u8]);
}

/// Builds encrypt and decrypt streams from a key and an IV.
///
/// The vault and the stream adapters take this as a parameter so tests
/// can inject a failing cipher without touching global state.
pub trait StreamCipherFactory: Send + Sync {
    /// Block size of the underlying cipher; the IV must be this long.
    fn block_size(&self) -> usize;

    fn encrypt_stream(&self, key: &[u8], iv: &[u8]) -> Result<Box<dyn KeyStream>>;

    fn decrypt_stream(&self, key: &[u8], iv: &[u8]) -> Result<Box<dyn KeyStream>>;
}

/// The production cipher: AES-CFB with a 16, 24 or 32 byte key.
#[derive(Debug, Clone, Copy, Default)]
pub struct AesCfb;

impl StreamCipherFactory for AesCfb {
    fn block_size(&self) -> usize {
        BLOCK_SIZE
    }

    fn encrypt_stream(&self, key: &[u8], iv: &[u8]) -> Result<Box<dyn KeyStream>> {
        check_iv(iv)?;
        match key.len() {
            16 => encryptor::<Aes128>(key, iv),
            24 => encryptor::<Aes192>(key, iv),
            32 => encryptor::<Aes256>(key, iv),
            other => Err(SecretError::InvalidKeySize(other)),
        }
    }

    fn decrypt_stream(&self, key: &[u8], iv: &[u8]) -> Result<Box<dyn KeyStream>> {
        check_iv(iv)?;
        match key.len() {
            16 => decryptor::<Aes128>(key, iv),
            24 => decryptor::<Aes192>(key, iv),
            32 => decryptor::<Aes256>(key, iv),
            other => Err(SecretError::InvalidKeySize(other)),
        }
    }
}

/// Build an AES-CFB encrypting stream.
pub fn new_encrypt_stream(key: &[u8], iv: &[u8]) -> Result<Box<dyn KeyStream>> {
    AesCfb.encrypt_stream(key, iv)
}

/// Build an AES-CFB decrypting stream.
pub fn new_decrypt_stream(key: &[u8], iv: &[u8]) -> Result<Box<dyn KeyStream>> {
    AesCfb.decrypt_stream(key, iv)
}

fn check_iv(iv: &[u8]) -> Result<()> {
    if iv.len() != BLOCK_SIZE {
        return Err(SecretError::InvalidIvSize(iv.len()));
    }
    Ok(())
}

struct CfbEncrypt<C: BlockEncryptMut + BlockCipher>(BufEncryptor<C>);

struct CfbDecrypt<C: BlockEncryptMut + BlockCipher>(BufDecryptor<C>);

impl<C> KeyStream for CfbEncrypt<C>
where
    C: BlockEncryptMut + BlockCipher + Send,
{
    fn apply(&mut self, buf: &mut [u8]) {
        self.0.encrypt(buf);
    }
}

impl<C> KeyStream for CfbDecrypt<C>
where
    C: BlockEncryptMut + BlockCipher + Send,
{
    fn apply(&mut self, buf: &mut [u8]) {
        self.0.decrypt(buf);
    }
}

fn encryptor<C>(key: &[u8], iv: &[u8]) -> Result<Box<dyn KeyStream>>
where
    C: BlockEncryptMut + BlockCipher + KeyInit + Send + 'static,
{
    let inner = BufEncryptor::<C>::new_from_slices(key, iv)
        .map_err(|_| SecretError::InvalidKeySize(key.len()))?;
    Ok(Box::new(CfbEncrypt(inner)))
}

fn decryptor<C>(key: &[u8], iv: &[u8]) -> Result<Box<dyn KeyStream>>
where
    C: BlockEncryptMut + BlockCipher + KeyInit + Send + 'static,
{
    let inner = BufDecryptor::<C>::new_from_slices(key, iv)
        .map_err(|_| SecretError::InvalidKeySize(key.len()))?;
    Ok(Box::new(CfbDecrypt(inner)))
}
