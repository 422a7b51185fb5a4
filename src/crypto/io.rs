//! `Write`/`Read` adapters that encrypt or decrypt a byte stream.
//!
//! Layout of an encrypted stream:
//!   [ IV (one cipher block, plaintext) | ciphertext (same length as plaintext) ]
//!
//! The IV is generated fresh for every `EncryptingWriter`, so two
//! encryptions of the same plaintext never share a prefix.

use std::io::{self, Read, Write};

use rand::RngCore;

use super::stream::{AesCfb, KeyStream, StreamCipherFactory};
use crate::errors::{SecretError, Result};

/// Encrypts everything written to it before forwarding to `inner`.
pub struct EncryptingWriter<W: Write> {
    inner: W,
    stream: Box<dyn KeyStream>,
    /// Scratch space so the caller's buffer is never modified.
    scratch: Vec<u8>,
}

impl<W: Write> EncryptingWriter<W> {
    /// Open an AES-CFB encrypting sink over `inner`.
    pub fn new(key: &[u8], inner: W) -> Result<Self> {
        Self::with_factory(&AesCfb, key, inner)
    }

    /// Open an encrypting sink using an explicit cipher factory.
    ///
    /// Generates a random IV, builds the stream, then writes the IV
    /// verbatim to `inner`.  A short or failed IV write is reported as
    /// `IncompleteIvWrite`.
    pub fn with_factory(
        factory: &dyn StreamCipherFactory,
        key: &[u8],
        mut inner: W,
    ) -> Result<Self> {
        let mut iv = vec![0u8; factory.block_size()];
        rand::rng().fill_bytes(&mut iv);

        let stream = factory.encrypt_stream(key, &iv)?;

        inner
            .write_all(&iv)
            .map_err(SecretError::IncompleteIvWrite)?;

        Ok(Self {
            inner,
            stream,
            scratch: Vec::new(),
        })
    }

    /// Unwrap the underlying sink.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Write for EncryptingWriter<W> {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.scratch.clear();
        self.scratch.extend_from_slice(data);
        self.stream.apply(&mut self.scratch);
        // The keystream has already advanced past `data`, so a partial
        // write here would desynchronize it: write everything or fail.
        self.inner.write_all(&self.scratch)?;
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Decrypts bytes read from `inner`.
pub struct DecryptingReader<R: Read> {
    inner: R,
    stream: Box<dyn KeyStream>,
}

impl<R: Read> DecryptingReader<R> {
    /// Open an AES-CFB decrypting source over `inner`.
    pub fn new(key: &[u8], inner: R) -> Result<Self> {
        Self::with_factory(&AesCfb, key, inner)
    }

    /// Open a decrypting source using an explicit cipher factory.
    ///
    /// Reads exactly one block from `inner` as the IV.  Fewer bytes,
    /// including an empty source, fail with `IncompleteIvRead`.
    pub fn with_factory(
        factory: &dyn StreamCipherFactory,
        key: &[u8],
        mut inner: R,
    ) -> Result<Self> {
        let mut iv = vec![0u8; factory.block_size()];
        inner
            .read_exact(&mut iv)
            .map_err(SecretError::IncompleteIvRead)?;

        let stream = factory.decrypt_stream(key, &iv)?;

        Ok(Self { inner, stream })
    }
}

impl<R: Read> Read for DecryptingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.stream.apply(&mut buf[..n]);
        Ok(n)
    }
}
