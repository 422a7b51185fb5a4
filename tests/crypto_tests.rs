//! Integration tests for the crypto module.

use std::io::{self, Read, Write};

use secretvault::crypto::{
    derive_key, new_decrypt_stream, new_encrypt_stream, DecryptingReader, EncryptingWriter,
    KeyStream, StreamCipherFactory, BLOCK_SIZE,
};
use secretvault::SecretError;

// ---------------------------------------------------------------------------
// Test doubles
// ---------------------------------------------------------------------------

/// A cipher whose construction always fails, like a rejected key.
struct RejectingCipher;

impl StreamCipherFactory for RejectingCipher {
    fn block_size(&self) -> usize {
        BLOCK_SIZE
    }

    fn encrypt_stream(&self, _key: &[u8], _iv: &[u8]) -> secretvault::Result<Box<dyn KeyStream>> {
        Err(SecretError::InvalidKeySize(10))
    }

    fn decrypt_stream(&self, _key: &[u8], _iv: &[u8]) -> secretvault::Result<Box<dyn KeyStream>> {
        Err(SecretError::InvalidKeySize(10))
    }
}

/// A sink that accepts at most `capacity` bytes, then reports zero-length writes.
struct ShortWriter {
    capacity: usize,
    written: Vec<u8>,
}

impl Write for ShortWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = buf.len().min(self.capacity - self.written.len());
        self.written.extend_from_slice(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A source whose every read fails.
struct BrokenReader;

impl Read for BrokenReader {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::Other, "disk on fire"))
    }
}

fn hex(s: &str) -> Vec<u8> {
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16).unwrap())
        .collect()
}

// ---------------------------------------------------------------------------
// Key derivation
// ---------------------------------------------------------------------------

#[test]
fn derived_key_is_md5_of_passphrase() {
    assert_eq!(
        derive_key("").as_bytes().to_vec(),
        hex("d41d8cd98f00b204e9800998ecf8427e")
    );
    assert_eq!(
        derive_key("abc").as_bytes().to_vec(),
        hex("900150983cd24fb0d6963f7d28e17f72")
    );
}

#[test]
fn derived_key_has_fixed_length_for_any_input() {
    let long = "x".repeat(10_000);
    for passphrase in ["", "a", "ünïcødé 🔑", long.as_str()] {
        assert_eq!(derive_key(passphrase).as_bytes().len(), 16);
    }
}

// ---------------------------------------------------------------------------
// Stream cipher
// ---------------------------------------------------------------------------

#[test]
fn aes128_cfb_matches_nist_vector() {
    // NIST SP 800-38A, F.3.13 CFB128-AES128.Encrypt, first block.
    let key = hex("2b7e151628aed2a6abf7158809cf4f3c");
    let iv = hex("000102030405060708090a0b0c0d0e0f");
    let mut block = hex("6bc1bee22e409f96e93d7e117393172a");

    new_encrypt_stream(&key, &iv).unwrap().apply(&mut block);
    assert_eq!(block, hex("3b3fd92eb72dad20333449f8e83cfb4a"));

    new_decrypt_stream(&key, &iv).unwrap().apply(&mut block);
    assert_eq!(block, hex("6bc1bee22e409f96e93d7e117393172a"));
}

#[test]
fn unsupported_key_size_is_rejected() {
    let iv = [0u8; BLOCK_SIZE];
    let err = new_decrypt_stream(b"6368616e67", &iv).err().unwrap();
    assert!(matches!(err, SecretError::InvalidKeySize(10)));
}

// ---------------------------------------------------------------------------
// Encrypting sink / decrypting source
// ---------------------------------------------------------------------------

#[test]
fn sink_and_source_roundtrip() {
    let key = derive_key("test_key");
    let plaintext = b"{\"twitter_api\":\"abc123\"}\n";

    let mut sink = EncryptingWriter::new(key.as_bytes(), Vec::new()).unwrap();
    sink.write_all(plaintext).unwrap();
    let blob = sink.into_inner();
    assert_eq!(blob.len(), BLOCK_SIZE + plaintext.len());

    let mut source = DecryptingReader::new(key.as_bytes(), blob.as_slice()).unwrap();
    let mut out = Vec::new();
    source.read_to_end(&mut out).unwrap();
    assert_eq!(out, plaintext);
}

#[test]
fn each_sink_uses_a_fresh_iv() {
    let key = derive_key("test_key");

    let encrypt = || {
        let mut sink = EncryptingWriter::new(key.as_bytes(), Vec::new()).unwrap();
        sink.write_all(b"same plaintext").unwrap();
        sink.into_inner()
    };
    let first = encrypt();
    let second = encrypt();

    assert_ne!(first[..BLOCK_SIZE], second[..BLOCK_SIZE]);
    assert_ne!(first[BLOCK_SIZE..], second[BLOCK_SIZE..]);
}

#[test]
fn wrong_key_yields_garbage_not_error() {
    let mut sink = EncryptingWriter::new(derive_key("right").as_bytes(), Vec::new()).unwrap();
    sink.write_all(b"plaintext").unwrap();
    let blob = sink.into_inner();

    let mut source = DecryptingReader::new(derive_key("wrong").as_bytes(), blob.as_slice()).unwrap();
    let mut out = Vec::new();
    source.read_to_end(&mut out).unwrap();
    assert_ne!(out, b"plaintext");
}

#[test]
fn short_iv_write_is_reported() {
    let writer = ShortWriter {
        capacity: 2,
        written: Vec::new(),
    };
    let err = EncryptingWriter::new(derive_key("k").as_bytes(), writer)
        .err()
        .unwrap();
    assert!(matches!(err, SecretError::IncompleteIvWrite(_)));
}

#[test]
fn failed_iv_read_is_reported() {
    let err = DecryptingReader::new(derive_key("k").as_bytes(), BrokenReader)
        .err()
        .unwrap();
    assert!(matches!(err, SecretError::IncompleteIvRead(_)));
}

#[test]
fn truncated_iv_is_reported() {
    let blob = [0u8; BLOCK_SIZE - 1];
    let err = DecryptingReader::new(derive_key("k").as_bytes(), &blob[..])
        .err()
        .unwrap();
    assert!(matches!(err, SecretError::IncompleteIvRead(_)));
}

#[test]
fn injected_cipher_failure_propagates() {
    let key = derive_key("k");

    let err = EncryptingWriter::with_factory(&RejectingCipher, key.as_bytes(), Vec::new())
        .err()
        .unwrap();
    assert!(matches!(err, SecretError::InvalidKeySize(10)));

    let blob = [0u8; 21];
    let err = DecryptingReader::with_factory(&RejectingCipher, key.as_bytes(), &blob[..])
        .err()
        .unwrap();
    assert!(matches!(err, SecretError::InvalidKeySize(10)));
}

#[test]
fn cipher_failure_happens_before_iv_is_written() {
    let mut out = Vec::new();
    let failed = EncryptingWriter::with_factory(&RejectingCipher, &[0u8; 16], &mut out).is_err();
    assert!(failed);
    assert!(out.is_empty());
}
