//! The encrypted key-value vault.
//!
//! Every public operation is a full cycle under one lock:
//! load (decrypt + decode) -> look up or mutate -> save (encode +
//! encrypt), with no plaintext cached between calls.  The lock only
//! serializes callers sharing one `Vault`; two vaults (or processes)
//! pointing at the same file are not coordinated.

use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::debug;
use zeroize::Zeroizing;

use crate::crypto::kdf::derive_key;
use crate::crypto::stream::{AesCfb, StreamCipherFactory};
use crate::crypto::{DecryptingReader, EncryptingWriter};
use crate::errors::{SecretError, Result};

use super::storage::{FileStorage, Storage};

/// Secret name -> secret value.  Ordered so saved files are stable.
pub type SecretMap = BTreeMap<String, String>;

/// The main vault handle.
pub struct Vault<S: Storage = FileStorage> {
    /// Fed to key derivation on every load and save.
    passphrase: Zeroizing<String>,

    /// Where the encrypted blob lives.
    storage: S,

    /// Builds the encrypt/decrypt streams.
    cipher: Box<dyn StreamCipherFactory>,

    /// In-memory map of the last load; the mutex serializes operations.
    secrets: Mutex<SecretMap>,
}

impl Vault<FileStorage> {
    /// A vault stored in the file at `path`, encrypted with AES-CFB.
    ///
    /// Nothing is read until the first operation; a missing file is an
    /// empty vault.
    pub fn new(passphrase: &str, path: impl Into<PathBuf>) -> Self {
        Self::with_storage(passphrase, FileStorage::new(path))
    }

    /// Returns the path of the vault file.
    pub fn path(&self) -> &std::path::Path {
        self.storage.path()
    }
}

impl<S: Storage> Vault<S> {
    /// A vault over any storage backend, encrypted with AES-CFB.
    pub fn with_storage(passphrase: &str, storage: S) -> Self {
        Self::with_parts(passphrase, storage, AesCfb)
    }

    /// A vault with an explicit storage backend and cipher factory.
    pub fn with_parts(
        passphrase: &str,
        storage: S,
        cipher: impl StreamCipherFactory + 'static,
    ) -> Self {
        Self {
            passphrase: Zeroizing::new(passphrase.to_string()),
            storage,
            cipher: Box::new(cipher),
            secrets: Mutex::new(SecretMap::new()),
        }
    }

    /// Returns the storage backend.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    // ------------------------------------------------------------------
    // Secret operations
    // ------------------------------------------------------------------

    /// Return the value stored under `name`.
    pub fn get(&self, name: &str) -> Result<String> {
        let mut secrets = self.lock();
        self.load_into(&mut secrets)?;
        secrets
            .get(name)
            .cloned()
            .ok_or_else(|| SecretError::KeyNotFound(name.to_string()))
    }

    /// Insert or overwrite `name`, then persist.
    pub fn set(&self, name: &str, value: &str) -> Result<()> {
        let mut secrets = self.lock();
        self.load_into(&mut secrets)?;
        secrets.insert(name.to_string(), value.to_string());
        self.save_from(&secrets)
    }

    /// Delete `name`, then persist.
    ///
    /// An absent name is `KeyNotFound` and nothing is written.
    pub fn remove(&self, name: &str) -> Result<()> {
        let mut secrets = self.lock();
        self.load_into(&mut secrets)?;
        if secrets.remove(name).is_none() {
            return Err(SecretError::KeyNotFound(name.to_string()));
        }
        self.save_from(&secrets)
    }

    /// Decrypt the stored map and return a copy of it.
    pub fn entries(&self) -> Result<SecretMap> {
        let mut secrets = self.lock();
        self.load_into(&mut secrets)?;
        Ok(secrets.clone())
    }

    /// Sorted secret names.
    pub fn names(&self) -> Result<Vec<String>> {
        let mut secrets = self.lock();
        self.load_into(&mut secrets)?;
        Ok(secrets.keys().cloned().collect())
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Replace the in-memory map with the stored one.
    pub fn load(&self) -> Result<()> {
        let mut secrets = self.lock();
        self.load_into(&mut secrets)
    }

    /// Encrypt the in-memory map and overwrite the stored blob.
    pub fn save(&self) -> Result<()> {
        let secrets = self.lock();
        self.save_from(&secrets)
    }

    fn lock(&self) -> MutexGuard<'_, SecretMap> {
        // The map is reloaded at the start of every operation, so a
        // panic mid-operation cannot leave stale state behind.
        self.secrets.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn load_into(&self, secrets: &mut SecretMap) -> Result<()> {
        let Some(reader) = self.storage.open_reader()? else {
            debug!(location = %self.storage.location(), "no vault yet, starting empty");
            secrets.clear();
            return Ok(());
        };

        let key = derive_key(&self.passphrase);
        let source = DecryptingReader::with_factory(self.cipher.as_ref(), key.as_bytes(), reader)?;
        *secrets = decode_secrets(source)?;

        debug!(
            location = %self.storage.location(),
            count = secrets.len(),
            "loaded vault"
        );
        Ok(())
    }

    fn save_from(&self, secrets: &SecretMap) -> Result<()> {
        let key = derive_key(&self.passphrase);
        let cipher = self.cipher.as_ref();

        self.storage.replace(&mut |out: &mut dyn Write| {
            let mut sink = EncryptingWriter::with_factory(cipher, key.as_bytes(), out)?;
            encode_secrets(&mut sink, secrets)?;
            sink.flush()?;
            Ok(())
        })?;

        debug!(
            location = %self.storage.location(),
            count = secrets.len(),
            "saved vault"
        );
        Ok(())
    }
}

impl<S: Storage> std::fmt::Debug for Vault<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Vault")
            .field("location", &self.storage.location())
            .field("passphrase", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

/// Decode the first JSON object in `reader`.
///
/// Empty or whitespace-only plaintext is an empty vault.  Anything
/// after the first object is ignored: older writers did not truncate
/// the file, so a shrinking vault left stale ciphertext at the end.
fn decode_secrets<R: Read>(reader: R) -> Result<SecretMap> {
    let mut values = serde_json::Deserializer::from_reader(reader).into_iter::<SecretMap>();
    match values.next() {
        None => Ok(SecretMap::new()),
        Some(Ok(map)) => Ok(map),
        Some(Err(e)) => Err(SecretError::from_json("secrets JSON", e)),
    }
}

/// Encode `secrets` as one JSON object followed by a newline.
fn encode_secrets<W: Write>(writer: &mut W, secrets: &SecretMap) -> Result<()> {
    serde_json::to_writer(&mut *writer, secrets)
        .map_err(|e| SecretError::from_json("secrets JSON", e))?;
    writer.write_all(b"\n")?;
    Ok(())
}
