//! Where the encrypted blob lives.
//!
//! `Storage` is the raw reader/writer capability the vault is built on.
//! `FileStorage` is the production backend; `MemoryStorage` keeps the
//! blob in memory for tests and embedding.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Cursor, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use tracing::warn;

use crate::errors::{SecretError, Result};

/// Callback that streams the new blob into the writer it is given.
pub type WriteFn<'a> = dyn FnMut(&mut dyn Write) -> Result<()> + 'a;

/// Raw byte storage for a single encrypted blob.
pub trait Storage: Send + Sync {
    /// Open the stored blob for reading.
    ///
    /// Returns `Ok(None)` when nothing has been stored yet.
    fn open_reader(&self) -> io::Result<Option<Box<dyn Read + '_>>>;

    /// Replace the stored blob with whatever `write` produces.
    ///
    /// If `write` fails, the previous blob must be left intact.
    fn replace(&self, write: &mut WriteFn<'_>) -> Result<()>;

    /// Human-readable location, for log messages.
    fn location(&self) -> String;
}

// ---------------------------------------------------------------------------
// FileStorage
// ---------------------------------------------------------------------------

/// A blob stored in a single file, replaced atomically on every write.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sibling temp path: `<dir>/.<name>.tmp`.
    ///
    /// Same directory as the target so the final rename stays on one
    /// filesystem.
    fn temp_path(&self) -> io::Result<PathBuf> {
        let name = self.path.file_name().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("'{}' does not name a file", self.path.display()),
            )
        })?;
        let parent = self.path.parent().unwrap_or(Path::new("."));
        Ok(parent.join(format!(".{}.tmp", name.to_string_lossy())))
    }
}

impl Storage for FileStorage {
    fn open_reader(&self) -> io::Result<Option<Box<dyn Read + '_>>> {
        match File::open(&self.path) {
            Ok(file) => Ok(Some(Box::new(BufReader::new(file)))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Write to a temp file, fsync it, then rename it over the target.
    ///
    /// Readers never observe a half-written blob, and a failed write
    /// leaves the previous file untouched.
    fn replace(&self, write: &mut WriteFn<'_>) -> Result<()> {
        let tmp_path = self.temp_path()?;

        let outcome = write_file(&tmp_path, write)
            .and_then(|()| fs::rename(&tmp_path, &self.path).map_err(SecretError::from));

        if outcome.is_err() {
            if let Err(e) = fs::remove_file(&tmp_path) {
                if e.kind() != io::ErrorKind::NotFound {
                    warn!(path = %tmp_path.display(), error = %e, "could not remove temp file");
                }
            }
        }
        outcome
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

/// Create `path` with owner-only permissions and stream `write` into it.
fn write_file(path: &Path, write: &mut WriteFn<'_>) -> Result<()> {
    let file = open_private(path)?;
    let mut writer = BufWriter::new(file);
    write(&mut writer)?;
    let file = writer.into_inner().map_err(|e| e.into_error())?;
    file.sync_all()?;
    Ok(())
}

#[cfg(unix)]
fn open_private(path: &Path) -> io::Result<File> {
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    // `mode` only applies on creation; tighten a stale temp file too.
    file.set_permissions(fs::Permissions::from_mode(0o600))?;
    Ok(file)
}

#[cfg(not(unix))]
fn open_private(path: &Path) -> io::Result<File> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}

// ---------------------------------------------------------------------------
// MemoryStorage
// ---------------------------------------------------------------------------

/// A blob held in memory.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    blob: Mutex<Option<Vec<u8>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with an existing blob, e.g. a captured or corrupted file.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            blob: Mutex::new(Some(bytes)),
        }
    }

    /// A copy of the currently stored blob.
    pub fn bytes(&self) -> Option<Vec<u8>> {
        self.blob
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Storage for MemoryStorage {
    fn open_reader(&self) -> io::Result<Option<Box<dyn Read + '_>>> {
        match self.bytes() {
            Some(bytes) => Ok(Some(Box::new(Cursor::new(bytes)))),
            None => Ok(None),
        }
    }

    fn replace(&self, write: &mut WriteFn<'_>) -> Result<()> {
        let mut buf = Vec::new();
        write(&mut buf)?;
        *self.blob.lock().unwrap_or_else(PoisonError::into_inner) = Some(buf);
        Ok(())
    }

    fn location(&self) -> String {
        "<memory>".to_string()
    }
}
