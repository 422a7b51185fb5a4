use thiserror::Error;

/// All errors that can occur in the secret store.
#[derive(Debug, Error)]
pub enum SecretError {
    // --- Cipher errors ---
    #[error("Invalid key size: {0} bytes (expected 16, 24 or 32)")]
    InvalidKeySize(usize),

    #[error("Invalid IV size: {0} bytes (must equal the cipher block size)")]
    InvalidIvSize(usize),

    #[error("Encrypt: unable to write the full IV: {0}")]
    IncompleteIvWrite(#[source] std::io::Error),

    #[error("Decrypt: unable to read the full IV: {0}")]
    IncompleteIvRead(#[source] std::io::Error),

    // --- Vault errors ---
    #[error("No value for secret '{0}'")]
    KeyNotFound(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- Serialization errors ---
    #[error("Serialization error: {0}")]
    Serialization(String),

    // --- Config errors ---
    #[error("Config file error: {0}")]
    Config(String),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),
}

impl SecretError {
    /// `true` when the error is the logical absence of a secret rather
    /// than a fault.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::KeyNotFound(_))
    }

    /// Classify a `serde_json` failure: I/O failures underneath the
    /// decoder keep their original `io::Error`.
    pub(crate) fn from_json(context: &str, err: serde_json::Error) -> Self {
        if err.is_io() {
            Self::Io(err.into())
        } else {
            Self::Serialization(format!("{context}: {err}"))
        }
    }
}

/// Convenience type alias for secret store results.
pub type Result<T> = std::result::Result<T, SecretError>;
