use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("username `{0}` already exists")]
    DuplicateUsername(String),

    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("malformed input: {0}")]
    MalformedInput(String),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("password hashing failed: {0}")]
    PasswordHash(String),

    #[error("account directory lock poisoned")]
    LockPoisoned,
}

/// Failures reading or writing the on-disk snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("no snapshot at {}", .0.display())]
    NotFound(PathBuf),

    #[error("could not access snapshot {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("snapshot {} is corrupt: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("snapshot version {found} is not supported (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("snapshot lists username `{0}` more than once")]
    DuplicateUsername(String),

    #[error("snapshot has an unusable password hash for `{0}`")]
    InvalidPasswordHash(String),

    #[error("account `{0}` holds an amount that is not a finite number")]
    NonFiniteAmount(String),
}
