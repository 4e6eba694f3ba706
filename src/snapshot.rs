//! On-disk snapshot of every account and its expenses.
//!
//! The snapshot is a JSON document carrying a schema `version` and the list
//! of accounts sorted by username, each with its expenses in recorded order.
//! Saving writes a temporary file beside the destination and renames it into
//! place, so a failed save leaves the previous snapshot intact.

use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::account::{Account, AccountDirectory};
use crate::error::SnapshotError;
use crate::expense::Ledger;
use crate::password;

pub const CURRENT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct SnapshotFile {
    version: u32,
    accounts: Vec<AccountRecord>,
}

#[derive(Serialize, Deserialize)]
struct AccountRecord {
    username: String,
    password_hash: String,
    #[serde(default)]
    expenses: Ledger,
}

pub fn save(directory: &AccountDirectory, path: &Path) -> Result<(), SnapshotError> {
    let io_err = |source: io::Error| SnapshotError::Io {
        path: path.to_path_buf(),
        source,
    };

    let parent = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(io_err)?;

    for account in directory.accounts() {
        if account.expenses().iter().any(|e| !e.amount().is_finite()) {
            return Err(SnapshotError::NonFiniteAmount(account.username().to_string()));
        }
    }

    let snapshot = SnapshotFile {
        version: CURRENT_VERSION,
        accounts: directory
            .accounts()
            .into_iter()
            .map(|account| AccountRecord {
                username: account.username().to_string(),
                password_hash: account.password_hash().to_string(),
                expenses: account.ledger().clone(),
            })
            .collect(),
    };

    let mut tmp = NamedTempFile::new_in(parent).map_err(io_err)?;
    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        serde_json::to_writer_pretty(&mut writer, &snapshot)
            .map_err(|e| io_err(io::Error::from(e)))?;
        writer.write_all(b"\n").map_err(io_err)?;
        writer.flush().map_err(io_err)?;
    }
    tmp.as_file().sync_all().map_err(io_err)?;
    tmp.persist(path).map_err(|e| io_err(e.error))?;

    log::info!(
        "saved {} account(s) to {}",
        snapshot.accounts.len(),
        path.display()
    );
    Ok(())
}

pub fn load(path: &Path) -> Result<AccountDirectory, SnapshotError> {
    let raw = fs::read(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => SnapshotError::NotFound(path.to_path_buf()),
        _ => SnapshotError::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;

    let corrupt = |source: serde_json::Error| SnapshotError::Corrupt {
        path: path.to_path_buf(),
        source,
    };
    let value: serde_json::Value = serde_json::from_slice(&raw).map_err(corrupt)?;
    if let Some(found) = value.get("version").and_then(|v| v.as_u64()) {
        if found != u64::from(CURRENT_VERSION) {
            return Err(SnapshotError::UnsupportedVersion {
                found: u32::try_from(found).unwrap_or(u32::MAX),
                expected: CURRENT_VERSION,
            });
        }
    }
    let snapshot: SnapshotFile = serde_json::from_value(value).map_err(corrupt)?;

    let mut directory = AccountDirectory::new();
    for record in snapshot.accounts {
        if !password::is_valid_hash(&record.password_hash) {
            return Err(SnapshotError::InvalidPasswordHash(record.username));
        }
        let username = record.username.clone();
        directory
            .insert(Account::with_ledger(
                record.username,
                record.password_hash,
                record.expenses,
            ))
            .map_err(|_| SnapshotError::DuplicateUsername(username))?;
    }

    log::info!(
        "loaded {} account(s) from {}",
        directory.len(),
        path.display()
    );
    Ok(directory)
}

/// Loads the snapshot, starting empty when it is missing or unusable.
pub fn load_or_default(path: &Path) -> AccountDirectory {
    match load(path) {
        Ok(directory) => directory,
        Err(SnapshotError::NotFound(_)) => {
            log::info!("no previous data at {}, starting empty", path.display());
            AccountDirectory::new()
        }
        Err(err) => {
            log::warn!("could not load previous data, starting empty: {}", err);
            AccountDirectory::new()
        }
    }
}

/// Default location of a per-account CSV export, beside the snapshot.
///
/// Characters of `username` that could name another directory are replaced with `_`.
pub fn export_path(snapshot: &Path, username: &str) -> PathBuf {
    let stem: String = username
        .chars()
        .map(|c| match c {
            c if c.is_alphanumeric() => c,
            '-' | '_' | '.' => c,
            _ => '_',
        })
        .collect();
    let file_name = format!("{}_expenses.csv", stem);
    match snapshot.parent() {
        Some(dir) => dir.join(file_name),
        None => PathBuf::from(file_name),
    }
}
