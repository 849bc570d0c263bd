//! Lockfile format adapters
//!
//! Each adapter turns raw lockfile content into a uniform
//! `name -> resolved version` mapping:
//! - npm: nested-tree JSON (package-lock.json)
//! - yarn: flat text blocks (yarn.lock)
//! - pnpm: flat YAML mapping (pnpm-lock.yaml)

mod npm;
mod pnpm;
mod yarn;

pub use npm::{NpmLockAdapter, MAX_DEPTH};
pub use pnpm::PnpmLockAdapter;
pub use yarn::YarnLockAdapter;

use crate::domain::{LockedVersions, PackageManager};
use crate::error::LockfileError;
use std::path::Path;

/// Parser for one lockfile format
pub trait LockfileAdapter {
    /// Parse raw lockfile content into resolved versions
    fn parse(&self, content: &str) -> Result<LockedVersions, LockfileError>;

    /// Package manager this adapter belongs to
    fn package_manager(&self) -> PackageManager;
}

/// Returns the adapter for a package manager
pub fn get_adapter(package_manager: PackageManager) -> Box<dyn LockfileAdapter> {
    match package_manager {
        PackageManager::Npm => Box::new(NpmLockAdapter),
        PackageManager::Yarn => Box::new(YarnLockAdapter),
        PackageManager::Pnpm => Box::new(PnpmLockAdapter),
    }
}

/// Reads and parses a lockfile from disk.
pub fn read_lockfile(
    path: &Path,
    package_manager: PackageManager,
) -> Result<LockedVersions, LockfileError> {
    let content = std::fs::read_to_string(path).map_err(|source| LockfileError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;
    get_adapter(package_manager).parse(&content)
}

/// Loads the locked versions of a project root.
///
/// Never fails: a missing, unreadable or unparsable lockfile yields an empty
/// mapping and a warning.
pub fn load_locked_versions(
    dir: &Path,
    package_manager: PackageManager,
    warnings: &mut Vec<String>,
) -> LockedVersions {
    let path = dir.join(package_manager.lockfile_name());
    if !path.is_file() {
        warnings.push(format!(
            "no {} found; continuing without lock data",
            package_manager.lockfile_name()
        ));
        return LockedVersions::new();
    }

    match read_lockfile(&path, package_manager) {
        Ok(versions) => versions,
        Err(e) => {
            warnings.push(format!("{}; continuing without lock data", e));
            LockedVersions::new()
        }
    }
}
