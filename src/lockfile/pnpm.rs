//! pnpm-lock.yaml adapter
//!
//! Reads the `packages` mapping, whose keys encode name and version:
//! `/lodash@4.17.21`, `/@babel/core@7.20.0`, and (pnpm v9) the same without
//! the leading slash.

use crate::domain::{LockedVersions, PackageManager};
use crate::error::LockfileError;
use crate::lockfile::LockfileAdapter;
use serde::Deserialize;
use std::collections::BTreeMap;

/// Adapter for pnpm-lock.yaml
pub struct PnpmLockAdapter;

#[derive(Debug, Deserialize)]
struct PnpmLock {
    #[serde(default)]
    packages: Option<BTreeMap<String, serde_yaml::Value>>,
}

impl LockfileAdapter for PnpmLockAdapter {
    fn parse(&self, content: &str) -> Result<LockedVersions, LockfileError> {
        let mut versions = LockedVersions::new();
        if content.trim().is_empty() {
            return Ok(versions);
        }

        let lock: PnpmLock =
            serde_yaml::from_str(content).map_err(|e| LockfileError::YamlParseError {
                message: e.to_string(),
            })?;

        for key in lock.packages.iter().flat_map(|packages| packages.keys()) {
            if let Some((name, version)) = split_package_key(key) {
                versions.insert(name.to_string(), version.to_string());
            }
        }

        Ok(versions)
    }

    fn package_manager(&self) -> PackageManager {
        PackageManager::Pnpm
    }
}

/// Splits a `packages` key into name and version.
///
/// Scoped names search for the separator after the scope's own `@`;
/// unscoped names split at the last `@`.
fn split_package_key(key: &str) -> Option<(&str, &str)> {
    let key = key.strip_prefix('/').unwrap_or(key);
    // Peer suffix: /react-dom@18.2.0(react@18.2.0)
    let key = match key.find('(') {
        Some(i) => &key[..i],
        None => key,
    };

    let separator = if key.starts_with('@') {
        key[1..].find('@').map(|i| i + 1)
    } else {
        key.rfind('@')
    }?;

    let (name, version) = (&key[..separator], &key[separator + 1..]);
    if name.is_empty() || version.is_empty() {
        return None;
    }
    Some((name, version))
}
