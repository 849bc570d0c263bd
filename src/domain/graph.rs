//! Uniform dependency graph shared by the reconciler and every command

use super::ManifestDependency;
use node_semver::Version;
use serde::Serialize;
use std::collections::BTreeMap;

/// Raw `name -> resolved version` mapping produced by a lockfile adapter
pub type LockedVersions = BTreeMap<String, String>;

/// A resolved package taken from the lockfile
///
/// Only constructed for syntactically valid semantic versions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LockedPackage {
    /// Package name
    pub name: String,
    /// Concrete resolved version
    pub version: String,
}

impl LockedPackage {
    /// Creates a locked package, or `None` if `version` is not a valid semantic version
    pub fn new(name: impl Into<String>, version: &str) -> Option<Self> {
        let version = version.trim();
        Version::parse(version).ok()?;
        Some(Self {
            name: name.into(),
            version: version.to_string(),
        })
    }

    /// Returns the parsed version
    pub fn parsed_version(&self) -> Option<Version> {
        Version::parse(&self.version).ok()
    }
}

/// Declared dependencies plus the locked set they are reconciled against
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DependencyGraph {
    /// Locked packages keyed by name
    pub locked: BTreeMap<String, LockedPackage>,
    /// Every declaration from the manifest, in manifest order
    pub declared: Vec<ManifestDependency>,
}

impl DependencyGraph {
    /// Builds the graph, dropping locked entries whose version is not valid semver.
    ///
    /// A warning is pushed for each dropped entry.
    pub fn new(
        declared: Vec<ManifestDependency>,
        resolved: LockedVersions,
        warnings: &mut Vec<String>,
    ) -> Self {
        let mut locked = BTreeMap::new();
        for (name, version) in resolved {
            match LockedPackage::new(name.as_str(), &version) {
                Some(package) => {
                    locked.insert(name, package);
                }
                None => warnings.push(format!(
                    "dropping locked entry {}: '{}' is not a valid version",
                    name, version
                )),
            }
        }

        Self { locked, declared }
    }

    /// Returns the locked package for `name`
    pub fn locked(&self, name: &str) -> Option<&LockedPackage> {
        self.locked.get(name)
    }

    /// Returns the declarations under one class
    pub fn declared_in(
        &self,
        class: super::DependencyClass,
    ) -> impl Iterator<Item = &ManifestDependency> {
        self.declared.iter().filter(move |d| d.class == class)
    }

    /// Returns the distinct declared names, sorted
    pub fn declared_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.declared.iter().map(|d| d.name.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        names
    }
}
