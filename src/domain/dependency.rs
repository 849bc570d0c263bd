//! Declared dependency structures

use serde::{Deserialize, Serialize};
use std::fmt;

/// Dependency class a manifest entry is declared under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyClass {
    /// `dependencies`
    Production,
    /// `devDependencies`
    Development,
    /// `optionalDependencies`
    Optional,
    /// `peerDependencies`
    Peer,
}

impl DependencyClass {
    /// Returns the package.json key for this class
    pub fn manifest_key(&self) -> &'static str {
        match self {
            DependencyClass::Production => "dependencies",
            DependencyClass::Development => "devDependencies",
            DependencyClass::Optional => "optionalDependencies",
            DependencyClass::Peer => "peerDependencies",
        }
    }

    /// Returns a short label for reports
    pub fn label(&self) -> &'static str {
        match self {
            DependencyClass::Production => "prod",
            DependencyClass::Development => "dev",
            DependencyClass::Optional => "optional",
            DependencyClass::Peer => "peer",
        }
    }

    /// Returns all classes in manifest order
    pub fn all() -> &'static [DependencyClass] {
        &[
            DependencyClass::Production,
            DependencyClass::Development,
            DependencyClass::Optional,
            DependencyClass::Peer,
        ]
    }
}

impl fmt::Display for DependencyClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A dependency as declared in package.json
///
/// The same name may appear under several classes with different ranges;
/// each declaration is its own entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestDependency {
    /// Package name
    pub name: String,
    /// Declared semantic version range, verbatim
    pub declared_range: String,
    /// Class the dependency is declared under
    pub class: DependencyClass,
}

impl ManifestDependency {
    /// Creates a new declared dependency
    pub fn new(
        name: impl Into<String>,
        declared_range: impl Into<String>,
        class: DependencyClass,
    ) -> Self {
        Self {
            name: name.into(),
            declared_range: declared_range.into(),
            class,
        }
    }

    /// Returns true if the name is safe to hand to external services
    pub fn has_valid_name(&self) -> bool {
        super::is_valid_package_name(&self.name)
    }
}

impl fmt::Display for ManifestDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{} ({})", self.name, self.declared_range, self.class)
    }
}
