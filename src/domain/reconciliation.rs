//! Reconciliation result types

use super::{DependencyClass, ManifestDependency};
use serde::Serialize;
use std::fmt;

/// Outcome of matching a declared range against the locked version
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReconcileStatus {
    /// The locked version satisfies the declared range
    Satisfied {
        /// Locked version
        locked: String,
    },
    /// The locked version falls outside the declared range
    Mismatched {
        /// Declared range
        declared: String,
        /// Locked version
        locked: String,
    },
    /// No usable locked entry for this name
    Unlocked,
}

impl ReconcileStatus {
    /// Returns the locked version, if any
    pub fn locked_version(&self) -> Option<&str> {
        match self {
            ReconcileStatus::Satisfied { locked } | ReconcileStatus::Mismatched { locked, .. } => {
                Some(locked)
            }
            ReconcileStatus::Unlocked => None,
        }
    }

    /// Returns a short label for reports
    pub fn label(&self) -> &'static str {
        match self {
            ReconcileStatus::Satisfied { .. } => "satisfied",
            ReconcileStatus::Mismatched { .. } => "mismatched",
            ReconcileStatus::Unlocked => "unlocked",
        }
    }
}

impl fmt::Display for ReconcileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReconcileStatus::Satisfied { locked } => write!(f, "satisfied by {}", locked),
            ReconcileStatus::Mismatched { declared, locked } => {
                write!(f, "locked {} does not satisfy {}", locked, declared)
            }
            ReconcileStatus::Unlocked => write!(f, "not locked"),
        }
    }
}

/// A declared dependency together with its reconciliation outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconciledDependency {
    /// The declaration
    #[serde(flatten)]
    pub dependency: ManifestDependency,
    /// The outcome
    #[serde(flatten)]
    pub status: ReconcileStatus,
}

/// A declaration the reconciler could not classify
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedDependency {
    /// The declaration
    #[serde(flatten)]
    pub dependency: ManifestDependency,
    /// Why it was skipped
    pub reason: String,
}

/// Read-only reconciliation view over a dependency graph
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconciliationResult {
    /// Classified declarations, in manifest order
    pub entries: Vec<ReconciledDependency>,
    /// Declarations whose range could not be parsed
    pub skipped: Vec<SkippedDependency>,
}

impl ReconciliationResult {
    /// Returns the entries with the given status label
    fn with_label(&self, label: &'static str) -> impl Iterator<Item = &ReconciledDependency> {
        self.entries.iter().filter(move |e| e.status.label() == label)
    }

    /// Returns satisfied entries
    pub fn satisfied(&self) -> impl Iterator<Item = &ReconciledDependency> {
        self.with_label("satisfied")
    }

    /// Returns mismatched entries
    pub fn mismatched(&self) -> impl Iterator<Item = &ReconciledDependency> {
        self.with_label("mismatched")
    }

    /// Returns unlocked entries
    pub fn unlocked(&self) -> impl Iterator<Item = &ReconciledDependency> {
        self.with_label("unlocked")
    }

    /// Looks up the outcome for one declaration
    pub fn status_of(&self, name: &str, class: DependencyClass) -> Option<&ReconcileStatus> {
        self.entries
            .iter()
            .find(|e| e.dependency.name == name && e.dependency.class == class)
            .map(|e| &e.status)
    }
}
