//! Core domain models for depaudit
//!
//! This module contains the fundamental types used throughout the application:
//! - Package manager identifiers
//! - Declared dependencies and their classes
//! - The uniform dependency graph built from manifest and lockfile
//! - Reconciliation outcomes

mod dependency;
mod graph;
mod package_manager;
mod package_name;
mod reconciliation;

pub use dependency::{DependencyClass, ManifestDependency};
pub use graph::{DependencyGraph, LockedPackage, LockedVersions};
pub use package_manager::PackageManager;
pub use package_name::is_valid_package_name;
pub use reconciliation::{
    ReconcileStatus, ReconciledDependency, ReconciliationResult, SkippedDependency,
};
