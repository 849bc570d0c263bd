//! Dependency inventory

use crate::domain::{
    DependencyClass, PackageManager, ReconciledDependency, ReconciliationResult,
    SkippedDependency,
};
use crate::project::Project;
use crate::reconcile::reconcile;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Inventory of every declared dependency with its reconciliation status
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    /// Project name from package.json
    pub project: String,
    /// Package manager in use
    pub package_manager: PackageManager,
    /// Lockfile the locked versions came from
    pub lockfile: Option<PathBuf>,
    /// Classified declarations
    pub dependencies: Vec<ReconciledDependency>,
    /// Declarations with non-semver ranges
    pub skipped: Vec<SkippedDependency>,
    /// Counts per class and per status
    pub totals: ScanTotals,
}

/// Inventory counts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanTotals {
    pub declared: usize,
    pub by_class: BTreeMap<DependencyClass, usize>,
    pub satisfied: usize,
    pub mismatched: usize,
    pub unlocked: usize,
    pub skipped: usize,
}

impl ScanTotals {
    fn from_result(result: &ReconciliationResult) -> Self {
        let mut by_class = BTreeMap::new();
        let classes = result
            .entries
            .iter()
            .map(|e| e.dependency.class)
            .chain(result.skipped.iter().map(|s| s.dependency.class));
        for class in classes {
            *by_class.entry(class).or_insert(0) += 1;
        }

        Self {
            declared: result.entries.len() + result.skipped.len(),
            by_class,
            satisfied: result.satisfied().count(),
            mismatched: result.mismatched().count(),
            unlocked: result.unlocked().count(),
            skipped: result.skipped.len(),
        }
    }
}

/// Builds the inventory for a loaded project
pub fn scan(project: &Project) -> ScanReport {
    let result = reconcile(&project.graph);
    let totals = ScanTotals::from_result(&result);

    ScanReport {
        project: project.manifest.name.clone(),
        package_manager: project.package_manager,
        lockfile: project.lockfile.clone(),
        dependencies: result.entries,
        skipped: result.skipped,
        totals,
    }
}
