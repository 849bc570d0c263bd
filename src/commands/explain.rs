//! Diagnosis of automated update PR failures
//!
//! Dependabot-style bots fail when the lockfile cannot be regenerated
//! cleanly. The checks below look for the usual causes in the manifest,
//! the lockfile and (when installed) the node_modules tree.

use crate::domain::{
    is_valid_package_name, DependencyClass, PackageManager, ReconcileStatus,
};
use crate::progress::Progress;
use crate::project::Project;
use crate::reconcile::reconcile;
use crate::service::PeerConflictService;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// How badly an issue blocks automated updates
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        };
        write!(f, "{}", label)
    }
}

/// Kind of problem found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    LockfileMissing,
    MultipleLockfiles,
    LockfileOutOfSync,
    NotInLockfile,
    UnparsableRange,
    InvalidPackageName,
    ConflictingRanges,
    PeerConflict,
}

/// One diagnosed problem
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    pub kind: IssueKind,
    pub severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    pub message: String,
    /// Command that resolves the issue, if there is one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fix: Option<String>,
}

impl Issue {
    fn new(kind: IssueKind, severity: Severity, message: String) -> Self {
        Self {
            kind,
            severity,
            package: None,
            message,
            fix: None,
        }
    }

    fn package(mut self, name: &str) -> Self {
        self.package = Some(name.to_string());
        self
    }

    fn fix(mut self, command: String) -> Self {
        self.fix = Some(command);
        self
    }
}

/// Every issue found, most severe first
#[derive(Debug, Clone, Serialize)]
pub struct ExplainReport {
    pub package_manager: PackageManager,
    /// False when the peer dependency check was skipped or failed
    pub peer_check: bool,
    pub issues: Vec<Issue>,
}

impl ExplainReport {
    /// Returns true when no error-level issue was found
    pub fn is_healthy(&self) -> bool {
        !self.issues.iter().any(|i| i.severity == Severity::Error)
    }
}

/// Issues derivable from the manifest and lockfile alone
pub fn diagnose(project: &Project) -> Vec<Issue> {
    let pm = project.package_manager;
    let mut issues = Vec::new();

    if project.lockfile.is_none() {
        issues.push(
            Issue::new(
                IssueKind::LockfileMissing,
                Severity::Error,
                format!(
                    "no {} found; update bots need a committed lockfile",
                    pm.lockfile_name()
                ),
            )
            .fix(pm.install_command()),
        );
    }

    if project.detection.has_multiple_lockfiles() {
        let names: Vec<&str> = project
            .detection
            .present
            .iter()
            .map(|pm| pm.lockfile_name())
            .collect();
        let extras: Vec<&str> = project
            .detection
            .present
            .iter()
            .filter(|other| **other != pm)
            .map(|other| other.lockfile_name())
            .collect();
        issues.push(
            Issue::new(
                IssueKind::MultipleLockfiles,
                Severity::Error,
                format!(
                    "several lockfiles present ({}); bots may pick the wrong package manager",
                    names.join(", ")
                ),
            )
            .fix(format!("rm {}", extras.join(" "))),
        );
    }

    for dependency in &project.graph.declared {
        if !is_valid_package_name(&dependency.name) {
            issues.push(
                Issue::new(
                    IssueKind::InvalidPackageName,
                    Severity::Error,
                    format!(
                        "'{}' in {} is not a valid package name",
                        dependency.name,
                        dependency.class.manifest_key()
                    ),
                )
                .package(&dependency.name),
            );
        }
    }

    let result = reconcile(&project.graph);
    for entry in &result.entries {
        let dependency = &entry.dependency;
        match &entry.status {
            ReconcileStatus::Mismatched { declared, locked } => issues.push(
                Issue::new(
                    IssueKind::LockfileOutOfSync,
                    Severity::Error,
                    format!(
                        "{} is locked at {} which does not satisfy {} ({})",
                        dependency.name, locked, declared, dependency.class
                    ),
                )
                .package(&dependency.name)
                .fix(pm.install_command()),
            ),
            // Peers are not installed by every manager, so absence is normal
            ReconcileStatus::Unlocked
                if project.lockfile.is_some() && dependency.class != DependencyClass::Peer =>
            {
                issues.push(
                    Issue::new(
                        IssueKind::NotInLockfile,
                        Severity::Warning,
                        format!(
                            "{} is declared in {} but missing from {}",
                            dependency.name,
                            dependency.class.manifest_key(),
                            pm.lockfile_name()
                        ),
                    )
                    .package(&dependency.name)
                    .fix(pm.install_command()),
                )
            }
            _ => {}
        }
    }

    for skipped in &result.skipped {
        issues.push(
            Issue::new(
                IssueKind::UnparsableRange,
                Severity::Info,
                format!("{}: {}", skipped.dependency.name, skipped.reason),
            )
            .package(&skipped.dependency.name),
        );
    }

    issues.extend(conflicting_ranges(project));
    issues.sort_by_key(|issue| issue.severity);
    issues
}

/// Same name declared under several classes with different ranges
fn conflicting_ranges(project: &Project) -> Vec<Issue> {
    let mut by_name: BTreeMap<&str, Vec<(DependencyClass, &str)>> = BTreeMap::new();
    for dependency in &project.graph.declared {
        by_name
            .entry(dependency.name.as_str())
            .or_default()
            .push((dependency.class, dependency.declared_range.as_str()));
    }

    by_name
        .into_iter()
        .filter(|(_, declarations)| {
            declarations
                .iter()
                .any(|(_, range)| *range != declarations[0].1)
        })
        .map(|(name, declarations)| {
            let detail: Vec<String> = declarations
                .iter()
                .map(|(class, range)| format!("{} {}", class.manifest_key(), range))
                .collect();
            Issue::new(
                IssueKind::ConflictingRanges,
                Severity::Warning,
                format!("{} has different ranges: {}", name, detail.join(", ")),
            )
            .package(name)
        })
        .collect()
}

/// Runs every check, including the package manager's peer dependency report.
///
/// The peer check needs an installed tree; without node_modules it is
/// skipped.
pub async fn explain(
    project: &Project,
    peers: &dyn PeerConflictService,
    progress: &mut Progress,
    warnings: &mut Vec<String>,
) -> ExplainReport {
    let mut issues = diagnose(project);
    let mut peer_check = false;

    if project.has_node_modules() {
        progress.spinner("Checking peer dependencies");
        let problems = peers.peer_problems().await;
        progress.finish_and_clear();

        match problems {
            Ok(problems) => {
                peer_check = true;
                let fix = match project.package_manager {
                    PackageManager::Npm => Some("npm install --legacy-peer-deps".to_string()),
                    PackageManager::Yarn | PackageManager::Pnpm => None,
                };
                issues.extend(problems.into_iter().map(|problem| Issue {
                    kind: IssueKind::PeerConflict,
                    severity: Severity::Warning,
                    package: None,
                    message: problem,
                    fix: fix.clone(),
                }));
            }
            Err(e) => warnings.push(format!("peer dependency check unavailable: {}", e)),
        }
    }

    issues.sort_by_key(|issue| issue.severity);

    ExplainReport {
        package_manager: project.package_manager,
        peer_check,
        issues,
    }
}
