//! Dependency reconciler
//!
//! Classifies every declared dependency against the single locked version
//! for its exact name:
//! - `Satisfied`: the locked version is inside the declared range
//! - `Mismatched`: the locked version is outside the declared range
//! - `Unlocked`: there is no usable locked version
//!
//! Declarations whose range is not a semantic version range (dist-tags,
//! `file:`/`git+`/`workspace:` specifiers, aliases) are returned as skipped.
//! Pure and in-memory: no filesystem or network access.

use crate::domain::{
    DependencyGraph, ManifestDependency, ReconcileStatus, ReconciledDependency,
    ReconciliationResult, SkippedDependency,
};
use node_semver::{Range, Version};

/// Reconciles every declaration in the graph
pub fn reconcile(graph: &DependencyGraph) -> ReconciliationResult {
    let mut result = ReconciliationResult::default();

    for dependency in &graph.declared {
        let range = match parse_range(&dependency.declared_range) {
            Ok(range) => range,
            Err(reason) => {
                result.skipped.push(SkippedDependency {
                    dependency: dependency.clone(),
                    reason,
                });
                continue;
            }
        };

        let status = classify(dependency, &range, graph);
        result.entries.push(ReconciledDependency {
            dependency: dependency.clone(),
            status,
        });
    }

    result
}

fn classify(
    dependency: &ManifestDependency,
    range: &Range,
    graph: &DependencyGraph,
) -> ReconcileStatus {
    let Some(locked) = graph.locked(&dependency.name) else {
        return ReconcileStatus::Unlocked;
    };
    let Ok(version) = Version::parse(&locked.version) else {
        return ReconcileStatus::Unlocked;
    };

    if range.satisfies(&version) {
        ReconcileStatus::Satisfied {
            locked: locked.version.clone(),
        }
    } else {
        ReconcileStatus::Mismatched {
            declared: dependency.declared_range.clone(),
            locked: locked.version.clone(),
        }
    }
}

/// Parses a declared range with npm semantics.
///
/// An empty range means any version, as npm treats it.
pub fn parse_range(raw: &str) -> Result<Range, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Range::parse("*").map_err(|e| e.to_string());
    }

    if let Some((protocol, _)) = raw.split_once(':') {
        return Err(format!("'{}:' specifiers are not version ranges", protocol));
    }
    if raw.chars().all(|c| c.is_ascii_alphabetic()) && !raw.eq_ignore_ascii_case("x") {
        return Err(format!("'{}' is a dist-tag, not a version range", raw));
    }

    Range::parse(raw).map_err(|e| format!("unparsable range '{}': {}", raw, e))
}
