//! Update suggestions
//!
//! For each declared dependency, the current version is the locked one when
//! available, otherwise whatever the package manager reports as installed.
//! A suggestion is produced only when the registry's latest version is
//! strictly newer.

use crate::domain::{is_valid_package_name, DependencyClass, PackageManager};
use crate::lookup::lookup_all;
use crate::progress::Progress;
use crate::project::Project;
use crate::reconcile::parse_range;
use crate::service::Services;
use node_semver::Version;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// Semantic version change between current and latest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionChangeType {
    /// Major version change (breaking)
    Major,
    /// Minor version change (features)
    Minor,
    /// Patch version change (fixes)
    Patch,
    /// Same release, different pre-release tag
    Prerelease,
}

impl VersionChangeType {
    /// Classifies an upgrade, or `None` if `latest` is not newer
    pub fn between(current: &Version, latest: &Version) -> Option<Self> {
        if latest <= current {
            return None;
        }

        Some(if latest.major != current.major {
            VersionChangeType::Major
        } else if latest.minor != current.minor {
            VersionChangeType::Minor
        } else if latest.patch != current.patch {
            VersionChangeType::Patch
        } else {
            VersionChangeType::Prerelease
        })
    }

    pub fn label(&self) -> &'static str {
        match self {
            VersionChangeType::Major => "major",
            VersionChangeType::Minor => "minor",
            VersionChangeType::Patch => "patch",
            VersionChangeType::Prerelease => "prerelease",
        }
    }

    /// Anything short of a major bump
    pub fn is_safe(&self) -> bool {
        !matches!(self, VersionChangeType::Major)
    }
}

impl fmt::Display for VersionChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// One suggested upgrade
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateSuggestion {
    pub name: String,
    pub class: DependencyClass,
    pub declared_range: String,
    pub current: String,
    pub latest: String,
    pub change: VersionChangeType,
    /// The declared range already admits `latest`
    pub in_range: bool,
    /// Not a major bump
    pub safe: bool,
    pub command: String,
}

/// Suggestions plus how many dependencies are already current
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateReport {
    pub suggestions: Vec<UpdateSuggestion>,
    pub up_to_date: usize,
}

/// Builds a suggestion if `latest` is newer than `current`
pub fn suggest(
    name: &str,
    class: DependencyClass,
    declared_range: &str,
    current: &Version,
    latest: &Version,
    package_manager: PackageManager,
) -> Option<UpdateSuggestion> {
    let change = VersionChangeType::between(current, latest)?;
    let in_range = parse_range(declared_range)
        .map(|range| range.satisfies(latest))
        .unwrap_or(false);

    Some(UpdateSuggestion {
        name: name.to_string(),
        class,
        declared_range: declared_range.to_string(),
        current: current.to_string(),
        latest: latest.to_string(),
        change,
        in_range,
        safe: change.is_safe(),
        command: package_manager.add_command(&format!("{}@{}", name, latest), class),
    })
}

/// Suggests updates for every declared dependency
pub async fn update(
    project: &Project,
    services: &Services,
    concurrency: usize,
    progress: &mut Progress,
    warnings: &mut Vec<String>,
) -> UpdateReport {
    let names: Vec<String> = project
        .graph
        .declared_names()
        .into_iter()
        .map(str::to_string)
        .collect();
    // Invalid names already warn during the registry pass
    let unlocked: Vec<String> = names
        .iter()
        .filter(|name| project.graph.locked(name).is_none() && is_valid_package_name(name))
        .cloned()
        .collect();

    progress.start(
        (names.len() + unlocked.len()) as u64,
        "Checking for updates",
    );
    let metadata = Arc::clone(&services.metadata);
    let latest_versions = lookup_all(&names, concurrency, progress, move |name| {
        let metadata = Arc::clone(&metadata);
        async move { metadata.metadata(&name).await.map(|m| m.latest) }
    })
    .await;
    let installed = Arc::clone(&services.installed);
    let installed_versions = lookup_all(&unlocked, concurrency, progress, move |name| {
        let installed = Arc::clone(&installed);
        async move { installed.installed_version(&name).await }
    })
    .await;
    progress.finish_and_clear();
    warnings.extend(latest_versions.warnings);
    warnings.extend(installed_versions.warnings);

    let mut report = UpdateReport::default();
    let mut reported = BTreeSet::new();
    for dependency in &project.graph.declared {
        let name = dependency.name.as_str();
        let current = match project.graph.locked(name) {
            Some(locked) => Some(locked.version.clone()),
            None => installed_versions.results.get(name).cloned().flatten(),
        };
        let Some(current) = current else {
            continue;
        };
        let Some(Some(latest)) = latest_versions.results.get(name) else {
            continue;
        };

        let (Ok(current), Ok(latest)) = (Version::parse(&current), Version::parse(latest)) else {
            if reported.insert(name) {
                warnings.push(format!(
                    "skipping {}: cannot compare '{}' with '{}'",
                    name, current, latest
                ));
            }
            continue;
        };

        match suggest(
            name,
            dependency.class,
            &dependency.declared_range,
            &current,
            &latest,
            project.package_manager,
        ) {
            Some(suggestion) => report.suggestions.push(suggestion),
            None => report.up_to_date += 1,
        }
    }

    report
}
