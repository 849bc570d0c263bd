//! Integration tests for depaudit
//!
//! These tests verify:
//! - Project loading across npm, yarn and pnpm lockfiles
//! - Reconciliation through the public API
//! - Feature commands against mocked external services

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use depaudit::commands::{self, IssueKind, RiskLevel, Severity, VersionChangeType};
use depaudit::domain::{is_valid_package_name, DependencyClass, PackageManager, ReconcileStatus};
use depaudit::error::{AppError, ServiceError};
use depaudit::progress::Progress;
use depaudit::project::Project;
use depaudit::reconcile::reconcile;
use depaudit::service::{
    AuditService, InstalledVersionService, MetadataService, PackageMetadata, PeerConflictService,
    Services, UnusedImportService, UnusedImports, VulnerabilityMap,
};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

/// Test fixture directory creation helper
fn create_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp directory")
}

fn write(dir: &Path, name: &str, content: &str) {
    fs::write(dir.join(name), content).unwrap();
}

/// Registry and tool answers keyed by package name
#[derive(Default)]
struct MockServices {
    metadata: BTreeMap<String, PackageMetadata>,
    installed: BTreeMap<String, String>,
    vulnerable: Option<VulnerabilityMap>,
    peer_problems: Option<Vec<String>>,
    installed_calls: AtomicUsize,
}

#[async_trait]
impl MetadataService for MockServices {
    async fn metadata(&self, name: &str) -> Result<PackageMetadata, ServiceError> {
        if !is_valid_package_name(name) {
            return Err(ServiceError::invalid_package_name(name));
        }
        self.metadata
            .get(name)
            .cloned()
            .ok_or_else(|| ServiceError::PackageNotFound {
                package: name.to_string(),
                registry: "mock".to_string(),
            })
    }
}

#[async_trait]
impl InstalledVersionService for MockServices {
    async fn installed_version(&self, name: &str) -> Result<Option<String>, ServiceError> {
        self.installed_calls.fetch_add(1, Ordering::SeqCst);
        if !is_valid_package_name(name) {
            return Err(ServiceError::invalid_package_name(name));
        }
        Ok(self.installed.get(name).cloned())
    }
}

#[async_trait]
impl AuditService for MockServices {
    async fn audit(&self) -> Result<VulnerabilityMap, ServiceError> {
        self.vulnerable.clone().ok_or_else(|| ServiceError::CommandFailed {
            command: "npm audit --json".to_string(),
            message: "registry unreachable".to_string(),
        })
    }
}

#[async_trait]
impl UnusedImportService for MockServices {
    async fn unused(&self) -> Result<UnusedImports, ServiceError> {
        Ok(UnusedImports::default())
    }
}

#[async_trait]
impl PeerConflictService for MockServices {
    async fn peer_problems(&self) -> Result<Vec<String>, ServiceError> {
        self.peer_problems.clone().ok_or_else(|| ServiceError::CommandFailed {
            command: "npm ls --json --all".to_string(),
            message: "no tree".to_string(),
        })
    }
}

fn services(mock: MockServices) -> Services {
    let mock = Arc::new(mock);
    Services {
        metadata: mock.clone(),
        installed: mock.clone(),
        audit: mock.clone(),
        unused: mock.clone(),
        peers: mock,
    }
}

fn metadata(latest: &str, maintainers: usize, weekly_downloads: u64) -> PackageMetadata {
    PackageMetadata {
        latest: Some(latest.to_string()),
        last_published: Some(Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap()),
        maintainers,
        weekly_downloads,
    }
}

mod project_loading {
    use super::*;

    #[test]
    fn test_npm_project_reconciles_against_nested_tree() {
        let temp_dir = create_test_dir();
        write(
            temp_dir.path(),
            "package.json",
            r#"{
                "name": "web",
                "dependencies": { "react": "^18.0.0", "lodash": "^4.17.0" },
                "devDependencies": { "jest": "^29.0.0" }
            }"#,
        );
        write(
            temp_dir.path(),
            "package-lock.json",
            r#"{
                "name": "web",
                "lockfileVersion": 1,
                "dependencies": {
                    "react": { "version": "17.0.2" },
                    "lodash": { "version": "4.17.21" }
                }
            }"#,
        );

        let project = Project::load(temp_dir.path(), None).unwrap();
        assert_eq!(project.package_manager, PackageManager::Npm);
        assert!(project.warnings.is_empty());

        let result = reconcile(&project.graph);
        assert_eq!(
            result.status_of("react", DependencyClass::Production),
            Some(&ReconcileStatus::Mismatched {
                declared: "^18.0.0".to_string(),
                locked: "17.0.2".to_string(),
            })
        );
        assert_eq!(
            result.status_of("lodash", DependencyClass::Production),
            Some(&ReconcileStatus::Satisfied {
                locked: "4.17.21".to_string()
            })
        );
        assert_eq!(
            result.status_of("jest", DependencyClass::Development),
            Some(&ReconcileStatus::Unlocked)
        );
    }

    #[test]
    fn test_yarn_project_is_detected() {
        let temp_dir = create_test_dir();
        write(
            temp_dir.path(),
            "package.json",
            r#"{ "name": "app", "dependencies": { "debug": "^4.1.0" } }"#,
        );
        write(
            temp_dir.path(),
            "yarn.lock",
            "# yarn lockfile v1\n\ndebug@^4.1.0:\n  version \"4.3.4\"\n",
        );

        let project = Project::load(temp_dir.path(), None).unwrap();
        assert_eq!(project.package_manager, PackageManager::Yarn);
        assert_eq!(project.graph.locked("debug").unwrap().version, "4.3.4");
    }

    #[test]
    fn test_pnpm_project_is_detected() {
        let temp_dir = create_test_dir();
        write(
            temp_dir.path(),
            "package.json",
            r#"{ "name": "app", "dependencies": { "@types/node": "^20.0.0" } }"#,
        );
        write(
            temp_dir.path(),
            "pnpm-lock.yaml",
            "lockfileVersion: '6.0'\npackages:\n  /@types/node@20.11.5:\n    resolution: {integrity: sha512-x}\n",
        );

        let project = Project::load(temp_dir.path(), None).unwrap();
        assert_eq!(project.package_manager, PackageManager::Pnpm);
        assert_eq!(project.graph.locked("@types/node").unwrap().version, "20.11.5");
    }

    #[test]
    fn test_corrupt_lockfile_degrades_to_unlocked() {
        let temp_dir = create_test_dir();
        write(
            temp_dir.path(),
            "package.json",
            r#"{ "name": "app", "dependencies": { "react": "^18.0.0" } }"#,
        );
        write(temp_dir.path(), "package-lock.json", "{ not json");

        let project = Project::load(temp_dir.path(), None).unwrap();
        assert!(project.graph.locked.is_empty());
        assert_eq!(project.warnings.len(), 1);
        assert_eq!(
            reconcile(&project.graph).status_of("react", DependencyClass::Production),
            Some(&ReconcileStatus::Unlocked)
        );
    }

    #[test]
    fn test_missing_manifest_is_fatal() {
        let temp_dir = create_test_dir();
        write(temp_dir.path(), "yarn.lock", "");

        let result = Project::load(temp_dir.path(), None);
        assert!(matches!(result, Err(AppError::Manifest(_))));
    }

    #[test]
    fn test_unknown_package_manager_override() {
        let temp_dir = create_test_dir();
        write(
            temp_dir.path(),
            "package.json",
            r#"{ "name": "app", "dependencies": { "react": "^18.0.0" } }"#,
        );
        write(
            temp_dir.path(),
            "package-lock.json",
            r#"{ "dependencies": { "react": { "version": "18.2.0" } } }"#,
        );

        let project = Project::load(temp_dir.path(), Some("bun")).unwrap();
        assert!(project.graph.locked.is_empty());
        assert!(project.warnings[0].contains("bun"));
    }
}

mod feature_commands {
    use super::*;

    fn express_project() -> TempDir {
        let temp_dir = create_test_dir();
        write(
            temp_dir.path(),
            "package.json",
            r#"{ "name": "api", "dependencies": { "express": "^4.18.0" } }"#,
        );
        write(
            temp_dir.path(),
            "package-lock.json",
            r#"{ "dependencies": { "express": { "version": "4.18.0" } } }"#,
        );
        temp_dir
    }

    #[tokio::test]
    async fn test_up_to_date_dependency_has_no_suggestion() {
        let temp_dir = express_project();
        let project = Project::load(temp_dir.path(), None).unwrap();

        let scan = commands::scan(&project);
        assert_eq!(scan.totals.satisfied, 1);

        let mut mock = MockServices::default();
        mock.metadata
            .insert("express".to_string(), metadata("4.18.0", 5, 30_000_000));
        let mut warnings = Vec::new();
        let report = commands::update(
            &project,
            &services(mock),
            4,
            &mut Progress::disabled(),
            &mut warnings,
        )
        .await;

        assert!(report.suggestions.is_empty());
        assert_eq!(report.up_to_date, 1);
        assert!(warnings.is_empty());
    }

    #[tokio::test]
    async fn test_update_uses_installed_version_for_unlocked() {
        let temp_dir = create_test_dir();
        write(
            temp_dir.path(),
            "package.json",
            r#"{ "name": "app", "devDependencies": { "typescript": "~5.0.0" } }"#,
        );
        let project = Project::load(temp_dir.path(), None).unwrap();

        let mut mock = MockServices::default();
        mock.metadata
            .insert("typescript".to_string(), metadata("5.4.2", 8, 40_000_000));
        mock.installed
            .insert("typescript".to_string(), "5.0.4".to_string());
        let mut warnings = Vec::new();
        let report = commands::update(
            &project,
            &services(mock),
            4,
            &mut Progress::disabled(),
            &mut warnings,
        )
        .await;

        assert_eq!(report.suggestions.len(), 1);
        let suggestion = &report.suggestions[0];
        assert_eq!(suggestion.current, "5.0.4");
        assert_eq!(suggestion.change, VersionChangeType::Minor);
        assert!(!suggestion.in_range);
        assert!(suggestion.safe);
    }

    #[tokio::test]
    async fn test_update_warns_once_for_invalid_unlocked_name() {
        let temp_dir = create_test_dir();
        write(
            temp_dir.path(),
            "package.json",
            r#"{ "name": "app", "dependencies": { "-g": "^1.0.0", "ms": "^2.1.0" } }"#,
        );
        let project = Project::load(temp_dir.path(), None).unwrap();

        let mut mock = MockServices::default();
        mock.metadata
            .insert("ms".to_string(), metadata("2.1.3", 3, 90_000_000));
        mock.installed.insert("ms".to_string(), "2.1.3".to_string());
        let mock = Arc::new(mock);
        let services = Services {
            metadata: mock.clone(),
            installed: mock.clone(),
            audit: mock.clone(),
            unused: mock.clone(),
            peers: mock.clone(),
        };
        let mut warnings = Vec::new();
        let report = commands::update(
            &project,
            &services,
            4,
            &mut Progress::disabled(),
            &mut warnings,
        )
        .await;

        assert_eq!(report.up_to_date, 1);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("-g"));
        assert_eq!(mock.installed_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_risk_survives_failed_lookups() {
        let temp_dir = create_test_dir();
        write(
            temp_dir.path(),
            "package.json",
            r#"{
                "name": "app",
                "dependencies": { "left-pad": "^1.3.0", "ghost-pkg": "^1.0.0" }
            }"#,
        );
        let project = Project::load(temp_dir.path(), None).unwrap();

        let mut mock = MockServices::default();
        mock.metadata
            .insert("left-pad".to_string(), metadata("1.3.0", 1, 500));
        let mut warnings = Vec::new();
        let now = Utc.with_ymd_and_hms(2026, 10, 1, 0, 0, 0).unwrap();
        let report = commands::risk(
            &project,
            &services(mock),
            2,
            &mut Progress::disabled(),
            now,
            &mut warnings,
        )
        .await;

        assert!(!report.audit_available);
        assert_eq!(report.entries.len(), 1);
        assert_eq!(report.entries[0].name, "left-pad");
        // single maintainer (+1) and under 1000 weekly downloads (+2)
        assert_eq!(report.entries[0].risk.score, 3);
        assert_eq!(report.entries[0].risk.level, RiskLevel::Medium);
        assert_eq!(warnings.len(), 2);
        assert!(warnings.iter().any(|w| w.contains("ghost-pkg")));
        assert!(warnings.iter().any(|w| w.contains("audit")));
    }

    #[tokio::test]
    async fn test_explain_and_fix_for_out_of_sync_lockfile() {
        let temp_dir = create_test_dir();
        write(
            temp_dir.path(),
            "package.json",
            r#"{ "name": "web", "dependencies": { "react": "^18.0.0" } }"#,
        );
        write(
            temp_dir.path(),
            "package-lock.json",
            r#"{ "dependencies": { "react": { "version": "17.0.2" } } }"#,
        );
        write(temp_dir.path(), "yarn.lock", "");
        fs::create_dir(temp_dir.path().join("node_modules")).unwrap();
        // yarn.lock would win detection
        let project = Project::load(temp_dir.path(), Some("npm")).unwrap();

        let mock = MockServices {
            peer_problems: Some(vec![
                "invalid: react-dom@18.2.0 requires react@^18.2.0".to_string()
            ]),
            ..MockServices::default()
        };
        let mut warnings = Vec::new();
        let report = commands::explain(
            &project,
            services(mock).peers.as_ref(),
            &mut Progress::disabled(),
            &mut warnings,
        )
        .await;

        assert!(report.peer_check);
        assert!(!report.is_healthy());
        let kinds: Vec<IssueKind> = report.issues.iter().map(|i| i.kind).collect();
        assert!(kinds.contains(&IssueKind::MultipleLockfiles));
        assert!(kinds.contains(&IssueKind::LockfileOutOfSync));
        assert!(kinds.contains(&IssueKind::PeerConflict));
        assert_eq!(report.issues[0].severity, Severity::Error);

        let fix = commands::fix_commands(&report);
        assert_eq!(fix.commands.iter().filter(|c| *c == "npm install").count(), 1);
        assert!(fix.commands.contains(&"rm yarn.lock".to_string()));
    }

    #[tokio::test]
    async fn test_explain_skips_peer_check_without_node_modules() {
        let temp_dir = express_project();
        let project = Project::load(temp_dir.path(), None).unwrap();

        let mut warnings = Vec::new();
        let report = commands::explain(
            &project,
            services(MockServices::default()).peers.as_ref(),
            &mut Progress::disabled(),
            &mut warnings,
        )
        .await;

        assert!(!report.peer_check);
        assert!(report.is_healthy());
        assert!(warnings.is_empty());
    }
}
