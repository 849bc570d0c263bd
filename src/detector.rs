//! Package manager detection from lockfiles present in the project root
//!
//! Probes yarn.lock, then pnpm-lock.yaml, then package-lock.json. Only
//! checks for existence; file contents are never read here.

use crate::domain::PackageManager;
use std::path::{Path, PathBuf};

/// Outcome of probing a project directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
    /// The package manager to use
    pub package_manager: PackageManager,
    /// Lockfile of the detected manager, if it exists
    pub lockfile: Option<PathBuf>,
    /// Every recognized lockfile present, in priority order
    pub present: Vec<PackageManager>,
}

impl Detection {
    /// Returns true if lockfiles of more than one manager are present
    pub fn has_multiple_lockfiles(&self) -> bool {
        self.present.len() > 1
    }
}

/// Detect the package manager for a project root, defaulting to npm
pub fn detect_package_manager(dir: &Path) -> PackageManager {
    PackageManager::all()
        .iter()
        .copied()
        .find(|pm| dir.join(pm.lockfile_name()).is_file())
        .unwrap_or(PackageManager::Npm)
}

/// Detect the package manager and report every lockfile present
pub fn detect(dir: &Path) -> Detection {
    let present: Vec<PackageManager> = PackageManager::all()
        .iter()
        .copied()
        .filter(|pm| dir.join(pm.lockfile_name()).is_file())
        .collect();

    let package_manager = present.first().copied().unwrap_or(PackageManager::Npm);
    let lockfile = present
        .first()
        .map(|pm| dir.join(pm.lockfile_name()));

    Detection {
        package_manager,
        lockfile,
        present,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_npm() {
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::write(temp_dir.path().join("package-lock.json"), "{}").unwrap();

        assert_eq!(detect_package_manager(temp_dir.path()), PackageManager::Npm);
    }

    #[test]
    fn test_detect_yarn() {
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::write(temp_dir.path().join("yarn.lock"), "").unwrap();

        assert_eq!(detect_package_manager(temp_dir.path()), PackageManager::Yarn);
    }

    #[test]
    fn test_detect_pnpm() {
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::write(temp_dir.path().join("pnpm-lock.yaml"), "").unwrap();

        assert_eq!(detect_package_manager(temp_dir.path()), PackageManager::Pnpm);
    }

    #[test]
    fn test_detect_priority_yarn_over_pnpm_over_npm() {
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::write(temp_dir.path().join("package-lock.json"), "{}").unwrap();
        std::fs::write(temp_dir.path().join("pnpm-lock.yaml"), "").unwrap();
        assert_eq!(detect_package_manager(temp_dir.path()), PackageManager::Pnpm);

        std::fs::write(temp_dir.path().join("yarn.lock"), "").unwrap();
        assert_eq!(detect_package_manager(temp_dir.path()), PackageManager::Yarn);
    }

    #[test]
    fn test_detect_default_is_npm() {
        let temp_dir = tempfile::tempdir().unwrap();

        let detection = detect(temp_dir.path());
        assert_eq!(detection.package_manager, PackageManager::Npm);
        assert!(detection.lockfile.is_none());
        assert!(detection.present.is_empty());
    }

    #[test]
    fn test_detect_reports_all_lockfiles() {
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::write(temp_dir.path().join("package-lock.json"), "{}").unwrap();
        std::fs::write(temp_dir.path().join("yarn.lock"), "").unwrap();

        let detection = detect(temp_dir.path());
        assert_eq!(detection.package_manager, PackageManager::Yarn);
        assert_eq!(detection.lockfile, Some(temp_dir.path().join("yarn.lock")));
        assert_eq!(
            detection.present,
            vec![PackageManager::Yarn, PackageManager::Npm]
        );
        assert!(detection.has_multiple_lockfiles());
    }

    #[test]
    fn test_directory_named_like_lockfile_is_ignored() {
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(temp_dir.path().join("yarn.lock")).unwrap();

        assert_eq!(detect_package_manager(temp_dir.path()), PackageManager::Npm);
    }
}
