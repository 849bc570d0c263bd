//! One-shot project loading
//!
//! Reads the manifest, detects (or takes) the package manager, parses the
//! lockfile and builds the dependency graph. Everything recoverable ends up
//! in `warnings`; only manifest problems fail the load.

use crate::detector::{self, Detection};
use crate::domain::{DependencyGraph, LockedVersions, PackageManager};
use crate::error::AppError;
use crate::lockfile;
use crate::manifest::Manifest;
use std::path::{Path, PathBuf};

/// A loaded project, fresh for one invocation
#[derive(Debug, Clone)]
pub struct Project {
    /// Project root directory
    pub root: PathBuf,
    /// Parsed package.json
    pub manifest: Manifest,
    /// Lockfiles found in the root
    pub detection: Detection,
    /// Package manager used for lock data and suggested commands
    pub package_manager: PackageManager,
    /// Lockfile the locked set was read from, if any
    pub lockfile: Option<PathBuf>,
    /// Declared dependencies plus locked packages
    pub graph: DependencyGraph,
    /// Recoverable problems met while loading
    pub warnings: Vec<String>,
}

impl Project {
    /// Loads a project root.
    ///
    /// `package_manager` overrides detection. An unrecognized name leaves
    /// the locked set empty and falls back to npm for suggested commands.
    pub fn load(root: &Path, package_manager: Option<&str>) -> Result<Self, AppError> {
        let mut warnings = Vec::new();
        let manifest = Manifest::read(root, &mut warnings)?;
        let detection = detector::detect(root);

        let (package_manager, resolved, lockfile) = match package_manager {
            None => {
                let pm = detection.package_manager;
                let resolved = lockfile::load_locked_versions(root, pm, &mut warnings);
                (pm, resolved, detection.lockfile.clone())
            }
            Some(name) => match name.parse::<PackageManager>() {
                Ok(pm) => {
                    let resolved = lockfile::load_locked_versions(root, pm, &mut warnings);
                    let path = root.join(pm.lockfile_name());
                    (pm, resolved, path.is_file().then_some(path))
                }
                Err(e) => {
                    warnings.push(format!("{}; continuing without lock data", e));
                    (PackageManager::Npm, LockedVersions::new(), None)
                }
            },
        };

        let graph = DependencyGraph::new(manifest.dependencies.clone(), resolved, &mut warnings);

        Ok(Self {
            root: root.to_path_buf(),
            manifest,
            detection,
            package_manager,
            lockfile,
            graph,
            warnings,
        })
    }

    /// Returns true if `node_modules` exists in the project root
    pub fn has_node_modules(&self) -> bool {
        self.root.join("node_modules").is_dir()
    }
}
