//! Unused dependency detection

use crate::domain::is_valid_package_name;
use crate::progress::Progress;
use crate::project::Project;
use crate::service::UnusedImportService;
use serde::Serialize;

/// Unused declarations and the commands that remove them
#[derive(Debug, Clone, Default, Serialize)]
pub struct UnusedReport {
    /// False when the analysis could not run
    pub analyzed: bool,
    /// Unused `dependencies`
    pub dependencies: Vec<String>,
    /// Unused `devDependencies`
    pub dev_dependencies: Vec<String>,
    /// One removal command per non-empty list
    pub commands: Vec<String>,
}

impl UnusedReport {
    /// Returns true when nothing is unused
    pub fn is_clean(&self) -> bool {
        self.dependencies.is_empty() && self.dev_dependencies.is_empty()
    }
}

/// Runs the unused-import analysis
pub async fn unused(
    project: &Project,
    service: &dyn UnusedImportService,
    progress: &mut Progress,
    warnings: &mut Vec<String>,
) -> UnusedReport {
    progress.spinner("Looking for unused dependencies");
    let analysis = service.unused().await;
    progress.finish_and_clear();

    let analysis = match analysis {
        Ok(analysis) => analysis,
        Err(e) => {
            warnings.push(format!("unused dependency analysis unavailable: {}", e));
            return UnusedReport::default();
        }
    };

    let dependencies = keep_valid(analysis.dependencies, warnings);
    let dev_dependencies = keep_valid(analysis.dev_dependencies, warnings);

    let commands = [&dependencies, &dev_dependencies]
        .into_iter()
        .filter(|names| !names.is_empty())
        .map(|names| project.package_manager.remove_command(names))
        .collect();

    UnusedReport {
        analyzed: true,
        dependencies,
        dev_dependencies,
        commands,
    }
}

fn keep_valid(names: Vec<String>, warnings: &mut Vec<String>) -> Vec<String> {
    names
        .into_iter()
        .filter(|name| {
            let valid = is_valid_package_name(name);
            if !valid {
                warnings.push(format!("skipping invalid package name '{}'", name));
            }
            valid
        })
        .collect()
}
