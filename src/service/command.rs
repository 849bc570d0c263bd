//! Process-backed services
//!
//! Runs the package manager CLIs (and depcheck through npx) in the project
//! root. Audit and analysis tools exit non-zero when they find something,
//! so the exit status only matters when stdout does not parse.

use super::{
    validate_package_name, AuditService, InstalledVersionService, PeerConflictService,
    UnusedImportService, UnusedImports, VulnerabilityMap,
};
use crate::domain::PackageManager;
use crate::error::ServiceError;
use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

/// Severity ranking shared by npm, yarn and pnpm audit reports
const SEVERITIES: [&str; 5] = ["info", "low", "moderate", "high", "critical"];

/// Captured output of one command
struct CommandOutput {
    stdout: String,
    stderr: String,
    success: bool,
}

/// Services that shell out to the package manager
pub struct CommandServices {
    root: PathBuf,
    package_manager: PackageManager,
    timeout: Duration,
}

impl CommandServices {
    /// Create services running in `root`
    pub fn new(root: &Path, package_manager: PackageManager, timeout: Duration) -> Self {
        Self {
            root: root.to_path_buf(),
            package_manager,
            timeout,
        }
    }

    async fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput, ServiceError> {
        let shown = format!("{} {}", program, args.join(" "));
        debug!("running '{}' in {}", shown, self.root.display());

        let mut command = Command::new(program);
        command
            .args(args)
            .current_dir(&self.root)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        let output = tokio::time::timeout(self.timeout, command.output())
            .await
            .map_err(|_| ServiceError::timeout(&shown, self.timeout))?
            .map_err(|e| ServiceError::SpawnFailed {
                command: shown.clone(),
                message: e.to_string(),
            })?;

        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            success: output.status.success(),
        })
    }

    /// Run a command and parse stdout, tolerating non-zero exits
    async fn run_parsed<T>(
        &self,
        program: &str,
        args: &[&str],
        parse: impl FnOnce(&str) -> Result<T, String>,
    ) -> Result<T, ServiceError> {
        let output = self.run(program, args).await?;
        parse(&output.stdout).map_err(|message| {
            let stderr = output.stderr.lines().next().unwrap_or_default().trim();
            let message = if !output.success && !stderr.is_empty() {
                stderr.to_string()
            } else {
                message
            };
            ServiceError::CommandFailed {
                command: format!("{} {}", program, args.join(" ")),
                message,
            }
        })
    }
}

#[async_trait]
impl InstalledVersionService for CommandServices {
    async fn installed_version(&self, name: &str) -> Result<Option<String>, ServiceError> {
        validate_package_name(name)?;

        let pm = self.package_manager;
        let args: Vec<&str> = match pm {
            PackageManager::Npm => vec!["ls", name, "--json", "--depth=0"],
            PackageManager::Yarn => vec!["list", "--pattern", name, "--depth=0", "--json"],
            PackageManager::Pnpm => vec!["list", name, "--json", "--depth=0"],
        };
        self.run_parsed(pm.command(), &args, |stdout| {
            parse_installed_version(pm, name, stdout)
        })
        .await
    }
}

#[async_trait]
impl AuditService for CommandServices {
    async fn audit(&self) -> Result<VulnerabilityMap, ServiceError> {
        let pm = self.package_manager;
        self.run_parsed(pm.command(), &["audit", "--json"], |stdout| {
            parse_audit_output(pm, stdout)
        })
        .await
    }
}

#[async_trait]
impl UnusedImportService for CommandServices {
    async fn unused(&self) -> Result<UnusedImports, ServiceError> {
        self.run_parsed("npx", &["--yes", "depcheck", "--json"], parse_depcheck_output)
            .await
    }
}

#[async_trait]
impl PeerConflictService for CommandServices {
    async fn peer_problems(&self) -> Result<Vec<String>, ServiceError> {
        self.run_parsed("npm", &["ls", "--json", "--all"], parse_peer_problems)
            .await
    }
}

fn parse_json(stdout: &str) -> Result<Value, String> {
    serde_json::from_str(stdout.trim()).map_err(|e| format!("unexpected output: {}", e))
}

/// Reads the installed version from `npm ls`, `yarn list` or `pnpm list` JSON
pub fn parse_installed_version(
    package_manager: PackageManager,
    name: &str,
    stdout: &str,
) -> Result<Option<String>, String> {
    match package_manager {
        PackageManager::Npm => {
            let json = parse_json(stdout)?;
            Ok(version_in_dependency_maps(&json, name))
        }
        PackageManager::Pnpm => {
            let json = parse_json(stdout)?;
            let projects = match &json {
                Value::Array(projects) => projects.as_slice(),
                other => std::slice::from_ref(other),
            };
            Ok(projects
                .iter()
                .find_map(|project| version_in_dependency_maps(project, name)))
        }
        PackageManager::Yarn => {
            let prefix = format!("{}@", name);
            let mut parsed_any = false;
            for line in stdout.lines().filter(|l| !l.trim().is_empty()) {
                let Ok(event) = serde_json::from_str::<Value>(line) else {
                    continue;
                };
                parsed_any = true;
                if event.get("type").and_then(Value::as_str) != Some("tree") {
                    continue;
                }
                let trees = event
                    .pointer("/data/trees")
                    .and_then(Value::as_array)
                    .into_iter()
                    .flatten();
                for tree in trees {
                    let version = tree
                        .get("name")
                        .and_then(Value::as_str)
                        .and_then(|n| n.strip_prefix(&prefix));
                    if let Some(version) = version {
                        return Ok(Some(version.to_string()));
                    }
                }
            }
            if parsed_any {
                Ok(None)
            } else {
                Err("unexpected output from yarn list".to_string())
            }
        }
    }
}

fn version_in_dependency_maps(json: &Value, name: &str) -> Option<String> {
    ["dependencies", "devDependencies", "optionalDependencies"]
        .iter()
        .find_map(|key| {
            json.get(key)?
                .get(name)?
                .get("version")?
                .as_str()
                .map(str::to_string)
        })
}

/// Reads vulnerable package names from `npm audit`, `yarn audit` or `pnpm audit` JSON
pub fn parse_audit_output(
    package_manager: PackageManager,
    stdout: &str,
) -> Result<VulnerabilityMap, String> {
    let mut vulnerable = VulnerabilityMap::new();

    match package_manager {
        PackageManager::Yarn => {
            let mut parsed_any = false;
            for line in stdout.lines().filter(|l| !l.trim().is_empty()) {
                let Ok(event) = serde_json::from_str::<Value>(line) else {
                    continue;
                };
                parsed_any = true;
                if event.get("type").and_then(Value::as_str) != Some("auditAdvisory") {
                    continue;
                }
                if let Some(advisory) = event.pointer("/data/advisory") {
                    record_advisory(&mut vulnerable, advisory, "module_name");
                }
            }
            if !parsed_any {
                return Err("unexpected output from yarn audit".to_string());
            }
        }
        PackageManager::Npm | PackageManager::Pnpm => {
            let json = parse_json(stdout)?;
            if let Some(vulnerabilities) = json.get("vulnerabilities").and_then(Value::as_object) {
                for (name, entry) in vulnerabilities {
                    let severity = entry.get("severity").and_then(Value::as_str);
                    record(&mut vulnerable, name, severity);
                }
            } else if let Some(advisories) = json.get("advisories").and_then(Value::as_object) {
                for advisory in advisories.values() {
                    record_advisory(&mut vulnerable, advisory, "module_name");
                }
            } else if json.get("error").is_some() {
                return Err(json["error"]
                    .get("summary")
                    .and_then(Value::as_str)
                    .unwrap_or("audit reported an error")
                    .to_string());
            }
        }
    }

    Ok(vulnerable)
}

fn record_advisory(vulnerable: &mut VulnerabilityMap, advisory: &Value, name_key: &str) {
    if let Some(name) = advisory.get(name_key).and_then(Value::as_str) {
        let severity = advisory.get("severity").and_then(Value::as_str);
        record(vulnerable, name, severity);
    }
}

/// Keeps the highest severity seen for a name
fn record(vulnerable: &mut VulnerabilityMap, name: &str, severity: Option<&str>) {
    let severity = severity.unwrap_or("unknown");
    let rank = |s: &str| SEVERITIES.iter().position(|known| *known == s);
    let existing = vulnerable
        .entry(name.to_string())
        .or_insert_with(|| severity.to_string());
    if rank(severity) > rank(existing.as_str()) {
        *existing = severity.to_string();
    }
}

/// Reads `depcheck --json` output
pub fn parse_depcheck_output(stdout: &str) -> Result<UnusedImports, String> {
    let json = parse_json(stdout)?;
    let names = |key: &str| -> Vec<String> {
        let mut names: Vec<String> = json
            .get(key)
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect();
        names.sort();
        names
    };

    Ok(UnusedImports {
        dependencies: names("dependencies"),
        dev_dependencies: names("devDependencies"),
    })
}

/// Reads the `problems` list from `npm ls --json`
pub fn parse_peer_problems(stdout: &str) -> Result<Vec<String>, String> {
    let json = parse_json(stdout)?;
    Ok(json
        .get("problems")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
        .map(str::to_string)
        .collect())
}
