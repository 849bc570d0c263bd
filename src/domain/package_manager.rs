//! Package manager definitions for the JavaScript ecosystem

use super::DependencyClass;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported JavaScript package managers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageManager {
    /// npm (package-lock.json, nested dependency tree)
    Npm,
    /// Yarn (yarn.lock, flat text blocks)
    Yarn,
    /// pnpm (pnpm-lock.yaml, flat YAML mapping)
    Pnpm,
}

impl PackageManager {
    /// Returns the lockfile name written by this package manager
    pub fn lockfile_name(&self) -> &'static str {
        match self {
            PackageManager::Npm => "package-lock.json",
            PackageManager::Yarn => "yarn.lock",
            PackageManager::Pnpm => "pnpm-lock.yaml",
        }
    }

    /// Returns the executable name
    pub fn command(&self) -> &'static str {
        match self {
            PackageManager::Npm => "npm",
            PackageManager::Yarn => "yarn",
            PackageManager::Pnpm => "pnpm",
        }
    }

    /// Returns all package managers in detection priority order
    pub fn all() -> &'static [PackageManager] {
        &[PackageManager::Yarn, PackageManager::Pnpm, PackageManager::Npm]
    }

    /// Command that reinstalls the tree and regenerates the lockfile
    pub fn install_command(&self) -> String {
        format!("{} install", self.command())
    }

    /// Command that adds (or re-pins) a package in the given dependency class
    pub fn add_command(&self, spec: &str, class: DependencyClass) -> String {
        let verb = match self {
            PackageManager::Npm => "install",
            PackageManager::Yarn | PackageManager::Pnpm => "add",
        };
        let flag = match (self, class) {
            (_, DependencyClass::Production) => None,
            (PackageManager::Yarn, DependencyClass::Development) => Some("--dev"),
            (PackageManager::Yarn, DependencyClass::Optional) => Some("--optional"),
            (PackageManager::Yarn, DependencyClass::Peer) => Some("--peer"),
            (_, DependencyClass::Development) => Some("--save-dev"),
            (_, DependencyClass::Optional) => Some("--save-optional"),
            (_, DependencyClass::Peer) => Some("--save-peer"),
        };

        let mut command = format!("{} {} {}", self.command(), verb, shell_quote(spec));
        if let Some(flag) = flag {
            command.push(' ');
            command.push_str(flag);
        }
        command
    }

    /// Command that removes the given packages
    pub fn remove_command(&self, names: &[String]) -> String {
        let verb = match self {
            PackageManager::Npm => "uninstall",
            PackageManager::Yarn | PackageManager::Pnpm => "remove",
        };
        let quoted: Vec<String> = names.iter().map(|n| shell_quote(n)).collect();
        format!("{} {} {}", self.command(), verb, quoted.join(" "))
    }
}

/// Quote an argument for POSIX shells when it contains anything beyond
/// the characters a package spec normally uses.
fn shell_quote(arg: &str) -> String {
    let plain = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "@/._-^~:+=".contains(c));
    if plain {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.command())
    }
}

impl FromStr for PackageManager {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "npm" => Ok(PackageManager::Npm),
            "yarn" => Ok(PackageManager::Yarn),
            "pnpm" => Ok(PackageManager::Pnpm),
            _ => Err(ConfigError::UnknownPackageManager {
                value: s.to_string(),
            }),
        }
    }
}
