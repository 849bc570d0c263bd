//! External services consumed by the commands
//!
//! This module provides:
//! - Service traits (metadata, installed version, audit, unused imports,
//!   peer conflicts) so commands can be tested with mocks
//! - Package name validation run before every name-taking call
//! - The npm registry service (HTTP)
//! - Process-backed services wrapping the package manager CLIs

mod client;
mod command;
mod registry;

pub use client::{HttpClient, DEFAULT_TIMEOUT};
pub use command::{
    parse_audit_output, parse_depcheck_output, parse_installed_version, parse_peer_problems,
    CommandServices,
};
pub use registry::{NpmRegistryService, DEFAULT_REGISTRY};

use crate::domain::{is_valid_package_name, PackageManager};
use crate::error::ServiceError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Registry metadata for one package
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageMetadata {
    /// Latest published version (`dist-tags.latest`)
    pub latest: Option<String>,
    /// Publish time of the latest version
    pub last_published: Option<DateTime<Utc>>,
    /// Number of maintainers
    pub maintainers: usize,
    /// Downloads over the last week
    pub weekly_downloads: u64,
}

/// Vulnerable package names mapped to their highest reported severity
pub type VulnerabilityMap = BTreeMap<String, String>;

/// Declared dependencies never imported by source code
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UnusedImports {
    /// Unused `dependencies`
    pub dependencies: Vec<String>,
    /// Unused `devDependencies`
    pub dev_dependencies: Vec<String>,
}

/// Registry metadata lookups
#[async_trait]
pub trait MetadataService: Send + Sync {
    /// Fetch metadata for a validated package name
    async fn metadata(&self, name: &str) -> Result<PackageMetadata, ServiceError>;
}

/// Installed version lookups through the active package manager
#[async_trait]
pub trait InstalledVersionService: Send + Sync {
    /// Currently installed version, `None` if not installed
    async fn installed_version(&self, name: &str) -> Result<Option<String>, ServiceError>;
}

/// Vulnerability audit of the whole tree
#[async_trait]
pub trait AuditService: Send + Sync {
    /// Run the audit
    async fn audit(&self) -> Result<VulnerabilityMap, ServiceError>;
}

/// Static unused-import analysis
#[async_trait]
pub trait UnusedImportService: Send + Sync {
    /// Run the analysis
    async fn unused(&self) -> Result<UnusedImports, ServiceError>;
}

/// Peer dependency conflicts reported by the package manager
#[async_trait]
pub trait PeerConflictService: Send + Sync {
    /// Problem descriptions, one per conflict
    async fn peer_problems(&self) -> Result<Vec<String>, ServiceError>;
}

/// Rejects names that must never reach a registry URL or a command line
pub fn validate_package_name(name: &str) -> Result<(), ServiceError> {
    if is_valid_package_name(name) {
        Ok(())
    } else {
        Err(ServiceError::invalid_package_name(name))
    }
}

/// Settings for the real service implementations
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// npm registry base URL
    pub registry: String,
    /// Timeout per external call
    pub timeout: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            registry: DEFAULT_REGISTRY.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// The full set of services a command may call
#[derive(Clone)]
pub struct Services {
    pub metadata: Arc<dyn MetadataService>,
    pub installed: Arc<dyn InstalledVersionService>,
    pub audit: Arc<dyn AuditService>,
    pub unused: Arc<dyn UnusedImportService>,
    pub peers: Arc<dyn PeerConflictService>,
}

impl Services {
    /// Builds the real services for a project
    pub fn for_project(
        root: &Path,
        package_manager: PackageManager,
        config: &ServiceConfig,
    ) -> Result<Self, ServiceError> {
        let client = HttpClient::with_timeout(config.timeout)?;
        let registry = Arc::new(NpmRegistryService::new(client, &config.registry));
        let commands = Arc::new(CommandServices::new(root, package_manager, config.timeout));

        Ok(Self {
            metadata: registry,
            installed: commands.clone(),
            audit: commands.clone(),
            unused: commands.clone(),
            peers: commands,
        })
    }
}
