//! npm registry metadata service
//!
//! Endpoints:
//! - `{registry}/{package}` for publish times, maintainers and dist-tags
//! - `https://api.npmjs.org/downloads/point/last-week/{package}` for downloads

use super::{validate_package_name, HttpClient, MetadataService, PackageMetadata};
use crate::error::ServiceError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use tracing::debug;

/// npm registry base URL
pub const DEFAULT_REGISTRY: &str = "https://registry.npmjs.org";

/// npm download counts API
const DOWNLOADS_URL: &str = "https://api.npmjs.org/downloads/point/last-week";

const REGISTRY_NAME: &str = "npm";

/// Metadata service backed by the npm registry
pub struct NpmRegistryService {
    client: HttpClient,
    registry: String,
}

/// Packument subset
#[derive(Debug, Deserialize)]
struct PackumentResponse {
    #[serde(default)]
    time: HashMap<String, serde_json::Value>,
    #[serde(default)]
    maintainers: Vec<serde_json::Value>,
    #[serde(default, rename = "dist-tags")]
    dist_tags: HashMap<String, String>,
}

/// Download point response
#[derive(Debug, Deserialize)]
struct DownloadsResponse {
    #[serde(default)]
    downloads: u64,
}

impl NpmRegistryService {
    /// Create a new registry service
    pub fn new(client: HttpClient, registry: &str) -> Self {
        Self {
            client,
            registry: registry.trim_end_matches('/').to_string(),
        }
    }

    /// Build the packument URL; the scope separator is escaped
    fn build_url(&self, package: &str) -> String {
        format!("{}/{}", self.registry, package.replacen('/', "%2f", 1))
    }

    async fn weekly_downloads(&self, package: &str) -> u64 {
        let url = format!("{}/{}", DOWNLOADS_URL, package);
        match self
            .client
            .get_json::<DownloadsResponse>(&url, package, "npm downloads")
            .await
        {
            Ok(response) => response.downloads,
            Err(e) => {
                debug!("download count unavailable for {}: {}", package, e);
                0
            }
        }
    }
}

impl PackumentResponse {
    fn into_metadata(self, weekly_downloads: u64) -> PackageMetadata {
        let latest = self.dist_tags.get("latest").cloned();
        let last_published = latest
            .as_deref()
            .and_then(|v| self.time.get(v))
            .or_else(|| self.time.get("modified"))
            .and_then(serde_json::Value::as_str)
            .and_then(|t| t.parse::<DateTime<Utc>>().ok());

        PackageMetadata {
            latest,
            last_published,
            maintainers: self.maintainers.len(),
            weekly_downloads,
        }
    }
}

#[async_trait]
impl MetadataService for NpmRegistryService {
    async fn metadata(&self, name: &str) -> Result<PackageMetadata, ServiceError> {
        validate_package_name(name)?;

        let packument: PackumentResponse = self
            .client
            .get_json(&self.build_url(name), name, REGISTRY_NAME)
            .await?;
        let downloads = self.weekly_downloads(name).await;

        Ok(packument.into_metadata(downloads))
    }
}
