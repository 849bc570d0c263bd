//! Application error types using thiserror
//!
//! Error hierarchy:
//! - ManifestError: package.json is missing or unusable (fatal)
//! - LockfileError: lockfile could not be read or parsed (degrades to no lock data)
//! - ServiceError: an external service call failed (per-dependency skip)
//! - ConfigError: invalid command line configuration

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors that abort a run
#[derive(Error, Debug)]
pub enum AppError {
    /// Manifest file related errors
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// External service related errors
    #[error(transparent)]
    Service(#[from] ServiceError),
}

/// Errors related to the project manifest
#[derive(Error, Debug)]
pub enum ManifestError {
    /// Manifest file not found
    #[error("manifest file not found: {path}")]
    NotFound { path: PathBuf },

    /// Failed to read manifest file
    #[error("failed to read manifest file {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON parsing error
    #[error("failed to parse JSON in {path}: {message}")]
    JsonParseError { path: PathBuf, message: String },

    /// Top-level value is not an object
    #[error("invalid manifest {path}: expected a JSON object")]
    NotAnObject { path: PathBuf },

    /// Missing or empty `name` field
    #[error("invalid manifest {path}: missing \"name\" field")]
    MissingName { path: PathBuf },
}

/// Errors related to lockfile parsing
#[derive(Error, Debug)]
pub enum LockfileError {
    /// Failed to read the lockfile
    #[error("failed to read lockfile {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON parsing error (package-lock.json)
    #[error("failed to parse JSON lockfile: {message}")]
    JsonParseError { message: String },

    /// YAML parsing error (pnpm-lock.yaml)
    #[error("failed to parse YAML lockfile: {message}")]
    YamlParseError { message: String },

    /// Structurally invalid document
    #[error("malformed lockfile: {message}")]
    Malformed { message: String },
}

/// Errors related to external service calls
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Name failed validation and was never passed to the service
    #[error("invalid package name '{name}'")]
    InvalidPackageName { name: String },

    /// Failed to spawn an external command
    #[error("failed to run '{command}': {message}")]
    SpawnFailed { command: String, message: String },

    /// External command produced no usable output
    #[error("'{command}' failed: {message}")]
    CommandFailed { command: String, message: String },

    /// External call exceeded its time budget
    #[error("'{operation}' timed out after {}s", .timeout.as_secs())]
    Timeout { operation: String, timeout: Duration },

    /// Package not found in registry
    #[error("package '{package}' not found in {registry} registry")]
    PackageNotFound { package: String, registry: String },

    /// Network request failed
    #[error("failed to fetch package '{package}' from {registry}: {message}")]
    NetworkError {
        package: String,
        registry: String,
        message: String,
    },

    /// Rate limit exceeded
    #[error("rate limit exceeded for {registry} registry")]
    RateLimitExceeded { registry: String },

    /// Invalid response from a service
    #[error("invalid response from {service} for '{package}': {message}")]
    InvalidResponse {
        package: String,
        service: String,
        message: String,
    },
}

/// Errors related to configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Unknown package manager name
    #[error("unknown package manager '{value}': expected 'npm', 'yarn', or 'pnpm'")]
    UnknownPackageManager { value: String },
}

impl ManifestError {
    /// Creates a new NotFound error
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        ManifestError::NotFound { path: path.into() }
    }

    /// Creates a new ReadError
    pub fn read_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ManifestError::ReadError {
            path: path.into(),
            source,
        }
    }

    /// Creates a new JsonParseError
    pub fn json_parse_error(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        ManifestError::JsonParseError {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl LockfileError {
    /// Creates a new Malformed error
    pub fn malformed(message: impl Into<String>) -> Self {
        LockfileError::Malformed {
            message: message.into(),
        }
    }
}

impl ServiceError {
    /// Creates a new InvalidPackageName error
    pub fn invalid_package_name(name: impl Into<String>) -> Self {
        ServiceError::InvalidPackageName { name: name.into() }
    }

    /// Creates a new NetworkError
    pub fn network_error(
        package: impl Into<String>,
        registry: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        ServiceError::NetworkError {
            package: package.into(),
            registry: registry.into(),
            message: message.into(),
        }
    }

    /// Creates a new InvalidResponse error
    pub fn invalid_response(
        package: impl Into<String>,
        service: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        ServiceError::InvalidResponse {
            package: package.into(),
            service: service.into(),
            message: message.into(),
        }
    }

    /// Creates a new Timeout error
    pub fn timeout(operation: impl Into<String>, timeout: Duration) -> Self {
        ServiceError::Timeout {
            operation: operation.into(),
            timeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_error_not_found() {
        let err = ManifestError::not_found("/path/to/package.json");
        let msg = format!("{}", err);
        assert!(msg.contains("manifest file not found"));
        assert!(msg.contains("package.json"));
    }

    #[test]
    fn test_manifest_error_json_parse() {
        let err = ManifestError::json_parse_error("/path/to/package.json", "unexpected token");
        let msg = format!("{}", err);
        assert!(msg.contains("failed to parse JSON"));
        assert!(msg.contains("unexpected token"));
    }

    #[test]
    fn test_manifest_error_missing_name() {
        let err = ManifestError::MissingName {
            path: PathBuf::from("package.json"),
        };
        assert!(err.to_string().contains("missing \"name\""));
    }

    #[test]
    fn test_lockfile_error_malformed() {
        let err = LockfileError::malformed("expected an object");
        assert_eq!(err.to_string(), "malformed lockfile: expected an object");
    }

    #[test]
    fn test_service_error_invalid_name() {
        let err = ServiceError::invalid_package_name("pkg; rm -rf /");
        assert!(err.to_string().contains("invalid package name"));
    }

    #[test]
    fn test_service_error_network() {
        let err = ServiceError::network_error("lodash", "npm", "connection refused");
        let msg = format!("{}", err);
        assert!(msg.contains("failed to fetch"));
        assert!(msg.contains("connection refused"));
    }

    #[test]
    fn test_service_error_timeout() {
        let err = ServiceError::timeout("npm audit --json", Duration::from_secs(30));
        let msg = format!("{}", err);
        assert!(msg.contains("timed out after 30s"));
        assert!(msg.contains("npm audit"));
    }

    #[test]
    fn test_config_error_unknown_package_manager() {
        let err = ConfigError::UnknownPackageManager {
            value: "bun".to_string(),
        };
        assert!(err.to_string().contains("unknown package manager 'bun'"));
    }

    #[test]
    fn test_app_error_from_manifest_error() {
        let app_err: AppError = ManifestError::not_found("/path").into();
        assert!(app_err.to_string().contains("manifest file not found"));
    }

    #[test]
    fn test_app_error_from_service_error() {
        let app_err: AppError = ServiceError::invalid_package_name("-g").into();
        assert!(matches!(app_err, AppError::Service(_)));
        assert_eq!(app_err.to_string(), "invalid package name '-g'");
    }

    #[test]
    fn test_error_debug_trait() {
        let err = ManifestError::not_found("/test");
        let debug = format!("{:?}", err);
        assert!(debug.contains("NotFound"));
    }
}
