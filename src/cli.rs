//! CLI argument parsing module for depaudit

use crate::lookup::DEFAULT_CONCURRENCY;
use crate::service::{ServiceConfig, DEFAULT_REGISTRY};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

/// Parse a positive number of seconds
fn parse_timeout(s: &str) -> Result<Duration, String> {
    let secs: u64 = s
        .trim()
        .parse()
        .map_err(|_| format!("invalid number of seconds: {}", s))?;
    if secs == 0 {
        return Err("timeout must be at least 1 second".to_string());
    }
    Ok(Duration::from_secs(secs))
}

/// Parse a concurrency bound of at least 1
fn parse_concurrency(s: &str) -> Result<usize, String> {
    match s.trim().parse::<usize>() {
        Ok(0) => Err("concurrency must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(_) => Err(format!("invalid concurrency: {}", s)),
    }
}

/// Dependency auditor for JavaScript projects
#[derive(Parser, Debug, Clone)]
#[command(
    name = "depaudit",
    version,
    about = "Dependency auditor for JavaScript projects"
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,

    /// Project root (default: current directory)
    #[arg(short, long, global = true, default_value = ".")]
    pub path: PathBuf,

    // Output options
    /// Output results in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose output
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Enable quiet mode - errors only
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    // Detection
    /// Use this package manager instead of detecting it (npm, yarn, pnpm)
    #[arg(long, global = true, value_name = "NAME")]
    pub package_manager: Option<String>,

    // External services
    /// Maximum number of concurrent per-dependency lookups
    #[arg(long, global = true, default_value_t = DEFAULT_CONCURRENCY, value_parser = parse_concurrency)]
    pub concurrency: usize,

    /// Timeout for each external call, in seconds
    #[arg(long, global = true, default_value = "30", value_parser = parse_timeout, value_name = "SECS")]
    pub timeout: Duration,

    /// npm registry base URL
    #[arg(long, global = true, default_value = DEFAULT_REGISTRY, value_name = "URL")]
    pub registry: String,
}

/// Audit commands
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// List declared dependencies with their locked versions
    Scan,
    /// Find dependencies that are never imported
    Unused,
    /// Score dependencies by maintenance and security risk
    Risk,
    /// Suggest available updates
    Update,
    /// Diagnose why automated dependency updates would fail
    Explain,
    /// Print the commands that resolve the diagnosed problems
    Fix,
}

impl CliArgs {
    /// Build the external service configuration
    pub fn service_config(&self) -> ServiceConfig {
        ServiceConfig {
            registry: self.registry.clone(),
            timeout: self.timeout,
        }
    }
}
