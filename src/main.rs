//! depaudit - Dependency auditor CLI tool for JavaScript projects
//!
//! Reconciles package.json against the npm, yarn or pnpm lockfile and
//! reports on the declared dependencies:
//! - scan: inventory with lock status
//! - unused, risk, update: external tool and registry data
//! - explain, fix: why automated updates would fail and what to run

use chrono::Utc;
use clap::Parser;
use depaudit::cli::{CliArgs, Command};
use depaudit::commands;
use depaudit::error::AppError;
use depaudit::output::{create_formatter, OutputConfig};
use depaudit::progress::Progress;
use depaudit::project::Project;
use depaudit::service::Services;
use std::io::{self, Write};
use std::process::ExitCode;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

/// Environment variable overriding the log filter
const LOG_ENV: &str = "DEPAUDIT_LOG";

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();
    init_logging(&args);

    // Run the main logic and handle errors
    match run(args).await {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(args: &CliArgs) {
    let default_level = if args.quiet {
        "error"
    } else if args.verbose {
        "debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .with_ansi(!args.no_color)
        .init();
}

/// Main application logic
async fn run(args: CliArgs) -> anyhow::Result<ExitCode> {
    debug!(
        version = env!("CARGO_PKG_VERSION"),
        path = %args.path.display(),
        command = ?args.command,
        "starting"
    );

    let project = Project::load(&args.path, args.package_manager.as_deref())?;
    debug!(
        package_manager = %project.package_manager,
        declared = project.graph.declared.len(),
        locked = project.graph.locked.len(),
        "project loaded"
    );
    for warning in &project.warnings {
        warn!("{}", warning);
    }

    let output_config = OutputConfig::from_cli(args.json, args.verbose, args.quiet, args.no_color);
    let formatter = create_formatter(&output_config);
    let mut progress = Progress::new(output_config.show_progress());
    let mut warnings = Vec::new();

    // Scan never builds services, so it works without an HTTP client
    let service_config = args.service_config();
    let build_services = || -> Result<Services, AppError> {
        Ok(Services::for_project(&project.root, project.package_manager, &service_config)?)
    };

    let mut stdout = io::stdout().lock();
    match args.command {
        Command::Scan => formatter.format_scan(&commands::scan(&project), &mut stdout)?,
        Command::Unused => {
            let services = build_services()?;
            let report = commands::unused(
                &project,
                services.unused.as_ref(),
                &mut progress,
                &mut warnings,
            )
            .await;
            formatter.format_unused(&report, &mut stdout)?;
        }
        Command::Risk => {
            let services = build_services()?;
            let report = commands::risk(
                &project,
                &services,
                args.concurrency,
                &mut progress,
                Utc::now(),
                &mut warnings,
            )
            .await;
            formatter.format_risk(&report, &mut stdout)?;
        }
        Command::Update => {
            let services = build_services()?;
            let report = commands::update(
                &project,
                &services,
                args.concurrency,
                &mut progress,
                &mut warnings,
            )
            .await;
            formatter.format_update(&report, &mut stdout)?;
        }
        Command::Explain => {
            let services = build_services()?;
            let report = commands::explain(
                &project,
                services.peers.as_ref(),
                &mut progress,
                &mut warnings,
            )
            .await;
            formatter.format_explain(&report, &mut stdout)?;
        }
        Command::Fix => {
            let services = build_services()?;
            let diagnosis = commands::explain(
                &project,
                services.peers.as_ref(),
                &mut progress,
                &mut warnings,
            )
            .await;
            formatter.format_fix(&commands::fix_commands(&diagnosis), &mut stdout)?;
        }
    }
    stdout.flush()?;

    for warning in &warnings {
        warn!("{}", warning);
    }

    Ok(ExitCode::SUCCESS)
}
