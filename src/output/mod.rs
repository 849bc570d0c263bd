//! Output formatting for command reports
//!
//! This module provides:
//! - Text output for human-readable display
//! - JSON output for machine processing

mod json;
mod text;

pub use json::JsonFormatter;
pub use text::TextFormatter;

use crate::commands::{
    ExplainReport, FixReport, RiskReport, ScanReport, UnusedReport, UpdateReport,
};
use std::io::Write;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output for machine processing
    Json,
}

/// Output verbosity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Errors only
    Quiet,
    /// Normal output
    #[default]
    Normal,
    /// Detailed output with additional information
    Verbose,
}

/// Configuration for output formatting
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Output format (text, json)
    pub format: OutputFormat,
    /// Verbosity level
    pub verbosity: Verbosity,
    /// Whether to use colors
    pub color: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            verbosity: Verbosity::default(),
            color: true,
        }
    }
}

impl OutputConfig {
    /// Create configuration from CLI arguments
    pub fn from_cli(json: bool, verbose: bool, quiet: bool, no_color: bool) -> Self {
        let format = if json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        };

        let verbosity = if quiet {
            Verbosity::Quiet
        } else if verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Normal
        };

        Self {
            format,
            verbosity,
            color: !no_color,
        }
    }

    /// Progress bars only make sense for interactive text output
    pub fn show_progress(&self) -> bool {
        self.format == OutputFormat::Text && self.verbosity != Verbosity::Quiet
    }
}

/// Trait for output formatters
pub trait OutputFormatter {
    /// Dependency inventory
    fn format_scan(&self, report: &ScanReport, writer: &mut dyn Write) -> std::io::Result<()>;

    /// Unused dependencies
    fn format_unused(&self, report: &UnusedReport, writer: &mut dyn Write)
        -> std::io::Result<()>;

    /// Risk table and summary
    fn format_risk(&self, report: &RiskReport, writer: &mut dyn Write) -> std::io::Result<()>;

    /// Update suggestions
    fn format_update(&self, report: &UpdateReport, writer: &mut dyn Write)
        -> std::io::Result<()>;

    /// Diagnosed issues
    fn format_explain(
        &self,
        report: &ExplainReport,
        writer: &mut dyn Write,
    ) -> std::io::Result<()>;

    /// Fix commands
    fn format_fix(&self, report: &FixReport, writer: &mut dyn Write) -> std::io::Result<()>;
}

/// Create an output formatter based on configuration
pub fn create_formatter(config: &OutputConfig) -> Box<dyn OutputFormatter> {
    match config.format {
        OutputFormat::Text => Box::new(TextFormatter::with_color(config.verbosity, config.color)),
        OutputFormat::Json => Box::new(JsonFormatter::new()),
    }
}
