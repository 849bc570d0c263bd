//! JSON output formatter for machine processing
//!
//! Reports are serialized as-is, pretty printed, one document per run.

use crate::commands::{
    ExplainReport, FixReport, RiskReport, ScanReport, UnusedReport, UpdateReport,
};
use crate::output::OutputFormatter;
use serde::Serialize;
use std::io::Write;

/// JSON formatter for machine-readable output
#[derive(Debug, Default)]
pub struct JsonFormatter;

impl JsonFormatter {
    /// Create a new JSON formatter
    pub fn new() -> Self {
        Self
    }

    fn write<T: Serialize>(&self, value: &T, writer: &mut dyn Write) -> std::io::Result<()> {
        serde_json::to_writer_pretty(&mut *writer, value)?;
        writeln!(writer)
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_scan(&self, report: &ScanReport, writer: &mut dyn Write) -> std::io::Result<()> {
        self.write(report, writer)
    }

    fn format_unused(
        &self,
        report: &UnusedReport,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        self.write(report, writer)
    }

    fn format_risk(&self, report: &RiskReport, writer: &mut dyn Write) -> std::io::Result<()> {
        self.write(report, writer)
    }

    fn format_update(
        &self,
        report: &UpdateReport,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        self.write(report, writer)
    }

    fn format_explain(
        &self,
        report: &ExplainReport,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        self.write(report, writer)
    }

    fn format_fix(&self, report: &FixReport, writer: &mut dyn Write) -> std::io::Result<()> {
        self.write(report, writer)
    }
}
