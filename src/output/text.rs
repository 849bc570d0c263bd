//! Text output formatter for human-readable display
//!
//! This module provides:
//! - Aligned dependency tables with colored status
//! - Semantic version change labels (major/minor/patch)
//! - Risk levels and summary counts
//! - Issues with their fix commands

use crate::commands::{
    ExplainReport, FixReport, RiskLevel, RiskReport, ScanReport, Severity, UnusedReport,
    UpdateReport, VersionChangeType,
};
use crate::domain::ReconcileStatus;
use crate::output::{OutputFormatter, Verbosity};
use colored::{ColoredString, Colorize};
use std::io::Write;

/// Minimum width of the name column
const MIN_NAME_WIDTH: usize = 20;

/// Text formatter for human-readable output
pub struct TextFormatter {
    /// Verbosity level
    verbosity: Verbosity,
    /// Whether to use colors
    color: bool,
}

impl TextFormatter {
    /// Create a new text formatter
    pub fn new(verbosity: Verbosity) -> Self {
        Self::with_color(verbosity, true)
    }

    /// Create a new text formatter with color option
    pub fn with_color(verbosity: Verbosity, color: bool) -> Self {
        Self { verbosity, color }
    }

    /// Applies a style only when colors are enabled
    fn paint(&self, text: &str, style: impl Fn(&str) -> ColoredString) -> String {
        if self.color {
            style(text).to_string()
        } else {
            text.to_string()
        }
    }

    fn heading(&self, text: &str, writer: &mut dyn Write) -> std::io::Result<()> {
        writeln!(writer, "{}", self.paint(text, |t| t.bold()))
    }

    fn status_label(&self, status: &ReconcileStatus) -> String {
        let label = status.label();
        match status {
            ReconcileStatus::Satisfied { .. } => self.paint(label, |t| t.green()),
            ReconcileStatus::Mismatched { .. } => self.paint(label, |t| t.red().bold()),
            ReconcileStatus::Unlocked => self.paint(label, |t| t.yellow()),
        }
    }

    fn change_label(&self, change: VersionChangeType) -> String {
        let label = change.label();
        match change {
            VersionChangeType::Major => self.paint(label, |t| t.red().bold()),
            VersionChangeType::Minor => self.paint(label, |t| t.yellow()),
            VersionChangeType::Patch => self.paint(label, |t| t.green()),
            VersionChangeType::Prerelease => self.paint(label, |t| t.cyan()),
        }
    }

    fn level_label(&self, level: RiskLevel) -> String {
        let label = format!("{:6}", level.label());
        match level {
            RiskLevel::High => self.paint(&label, |t| t.red().bold()),
            RiskLevel::Medium => self.paint(&label, |t| t.yellow()),
            RiskLevel::Low => self.paint(&label, |t| t.green()),
        }
    }

    fn severity_label(&self, severity: Severity) -> String {
        let label = format!("[{}]", severity);
        match severity {
            Severity::Error => self.paint(&label, |t| t.red().bold()),
            Severity::Warning => self.paint(&label, |t| t.yellow()),
            Severity::Info => self.paint(&label, |t| t.dimmed()),
        }
    }

    fn name_width<'a>(names: impl Iterator<Item = &'a str>) -> usize {
        names.map(str::len).max().unwrap_or(0).max(MIN_NAME_WIDTH)
    }
}

impl Default for TextFormatter {
    fn default() -> Self {
        Self::new(Verbosity::Normal)
    }
}

impl OutputFormatter for TextFormatter {
    fn format_scan(&self, report: &ScanReport, writer: &mut dyn Write) -> std::io::Result<()> {
        let source = report
            .lockfile
            .as_ref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "no lockfile".to_string());
        let title = format!("{} ({}, {})", report.project, report.package_manager, source);
        self.heading(&title, writer)?;

        let width = Self::name_width(report.dependencies.iter().map(|e| e.dependency.name.as_str()));
        for entry in &report.dependencies {
            let dependency = &entry.dependency;
            writeln!(
                writer,
                "  {:width$} {:16} {:12} {} {}",
                dependency.name,
                dependency.declared_range,
                entry.status.locked_version().unwrap_or("-"),
                self.status_label(&entry.status),
                self.paint(dependency.class.label(), |t| t.dimmed()),
                width = width
            )?;
        }

        if !report.skipped.is_empty() {
            writeln!(writer)?;
            writeln!(writer, "  {}", self.paint("Skipped:", |t| t.dimmed()))?;
            for skipped in &report.skipped {
                writeln!(
                    writer,
                    "  {:width$} {}",
                    skipped.dependency.name,
                    self.paint(&format!("({})", skipped.reason), |t| t.dimmed()),
                    width = width
                )?;
            }
        }

        let totals = &report.totals;
        writeln!(writer)?;
        writeln!(
            writer,
            "{} declared: {} satisfied, {} mismatched, {} unlocked, {} skipped",
            totals.declared,
            self.paint(&totals.satisfied.to_string(), |t| t.green()),
            self.paint(&totals.mismatched.to_string(), |t| t.red()),
            self.paint(&totals.unlocked.to_string(), |t| t.yellow()),
            totals.skipped
        )?;

        if self.verbosity == Verbosity::Verbose {
            let classes: Vec<String> = totals
                .by_class
                .iter()
                .map(|(class, count)| format!("{} {}", count, class))
                .collect();
            writeln!(writer, "  by class: {}", classes.join(", "))?;
        }

        Ok(())
    }

    fn format_unused(
        &self,
        report: &UnusedReport,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        if !report.analyzed {
            return writeln!(writer, "Unused dependency analysis unavailable");
        }
        if report.is_clean() {
            return writeln!(writer, "{}", self.paint("No unused dependencies", |t| t.green()));
        }

        for (title, names) in [
            ("Unused dependencies:", &report.dependencies),
            ("Unused devDependencies:", &report.dev_dependencies),
        ] {
            if names.is_empty() {
                continue;
            }
            self.heading(title, writer)?;
            for name in names {
                writeln!(writer, "  {}", name)?;
            }
        }

        writeln!(writer)?;
        writeln!(writer, "Remove with:")?;
        for command in &report.commands {
            writeln!(writer, "  {}", self.paint(command, |t| t.cyan()))?;
        }
        Ok(())
    }

    fn format_risk(&self, report: &RiskReport, writer: &mut dyn Write) -> std::io::Result<()> {
        if !report.audit_available {
            writeln!(
                writer,
                "{}",
                self.paint("(no vulnerability data)", |t| t.dimmed())
            )?;
        }

        let width = Self::name_width(report.entries.iter().map(|e| e.name.as_str()));
        for entry in &report.entries {
            let reasons = if entry.risk.reasons.is_empty() {
                String::new()
            } else {
                self.paint(&entry.risk.reasons.join("; "), |t| t.dimmed())
            };
            writeln!(
                writer,
                "  {:width$} {} {:>2}  {}",
                entry.name,
                self.level_label(entry.risk.level),
                entry.risk.score,
                reasons,
                width = width
            )?;
        }

        let summary = &report.summary;
        writeln!(writer)?;
        writeln!(
            writer,
            "Summary: {} high, {} medium, {} low",
            self.paint(&summary.high.to_string(), |t| t.red().bold()),
            self.paint(&summary.medium.to_string(), |t| t.yellow()),
            self.paint(&summary.low.to_string(), |t| t.green()),
        )
    }

    fn format_update(
        &self,
        report: &UpdateReport,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        if report.suggestions.is_empty() {
            return writeln!(
                writer,
                "{}",
                self.paint("All dependencies are up to date", |t| t.green())
            );
        }

        let width = Self::name_width(report.suggestions.iter().map(|s| s.name.as_str()));
        let arrow = if self.color { "→" } else { "->" };
        for suggestion in &report.suggestions {
            let range_note = if suggestion.in_range {
                " (in range)"
            } else {
                ""
            };
            writeln!(
                writer,
                "  {:width$} {} {} {} [{}]{}",
                suggestion.name,
                self.paint(&suggestion.current, |t| t.dimmed()),
                self.paint(arrow, |t| t.dimmed()),
                self.paint(&suggestion.latest, |t| t.bright_white().bold()),
                self.change_label(suggestion.change),
                range_note,
                width = width
            )?;
            if self.verbosity == Verbosity::Verbose || suggestion.safe {
                writeln!(writer, "    {}", self.paint(&suggestion.command, |t| t.cyan()))?;
            }
        }

        writeln!(writer)?;
        writeln!(
            writer,
            "{} {} available, {} up to date",
            report.suggestions.len(),
            if report.suggestions.len() == 1 {
                "update"
            } else {
                "updates"
            },
            report.up_to_date
        )
    }

    fn format_explain(
        &self,
        report: &ExplainReport,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        if report.issues.is_empty() {
            return writeln!(
                writer,
                "{}",
                self.paint("No problems found", |t| t.green())
            );
        }

        for issue in &report.issues {
            writeln!(
                writer,
                "{} {}",
                self.severity_label(issue.severity),
                issue.message
            )?;
            if let Some(fix) = &issue.fix {
                writeln!(writer, "    fix: {}", self.paint(fix, |t| t.cyan()))?;
            }
        }

        if self.verbosity == Verbosity::Verbose && !report.peer_check {
            writeln!(writer)?;
            writeln!(
                writer,
                "{}",
                self.paint("Peer dependency check was not run", |t| t.dimmed())
            )?;
        }
        Ok(())
    }

    fn format_fix(&self, report: &FixReport, writer: &mut dyn Write) -> std::io::Result<()> {
        if report.commands.is_empty() && report.manual.is_empty() {
            return writeln!(writer, "{}", self.paint("Nothing to fix", |t| t.green()));
        }

        if !report.commands.is_empty() {
            self.heading("Run:", writer)?;
            for command in &report.commands {
                writeln!(writer, "  {}", self.paint(command, |t| t.cyan()))?;
            }
        }

        if !report.manual.is_empty() {
            if !report.commands.is_empty() {
                writeln!(writer)?;
            }
            self.heading("Needs manual attention:", writer)?;
            for message in &report.manual {
                writeln!(writer, "  - {}", message)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{
        Issue, IssueKind, RiskEntry, RiskScore, RiskSummary, UpdateSuggestion,
    };
    use crate::domain::{DependencyClass, PackageManager};

    fn plain() -> TextFormatter {
        TextFormatter::with_color(Verbosity::Normal, false)
    }

    fn render(f: impl FnOnce(&mut Vec<u8>) -> std::io::Result<()>) -> String {
        let mut buffer = Vec::new();
        f(&mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_format_update() {
        let report = UpdateReport {
            suggestions: vec![UpdateSuggestion {
                name: "jest".to_string(),
                class: DependencyClass::Development,
                declared_range: "^28.0.0".to_string(),
                current: "28.1.3".to_string(),
                latest: "29.7.0".to_string(),
                change: VersionChangeType::Major,
                in_range: false,
                safe: false,
                command: "npm install jest@29.7.0 --save-dev".to_string(),
            }],
            up_to_date: 2,
        };

        let output = render(|w| plain().format_update(&report, w));

        assert!(output.contains("jest"));
        assert!(output.contains("28.1.3 -> 29.7.0 [major]"));
        assert!(!output.contains("npm install"));
        assert!(output.contains("1 update available, 2 up to date"));
    }

    #[test]
    fn test_format_update_empty() {
        let output = render(|w| plain().format_update(&UpdateReport::default(), w));
        assert_eq!(output, "All dependencies are up to date\n");
    }

    #[test]
    fn test_format_risk() {
        let report = RiskReport {
            audit_available: false,
            entries: vec![RiskEntry {
                name: "left-pad".to_string(),
                class: DependencyClass::Production,
                locked: Some("1.3.0".to_string()),
                latest: Some("1.3.0".to_string()),
                last_published: None,
                maintainers: 1,
                weekly_downloads: 500,
                vulnerable: false,
                risk: RiskScore {
                    score: 3,
                    level: RiskLevel::Medium,
                    reasons: vec!["single maintainer".to_string(), "500 weekly downloads".to_string()],
                },
            }],
            summary: RiskSummary {
                high: 0,
                medium: 1,
                low: 0,
            },
        };

        let output = render(|w| plain().format_risk(&report, w));

        assert!(output.starts_with("(no vulnerability data)"));
        assert!(output.contains("medium"));
        assert!(output.contains("single maintainer; 500 weekly downloads"));
        assert!(output.contains("Summary: 0 high, 1 medium, 0 low"));
    }

    #[test]
    fn test_format_explain() {
        let report = ExplainReport {
            package_manager: PackageManager::Yarn,
            peer_check: true,
            issues: vec![Issue {
                kind: IssueKind::LockfileMissing,
                severity: Severity::Error,
                package: None,
                message: "no yarn.lock found".to_string(),
                fix: Some("yarn install".to_string()),
            }],
        };

        let output = render(|w| plain().format_explain(&report, w));

        assert_eq!(output, "[error] no yarn.lock found\n    fix: yarn install\n");
    }

    #[test]
    fn test_format_fix() {
        let report = FixReport {
            commands: vec!["rm package-lock.json".to_string(), "yarn install".to_string()],
            manual: vec!["'my pkg' is not a valid package name".to_string()],
        };

        let output = render(|w| plain().format_fix(&report, w));

        assert!(output.starts_with("Run:\n  rm package-lock.json\n  yarn install\n"));
        assert!(output.contains("Needs manual attention:\n  - 'my pkg'"));
    }

    #[test]
    fn test_format_unused() {
        let report = UnusedReport {
            analyzed: true,
            dependencies: vec!["moment".to_string()],
            dev_dependencies: Vec::new(),
            commands: vec!["pnpm remove moment".to_string()],
        };

        let output = render(|w| plain().format_unused(&report, w));

        assert!(output.contains("Unused dependencies:\n  moment\n"));
        assert!(!output.contains("devDependencies"));
        assert!(output.ends_with("Remove with:\n  pnpm remove moment\n"));
    }
}
