//! Fix commands derived from the diagnosis
//!
//! Commands are only listed; nothing is executed.

use super::explain::{ExplainReport, Issue};
use serde::Serialize;
use std::collections::HashSet;

/// Ordered, de-duplicated fix commands
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FixReport {
    pub commands: Vec<String>,
    /// Issues with no command that resolves them
    pub manual: Vec<String>,
}

/// Collects fix commands in issue order (most severe first)
pub fn fix_commands(report: &ExplainReport) -> FixReport {
    let mut seen = HashSet::new();
    let mut fix = FixReport::default();

    for Issue { message, fix: command, .. } in &report.issues {
        match command {
            Some(command) => {
                if seen.insert(command.as_str()) {
                    fix.commands.push(command.clone());
                }
            }
            None => fix.manual.push(message.clone()),
        }
    }

    fix
}
