//! Feature commands
//!
//! Each command consumes a loaded `Project` (plus services where it needs
//! external data) and returns a serializable report. Recoverable problems
//! are pushed onto a warnings list instead of failing the command.

pub mod explain;
pub mod fix;
pub mod risk;
pub mod scan;
pub mod unused;
pub mod update;

pub use explain::{diagnose, explain, ExplainReport, Issue, IssueKind, Severity};
pub use fix::{fix_commands, FixReport};
pub use risk::{risk, score_package, RiskEntry, RiskLevel, RiskReport, RiskScore, RiskSummary};
pub use scan::{scan, ScanReport, ScanTotals};
pub use unused::{unused, UnusedReport};
pub use update::{suggest, update, UpdateReport, UpdateSuggestion, VersionChangeType};
