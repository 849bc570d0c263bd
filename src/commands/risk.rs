//! Dependency health scoring
//!
//! Scores each production and development dependency from registry
//! metadata and the vulnerability audit:
//! - known vulnerability: +3
//! - last publish older than two years: +2 (older than one year: +1)
//! - no maintainers: +2 (single maintainer: +1)
//! - under 1 000 weekly downloads: +2 (under 10 000: +1)

use crate::domain::DependencyClass;
use crate::lookup::lookup_all;
use crate::progress::Progress;
use crate::project::Project;
use crate::service::{PackageMetadata, Services, VulnerabilityMap};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

const STALE_DAYS: i64 = 730;
const AGING_DAYS: i64 = 365;
const LOW_DOWNLOADS: u64 = 1_000;
const MODEST_DOWNLOADS: u64 = 10_000;

const HIGH_THRESHOLD: u32 = 5;
const MEDIUM_THRESHOLD: u32 = 2;

/// Risk bucket derived from the score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Buckets a score
    pub fn from_score(score: u32) -> Self {
        if score >= HIGH_THRESHOLD {
            RiskLevel::High
        } else if score >= MEDIUM_THRESHOLD {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Score plus the findings that produced it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RiskScore {
    pub score: u32,
    pub level: RiskLevel,
    pub reasons: Vec<String>,
}

/// Scores one package
pub fn score_package(
    metadata: &PackageMetadata,
    vulnerability: Option<&str>,
    now: DateTime<Utc>,
) -> RiskScore {
    let mut score = 0;
    let mut reasons = Vec::new();

    if let Some(severity) = vulnerability {
        score += 3;
        reasons.push(format!("known vulnerability ({})", severity));
    }

    if let Some(published) = metadata.last_published {
        let days = (now - published).num_days();
        if days > STALE_DAYS {
            score += 2;
            reasons.push(format!("last published {} days ago", days));
        } else if days > AGING_DAYS {
            score += 1;
            reasons.push(format!("last published {} days ago", days));
        }
    }

    match metadata.maintainers {
        0 => {
            score += 2;
            reasons.push("no maintainers".to_string());
        }
        1 => {
            score += 1;
            reasons.push("single maintainer".to_string());
        }
        _ => {}
    }

    if metadata.weekly_downloads < LOW_DOWNLOADS {
        score += 2;
        reasons.push(format!("{} weekly downloads", metadata.weekly_downloads));
    } else if metadata.weekly_downloads < MODEST_DOWNLOADS {
        score += 1;
        reasons.push(format!("{} weekly downloads", metadata.weekly_downloads));
    }

    RiskScore {
        score,
        level: RiskLevel::from_score(score),
        reasons,
    }
}

/// One scored dependency
#[derive(Debug, Clone, Serialize)]
pub struct RiskEntry {
    pub name: String,
    pub class: DependencyClass,
    pub locked: Option<String>,
    pub latest: Option<String>,
    pub last_published: Option<DateTime<Utc>>,
    pub maintainers: usize,
    pub weekly_downloads: u64,
    pub vulnerable: bool,
    #[serde(flatten)]
    pub risk: RiskScore,
}

/// Count per level
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RiskSummary {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

/// Scored dependencies, riskiest first
#[derive(Debug, Clone, Default, Serialize)]
pub struct RiskReport {
    /// False when the audit could not run
    pub audit_available: bool,
    pub entries: Vec<RiskEntry>,
    pub summary: RiskSummary,
}

/// Scores every production and development dependency
pub async fn risk(
    project: &Project,
    services: &Services,
    concurrency: usize,
    progress: &mut Progress,
    now: DateTime<Utc>,
    warnings: &mut Vec<String>,
) -> RiskReport {
    let mut seen = BTreeSet::new();
    let targets: Vec<(String, DependencyClass)> = project
        .graph
        .declared
        .iter()
        .filter(|d| {
            matches!(
                d.class,
                DependencyClass::Production | DependencyClass::Development
            )
        })
        .filter(|d| seen.insert(d.name.clone()))
        .map(|d| (d.name.clone(), d.class))
        .collect();
    let names: Vec<String> = targets.iter().map(|(name, _)| name.clone()).collect();

    progress.start(names.len() as u64, "Scoring dependencies");
    let bar = &*progress;
    let metadata = Arc::clone(&services.metadata);
    let (audit, lookups) = tokio::join!(
        services.audit.audit(),
        lookup_all(&names, concurrency, bar, move |name| {
            let metadata = Arc::clone(&metadata);
            async move { metadata.metadata(&name).await }
        })
    );
    progress.finish_and_clear();

    let (audit_available, vulnerable) = match audit {
        Ok(vulnerable) => (true, vulnerable),
        Err(e) => {
            warnings.push(format!("vulnerability audit unavailable: {}", e));
            (false, VulnerabilityMap::new())
        }
    };
    warnings.extend(lookups.warnings);

    let mut report = RiskReport {
        audit_available,
        ..RiskReport::default()
    };
    for (name, class) in targets {
        let Some(metadata) = lookups.results.get(&name) else {
            continue;
        };
        let vulnerability = vulnerable.get(&name).map(String::as_str);
        let risk = score_package(metadata, vulnerability, now);

        match risk.level {
            RiskLevel::High => report.summary.high += 1,
            RiskLevel::Medium => report.summary.medium += 1,
            RiskLevel::Low => report.summary.low += 1,
        }

        report.entries.push(RiskEntry {
            locked: project.graph.locked(&name).map(|p| p.version.clone()),
            latest: metadata.latest.clone(),
            last_published: metadata.last_published,
            maintainers: metadata.maintainers,
            weekly_downloads: metadata.weekly_downloads,
            vulnerable: vulnerability.is_some(),
            name,
            class,
            risk,
        });
    }

    report
        .entries
        .sort_by(|a, b| b.risk.score.cmp(&a.risk.score).then(a.name.cmp(&b.name)));
    report
}
