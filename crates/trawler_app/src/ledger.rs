use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use trawler_core::{ItemOutcome, RecoveryOutcome, RunReport};
use trawler_engine::AtomicFileWriter;

pub const LEDGER_FILE_NAME: &str = ".trawler_ledger.ron";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerOutcome {
    Completed {
        recoveries: u32,
    },
    AlreadyPresent,
    TriggerFailed {
        reason: String,
    },
    Failed {
        recoveries: u32,
        last_recovery: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub identity: String,
    pub outcome: LedgerOutcome,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerCounters {
    pub steps: u64,
    pub accepted: usize,
    pub filtered: usize,
    pub duplicates: usize,
    pub unreadable: usize,
    pub completed: usize,
    pub already_present: usize,
    pub trigger_failed: usize,
    pub failed: usize,
}

/// Record of one run, written next to the downloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger {
    /// RFC 3339, UTC.
    pub finished_at: String,
    pub list_url: String,
    /// Why the run stopped early, if it did.
    pub error: Option<String>,
    pub accepted: Vec<String>,
    pub outcomes: Vec<LedgerEntry>,
    pub counters: LedgerCounters,
}

impl Ledger {
    pub fn from_report(
        report: &RunReport,
        list_url: &str,
        error: Option<String>,
        finished_at: DateTime<Utc>,
    ) -> Self {
        let stats = &report.stats;
        Self {
            finished_at: finished_at.to_rfc3339(),
            list_url: list_url.to_string(),
            error,
            accepted: report.accepted.iter().map(|id| id.to_string()).collect(),
            outcomes: report
                .records
                .iter()
                .map(|record| LedgerEntry {
                    identity: record.identity.to_string(),
                    outcome: record.outcome.clone().into(),
                })
                .collect(),
            counters: LedgerCounters {
                steps: stats.steps,
                accepted: report.accepted.len(),
                filtered: stats.filtered,
                duplicates: stats.duplicates,
                unreadable: stats.unreadable,
                completed: stats.completed,
                already_present: stats.already_present,
                trigger_failed: stats.trigger_failed,
                failed: stats.failed,
            },
        }
    }
}

impl From<ItemOutcome> for LedgerOutcome {
    fn from(outcome: ItemOutcome) -> Self {
        match outcome {
            ItemOutcome::Completed { recoveries } => LedgerOutcome::Completed { recoveries },
            ItemOutcome::AlreadyPresent => LedgerOutcome::AlreadyPresent,
            ItemOutcome::TriggerFailed { reason } => LedgerOutcome::TriggerFailed { reason },
            ItemOutcome::Failed {
                recoveries,
                last_recovery,
            } => LedgerOutcome::Failed {
                recoveries,
                last_recovery: last_recovery.map(|last: RecoveryOutcome| last.to_string()),
            },
        }
    }
}

pub fn save_ledger(dir: &Path, ledger: &Ledger) -> anyhow::Result<PathBuf> {
    let pretty = ron::ser::PrettyConfig::new();
    let content = ron::ser::to_string_pretty(ledger, pretty).context("serializing run ledger")?;
    let path = AtomicFileWriter::new(dir)
        .write(LEDGER_FILE_NAME, &content)
        .with_context(|| format!("writing run ledger to {}", dir.display()))?;
    Ok(path)
}

/// The ledger of the previous run, if one was written.
pub fn load_ledger(dir: &Path) -> anyhow::Result<Option<Ledger>> {
    let path = dir.join(LEDGER_FILE_NAME);
    let content = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => {
            return Err(err).with_context(|| format!("reading run ledger {}", path.display()))
        }
    };
    let ledger = ron::from_str(&content)
        .with_context(|| format!("parsing run ledger {}", path.display()))?;
    Ok(Some(ledger))
}
