use std::fmt;

use crate::ItemIdentity;

/// Result of one pass over the transfer-status surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryOutcome {
    Resumed,
    NoActionTaken,
    NotFound,
}

impl fmt::Display for RecoveryOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecoveryOutcome::Resumed => write!(f, "resumed"),
            RecoveryOutcome::NoActionTaken => write!(f, "no action taken"),
            RecoveryOutcome::NotFound => write!(f, "not found"),
        }
    }
}

/// Final outcome for an accepted item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    /// The final file appeared in the download directory.
    Completed { recoveries: u32 },
    /// A file with the identity's name already existed; nothing was triggered.
    AlreadyPresent,
    /// The acquire control never became available.
    TriggerFailed { reason: String },
    /// The recovery budget ran out before the final file appeared.
    Failed {
        recoveries: u32,
        last_recovery: Option<RecoveryOutcome>,
    },
}

impl ItemOutcome {
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            ItemOutcome::Completed { .. } | ItemOutcome::AlreadyPresent
        )
    }
}

impl fmt::Display for ItemOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemOutcome::Completed { recoveries: 0 } => write!(f, "completed"),
            ItemOutcome::Completed { recoveries } => {
                write!(f, "completed after {recoveries} recovery attempts")
            }
            ItemOutcome::AlreadyPresent => write!(f, "already present"),
            ItemOutcome::TriggerFailed { reason } => write!(f, "trigger failed: {reason}"),
            ItemOutcome::Failed {
                recoveries,
                last_recovery: Some(last),
            } => write!(f, "failed after {recoveries} recovery attempts (last: {last})"),
            ItemOutcome::Failed { recoveries, .. } => {
                write!(f, "failed after {recoveries} recovery attempts")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRecord {
    pub identity: ItemIdentity,
    pub outcome: ItemOutcome,
}
