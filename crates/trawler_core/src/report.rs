use crate::{ItemIdentity, ItemRecord};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RunStats {
    pub steps: u64,
    pub filtered: usize,
    pub duplicates: usize,
    pub unreadable: usize,
    pub read_failures: usize,
    pub completed: usize,
    pub already_present: usize,
    pub trigger_failed: usize,
    pub failed: usize,
}

/// What a run hands to the ledger: accepted identities in order plus outcomes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RunReport {
    pub accepted: Vec<ItemIdentity>,
    pub records: Vec<ItemRecord>,
    pub stats: RunStats,
}

impl RunReport {
    pub fn outcome_for(&self, identity: &str) -> Option<&crate::ItemOutcome> {
        self.records
            .iter()
            .find(|record| record.identity.as_str() == identity)
            .map(|record| &record.outcome)
    }
}
