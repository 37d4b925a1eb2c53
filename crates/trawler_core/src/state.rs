use crate::report::{RunReport, RunStats};
use crate::{ItemIdentity, ItemOutcome, ItemRecord, MasterList};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumSettings {
    /// Required identity suffix, e.g. `".zip"`.
    pub extension: String,
    /// Field separator inside a label.
    pub separator: char,
    /// Consecutive steps with an unchanged label before the list counts as exhausted.
    pub unchanged_limit: u32,
    /// Consecutive unreadable entries before the session counts as lost.
    pub max_read_failures: u32,
}

impl Default for EnumSettings {
    fn default() -> Self {
        Self {
            extension: ".zip".to_string(),
            separator: ',',
            unchanged_limit: 10,
            max_read_failures: 50,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ScanState {
    #[default]
    Scanning,
    Done,
    Aborted {
        reason: String,
    },
}

/// Enumeration state: the master list plus the unchanged-label discipline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumState {
    settings: EnumSettings,
    master: MasterList,
    scan: ScanState,
    previous_label: Option<String>,
    unchanged: u32,
    read_failures: u32,
    records: Vec<ItemRecord>,
    stats: RunStats,
}

impl Default for EnumState {
    fn default() -> Self {
        Self::new(EnumSettings::default())
    }
}

impl EnumState {
    pub fn new(settings: EnumSettings) -> Self {
        Self {
            settings,
            master: MasterList::new(),
            scan: ScanState::Scanning,
            previous_label: None,
            unchanged: 0,
            read_failures: 0,
            records: Vec::new(),
            stats: RunStats::default(),
        }
    }

    pub fn settings(&self) -> &EnumSettings {
        &self.settings
    }

    pub fn master(&self) -> &MasterList {
        &self.master
    }

    pub fn scan(&self) -> &ScanState {
        &self.scan
    }

    pub fn is_finished(&self) -> bool {
        self.scan != ScanState::Scanning
    }

    pub fn steps(&self) -> u64 {
        self.stats.steps
    }

    pub fn unchanged(&self) -> u32 {
        self.unchanged
    }

    pub fn records(&self) -> &[ItemRecord] {
        &self.records
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    pub fn report(&self) -> RunReport {
        RunReport {
            accepted: self.master.to_vec(),
            records: self.records.clone(),
            stats: self.stats.clone(),
        }
    }

    pub(crate) fn begin_step(&mut self) {
        self.stats.steps += 1;
        self.read_failures = 0;
    }

    pub(crate) fn accept(&mut self, identity: ItemIdentity) -> bool {
        self.master.add(identity)
    }

    pub(crate) fn note_filtered(&mut self) {
        self.stats.filtered += 1;
    }

    pub(crate) fn note_duplicate(&mut self) {
        self.stats.duplicates += 1;
    }

    pub(crate) fn note_unreadable(&mut self) {
        self.stats.unreadable += 1;
    }

    /// Returns the unchanged-step count after comparing against the previous label.
    pub(crate) fn track_label(&mut self, label: Option<String>) -> u32 {
        if label == self.previous_label {
            self.unchanged += 1;
        } else {
            self.unchanged = 0;
        }
        self.previous_label = label;
        self.unchanged
    }

    /// Returns the consecutive read-failure count.
    pub(crate) fn note_read_failure(&mut self) -> u32 {
        self.read_failures += 1;
        self.stats.read_failures += 1;
        self.read_failures
    }

    pub(crate) fn record(&mut self, identity: ItemIdentity, outcome: ItemOutcome) {
        match &outcome {
            ItemOutcome::Completed { .. } => self.stats.completed += 1,
            ItemOutcome::AlreadyPresent => self.stats.already_present += 1,
            ItemOutcome::TriggerFailed { .. } => self.stats.trigger_failed += 1,
            ItemOutcome::Failed { .. } => self.stats.failed += 1,
        }
        self.records.push(ItemRecord { identity, outcome });
    }

    pub(crate) fn finish(&mut self) {
        self.scan = ScanState::Done;
    }

    pub(crate) fn abort(&mut self, reason: String) {
        self.scan = ScanState::Aborted { reason };
    }
}
