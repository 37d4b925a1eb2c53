use crate::{ItemOutcome, RecoveryOutcome};

/// What one poll of the download directory saw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    /// A file named exactly like the identity exists.
    Finalized,
    /// Only the transient file exists, with this size in bytes.
    Partial { size: u64 },
    /// Neither file exists.
    Absent,
}

/// What the monitor should do after a poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    Complete,
    Poll,
    Recover,
    GiveUp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransferPhase {
    #[default]
    Waiting,
    InProgress,
    Stalled,
    Completed,
    Failed,
}

impl TransferPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, TransferPhase::Completed | TransferPhase::Failed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferHandle {
    pub final_name: String,
    pub transient_name: String,
    /// Name the transfer settles under once it leaves a provisional name.
    pub derived_name: Option<String>,
    pub last_observed_size: Option<u64>,
    pub stall_count: u32,
}

impl TransferHandle {
    pub fn new(final_name: impl Into<String>, transient_name: impl Into<String>) -> Self {
        Self {
            final_name: final_name.into(),
            transient_name: transient_name.into(),
            derived_name: None,
            last_observed_size: None,
            stall_count: 0,
        }
    }

    /// Seed the size seen when the transient file was first detected.
    pub fn with_baseline(mut self, size: u64) -> Self {
        self.last_observed_size = Some(size);
        self
    }

    pub fn with_derived_name(mut self, name: impl Into<String>) -> Self {
        self.derived_name = Some(name.into());
        self
    }

    /// The derived name, when the transfer is currently tracked under another one.
    pub fn rename_candidate(&self) -> Option<&str> {
        self.derived_name
            .as_deref()
            .filter(|derived| *derived != self.transient_name)
    }
}

/// Size-based stall detection for one transfer.
///
/// The recovery budget counts recoveries since the last observed size
/// change; progress refills it. `None` never gives up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferTracker {
    handle: TransferHandle,
    phase: TransferPhase,
    stall_threshold: u32,
    max_recoveries: Option<u32>,
    recoveries: u32,
    recoveries_since_progress: u32,
    last_recovery: Option<RecoveryOutcome>,
    polls: u64,
}

impl TransferTracker {
    pub fn new(handle: TransferHandle, stall_threshold: u32, max_recoveries: Option<u32>) -> Self {
        Self {
            handle,
            phase: TransferPhase::Waiting,
            stall_threshold: stall_threshold.max(1),
            max_recoveries,
            recoveries: 0,
            recoveries_since_progress: 0,
            last_recovery: None,
            polls: 0,
        }
    }

    pub fn handle(&self) -> &TransferHandle {
        &self.handle
    }

    pub fn phase(&self) -> TransferPhase {
        self.phase
    }

    pub fn polls(&self) -> u64 {
        self.polls
    }

    pub fn recoveries(&self) -> u32 {
        self.recoveries
    }

    /// Follow the transfer after it was renamed on disk.
    pub fn retarget(&mut self, transient_name: impl Into<String>) {
        self.handle.transient_name = transient_name.into();
    }

    pub fn observe(&mut self, probe: Probe) -> Directive {
        match self.phase {
            TransferPhase::Completed => return Directive::Complete,
            TransferPhase::Failed => return Directive::GiveUp,
            _ => {}
        }
        self.polls += 1;

        match probe {
            Probe::Finalized => {
                self.phase = TransferPhase::Completed;
                Directive::Complete
            }
            Probe::Partial { size } if self.handle.last_observed_size == Some(size) => {
                self.handle.stall_count += 1;
                if self.handle.stall_count >= self.stall_threshold {
                    self.phase = TransferPhase::Stalled;
                    self.handle.stall_count = 0;
                    Directive::Recover
                } else {
                    Directive::Poll
                }
            }
            Probe::Partial { size } => {
                self.handle.last_observed_size = Some(size);
                self.handle.stall_count = 0;
                self.recoveries_since_progress = 0;
                self.phase = TransferPhase::InProgress;
                Directive::Poll
            }
            Probe::Absent => {
                self.phase = TransferPhase::Waiting;
                Directive::Recover
            }
        }
    }

    /// Account for a finished recovery pass; `GiveUp` once the budget is spent.
    pub fn recovery_finished(&mut self, outcome: RecoveryOutcome) -> Directive {
        self.recoveries += 1;
        self.recoveries_since_progress += 1;
        self.last_recovery = Some(outcome);
        match self.max_recoveries {
            Some(max) if self.recoveries_since_progress >= max => {
                self.phase = TransferPhase::Failed;
                Directive::GiveUp
            }
            _ => Directive::Poll,
        }
    }

    pub fn outcome(&self) -> Option<ItemOutcome> {
        match self.phase {
            TransferPhase::Completed => Some(ItemOutcome::Completed {
                recoveries: self.recoveries,
            }),
            TransferPhase::Failed => Some(ItemOutcome::Failed {
                recoveries: self.recoveries,
                last_recovery: self.last_recovery,
            }),
            _ => None,
        }
    }
}
