//! Trawler core: pure enumeration and transfer state machines.
mod effect;
mod identity;
mod master_list;
mod msg;
mod outcome;
mod report;
mod state;
mod transfer;
mod update;

pub use effect::{Effect, SkipReason};
pub use identity::{parse_label, ItemIdentity, LabelError};
pub use master_list::MasterList;
pub use msg::Msg;
pub use outcome::{ItemOutcome, ItemRecord, RecoveryOutcome};
pub use report::{RunReport, RunStats};
pub use state::{EnumSettings, EnumState, ScanState};
pub use transfer::{Directive, Probe, TransferHandle, TransferPhase, TransferTracker};
pub use update::update;
