//! Trawler engine: drives the list, the transfers and the recovery surface.
mod clock;
mod config;
mod enumerator;
mod error;
mod monitor;
mod recovery;
mod store;
mod surface;
mod trigger;
pub mod webdriver;

pub use clock::{poll_until, Clock, ManualClock, SystemClock};
pub use config::{EngineConfig, ListSettings, MonitorSettings, RecoverySettings, TriggerSettings};
pub use enumerator::{ItemEnumerator, Step};
pub use error::{EnumerationError, StoreError, SurfaceError};
pub use monitor::TransferMonitor;
pub use recovery::{Recover, RecoveryAgent};
pub use store::{ensure_download_dir, AtomicFileWriter, pick_transient, ArtifactStore, LocalDir};
pub use surface::{BrowserSession, ItemActions, TransferEntry, TransferStatusView, VirtualList};
pub use trigger::{AcquisitionTrigger, TriggerResult};
