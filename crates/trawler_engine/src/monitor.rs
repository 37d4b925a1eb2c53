use trawler_core::{Directive, ItemOutcome, Probe, TransferHandle, TransferTracker};
use trawler_logging::{trawl_debug, trawl_error, trawl_info, trawl_warn};

use crate::clock::Clock;
use crate::config::MonitorSettings;
use crate::recovery::Recover;
use crate::store::ArtifactStore;

/// Polls the download directory until a transfer finalizes or is given up.
pub struct TransferMonitor<'a, A: ?Sized, C: ?Sized> {
    store: &'a A,
    clock: &'a C,
    settings: &'a MonitorSettings,
}

impl<'a, A, C> TransferMonitor<'a, A, C>
where
    A: ArtifactStore + ?Sized,
    C: Clock + ?Sized,
{
    pub fn new(store: &'a A, clock: &'a C, settings: &'a MonitorSettings) -> Self {
        Self {
            store,
            clock,
            settings,
        }
    }

    /// Blocks until the transfer is `Completed` or `Failed`.
    pub fn watch<R>(&self, handle: TransferHandle, recovery: &mut R) -> ItemOutcome
    where
        R: Recover + ?Sized,
    {
        trawl_info!(
            "Waiting for {} to complete (transient {})...",
            handle.final_name,
            handle.transient_name
        );
        let mut tracker = TransferTracker::new(
            handle,
            self.settings.stall_threshold,
            self.settings.max_recovery_attempts,
        );

        loop {
            let probe = self.probe(&mut tracker);
            let directive = tracker.observe(probe);
            log_poll(&tracker, probe, directive);

            match directive {
                Directive::Complete | Directive::GiveUp => break,
                Directive::Poll => {}
                Directive::Recover => {
                    let name = tracker.handle().final_name.clone();
                    let outcome = recovery.recover(&name);
                    if tracker.recovery_finished(outcome) == Directive::GiveUp {
                        trawl_error!(
                            "Giving up on {} after {} recovery attempts",
                            name,
                            tracker.recoveries()
                        );
                        break;
                    }
                }
            }
            self.clock.sleep(self.settings.poll_interval);
        }

        tracker.outcome().unwrap_or(ItemOutcome::Failed {
            recoveries: tracker.recoveries(),
            last_recovery: None,
        })
    }

    fn probe(&self, tracker: &mut TransferTracker) -> Probe {
        let handle = tracker.handle();
        if self.store.exists(&handle.final_name) {
            return Probe::Finalized;
        }
        if let Some(size) = self.size_of(&handle.transient_name) {
            return Probe::Partial { size };
        }

        // A provisional name may have been swapped for the derived one.
        let Some(derived) = handle.rename_candidate().map(str::to_owned) else {
            return Probe::Absent;
        };
        match self.size_of(&derived) {
            Some(size) => {
                trawl_info!(
                    "{} was renamed to {}; following it.",
                    handle.transient_name,
                    derived
                );
                tracker.retarget(derived);
                Probe::Partial { size }
            }
            None => Probe::Absent,
        }
    }

    fn size_of(&self, name: &str) -> Option<u64> {
        self.store.size_of(name).unwrap_or_else(|err| {
            trawl_warn!("Could not read size of {}: {}", name, err);
            None
        })
    }
}

fn log_poll(tracker: &TransferTracker, probe: Probe, directive: Directive) {
    let handle = tracker.handle();
    match (probe, directive) {
        (Probe::Finalized, _) => {
            trawl_info!("File {} exists. Transfer complete.", handle.final_name)
        }
        (Probe::Absent, _) => trawl_info!(
            "Neither {} nor {} found; transfer may have failed or been renamed.",
            handle.transient_name,
            handle.final_name
        ),
        (Probe::Partial { .. }, Directive::Recover) => trawl_info!(
            "{} stopped growing; checking for a 'Resume' control...",
            handle.transient_name
        ),
        (Probe::Partial { size }, _) if handle.stall_count > 0 => trawl_debug!(
            "{} size unchanged at {} for {} checks.",
            handle.transient_name,
            size,
            handle.stall_count
        ),
        (Probe::Partial { size }, _) => trawl_info!(
            "{} size: {}. Still downloading...",
            handle.transient_name,
            size
        ),
    }
}
