use trawler_core::RecoveryOutcome;
use trawler_logging::{trawl_error, trawl_info, trawl_warn};

use crate::clock::Clock;
use crate::config::RecoverySettings;
use crate::surface::{TransferEntry, TransferStatusView};
use crate::SurfaceError;

/// Something that can try to unblock the transfer of `identity`.
pub trait Recover {
    fn recover(&mut self, identity: &str) -> RecoveryOutcome;
}

/// Resumes a paused transfer through the transfer-status view.
///
/// Never fails: surface errors are logged and reported as an outcome, and
/// focus is handed back to the list view on every path.
pub struct RecoveryAgent<'a, S: ?Sized, C: ?Sized> {
    session: &'a mut S,
    clock: &'a C,
    settings: &'a RecoverySettings,
}

impl<'a, S, C> RecoveryAgent<'a, S, C>
where
    S: TransferStatusView + ?Sized,
    C: Clock + ?Sized,
{
    pub fn new(session: &'a mut S, clock: &'a C, settings: &'a RecoverySettings) -> Self {
        Self {
            session,
            clock,
            settings,
        }
    }

    fn inspect(&mut self, identity: &str) -> Result<RecoveryOutcome, Failure> {
        self.session.open_status_view().map_err(Failure::Listing)?;
        self.clock.sleep(self.settings.status_settle);

        let entries = self.session.transfer_entries().map_err(Failure::Listing)?;
        let Some(entry) = find_entry(&entries, identity) else {
            return Ok(RecoveryOutcome::NotFound);
        };

        let actions = self.session.entry_actions(entry).map_err(Failure::Entry)?;
        let resume = self.settings.resume_label.as_str();
        if !actions.iter().any(|action| action.trim() == resume) {
            return Ok(RecoveryOutcome::NoActionTaken);
        }
        self.session
            .invoke_entry_action(entry, resume)
            .map_err(Failure::Entry)?;
        Ok(RecoveryOutcome::Resumed)
    }
}

impl<S, C> Recover for RecoveryAgent<'_, S, C>
where
    S: TransferStatusView + ?Sized,
    C: Clock + ?Sized,
{
    fn recover(&mut self, identity: &str) -> RecoveryOutcome {
        trawl_info!("Checking transfer status view for {}...", identity);
        let outcome = match self.inspect(identity) {
            Ok(outcome) => outcome,
            Err(Failure::Listing(err)) => {
                trawl_error!("Error reading transfer status view: {}", err);
                RecoveryOutcome::NotFound
            }
            Err(Failure::Entry(err)) => {
                trawl_error!("Error resuming transfer of {}: {}", identity, err);
                RecoveryOutcome::NoActionTaken
            }
        };
        if let Err(err) = self.session.close_status_view() {
            trawl_warn!("Failed to return from transfer status view: {}", err);
        }

        match outcome {
            RecoveryOutcome::Resumed => trawl_info!("Clicked 'Resume' for {}.", identity),
            RecoveryOutcome::NoActionTaken => {
                trawl_info!("No 'Resume' control found for {}.", identity)
            }
            RecoveryOutcome::NotFound => {
                trawl_warn!("No transfer entry matches {}.", identity)
            }
        }
        outcome
    }
}

enum Failure {
    Listing(SurfaceError),
    Entry(SurfaceError),
}

fn find_entry<'e>(entries: &'e [TransferEntry], identity: &str) -> Option<&'e TransferEntry> {
    entries.iter().find(|entry| entry.label.contains(identity))
}
