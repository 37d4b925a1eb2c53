use trawler_core::ItemIdentity;
use trawler_logging::{trawl_error, trawl_info};

use crate::clock::{poll_until, Clock};
use crate::config::TriggerSettings;
use crate::surface::ItemActions;
use crate::SurfaceError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerResult {
    Triggered,
    Failed { reason: String },
}

/// Starts the transfer for the focused item.
pub struct AcquisitionTrigger<'a, S: ?Sized, C: ?Sized> {
    session: &'a mut S,
    clock: &'a C,
    settings: &'a TriggerSettings,
}

impl<'a, S, C> AcquisitionTrigger<'a, S, C>
where
    S: ItemActions + ?Sized,
    C: Clock + ?Sized,
{
    pub fn new(session: &'a mut S, clock: &'a C, settings: &'a TriggerSettings) -> Self {
        Self {
            session,
            clock,
            settings,
        }
    }

    pub fn fire(&mut self, identity: &ItemIdentity) -> TriggerResult {
        match self.try_fire() {
            Ok(()) => {
                trawl_info!("Clicked the acquire control for {}", identity);
                TriggerResult::Triggered
            }
            Err(reason) => {
                trawl_error!("Failed to trigger transfer for {}: {}", identity, reason);
                TriggerResult::Failed { reason }
            }
        }
    }

    fn try_fire(&mut self) -> Result<(), String> {
        self.session.reveal_focused().map_err(describe)?;
        self.clock.sleep(self.settings.reveal_settle);

        let session = &mut *self.session;
        let ready = poll_until(
            self.clock,
            self.settings.control_timeout,
            self.settings.control_poll,
            || session.acquire_control_ready().map(|ready| ready.then_some(())),
        )
        .map_err(describe)?;
        if ready.is_none() {
            return Err(format!(
                "acquire control not available within {:?}",
                self.settings.control_timeout
            ));
        }

        self.session.invoke_acquire_control().map_err(describe)?;
        self.clock.sleep(self.settings.settle);
        Ok(())
    }
}

fn describe(err: SurfaceError) -> String {
    err.to_string()
}
