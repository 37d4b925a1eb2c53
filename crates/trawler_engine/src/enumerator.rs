use std::collections::BTreeSet;
use std::time::Duration;

use trawler_core::{
    update, Effect, EnumState, ItemIdentity, ItemOutcome, Msg, RunReport, SkipReason,
    TransferHandle,
};
use trawler_logging::{trawl_error, trawl_info, trawl_warn};

use crate::clock::{poll_until, Clock};
use crate::config::EngineConfig;
use crate::monitor::TransferMonitor;
use crate::recovery::RecoveryAgent;
use crate::store::{pick_transient, ArtifactStore};
use crate::surface::BrowserSession;
use crate::trigger::{AcquisitionTrigger, TriggerResult};
use crate::{EnumerationError, SurfaceError};

/// Result of one enumeration step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Continue,
    Done,
    Fatal(EnumerationError),
}

/// Walks the virtualized list and acquires every new qualifying item, one at a time.
pub struct ItemEnumerator<'a, S: ?Sized, A: ?Sized, C: ?Sized> {
    session: &'a mut S,
    store: &'a A,
    clock: &'a C,
    config: &'a EngineConfig,
    state: EnumState,
}

impl<'a, S, A, C> ItemEnumerator<'a, S, A, C>
where
    S: BrowserSession + ?Sized,
    A: ArtifactStore + ?Sized,
    C: Clock + ?Sized,
{
    pub fn new(session: &'a mut S, store: &'a A, clock: &'a C, config: &'a EngineConfig) -> Self {
        Self {
            session,
            store,
            clock,
            config,
            state: EnumState::new(config.list.enumeration.clone()),
        }
    }

    pub fn state(&self) -> &EnumState {
        &self.state
    }

    pub fn report(&self) -> RunReport {
        self.state.report()
    }

    /// Waits for the list, then steps until the list is exhausted or the run fails.
    ///
    /// The partial report stays available through [`Self::report`] after an error.
    pub fn run(&mut self) -> Result<RunReport, EnumerationError> {
        let ready_timeout = self.config.list.ready_timeout;
        match self.wait_for_list(ready_timeout) {
            Ok(true) => trawl_info!("List rendered. Proceeding with item checks..."),
            Ok(false) => {
                let err = EnumerationError::ReadyTimeout(ready_timeout);
                trawl_error!("Timed out waiting for the list: {}", err);
                return Err(err);
            }
            Err(err) => return Err(EnumerationError::SessionLost(err.to_string())),
        }
        if let Err(err) = self.session.prepare() {
            if err.is_fatal() {
                return Err(EnumerationError::SessionLost(err.to_string()));
            }
            trawl_warn!("Could not prepare the list: {}", err);
        }

        let result = loop {
            match self.step() {
                Step::Continue => {}
                Step::Done => break Ok(()),
                Step::Fatal(err) => {
                    trawl_error!("Enumeration stopped: {}", err);
                    break Err(err);
                }
            }
        };

        trawl_info!("Total items added: {}", self.state.master().len());
        result.map(|()| self.report())
    }

    pub fn step(&mut self) -> Step {
        let render_timeout = self.config.list.render_timeout;
        match self.wait_for_list(render_timeout) {
            Ok(true) => {}
            Ok(false) => return Step::Fatal(EnumerationError::ListTimeout(render_timeout)),
            Err(err) => return Step::Fatal(EnumerationError::SessionLost(err.to_string())),
        }

        let msg = match self.session.current_label() {
            Ok(label) => Msg::LabelRead(label),
            Err(err) if err.is_fatal() => {
                return Step::Fatal(EnumerationError::SessionLost(err.to_string()))
            }
            Err(err) => {
                trawl_warn!("Could not read the focused entry ({}). Re-reading.", err);
                Msg::ReadFailed {
                    reason: err.to_string(),
                }
            }
        };

        let mut step = Step::Continue;
        for effect in self.dispatch(msg) {
            match effect {
                Effect::Skip { label, reason } => self.log_skip(&label, &reason),
                Effect::Acquire { identity } => {
                    trawl_info!("Tracking: {}", identity);
                    let outcome = self.acquire(&identity);
                    trawl_info!("{}: {}", identity, outcome);
                    self.dispatch(Msg::AcquisitionFinished { identity, outcome });
                }
                Effect::Advance => {
                    if let Err(err) = self.session.advance() {
                        if err.is_fatal() {
                            return Step::Fatal(EnumerationError::SessionLost(err.to_string()));
                        }
                        trawl_warn!("Failed to advance the list: {}", err);
                    }
                }
                Effect::Finish { unchanged_steps } => {
                    trawl_info!(
                        "Focused entry unchanged for {} steps. Enumeration complete.",
                        unchanged_steps
                    );
                    step = Step::Done;
                }
                Effect::Abort { reason } => {
                    step = Step::Fatal(EnumerationError::SessionLost(reason));
                }
            }
        }

        if step == Step::Continue {
            self.clock.sleep(self.config.list.step_pace);
        }
        step
    }

    fn dispatch(&mut self, msg: Msg) -> Vec<Effect> {
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        effects
    }

    fn wait_for_list(&mut self, timeout: Duration) -> Result<bool, SurfaceError> {
        let session = &mut *self.session;
        let rendered = poll_until(self.clock, timeout, self.config.list.render_poll, || {
            match session.is_rendered() {
                Ok(rendered) => Ok(rendered.then_some(())),
                Err(err) if err.is_fatal() => Err(err),
                Err(err) => {
                    trawl_warn!("List not readable yet: {}", err);
                    Ok(None)
                }
            }
        })?;
        Ok(rendered.is_some())
    }

    fn acquire(&mut self, identity: &ItemIdentity) -> ItemOutcome {
        if self.store.exists(identity.as_str()) {
            trawl_info!("File already exists locally: {}", identity);
            return ItemOutcome::AlreadyPresent;
        }
        trawl_info!("File not found locally. Triggering transfer: {}", identity);

        let before = self.store.entries().unwrap_or_else(|err| {
            trawl_warn!("Could not list download directory: {}", err);
            BTreeSet::new()
        });

        let fired = AcquisitionTrigger::new(&mut *self.session, self.clock, &self.config.trigger)
            .fire(identity);
        if let TriggerResult::Failed { reason } = fired {
            return ItemOutcome::TriggerFailed { reason };
        }

        let handle = self.detect_transfer(identity, &before);

        match self.session.refocus() {
            Ok(()) => trawl_info!("Returned to the list entry."),
            Err(err) => trawl_warn!("Could not return to the list entry: {}", err),
        }

        let mut agent = RecoveryAgent::new(&mut *self.session, self.clock, &self.config.recovery);
        TransferMonitor::new(self.store, self.clock, &self.config.monitor).watch(handle, &mut agent)
    }

    /// Finds the in-progress file by diffing the directory against `before`.
    fn detect_transfer(&self, identity: &ItemIdentity, before: &BTreeSet<String>) -> TransferHandle {
        let final_name = identity.as_str();
        let derived = self.config.derived_transient_name(final_name);
        let suffix = self.config.trigger.transient_suffix.as_str();
        let store = self.store;

        let found = poll_until(
            self.clock,
            self.config.trigger.start_timeout,
            self.config.trigger.start_poll,
            || {
                if store.exists(final_name) {
                    return Ok(Some(final_name.to_string()));
                }
                let appeared: BTreeSet<String> =
                    store.entries()?.difference(before).cloned().collect();
                Ok::<_, std::io::Error>(pick_transient(&appeared, &derived, suffix))
            },
        );

        match found {
            Ok(Some(name)) if name == final_name => {
                trawl_info!("Transfer finished immediately: {}", final_name);
                TransferHandle::new(final_name, derived)
            }
            Ok(Some(name)) => {
                trawl_info!("Transfer started: {}", name);
                let handle = TransferHandle::new(final_name, name.as_str())
                    .with_derived_name(derived.as_str());
                match store.size_of(&name) {
                    Ok(Some(size)) => handle.with_baseline(size),
                    _ => handle,
                }
            }
            Ok(None) => {
                trawl_warn!(
                    "No new file appeared within {:?}; watching {}",
                    self.config.trigger.start_timeout,
                    derived
                );
                TransferHandle::new(final_name, derived)
            }
            Err(err) => {
                trawl_warn!("Could not list download directory: {}; watching {}", err, derived);
                TransferHandle::new(final_name, derived)
            }
        }
    }

    fn log_skip(&self, label: &str, reason: &SkipReason) {
        match reason {
            SkipReason::Unparseable(err) => trawl_warn!("Skipped entry {:?}: {}", label, err),
            SkipReason::ExtensionMismatch => trawl_info!(
                "Skipped non-{} file: {}",
                self.config.list.enumeration.extension,
                label
            ),
            SkipReason::Duplicate => trawl_info!("Skipped duplicate: {}", label),
        }
    }
}
