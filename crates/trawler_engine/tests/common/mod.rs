#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::io;
use std::rc::Rc;
use std::sync::Once;

use trawler_core::RecoveryOutcome;
use trawler_engine::{
    ArtifactStore, Clock, ItemActions, ManualClock, Recover, SurfaceError, TransferEntry,
    TransferStatusView, VirtualList,
};

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(trawler_logging::initialize_for_tests);
}

/// In-memory download directory shared between a test and its fake session.
#[derive(Debug, Default)]
pub struct FakeStore {
    files: RefCell<BTreeMap<String, u64>>,
}

impl FakeStore {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn put(&self, name: &str, size: u64) {
        self.files.borrow_mut().insert(name.to_string(), size);
    }
}

impl ArtifactStore for FakeStore {
    fn exists(&self, name: &str) -> bool {
        self.files.borrow().contains_key(name)
    }

    fn size_of(&self, name: &str) -> io::Result<Option<u64>> {
        Ok(self.files.borrow().get(name).copied())
    }

    fn entries(&self) -> io::Result<BTreeSet<String>> {
        Ok(self.files.borrow().keys().cloned().collect())
    }
}

/// What one monitor poll should see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Poll {
    Final,
    Partial(u64),
    Missing,
}

/// Store that replays one scripted state per poll; every poll starts by
/// checking the final name.
pub struct ScriptedStore {
    final_name: String,
    polls: RefCell<VecDeque<Poll>>,
    current: RefCell<Poll>,
    exhausted: Poll,
}

impl ScriptedStore {
    pub fn new(final_name: &str, polls: &[Poll], exhausted: Poll) -> Self {
        Self {
            final_name: final_name.to_string(),
            polls: RefCell::new(polls.iter().copied().collect()),
            current: RefCell::new(Poll::Missing),
            exhausted,
        }
    }

    pub fn remaining(&self) -> usize {
        self.polls.borrow().len()
    }
}

impl ArtifactStore for ScriptedStore {
    fn exists(&self, name: &str) -> bool {
        if name != self.final_name {
            return false;
        }
        let next = self.polls.borrow_mut().pop_front().unwrap_or(self.exhausted);
        *self.current.borrow_mut() = next;
        next == Poll::Final
    }

    fn size_of(&self, _name: &str) -> io::Result<Option<u64>> {
        Ok(match *self.current.borrow() {
            Poll::Partial(size) => Some(size),
            Poll::Final | Poll::Missing => None,
        })
    }

    fn entries(&self) -> io::Result<BTreeSet<String>> {
        Ok(BTreeSet::new())
    }
}

/// Records every recovery call together with the clock's sleep count.
pub struct CountingRecovery<'a> {
    clock: &'a ManualClock,
    outcome: RecoveryOutcome,
    pub calls: Vec<(String, u64)>,
}

impl<'a> CountingRecovery<'a> {
    pub fn new(clock: &'a ManualClock, outcome: RecoveryOutcome) -> Self {
        Self {
            clock,
            outcome,
            calls: Vec::new(),
        }
    }
}

impl Recover for CountingRecovery<'_> {
    fn recover(&mut self, identity: &str) -> RecoveryOutcome {
        self.calls.push((identity.to_string(), self.clock.sleeps()));
        self.outcome
    }
}

#[derive(Debug, Clone)]
pub struct FakeEntry {
    pub label: String,
    pub actions: Vec<String>,
}

impl FakeEntry {
    pub fn new(label: &str, actions: &[&str]) -> Self {
        Self {
            label: label.to_string(),
            actions: actions.iter().map(|a| a.to_string()).collect(),
        }
    }
}

/// Scripted browser session: a list of labels, an acquire control, and a status view.
pub struct FakeSession {
    labels: Vec<Option<String>>,
    cursor: usize,
    pub rendered: bool,
    pub read_errors: VecDeque<SurfaceError>,
    /// Every read after this many successful ones reports a lost session.
    pub lost_after_reads: Option<u32>,
    reads: u32,
    /// `Some(n)`: the control is ready on the n-th check; `None`: never.
    pub control_ready_on: Option<u32>,
    pub control_checks: u32,
    pub advances: u32,
    pub triggered: Vec<Option<String>>,
    pub refocused: u32,
    on_trigger: Option<Box<dyn FnMut(&str)>>,
    pub entries: Vec<FakeEntry>,
    pub entries_error: Option<SurfaceError>,
    pub status_open: bool,
    pub status_opened: u32,
    pub invoked: Vec<(usize, String)>,
}

impl FakeSession {
    pub fn new(labels: &[&str]) -> Self {
        Self {
            labels: labels.iter().map(|l| Some(l.to_string())).collect(),
            cursor: 0,
            rendered: true,
            read_errors: VecDeque::new(),
            lost_after_reads: None,
            reads: 0,
            control_ready_on: Some(1),
            control_checks: 0,
            advances: 0,
            triggered: Vec::new(),
            refocused: 0,
            on_trigger: None,
            entries: Vec::new(),
            entries_error: None,
            status_open: false,
            status_opened: 0,
            invoked: Vec::new(),
        }
    }

    /// Runs with the focused label whenever the acquire control is clicked.
    pub fn on_trigger(mut self, hook: impl FnMut(&str) + 'static) -> Self {
        self.on_trigger = Some(Box::new(hook));
        self
    }

    fn focused(&self) -> Option<String> {
        self.labels.get(self.cursor).cloned().flatten()
    }
}

impl VirtualList for FakeSession {
    fn is_rendered(&mut self) -> Result<bool, SurfaceError> {
        Ok(self.rendered)
    }

    fn current_label(&mut self) -> Result<Option<String>, SurfaceError> {
        if let Some(err) = self.read_errors.pop_front() {
            return Err(err);
        }
        if self.lost_after_reads.is_some_and(|limit| self.reads >= limit) {
            return Err(SurfaceError::SessionLost("browser closed".to_string()));
        }
        self.reads += 1;
        Ok(self.focused())
    }

    fn advance(&mut self) -> Result<(), SurfaceError> {
        self.advances += 1;
        if self.cursor + 1 < self.labels.len() {
            self.cursor += 1;
        }
        Ok(())
    }
}

impl ItemActions for FakeSession {
    fn reveal_focused(&mut self) -> Result<(), SurfaceError> {
        Ok(())
    }

    fn acquire_control_ready(&mut self) -> Result<bool, SurfaceError> {
        self.control_checks += 1;
        Ok(matches!(self.control_ready_on, Some(n) if self.control_checks >= n))
    }

    fn invoke_acquire_control(&mut self) -> Result<(), SurfaceError> {
        let label = self.focused();
        if let (Some(hook), Some(label)) = (self.on_trigger.as_mut(), label.as_deref()) {
            hook(label);
        }
        self.triggered.push(label);
        self.control_checks = 0;
        Ok(())
    }

    fn refocus(&mut self) -> Result<(), SurfaceError> {
        self.refocused += 1;
        Ok(())
    }
}

impl TransferStatusView for FakeSession {
    fn open_status_view(&mut self) -> Result<(), SurfaceError> {
        self.status_open = true;
        self.status_opened += 1;
        Ok(())
    }

    fn close_status_view(&mut self) -> Result<(), SurfaceError> {
        self.status_open = false;
        Ok(())
    }

    fn transfer_entries(&mut self) -> Result<Vec<TransferEntry>, SurfaceError> {
        if let Some(err) = self.entries_error.clone() {
            return Err(err);
        }
        Ok(self
            .entries
            .iter()
            .enumerate()
            .map(|(index, entry)| TransferEntry {
                index,
                label: entry.label.clone(),
            })
            .collect())
    }

    fn entry_actions(&mut self, entry: &TransferEntry) -> Result<Vec<String>, SurfaceError> {
        Ok(self.entries[entry.index].actions.clone())
    }

    fn invoke_entry_action(
        &mut self,
        entry: &TransferEntry,
        action: &str,
    ) -> Result<(), SurfaceError> {
        self.invoked.push((entry.index, action.to_string()));
        Ok(())
    }
}

pub fn elapsed_secs(clock: &ManualClock) -> u64 {
    clock.now().as_secs()
}
