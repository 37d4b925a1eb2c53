mod common;

use std::cell::Cell;
use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

use common::{init_logging, FakeSession, FakeStore};
use pretty_assertions::assert_eq;
use trawler_core::{ItemIdentity, ItemOutcome, RecoveryOutcome};
use trawler_engine::{
    ArtifactStore, Clock, EngineConfig, EnumerationError, ItemEnumerator, ManualClock, Step, SurfaceError,
};

fn config() -> EngineConfig {
    EngineConfig::default_with_download_dir(PathBuf::from("downloads"))
}

/// Clicking the control finishes the transfer instantly.
fn instant_session(store: &Rc<FakeStore>, labels: &[&str]) -> FakeSession {
    let store = Rc::clone(store);
    FakeSession::new(labels).on_trigger(move |label| {
        let name = label.split(',').next().unwrap_or(label).trim();
        store.put(name, 42);
    })
}

fn names(ids: &[ItemIdentity]) -> Vec<&str> {
    ids.iter().map(ItemIdentity::as_str).collect()
}

#[test]
fn acquires_each_distinct_qualifying_item_once() {
    init_logging();
    let store = FakeStore::new();
    let clock = ManualClock::new();
    let config = config();
    let mut session = instant_session(
        &store,
        &[
            "a.zip, Compressed, 1 MB",
            "notes.txt, Text",
            "b.zip, Compressed",
            "a.zip, Compressed, copy",
            "c.zip",
        ],
    );

    let mut enumerator = ItemEnumerator::new(&mut session, &*store, &clock, &config);
    let report = enumerator.run().unwrap();

    assert_eq!(names(&report.accepted), vec!["a.zip", "b.zip", "c.zip"]);
    assert_eq!(report.stats.completed, 3);
    assert_eq!(report.stats.filtered, 1);
    assert_eq!(report.stats.duplicates, 1);
    assert_eq!(
        report.outcome_for("b.zip"),
        Some(&ItemOutcome::Completed { recoveries: 0 })
    );

    let triggered: Vec<String> = session.triggered.iter().flatten().cloned().collect();
    assert!(triggered.iter().all(|label| !label.starts_with("notes.txt")));
    assert_eq!(triggered.len(), 3);
    assert_eq!(session.refocused, 3);
}

#[test]
fn stops_ten_steps_after_the_label_stops_changing() {
    init_logging();
    let store = FakeStore::new();
    let clock = ManualClock::new();
    let config = config();
    let mut session = instant_session(&store, &["1.zip", "2.zip", "3.zip", "4.zip", "5.zip"]);

    let mut enumerator = ItemEnumerator::new(&mut session, &*store, &clock, &config);
    enumerator.run().unwrap();

    assert_eq!(enumerator.state().steps(), 15);
    drop(enumerator);
    assert_eq!(session.advances, 14);
}

#[test]
fn existing_local_file_is_not_triggered() {
    init_logging();
    let store = FakeStore::new();
    store.put("a.zip", 7);
    let clock = ManualClock::new();
    let config = config();
    let mut session = instant_session(&store, &["a.zip, Compressed"]);

    let mut enumerator = ItemEnumerator::new(&mut session, &*store, &clock, &config);
    let report = enumerator.run().unwrap();

    assert_eq!(report.outcome_for("a.zip"), Some(&ItemOutcome::AlreadyPresent));
    drop(enumerator);
    assert!(session.triggered.is_empty());
}

#[test]
fn trigger_failure_skips_item_and_continues() {
    init_logging();
    let store = FakeStore::new();
    let clock = ManualClock::new();
    let config = config();
    let mut session = instant_session(&store, &["a.zip", "b.zip"]);
    session.control_ready_on = None;

    let mut enumerator = ItemEnumerator::new(&mut session, &*store, &clock, &config);
    let report = enumerator.run().unwrap();

    assert_eq!(names(&report.accepted), vec!["a.zip", "b.zip"]);
    assert_eq!(report.stats.trigger_failed, 2);
    assert!(matches!(
        report.outcome_for("a.zip"),
        Some(ItemOutcome::TriggerFailed { .. })
    ));
}

#[test]
fn list_that_never_renders_aborts_the_run() {
    init_logging();
    let store = FakeStore::new();
    let clock = ManualClock::new();
    let config = config();
    let mut session = FakeSession::new(&["a.zip"]);
    session.rendered = false;

    let mut enumerator = ItemEnumerator::new(&mut session, &*store, &clock, &config);
    let err = enumerator.run().unwrap_err();

    assert_eq!(err, EnumerationError::ReadyTimeout(Duration::from_secs(300)));
    assert_eq!(clock.now(), Duration::from_secs(300));
    assert!(enumerator.report().accepted.is_empty());
}

#[test]
fn stale_reads_are_retried_without_losing_progress() {
    init_logging();
    let store = FakeStore::new();
    let clock = ManualClock::new();
    let config = config();
    let mut session = instant_session(&store, &["a.zip", "b.zip"]);
    session
        .read_errors
        .push_back(SurfaceError::Stale("row detached".to_string()));
    session
        .read_errors
        .push_back(SurfaceError::Stale("row detached".to_string()));

    let mut enumerator = ItemEnumerator::new(&mut session, &*store, &clock, &config);
    assert_eq!(enumerator.step(), Step::Continue);
    assert_eq!(enumerator.step(), Step::Continue);
    assert_eq!(enumerator.state().steps(), 0);

    let report = enumerator.run().unwrap();
    assert_eq!(names(&report.accepted), vec!["a.zip", "b.zip"]);
    assert_eq!(report.stats.read_failures, 2);
}

#[test]
fn lost_session_is_fatal_but_keeps_partial_report() {
    init_logging();
    let store = FakeStore::new();
    let clock = ManualClock::new();
    let config = config();
    let mut session = instant_session(&store, &["a.zip", "b.zip", "c.zip"]);
    session.lost_after_reads = Some(2);

    let mut enumerator = ItemEnumerator::new(&mut session, &*store, &clock, &config);
    let err = enumerator.run().unwrap_err();

    assert!(matches!(err, EnumerationError::SessionLost(_)));
    let report = enumerator.report();
    assert_eq!(names(&report.accepted), vec!["a.zip", "b.zip"]);
    assert_eq!(report.stats.completed, 2);
}

#[test]
fn lost_session_surfaces_as_fatal_step() {
    init_logging();
    let store = FakeStore::new();
    let clock = ManualClock::new();
    let config = config();
    let mut session = FakeSession::new(&["a.zip"]);
    session
        .read_errors
        .push_back(SurfaceError::SessionLost("connection refused".to_string()));

    let mut enumerator = ItemEnumerator::new(&mut session, &*store, &clock, &config);
    assert!(matches!(
        enumerator.step(),
        Step::Fatal(EnumerationError::SessionLost(_))
    ));
    assert_eq!(enumerator.state().steps(), 0);
}

#[test]
fn stalled_transfer_goes_through_status_view_until_budget_is_spent() {
    init_logging();
    let store = FakeStore::new();
    let clock = ManualClock::new();
    let mut config = config();
    config.monitor.stall_threshold = 1;
    config.monitor.max_recovery_attempts = Some(2);

    let transient_store = Rc::clone(&store);
    let mut session = FakeSession::new(&["big.zip, 4 GB"]).on_trigger(move |_| {
        transient_store.put("big.zip.crdownload", 1024);
    });

    let mut enumerator = ItemEnumerator::new(&mut session, &*store, &clock, &config);
    let report = enumerator.run().unwrap();

    assert_eq!(
        report.outcome_for("big.zip"),
        Some(&ItemOutcome::Failed {
            recoveries: 2,
            last_recovery: Some(RecoveryOutcome::NotFound),
        })
    );
    drop(enumerator);
    assert_eq!(session.status_opened, 2);
    assert!(!session.status_open);
}

/// Download that starts under a provisional name and is renamed to
/// `big.zip.crdownload` ten seconds later, then grows until it finalizes.
struct RenamingStore {
    clock: Rc<ManualClock>,
    started: Cell<Option<Duration>>,
}

impl RenamingStore {
    fn files(&self) -> BTreeMap<&'static str, u64> {
        let Some(start) = self.started.get() else {
            return BTreeMap::new();
        };
        let elapsed = (self.clock.now() - start).as_secs();
        match elapsed {
            0..10 => BTreeMap::from([("Unconfirmed 1.crdownload", 500)]),
            10..800 => BTreeMap::from([("big.zip.crdownload", 1000 * (elapsed / 10))]),
            _ => BTreeMap::from([("big.zip", 80_000)]),
        }
    }
}

impl ArtifactStore for RenamingStore {
    fn exists(&self, name: &str) -> bool {
        self.files().contains_key(name)
    }

    fn size_of(&self, name: &str) -> io::Result<Option<u64>> {
        Ok(self.files().get(name).copied())
    }

    fn entries(&self) -> io::Result<BTreeSet<String>> {
        Ok(self.files().keys().map(|name| name.to_string()).collect())
    }
}

#[test]
fn provisional_transfer_is_followed_after_rename() {
    init_logging();
    let clock = Rc::new(ManualClock::new());
    let store = Rc::new(RenamingStore {
        clock: Rc::clone(&clock),
        started: Cell::new(None),
    });
    let config = config();

    let hook_store = Rc::clone(&store);
    let hook_clock = Rc::clone(&clock);
    let mut session = FakeSession::new(&["big.zip, 80 KB"]).on_trigger(move |_| {
        hook_store.started.set(Some(hook_clock.now()));
    });

    let mut enumerator = ItemEnumerator::new(&mut session, &*store, &*clock, &config);
    let report = enumerator.run().unwrap();

    assert_eq!(
        report.outcome_for("big.zip"),
        Some(&ItemOutcome::Completed { recoveries: 0 })
    );
    drop(enumerator);
    assert_eq!(session.status_opened, 0);
}
