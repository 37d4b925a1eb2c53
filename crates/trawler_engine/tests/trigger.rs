mod common;

use std::time::Duration;

use common::{init_logging, FakeSession};
use trawler_core::ItemIdentity;
use trawler_engine::{AcquisitionTrigger, Clock, ManualClock, TriggerResult, TriggerSettings};

fn settings() -> TriggerSettings {
    TriggerSettings {
        reveal_settle: Duration::from_secs(2),
        control_timeout: Duration::from_secs(10),
        control_poll: Duration::from_secs(1),
        settle: Duration::from_secs(2),
        ..TriggerSettings::default()
    }
}

#[test]
fn clicks_control_once_it_is_ready() {
    init_logging();
    let clock = ManualClock::new();
    let settings = settings();
    let mut session = FakeSession::new(&["scene.zip, 1 MB"]);
    session.control_ready_on = Some(3);

    let result = AcquisitionTrigger::new(&mut session, &clock, &settings)
        .fire(&ItemIdentity::new("scene.zip"));

    assert_eq!(result, TriggerResult::Triggered);
    assert_eq!(session.triggered, vec![Some("scene.zip, 1 MB".to_string())]);
    // reveal settle + two control polls + settle
    assert_eq!(clock.now(), Duration::from_secs(6));
}

#[test]
fn missing_control_fails_after_timeout() {
    init_logging();
    let clock = ManualClock::new();
    let settings = settings();
    let mut session = FakeSession::new(&["scene.zip"]);
    session.control_ready_on = None;

    let result = AcquisitionTrigger::new(&mut session, &clock, &settings)
        .fire(&ItemIdentity::new("scene.zip"));

    assert!(matches!(result, TriggerResult::Failed { .. }));
    assert!(session.triggered.is_empty());
    assert_eq!(clock.now(), Duration::from_secs(12));
    assert_eq!(session.control_checks, 11);
}
