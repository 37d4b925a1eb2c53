use std::cell::Cell;
use std::time::{Duration, Instant};

/// Monotonic time source with a blocking sleep.
///
/// Every wait in the engine goes through this trait so tests can swap in
/// [`ManualClock`] and run polling loops without real delays.
pub trait Clock {
    /// Time elapsed since an arbitrary, fixed origin.
    fn now(&self) -> Duration;
    fn sleep(&self, period: Duration);
}

#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn sleep(&self, period: Duration) {
        std::thread::sleep(period);
    }
}

/// Clock that only moves when slept on.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<Duration>,
    sleeps: Cell<u64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    /// Number of `sleep` calls so far.
    pub fn sleeps(&self) -> u64 {
        self.sleeps.get()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }

    fn sleep(&self, period: Duration) {
        self.sleeps.set(self.sleeps.get() + 1);
        self.advance(period);
    }
}

/// Calls `probe` every `period` until it yields `Some`, or `timeout` has passed.
///
/// The probe always runs at least once, and once more at the deadline.
pub fn poll_until<C, T, E, F>(
    clock: &C,
    timeout: Duration,
    period: Duration,
    mut probe: F,
) -> Result<Option<T>, E>
where
    C: Clock + ?Sized,
    F: FnMut() -> Result<Option<T>, E>,
{
    let deadline = clock.now() + timeout;
    loop {
        if let Some(value) = probe()? {
            return Ok(Some(value));
        }
        let now = clock.now();
        if now >= deadline {
            return Ok(None);
        }
        clock.sleep(period.min(deadline - now).max(Duration::from_millis(1)));
    }
}
