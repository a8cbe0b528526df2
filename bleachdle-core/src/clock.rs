use chrono::{DateTime, FixedOffset, Local};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Time source for the reveal schedule and the midnight countdown.
pub trait Clock: Send + Sync {
    /// Monotonic time elapsed since the clock was created
    fn elapsed(&self) -> Duration;

    /// Wall-clock time in the player's timezone
    fn local_now(&self) -> DateTime<FixedOffset>;
}

#[derive(Debug, Clone)]
pub struct SystemClock {
    started: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    fn local_now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

#[derive(Debug)]
struct VirtualTime {
    elapsed: Duration,
    wall: DateTime<FixedOffset>,
}

/// Manually advanced clock. Clones share the same time.
#[derive(Debug, Clone)]
pub struct VirtualClock {
    time: Arc<Mutex<VirtualTime>>,
}

impl VirtualClock {
    pub fn starting_at(wall: DateTime<FixedOffset>) -> Self {
        Self {
            time: Arc::new(Mutex::new(VirtualTime {
                elapsed: Duration::ZERO,
                wall,
            })),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut time = self.time.lock().unwrap_or_else(|e| e.into_inner());
        time.elapsed += by;
        if let Ok(delta) = chrono::Duration::from_std(by) {
            time.wall = time.wall + delta;
        }
    }

    pub fn advance_millis(&self, millis: u64) {
        self.advance(Duration::from_millis(millis));
    }
}

impl Clock for VirtualClock {
    fn elapsed(&self) -> Duration {
        self.time.lock().unwrap_or_else(|e| e.into_inner()).elapsed
    }

    fn local_now(&self) -> DateTime<FixedOffset> {
        self.time.lock().unwrap_or_else(|e| e.into_inner()).wall
    }
}
