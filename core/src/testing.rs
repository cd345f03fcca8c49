//! Test doubles shared by the unit tests.

use std::sync::Mutex;
use std::time::Duration;

use crate::timer::{Timer, TimerCallback};

/// Timer that only fires when the test says so.
#[derive(Default)]
pub struct ManualTimer {
    pending: Mutex<Option<(Duration, TimerCallback)>>,
    arms: Mutex<Vec<Duration>>,
}

impl ManualTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of times the timer has been armed.
    pub fn arm_count(&self) -> usize {
        self.arms.lock().unwrap().len()
    }

    /// Delay of the pending wait, if one is pending.
    pub fn armed_delay(&self) -> Option<Duration> {
        self.pending.lock().unwrap().as_ref().map(|(delay, _)| *delay)
    }

    /// Remove the pending callback without running it.
    pub fn take_callback(&self) -> Option<TimerCallback> {
        self.pending.lock().unwrap().take().map(|(_, callback)| callback)
    }

    /// Run the pending callback as if its delay elapsed.
    pub fn fire(&self) -> bool {
        // released before running: the callback usually re-arms
        match self.take_callback() {
            Some(callback) => {
                callback();
                true
            }
            None => false,
        }
    }
}

impl Timer for ManualTimer {
    fn arm(&self, delay: Duration, callback: TimerCallback) {
        self.arms.lock().unwrap().push(delay);
        *self.pending.lock().unwrap() = Some((delay, callback));
    }

    fn cancel(&self) {
        self.pending.lock().unwrap().take();
    }
}
