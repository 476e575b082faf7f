//! Nullable clock for deterministic time in tests.

use levy_types::{Clock, Timestamp};
use std::cell::Cell;

/// A deterministic clock for testing.
///
/// Time only advances when you tell it to.
pub struct NullClock {
    current: Cell<u64>,
}

impl NullClock {
    pub fn new(initial_secs: u64) -> Self {
        Self {
            current: Cell::new(initial_secs),
        }
    }

    /// Get the current time.
    pub fn now(&self) -> Timestamp {
        Timestamp::new(self.current.get())
    }

    /// Advance time by a number of seconds.
    pub fn advance(&self, secs: u64) {
        self.current.set(self.current.get().saturating_add(secs));
    }

    /// Move time forward to `secs`. Earlier values are ignored so the
    /// clock stays monotonic.
    pub fn set(&self, secs: u64) {
        if secs > self.current.get() {
            self.current.set(secs);
        }
    }
}

impl Clock for NullClock {
    fn now(&self) -> Timestamp {
        NullClock::now(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advances_only_on_request() {
        let clock = NullClock::new(100);
        assert_eq!(clock.now(), Timestamp::new(100));
        clock.advance(5);
        assert_eq!(clock.now(), Timestamp::new(105));
    }

    #[test]
    fn set_never_goes_backwards() {
        let clock = NullClock::new(100);
        clock.set(50);
        assert_eq!(clock.now(), Timestamp::new(100));
        clock.set(200);
        assert_eq!(Clock::now(&clock), Timestamp::new(200));
    }
}
