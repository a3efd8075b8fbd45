//! Event-wait primitive: a countdown of pending signals plus a status code.

use crate::error::ConfigError;

#[cfg(feature = "timeout")]
use crate::constants::SR_TIMEOUT;

/// A shared countdown that one or more producers signal and one or more
/// tasks wait on via [`crate::task::Task::wait_for`]/[`crate::task::Task::wait_for_delayed`].
///
/// A request is *pending* while `count != 0` and *completed* once it
/// reaches 0. A completed request is immutable until [`StatusRequest::set_waiting`]
/// reopens it; signalling a completed request is a no-op.
pub struct StatusRequest {
    count: u32,
    status: i32,
    #[cfg(feature = "timeout")]
    timeout: u32,
    #[cfg(feature = "timeout")]
    start_time: u32,
}

impl StatusRequest {
    /// A request that starts out completed (count == 0).
    pub const fn new() -> Self {
        Self {
            count: 0,
            status: 0,
            #[cfg(feature = "timeout")]
            timeout: 0,
            #[cfg(feature = "timeout")]
            start_time: 0,
        }
    }

    /// Re-open the request, expecting `count` more signals before it
    /// completes. Clears the status and, when timeouts are enabled,
    /// restamps the timeout window against `now`. Does not fail.
    pub fn set_waiting(&mut self, count: u32, now: u32) {
        self.count = count;
        self.status = 0;
        #[cfg(feature = "timeout")]
        {
            self.start_time = now;
        }
        #[cfg(not(feature = "timeout"))]
        {
            let _ = now;
        }
    }

    /// Convenience for `set_waiting(1, now)`.
    pub fn set_waiting_once(&mut self, now: u32) {
        self.set_waiting(1, now);
    }

    /// Signal one occurrence. If `status < 0`, the request completes
    /// immediately regardless of the remaining count (an error
    /// short-circuits the request). Returns whether the request is now
    /// completed. A no-op on an already-completed request.
    pub fn signal(&mut self, status: i32) -> bool {
        if self.count != 0 {
            if self.count > 0 {
                self.count -= 1;
            }
            self.status = status;
            if status < 0 {
                self.count = 0;
            }
        }
        self.count == 0
    }

    /// Force the request complete with the given status, ignoring the
    /// remaining count. A no-op on an already-completed request.
    pub fn signal_complete(&mut self, status: i32) {
        if self.count != 0 {
            self.count = 0;
            self.status = status;
        }
    }

    pub fn pending(&self) -> bool {
        self.count != 0
    }

    pub fn completed(&self) -> bool {
        self.count == 0
    }

    pub fn status(&self) -> i32 {
        self.status
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    /// Configure a timeout (in ticks) for this request. A timeout of 0 is
    /// rejected: it is indistinguishable from "no timeout" (see
    /// [`crate::error::ConfigError`]) and would silently discard the
    /// caller's intent rather than enforce it.
    #[cfg(feature = "timeout")]
    pub fn with_timeout(mut self, timeout: u32, now: u32) -> Result<Self, ConfigError> {
        if timeout == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        self.timeout = timeout;
        self.start_time = now;
        Ok(self)
    }

    #[cfg(feature = "timeout")]
    pub fn reset_timeout(&mut self, now: u32) {
        self.start_time = now;
    }

    /// Signed ticks remaining until timeout; -1 if no timeout is set.
    #[cfg(feature = "timeout")]
    pub fn until_timeout(&self, now: u32) -> i32 {
        if self.timeout == 0 {
            return -1;
        }
        (self.start_time.wrapping_add(self.timeout) as i32).wrapping_sub(now as i32)
    }

    /// Called by the scheduler's wait gate: if this request's own timeout
    /// has elapsed while a task is waiting on it, force it complete with
    /// [`SR_TIMEOUT`].
    #[cfg(feature = "timeout")]
    pub(crate) fn timeout_if_elapsed(&mut self, now: u32) {
        if self.timeout != 0 && now.wrapping_sub(self.start_time) > self.timeout {
            self.signal_complete(SR_TIMEOUT);
        }
    }
}

impl Default for StatusRequest {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_completed() {
        let sr = StatusRequest::new();
        assert!(sr.completed());
        assert!(!sr.pending());
    }

    #[test]
    fn set_waiting_reopens() {
        let mut sr = StatusRequest::new();
        sr.set_waiting(2, 0);
        assert!(sr.pending());
        assert_eq!(sr.count(), 2);
    }

    #[test]
    fn signal_counts_down() {
        let mut sr = StatusRequest::new();
        sr.set_waiting(2, 0);
        assert!(!sr.signal(0));
        assert!(sr.pending());
        assert!(sr.signal(0));
        assert!(sr.completed());
    }

    #[test]
    fn negative_signal_short_circuits() {
        let mut sr = StatusRequest::new();
        sr.set_waiting(5, 0);
        assert!(sr.signal(-1));
        assert!(sr.completed());
        assert_eq!(sr.status(), -1);
    }

    #[test]
    fn signal_on_completed_is_noop() {
        let mut sr = StatusRequest::new();
        assert!(sr.completed());
        assert!(sr.signal(42));
        assert_eq!(sr.status(), 0);
    }

    #[test]
    fn signal_complete_forces_done() {
        let mut sr = StatusRequest::new();
        sr.set_waiting(10, 0);
        sr.signal_complete(7);
        assert!(sr.completed());
        assert_eq!(sr.status(), 7);
    }

    #[test]
    fn signal_complete_on_completed_is_noop() {
        let mut sr = StatusRequest::new();
        sr.signal_complete(7);
        assert_eq!(sr.status(), 0);
    }

    #[cfg(feature = "timeout")]
    #[test]
    fn zero_timeout_rejected() {
        let sr = StatusRequest::new();
        assert_eq!(sr.with_timeout(0, 0), Err(ConfigError::ZeroTimeout));
    }

    #[cfg(feature = "timeout")]
    #[test]
    fn until_timeout_counts_down() {
        let sr = StatusRequest::new().with_timeout(100, 0).unwrap();
        assert_eq!(sr.until_timeout(40), 60);
        assert_eq!(sr.until_timeout(150), -50);
    }

    #[cfg(feature = "timeout")]
    #[test]
    fn no_timeout_is_negative_one() {
        let sr = StatusRequest::new();
        assert_eq!(sr.until_timeout(1234), -1);
    }
}
