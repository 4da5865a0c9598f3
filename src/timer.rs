//! Single-shot retransmission timer.
//!
//! Each role owns at most one timer.  The harness schedules an expiry event
//! whenever the timer is armed; because a stopped timer's expiry may still sit
//! in the event queue, every arm hands out a fresh *generation* and an expiry
//! only fires if its generation is still the armed one.
//!
//! ```text
//!   start(g=1) ── stop ── start(g=2) ──────── fire(g=1)  → stale, ignored
//!                                      └───── fire(g=2)  → delivered
//! ```
//!
//! Misuse (arming a running timer, stopping an idle one) is logged and
//! otherwise tolerated: a second start keeps the original deadline.

use std::time::Duration;

use crate::context::Role;

/// Identifies one arming of a timer.
pub type Generation = u64;

/// One role's timer.
#[derive(Debug)]
pub struct Timer {
    role: Role,
    /// Deadline and generation of the current arming.
    armed: Option<(Duration, Generation)>,
    generation: Generation,
}

impl Timer {
    pub fn new(role: Role) -> Self {
        Self {
            role,
            armed: None,
            generation: 0,
        }
    }

    pub fn is_running(&self) -> bool {
        self.armed.is_some()
    }

    /// Absolute time at which the timer will fire, if armed.
    pub fn deadline(&self) -> Option<Duration> {
        self.armed.map(|(at, _)| at)
    }

    /// Arm the timer to fire `after` from `now`.
    ///
    /// Returns the deadline and generation the caller must schedule, or
    /// `None` if the timer was already running.
    pub fn start(&mut self, now: Duration, after: Duration) -> Option<(Duration, Generation)> {
        if self.armed.is_some() {
            log::warn!("[timer] {} started while already running, ignored", self.role);
            return None;
        }
        self.generation += 1;
        let arming = (now + after, self.generation);
        self.armed = Some(arming);
        Some(arming)
    }

    /// Disarm the timer.
    pub fn stop(&mut self) {
        if self.armed.take().is_none() {
            log::warn!("[timer] {} stopped while idle", self.role);
        }
    }

    /// Consume an expiry event.  Returns `true` if `generation` is the live
    /// arming, in which case the timer is now idle.
    pub fn fire(&mut self, generation: Generation) -> bool {
        match self.armed {
            Some((_, live)) if live == generation => {
                self.armed = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RTT: Duration = Duration::from_millis(16);

    #[test]
    fn start_then_fire() {
        let mut t = Timer::new(Role::Sender);
        let (at, g) = t.start(Duration::from_millis(4), RTT).unwrap();
        assert_eq!(at, Duration::from_millis(20));
        assert!(t.is_running());
        assert!(t.fire(g));
        assert!(!t.is_running());
    }

    #[test]
    fn stale_expiry_ignored_after_restart() {
        let mut t = Timer::new(Role::Sender);
        let (_, g1) = t.start(Duration::ZERO, RTT).unwrap();
        t.stop();
        let (_, g2) = t.start(Duration::from_millis(5), RTT).unwrap();
        assert!(!t.fire(g1));
        assert!(t.is_running());
        assert!(t.fire(g2));
    }

    #[test]
    fn double_start_keeps_first_deadline() {
        let mut t = Timer::new(Role::Sender);
        t.start(Duration::ZERO, RTT);
        assert!(t.start(Duration::from_millis(3), RTT).is_none());
        assert_eq!(t.deadline(), Some(RTT));
    }

    #[test]
    fn fire_after_stop_is_ignored() {
        let mut t = Timer::new(Role::Receiver);
        let (_, g) = t.start(Duration::ZERO, RTT).unwrap();
        t.stop();
        assert!(!t.fire(g));
    }
}
