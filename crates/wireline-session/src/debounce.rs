use std::time::{Duration, Instant};

/// Default minimum gap between two admitted messages on a session.
pub const DEBOUNCE_WINDOW: Duration = Duration::from_micros(100);

/// Single-slot admission guard for message dispatch.
///
/// Tracks the timestamp of the most recently admitted message; a message
/// arriving within the window of the previous one is rejected. The guard
/// deliberately does not key on command id: a burst of *different*
/// commands inside the window still gets only the first one through. This
/// matches the protocol's established behavior and must not be "fixed"
/// into a per-command limiter.
#[derive(Debug)]
pub struct DebounceGuard {
    window: Duration,
    last_time: Option<Instant>,
    last_cmd_id: u32,
}

impl DebounceGuard {
    /// Create a guard with the given window. A zero window admits everything.
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_time: None,
            last_cmd_id: 0,
        }
    }

    /// Whether a message arriving at `now` may be admitted.
    ///
    /// The first message on a session is always admitted.
    pub fn is_valid(&self, now: Instant) -> bool {
        match self.last_time {
            Some(last) => now.saturating_duration_since(last) >= self.window,
            None => true,
        }
    }

    /// Record an admitted message. Overwrites the slot unconditionally.
    pub fn mark(&mut self, now: Instant, cmd_id: u32) {
        self.last_time = Some(now);
        self.last_cmd_id = cmd_id;
    }

    /// Command id of the most recently admitted message.
    pub fn last_cmd_id(&self) -> u32 {
        self.last_cmd_id
    }
}

impl Default for DebounceGuard {
    fn default() -> Self {
        Self::new(DEBOUNCE_WINDOW)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_message_is_always_admitted() {
        let guard = DebounceGuard::new(Duration::from_secs(10));
        assert!(guard.is_valid(Instant::now()));
    }

    #[test]
    fn message_inside_window_is_rejected() {
        let mut guard = DebounceGuard::new(Duration::from_millis(100));
        let start = Instant::now();
        guard.mark(start, 1);
        assert!(!guard.is_valid(start + Duration::from_millis(50)));
    }

    #[test]
    fn message_at_or_past_window_is_admitted() {
        let mut guard = DebounceGuard::new(Duration::from_millis(100));
        let start = Instant::now();
        guard.mark(start, 1);
        assert!(guard.is_valid(start + Duration::from_millis(100)));
        assert!(guard.is_valid(start + Duration::from_millis(500)));
    }

    #[test]
    fn different_command_ids_share_one_slot() {
        // Admission is a single global slot per session, not per command.
        let mut guard = DebounceGuard::new(Duration::from_millis(100));
        let start = Instant::now();
        guard.mark(start, 1);
        assert!(!guard.is_valid(start + Duration::from_millis(10)));
        assert_eq!(guard.last_cmd_id(), 1);
    }

    #[test]
    fn mark_overwrites_the_slot() {
        let mut guard = DebounceGuard::new(Duration::from_millis(100));
        let start = Instant::now();
        guard.mark(start, 1);
        guard.mark(start + Duration::from_millis(200), 2);
        assert_eq!(guard.last_cmd_id(), 2);
        assert!(!guard.is_valid(start + Duration::from_millis(250)));
    }

    #[test]
    fn zero_window_admits_back_to_back_messages() {
        let mut guard = DebounceGuard::new(Duration::ZERO);
        let now = Instant::now();
        guard.mark(now, 1);
        assert!(guard.is_valid(now));
    }
}
