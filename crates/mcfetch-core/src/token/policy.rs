use std::time::Duration;

/// What the poll loop should do after a list call still shows `registering`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollDecision {
    /// Stop polling and report the token as stuck.
    GiveUp,
    /// Poll again after the given delay (may be zero).
    PollAfter(Duration),
}

/// Exponential backoff between registration-token list calls.
///
/// `max_attempts == 0` means poll until the server changes state, with no
/// upper bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Maximum number of list calls (0 = unbounded).
    pub max_attempts: u32,
    /// Delay after the first unsuccessful poll.
    pub base_delay: Duration,
    /// Upper bound on the delay between polls.
    pub max_delay: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 120,
            base_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(5),
        }
    }
}

impl PollPolicy {
    /// Poll back-to-back until the state changes, never giving up.
    pub fn unbounded() -> Self {
        Self {
            max_attempts: 0,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    pub fn is_bounded(&self) -> bool {
        self.max_attempts != 0
    }

    /// Decide what to do after poll number `attempt` (1-based) came back
    /// still registering.
    pub fn decide(&self, attempt: u32) -> PollDecision {
        if self.is_bounded() && attempt >= self.max_attempts {
            return PollDecision::GiveUp;
        }
        // base * 2^(attempt-1), capped.
        let exp = 1u32 << attempt.saturating_sub(1).min(8);
        let delay = self.base_delay.saturating_mul(exp).min(self.max_delay);
        PollDecision::PollAfter(delay)
    }
}
