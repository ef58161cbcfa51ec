//! Bounded resubmission of transactions rejected for a stale nonce.

/// Most sends made for one inbound request.
pub const MAX_SEND_ATTEMPTS: usize = 5;

/// Sends made so far for one inbound request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryState {
    attempts_made: usize,
    max_attempts: usize,
}

impl Default for RetryState {
    fn default() -> Self {
        Self::new(MAX_SEND_ATTEMPTS)
    }
}

impl RetryState {
    pub const fn new(max_attempts: usize) -> Self {
        Self {
            attempts_made: 0,
            max_attempts,
        }
    }

    pub const fn record_attempt(&mut self) {
        self.attempts_made += 1;
    }

    pub const fn attempts(&self) -> usize {
        self.attempts_made
    }

    /// Whether another send is allowed.
    pub const fn can_retry(&self) -> bool {
        self.attempts_made < self.max_attempts
    }
}
