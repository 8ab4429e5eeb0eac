//! Backoff policies governing the delay between successive polls.

use std::time::Duration;

use crate::config::PollingConfig;

/// The rule for spacing out successive polls of one task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackoffPolicy {
    /// The interval stays constant for the lifetime of the task.
    Fixed(Duration),
    /// The interval starts at `base` and grows by `increment` after every
    /// empty poll, up to `ceiling`. No reset is needed: the task terminates
    /// on the first non-empty poll.
    Growing {
        base: Duration,
        increment: Duration,
        ceiling: Duration,
    },
}

impl BackoffPolicy {
    /// Builds the fixed policy from configuration.
    pub fn fixed(config: &PollingConfig) -> Self {
        Self::Fixed(config.fixed_interval())
    }

    /// Builds the growing policy from configuration.
    pub fn growing(config: &PollingConfig) -> Self {
        Self::Growing {
            base: config.base_interval(),
            increment: config.increment(),
            ceiling: config.max_interval(),
        }
    }

    /// Creates the mutable per-task delay state for this policy.
    pub fn state(&self) -> BackoffState {
        let current = match self {
            Self::Fixed(interval) => *interval,
            Self::Growing { base, .. } => *base,
        };
        BackoffState {
            policy: *self,
            current,
        }
    }
}

/// Mutable delay state of one polling task.
#[derive(Debug, Clone, Copy)]
pub struct BackoffState {
    policy: BackoffPolicy,
    current: Duration,
}

impl BackoffState {
    /// The delay to wait before the next poll.
    pub fn current(&self) -> Duration {
        self.current
    }

    /// Records an empty poll, growing the delay where the policy says so.
    pub fn record_empty_poll(&mut self) {
        if let BackoffPolicy::Growing {
            increment, ceiling, ..
        } = self.policy
        {
            self.current = (self.current + increment).min(ceiling);
        }
    }
}
