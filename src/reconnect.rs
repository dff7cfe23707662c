//! Retry schedule for the reconnect supervisor.

use core::time::Duration;

/// Two-tier bounded retry schedule used after a mid-session read
/// failure.
///
/// The supervisor runs `outer_rounds` rounds of `inner_attempts`
/// connection attempts each. Before inner attempt `i` (1-based) it
/// sleeps `i × inner_step`; after failed round `m` (0-based) it sleeps
/// an additional `m × outer_step`. The default reproduces the
/// historical schedule: ten tries at 1 s…10 s, five rounds spaced
/// 0–4 min apart, fifty attempts in total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconnectPolicy {
    /// Connection attempts per round.
    pub inner_attempts: u32,
    /// Delay increment between inner attempts.
    pub inner_step: Duration,
    /// Number of rounds before giving up.
    pub outer_rounds: u32,
    /// Delay increment between rounds.
    pub outer_step: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        ReconnectPolicy {
            inner_attempts: 10,
            inner_step: Duration::from_secs(1),
            outer_rounds: 5,
            outer_step: Duration::from_secs(60),
        }
    }
}

impl ReconnectPolicy {
    /// Delay before inner attempt `attempt` (1-based) of any round.
    pub(crate) fn attempt_delay(&self, attempt: u32) -> Duration {
        self.inner_step * attempt
    }

    /// Extra delay after failed round `round` (0-based).
    pub(crate) fn round_delay(&self, round: u32) -> Duration {
        self.outer_step * round
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_schedule_matches_historical_behaviour() {
        let policy = ReconnectPolicy::default();
        assert_eq!(policy.inner_attempts * policy.outer_rounds, 50);
        assert_eq!(policy.attempt_delay(1), Duration::from_secs(1));
        assert_eq!(policy.attempt_delay(10), Duration::from_secs(10));
        assert_eq!(policy.round_delay(0), Duration::ZERO);
        assert_eq!(policy.round_delay(4), Duration::from_secs(240));
    }

    #[test]
    fn custom_steps_scale_linearly() {
        let policy = ReconnectPolicy {
            inner_attempts: 3,
            inner_step: Duration::from_millis(10),
            outer_rounds: 2,
            outer_step: Duration::from_millis(100),
        };
        assert_eq!(policy.attempt_delay(3), Duration::from_millis(30));
        assert_eq!(policy.round_delay(1), Duration::from_millis(100));
    }
}
