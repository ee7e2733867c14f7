//! Poll schedule state machine.
//!
//! The first poll waits for the variant's warm-up delay; every poll after it
//! is spaced by the steady interval. The switch happens once, on the first
//! poll, whatever that poll returns.

use tokio::time::Instant;

use super::TimingProfile;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollPhase {
    AwaitingFirstPoll,
    SteadyPolling,
}

#[derive(Debug, Clone)]
pub struct PollSchedule {
    phase: PollPhase,
    interval: std::time::Duration,
    next_poll: Instant,
    polls: u32,
}

impl PollSchedule {
    pub fn new(timings: &TimingProfile, no_cache: bool, submitted_at: Instant) -> Self {
        Self {
            phase: PollPhase::AwaitingFirstPoll,
            interval: timings.requests_interval,
            next_poll: submitted_at + timings.first_poll_delay(no_cache),
            polls: 0,
        }
    }

    pub fn phase(&self) -> PollPhase {
        self.phase
    }

    pub fn next_poll(&self) -> Instant {
        self.next_poll
    }

    pub fn polls(&self) -> u32 {
        self.polls
    }

    /// Register a poll that fired at `fired_at` and arm the next one.
    /// Returns the 1-based attempt number.
    pub fn record_poll(&mut self, fired_at: Instant) -> u32 {
        self.phase = PollPhase::SteadyPolling;
        self.next_poll = fired_at + self.interval;
        self.polls += 1;
        self.polls
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn first_poll_honours_cache_mode() {
        let start = Instant::now();
        let cached = PollSchedule::new(&TimingProfile::HCAPTCHA, false, start);
        let fresh = PollSchedule::new(&TimingProfile::HCAPTCHA, true, start);
        assert_eq!(cached.next_poll() - start, Duration::from_secs(1));
        assert_eq!(fresh.next_poll() - start, Duration::from_secs(10));
        assert_eq!(cached.phase(), PollPhase::AwaitingFirstPoll);
    }

    #[test]
    fn switches_to_steady_interval_once() {
        let start = Instant::now();
        let mut schedule = PollSchedule::new(&TimingProfile::RECAPTCHA_V2, true, start);

        let first = schedule.next_poll();
        assert_eq!(schedule.record_poll(first), 1);
        assert_eq!(schedule.phase(), PollPhase::SteadyPolling);
        assert_eq!(schedule.next_poll() - first, Duration::from_secs(3));

        let second = schedule.next_poll();
        assert_eq!(schedule.record_poll(second), 2);
        assert_eq!(schedule.phase(), PollPhase::SteadyPolling);
        assert_eq!(schedule.next_poll() - second, Duration::from_secs(3));
        assert_eq!(schedule.polls(), 2);
    }
}
