use log::{debug, info};
use serde::{Deserialize, Serialize};

/// Result of feeding one tick to the timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Stopped timer or a tick scheduled for an earlier question.
    Ignored,
    Running(u32),
    /// This tick brought the countdown to zero. Reported once.
    Expired,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimerState {
    pub remaining_seconds: u32,
    pub limit_seconds: u32,
    pub is_running: bool,
}

/// Per-question countdown, driven by explicit ticks.
///
/// Every `start` and `stop` bumps a generation number. The scheduler hands
/// that number back with each tick, so a tick armed for a previous question
/// can never touch the current one.
#[derive(Debug, Default)]
pub struct CountdownTimer {
    remaining: u32,
    limit: u32,
    running: bool,
    generation: u64,
}

impl CountdownTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resets to `deadline_seconds` and starts counting. Returns the
    /// generation ticks must carry.
    pub fn start(&mut self, deadline_seconds: u32) -> u64 {
        self.generation += 1;
        self.limit = deadline_seconds;
        self.remaining = deadline_seconds;
        self.running = deadline_seconds > 0;
        info!("⏱️ Countdown started: {}s", deadline_seconds);
        self.generation
    }

    pub fn stop(&mut self) {
        if self.running {
            debug!("⏹️ Countdown stopped at {}s", self.remaining);
        }
        self.generation += 1;
        self.running = false;
    }

    pub fn on_tick(&mut self, generation: u64) -> TickOutcome {
        if !self.running || generation != self.generation {
            return TickOutcome::Ignored;
        }

        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.running = false;
            info!("⏰ Time's up");
            TickOutcome::Expired
        } else {
            TickOutcome::Running(self.remaining)
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Seconds used so far, never more than the limit.
    pub fn elapsed(&self) -> u32 {
        self.limit.saturating_sub(self.remaining)
    }

    pub fn is_urgent(&self, threshold_seconds: u32) -> bool {
        self.limit > 0 && self.remaining < threshold_seconds
    }

    pub fn state(&self) -> TimerState {
        TimerState {
            remaining_seconds: self.remaining,
            limit_seconds: self.limit,
            is_running: self.running,
        }
    }
}

/// `mm:ss`, as shown next to the question.
pub fn format_clock(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
