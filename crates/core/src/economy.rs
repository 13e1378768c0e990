//! Cabinet power and credits.
//!
//! Credits only gate play attempts made while the arcade view is active;
//! grid and scroll browsing launch unconditionally.

use std::time::Duration;

use tracing::{debug, info};

use crate::{
    error::PlayError,
    scheduler::{Scheduler, Task},
    view::ViewMode,
};

/// Successful play attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayReceipt {
    /// A credit was consumed.
    pub charged: bool,
    pub credits_left: u32,
}

/// Timings used by the economy's delayed feedback.
#[derive(Debug, Clone, Copy)]
pub struct EconomyTimings {
    /// Delay before an empty, powered cabinet starts asking for a coin.
    pub nudge_delay: Duration,
    /// How long the credits display stays highlighted after a change.
    pub credits_glow: Duration,
}

#[derive(Debug, Clone)]
pub struct EconomyStateMachine {
    powered: bool,
    credits: u32,
    needs_coin: bool,
    credits_glow: bool,
    timings: EconomyTimings,
}

impl EconomyStateMachine {
    pub fn new(powered: bool, credits: u32, timings: EconomyTimings) -> Self {
        Self {
            powered,
            credits,
            needs_coin: false,
            credits_glow: false,
            timings,
        }
    }

    pub fn powered(&self) -> bool {
        self.powered
    }

    pub fn credits(&self) -> u32 {
        self.credits
    }

    /// The coin slot is flagged as wanting a coin.
    pub fn needs_coin(&self) -> bool {
        self.needs_coin
    }

    pub fn credits_glow(&self) -> bool {
        self.credits_glow
    }

    /// Arcade movement and play controls accept input.
    pub fn controls_enabled(&self) -> bool {
        self.powered
    }

    /// Flip power. Switching on with no credits queues the coin nudge;
    /// switching off clears the flag and drops any nudge still queued.
    pub fn toggle_power(&mut self, scheduler: &mut Scheduler, now: Duration) -> bool {
        self.powered = !self.powered;
        if self.powered {
            if self.credits == 0 {
                self.schedule_nudge(scheduler, now);
            }
        } else {
            self.needs_coin = false;
            scheduler.cancel_where(|task| *task == Task::CoinNudge);
        }
        info!(powered = self.powered, credits = self.credits, "cabinet power toggled");
        self.powered
    }

    /// Insert a coin. Ignored while unpowered.
    pub fn add_coin(&mut self, scheduler: &mut Scheduler, now: Duration) -> bool {
        if !self.powered {
            return false;
        }
        self.credits += 1;
        self.needs_coin = false;
        self.pulse_credits(scheduler, now);
        debug!(credits = self.credits, "coin inserted");
        true
    }

    /// Gate a play attempt made from `mode`.
    pub fn attempt_play(
        &mut self,
        mode: ViewMode,
        scheduler: &mut Scheduler,
        now: Duration,
    ) -> Result<PlayReceipt, PlayError> {
        if mode != ViewMode::Arcade {
            return Ok(PlayReceipt {
                charged: false,
                credits_left: self.credits,
            });
        }
        if !self.powered {
            return Err(PlayError::PoweredOff);
        }
        if self.credits == 0 {
            self.needs_coin = true;
            return Err(PlayError::NoCredits);
        }

        self.credits -= 1;
        self.pulse_credits(scheduler, now);
        if self.credits == 0 {
            self.schedule_nudge(scheduler, now);
        }
        Ok(PlayReceipt {
            charged: true,
            credits_left: self.credits,
        })
    }

    /// Delayed coin nudge. Only raises the flag if the cabinet is still
    /// powered and empty.
    pub fn fire_nudge(&mut self) -> bool {
        if self.powered && self.credits == 0 {
            self.needs_coin = true;
            return true;
        }
        false
    }

    /// Highlight the credits display for the configured glow period.
    pub fn pulse_credits(&mut self, scheduler: &mut Scheduler, now: Duration) {
        self.credits_glow = true;
        scheduler.cancel_where(|task| *task == Task::CreditsGlowEnd);
        scheduler.schedule(now, self.timings.credits_glow, Task::CreditsGlowEnd);
    }

    pub fn end_credits_glow(&mut self) {
        self.credits_glow = false;
    }

    fn schedule_nudge(&mut self, scheduler: &mut Scheduler, now: Duration) {
        scheduler.schedule(now, self.timings.nudge_delay, Task::CoinNudge);
    }
}
