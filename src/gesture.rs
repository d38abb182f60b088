//! Gesture detection for one controller slot.
//!
//! Three independent detectors run on every sample:
//!
//! - **Toggle**: both sticks clicked in (or the guide button, when the backend
//!   reports it) fires once the toggle clock has passed the debounce window.
//!   The clock runs freely and restarts on every fire; it starts at a large
//!   seed so the very first toggle is instant.
//! - **Freeze**: a level signal, true while the left trigger is past its
//!   threshold.
//! - **Quit**: accumulates tick time while both sticks are held up and fires
//!   once, on the tick the hold exceeds the quit threshold.
//!
//! The detector only reports decisions; applying them is the scheduler's job.

use crate::config::MagnifierConfig;
use crate::constants::TOGGLE_TIMER_SEED_MS;
use crate::filter::sign;
use crate::types::{ControllerSample, FilteredStick, GestureOutcome};

/// Elapsed-time accumulators, in milliseconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GestureTimers {
    /// Time since the last toggle.
    pub toggle_ms: u32,
    /// Continuous time both sticks have been held up.
    pub quit_ms: u32,
}

impl Default for GestureTimers {
    fn default() -> Self {
        Self {
            toggle_ms: TOGGLE_TIMER_SEED_MS,
            quit_ms: 0,
        }
    }
}

#[derive(Clone, Debug)]
pub struct GestureDetector {
    timers: GestureTimers,
    tick_interval_ms: u32,
    toggle_debounce_ms: u32,
    quit_hold_ms: u32,
    trigger_threshold: u8,
    extended_button: bool,
}

impl GestureDetector {
    pub fn new(config: &MagnifierConfig) -> Self {
        Self {
            timers: GestureTimers::default(),
            tick_interval_ms: config.tick_interval_ms,
            toggle_debounce_ms: config.toggle_debounce_ms,
            quit_hold_ms: config.quit_hold_ms,
            trigger_threshold: config.trigger_threshold,
            extended_button: config.guide_button,
        }
    }

    pub fn timers(&self) -> GestureTimers {
        self.timers
    }

    /// Inspect one sample. `left` and `right` are the filtered sticks for the
    /// same sample; only the sign of their Y axes is used.
    pub fn observe(
        &mut self,
        sample: &ControllerSample,
        left: FilteredStick,
        right: FilteredStick,
    ) -> GestureOutcome {
        let mut outcome = GestureOutcome::default();

        let sticks_clicked = sample.buttons.left_thumb() && sample.buttons.right_thumb();
        let guide = self.extended_button && sample.guide_pressed();
        if (sticks_clicked || guide) && self.timers.toggle_ms > self.toggle_debounce_ms {
            outcome.toggle = true;
            self.timers.toggle_ms = 0;
        }

        outcome.frozen = sample.left_trigger > self.trigger_threshold;

        let before = self.timers.quit_ms;
        if sign(left.y) < 0.0 && sign(right.y) < 0.0 {
            self.timers.quit_ms = before.saturating_add(self.tick_interval_ms);
        } else {
            self.timers.quit_ms = 0;
        }
        outcome.quit = before <= self.quit_hold_ms && self.timers.quit_ms > self.quit_hold_ms;

        outcome
    }

    /// Advance the toggle clock. Called once per tick whether or not the slot
    /// produced a sample.
    pub fn advance_clock(&mut self, elapsed_ms: u32) {
        self.timers.toggle_ms = self.timers.toggle_ms.saturating_add(elapsed_ms);
    }

    /// Start a new debounce window, e.g. after another slot toggled.
    pub fn restart_toggle_debounce(&mut self) {
        self.timers.toggle_ms = 0;
    }
}
