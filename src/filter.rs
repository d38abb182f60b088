//! Deadzone and saturation for raw stick readings.

use crate::constants::{DEADZONE_FRACTION, MAX_ANALOG_MAGNITUDE};
use crate::types::{FilteredStick, StickReading};

/// Three-valued sign: 0 for zero, otherwise ±1.
pub fn sign(n: f32) -> f32 {
    if n == 0.0 {
        0.0
    } else if n > 0.0 {
        1.0
    } else {
        -1.0
    }
}

/// Converts raw stick readings into clean direction + magnitude values.
#[derive(Clone, Copy, Debug)]
pub struct InputFilter {
    deadzone: f32,
    max_magnitude: f32,
}

impl Default for InputFilter {
    fn default() -> Self {
        Self::new(DEADZONE_FRACTION)
    }
}

impl InputFilter {
    pub fn new(deadzone: f32) -> Self {
        Self {
            deadzone,
            max_magnitude: MAX_ANALOG_MAGNITUDE,
        }
    }

    pub fn max_magnitude(&self) -> f32 {
        self.max_magnitude
    }

    /// Filter a single axis value.
    pub fn axis(&self, raw: f32) -> f32 {
        let magnitude = raw.abs();
        if magnitude < self.max_magnitude * self.deadzone {
            0.0
        } else if magnitude > self.max_magnitude {
            self.max_magnitude * sign(raw)
        } else {
            raw
        }
    }

    /// Filter a stick, flipping Y so that pushing the stick up yields a
    /// negative value (screen space).
    pub fn stick(&self, raw: StickReading) -> FilteredStick {
        let x = f32::from(raw.x);
        let y = -f32::from(raw.y);
        FilteredStick::new(self.axis(x), self.axis(y))
    }
}
