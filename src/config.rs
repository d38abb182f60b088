use std::path::PathBuf;

use log::LevelFilter;

use crate::constants::{
    ACCEL_MULTIPLIER, BRAKE_PX_PER_TICK2, DEADZONE_FRACTION, LENS_HEIGHT, LENS_WIDTH,
    MAGNIFICATION, MAX_CONTROLLER_SLOTS, MAX_SPEED_PX_PER_TICK, QUIT_HOLD_MS, TICK_INTERVAL_MS,
    TOGGLE_DEBOUNCE_MS, TRIGGER_THRESHOLD,
};
use crate::error::{MagnifierError, Result};
use crate::types::ScreenMetrics;

const ENV_SCREEN: &str = "GAME_MAGNIFIER_SCREEN";
const ENV_LOG_LEVEL: &str = "GAME_MAGNIFIER_LOG_LEVEL";
const ENV_NO_GUIDE: &str = "GAME_MAGNIFIER_NO_GUIDE";
const ENV_START_HIDDEN: &str = "GAME_MAGNIFIER_START_HIDDEN";
const ENV_TRACE: &str = "GAME_MAGNIFIER_TRACE";

/// Runtime configuration for the magnifier loop.
///
/// # Kinematics
/// - `max_speed`: velocity cap per axis, pixels per tick
/// - `brake`: velocity removed per tick when the stick is centered
/// - `accel_multiplier`: velocity added per tick at full deflection
///
/// # Gestures
/// - `toggle_debounce_ms`: both sticks clicked (or guide) toggles at most this often
/// - `quit_hold_ms`: both sticks held up for longer than this quits
#[derive(Clone, Debug)]
pub struct MagnifierConfig {
    pub screen: ScreenMetrics,
    pub lens_width: i32,
    pub lens_height: i32,
    pub magnification: f32,
    pub tick_interval_ms: u32,
    pub max_speed: f32,
    pub brake: f32,
    pub accel_multiplier: f32,
    /// Fraction of the full stick range treated as no input, in `[0, 1)`
    pub deadzone: f32,
    /// Left trigger values above this freeze the viewport
    pub trigger_threshold: u8,
    pub toggle_debounce_ms: u32,
    pub quit_hold_ms: u32,
    /// Number of controller slots polled each tick
    pub slots: usize,
    /// Use the guide button as a toggle when the backend reports it
    pub guide_button: bool,
    /// Open the overlay at launch
    pub start_shown: bool,
    /// Log verbosity level: 0=off, 1=error, 2=warn, 3=info, 4=debug, 5=trace
    pub log_level: i32,
    /// Write a per-tick CSV trace here on exit
    pub trace_csv: Option<PathBuf>,
}

impl Default for MagnifierConfig {
    fn default() -> Self {
        Self {
            screen: ScreenMetrics::default(),
            lens_width: LENS_WIDTH,
            lens_height: LENS_HEIGHT,
            magnification: MAGNIFICATION,
            tick_interval_ms: TICK_INTERVAL_MS,
            max_speed: MAX_SPEED_PX_PER_TICK,
            brake: BRAKE_PX_PER_TICK2,
            accel_multiplier: ACCEL_MULTIPLIER,
            deadzone: DEADZONE_FRACTION,
            trigger_threshold: TRIGGER_THRESHOLD,
            toggle_debounce_ms: TOGGLE_DEBOUNCE_MS,
            quit_hold_ms: QUIT_HOLD_MS,
            slots: MAX_CONTROLLER_SLOTS,
            guide_button: true,
            start_shown: true,
            log_level: 3, // Info level by default
            trace_csv: None,
        }
    }
}

impl MagnifierConfig {
    /// Defaults with overrides taken from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults with overrides taken from `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup(ENV_SCREEN) {
            let (width, height) = parse_resolution(&value)?;
            config.screen.width = width;
            config.screen.height = height;
        }

        if let Some(value) = lookup(ENV_LOG_LEVEL) {
            config.log_level = value.trim().parse().map_err(|_| {
                MagnifierError::InvalidConfig(format!("{ENV_LOG_LEVEL}={value} is not a number"))
            })?;
        }

        if lookup(ENV_NO_GUIDE).is_some_and(|v| is_truthy(&v)) {
            config.guide_button = false;
        }

        if lookup(ENV_START_HIDDEN).is_some_and(|v| is_truthy(&v)) {
            config.start_shown = false;
        }

        if let Some(path) = lookup(ENV_TRACE).filter(|p| !p.trim().is_empty()) {
            config.trace_csv = Some(PathBuf::from(path));
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.screen.width <= 0 || self.screen.height <= 0 {
            return Err(MagnifierError::InvalidConfig(format!(
                "screen must be non-empty, got {}x{}",
                self.screen.width, self.screen.height
            )));
        }
        if self.lens_width <= 0 || self.lens_height <= 0 {
            return Err(MagnifierError::InvalidConfig(format!(
                "lens must be non-empty, got {}x{}",
                self.lens_width, self.lens_height
            )));
        }
        if self.magnification <= 0.0 {
            return Err(MagnifierError::InvalidConfig(format!(
                "magnification must be positive, got {}",
                self.magnification
            )));
        }
        if self.tick_interval_ms == 0 {
            return Err(MagnifierError::InvalidConfig(
                "tick interval must be at least 1 ms".to_string(),
            ));
        }
        if !(0.0..1.0).contains(&self.deadzone) {
            return Err(MagnifierError::InvalidConfig(format!(
                "deadzone must be in [0, 1), got {}",
                self.deadzone
            )));
        }
        if !(0..=5).contains(&self.log_level) {
            return Err(MagnifierError::InvalidConfig(format!(
                "log level must be in 0..=5, got {}",
                self.log_level
            )));
        }
        if self.slots == 0 {
            return Err(MagnifierError::InvalidConfig(
                "at least one controller slot is required".to_string(),
            ));
        }
        Ok(())
    }

    /// Level filter matching `log_level`.
    pub fn log_filter(&self) -> LevelFilter {
        match self.log_level {
            0 => LevelFilter::Off,
            1 => LevelFilter::Error,
            2 => LevelFilter::Warn,
            3 => LevelFilter::Info,
            4 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

fn parse_resolution(value: &str) -> Result<(i32, i32)> {
    let invalid = || {
        MagnifierError::InvalidConfig(format!("{ENV_SCREEN}={value} is not <width>x<height>"))
    };
    let (w, h) = value.trim().split_once(['x', 'X']).ok_or_else(invalid)?;
    let width = w.trim().parse().map_err(|_| invalid())?;
    let height = h.trim().parse().map_err(|_| invalid())?;
    Ok((width, height))
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
