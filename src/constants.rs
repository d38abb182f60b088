//! Documented constants for the controller-driven magnifier.
//!
//! Values are expressed in the units the control loop works in: raw stick
//! units, pixels per tick, and milliseconds of simulated tick time.

// ============================================================================
// Analog Input Constants
// ============================================================================

/// Largest magnitude a stick axis reports.
///
/// Native sticks report `[-32768, 32767]`; the negative extreme is clamped to
/// `-32767` so both directions saturate symmetrically.
pub const MAX_ANALOG_MAGNITUDE: f32 = 32767.0;

/// Fraction of [`MAX_ANALOG_MAGNITUDE`] treated as no input.
///
/// With the default of 0.2 any axis reading below ~6553 units is zeroed.
pub const DEADZONE_FRACTION: f32 = 0.2;

/// Trigger value above which a trigger counts as pressed.
///
/// Matches the standard gamepad trigger threshold (30 out of 255).
pub const TRIGGER_THRESHOLD: u8 = 30;

// ============================================================================
// Button Bits
// ============================================================================

/// Left stick clicked in.
pub const BUTTON_LEFT_THUMB: u16 = 0x0040;

/// Right stick clicked in.
pub const BUTTON_RIGHT_THUMB: u16 = 0x0080;

/// Vendor-specific "guide" button, only present when the backend exposes it.
pub const BUTTON_GUIDE: u16 = 0x0400;

// ============================================================================
// Viewport Kinematics
// ============================================================================

/// Maximum viewport velocity per axis, in pixels per tick.
///
/// At 60 ticks per second this is 1200 px/s, enough to cross a Full HD screen
/// in about 1.6 seconds.
pub const MAX_SPEED_PX_PER_TICK: f32 = 20.0;

/// Velocity removed per tick while the stick rests in the deadzone.
pub const BRAKE_PX_PER_TICK2: f32 = 3.0;

/// Velocity gained per tick at full stick deflection.
///
/// A fully deflected stick reaches [`MAX_SPEED_PX_PER_TICK`] in four ticks.
pub const ACCEL_MULTIPLIER: f32 = 5.0;

// ============================================================================
// Timing Constants
// ============================================================================

/// Nominal control loop rate.
pub const TARGET_FPS: u32 = 60;

/// Tick interval in milliseconds.
///
/// `1000 / 60` in integer arithmetic; the loop runs slightly faster than
/// 60 Hz as a result.
pub const TICK_INTERVAL_MS: u32 = 1000 / TARGET_FPS;

/// Minimum time between two toggle gestures.
pub const TOGGLE_DEBOUNCE_MS: u32 = 400;

/// How long both sticks must be held up before the process quits.
pub const QUIT_HOLD_MS: u32 = 2000;

/// Initial value of the toggle clock, large enough that the first toggle fires
/// immediately.
pub const TOGGLE_TIMER_SEED_MS: u32 = 99_999;

/// Number of controller slots polled each tick.
pub const MAX_CONTROLLER_SLOTS: usize = 4;

// ============================================================================
// Lens Geometry
// ============================================================================

/// Width of the magnified lens window in pixels.
pub const LENS_WIDTH: i32 = 800;

/// Height of the magnified lens window in pixels.
pub const LENS_HEIGHT: i32 = 600;

/// Magnification applied to the source rectangle.
pub const MAGNIFICATION: f32 = 2.0;

/// Default window frame border width, used when the platform does not report one.
pub const DEFAULT_FRAME_BORDER: i32 = 3;

/// Default window caption height, used when the platform does not report one.
pub const DEFAULT_CAPTION_HEIGHT: i32 = 23;

// ============================================================================
// Diagnostics
// ============================================================================

/// Trace rows buffered between flushes to disk.
///
/// One second of ticks at [`TARGET_FPS`].
pub const TRACE_FLUSH_ROWS: u64 = TARGET_FPS as u64;
