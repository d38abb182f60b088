use crate::constants::{
    BUTTON_GUIDE, BUTTON_LEFT_THUMB, BUTTON_RIGHT_THUMB, DEFAULT_CAPTION_HEIGHT,
    DEFAULT_FRAME_BORDER,
};

/// Screen-space point in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Truncate toward zero, the way the render step addresses pixels.
    pub fn to_pixel(self) -> (i32, i32) {
        (self.x as i32, self.y as i32)
    }
}

/// Raw reading of one analog stick, native convention (up is positive).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StickReading {
    pub x: i16,
    pub y: i16,
}

impl StickReading {
    pub fn new(x: i16, y: i16) -> Self {
        Self { x, y }
    }
}

/// Button bitmask as reported by the controller.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Buttons(pub u16);

impl Buttons {
    pub fn contains(self, mask: u16) -> bool {
        self.0 & mask == mask
    }

    pub fn left_thumb(self) -> bool {
        self.contains(BUTTON_LEFT_THUMB)
    }

    pub fn right_thumb(self) -> bool {
        self.contains(BUTTON_RIGHT_THUMB)
    }

    pub fn with(self, mask: u16) -> Self {
        Buttons(self.0 | mask)
    }
}

/// Snapshot of one controller slot for one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ControllerSample {
    pub buttons: Buttons,
    pub left_stick: StickReading,
    pub right_stick: StickReading,
    pub left_trigger: u8,
    pub right_trigger: u8,
    /// Guide button state. `None` when the backend cannot report it.
    pub guide: Option<bool>,
}

impl ControllerSample {
    /// Whether the extended guide button is held.
    ///
    /// Falls back to the guide bit in `buttons` for backends that fold it into
    /// the mask.
    pub fn guide_pressed(&self) -> bool {
        match self.guide {
            Some(pressed) => pressed,
            None => self.buttons.contains(BUTTON_GUIDE),
        }
    }
}

/// Stick reading after deadzone, saturation and Y inversion.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FilteredStick {
    pub x: f32,
    pub y: f32,
}

impl FilteredStick {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn is_neutral(&self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }
}

/// Persistent viewport state: center position and velocity in pixels per tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ViewportState {
    pub position: Point,
    pub velocity: Point,
}

/// What the gesture detector decided for one slot on one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GestureOutcome {
    /// Show/hide the overlay.
    pub toggle: bool,
    /// Movement integration suspended for this tick.
    pub frozen: bool,
    /// Both sticks held up long enough; terminal.
    pub quit: bool,
}

/// Overlay mode owned by the scheduler.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OverlayVisibility {
    pub shown: bool,
    pub frozen: bool,
}

/// Screen and window-frame metrics supplied by the platform.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScreenMetrics {
    pub width: i32,
    pub height: i32,
    pub frame_border: i32,
    pub caption_height: i32,
}

impl ScreenMetrics {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            frame_border: DEFAULT_FRAME_BORDER,
            caption_height: DEFAULT_CAPTION_HEIGHT,
        }
    }

    pub fn center(&self) -> Point {
        Point::new(self.width as f32 / 2.0, self.height as f32 / 2.0)
    }
}

impl Default for ScreenMetrics {
    fn default() -> Self {
        Self::new(1920, 1080)
    }
}

/// Integer rectangle given as origin plus size.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new(left: i32, top: i32, width: i32, height: i32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }
}

/// One row of the per-tick debug trace.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TraceSample {
    pub tick: u64,
    pub position: Point,
    pub velocity: Point,
    pub shown: bool,
    pub frozen: bool,
}
