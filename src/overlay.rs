//! Interfaces to the overlay window and the lens placement math.
//!
//! The window-system binding that actually creates the magnifier window lives
//! outside this crate. The scheduler talks to it through the traits below;
//! [`LoggingOverlay`] is a headless implementation that reports what would be
//! drawn.

use crate::config::MagnifierConfig;
use crate::error::{MagnifierError, Result};
use crate::types::{Point, Rect, ScreenMetrics};

/// Result of draining the overlay window's message queue.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PumpStatus {
    Continue,
    /// The OS asked the overlay window to close.
    CloseRequested,
}

/// Creation and destruction of the overlay window.
pub trait OverlayLifecycle {
    type Handle;

    /// Create the overlay centered on `initial_center`. On error the caller
    /// keeps the overlay hidden.
    fn initialize(&mut self, initial_center: Point) -> Result<Self::Handle>;

    fn teardown(&mut self, handle: Self::Handle);
}

/// Per-tick repositioning of a live overlay. Called at most once per tick.
pub trait OverlayRenderUpdate: OverlayLifecycle {
    fn set_center(&mut self, handle: &Self::Handle, center: Point);
}

/// Non-blocking drain of messages already queued for the overlay window.
pub trait MessagePump: OverlayLifecycle {
    fn drain_pending(&mut self, handle: &Self::Handle) -> PumpStatus;
}

/// Where the magnifier samples from and where its window sits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LensLayout {
    /// Source rectangle on screen, origin plus lens size.
    pub source: Rect,
    /// Host window rectangle, centered on the viewport position.
    pub window: Rect,
}

impl LensLayout {
    /// Layout for a lens centered on `center`.
    ///
    /// The source origin is pulled back by half the lens divided by the
    /// magnification, then shifted by the window frame so the client area
    /// lines up with the magnified region.
    pub fn compute(
        center: Point,
        lens_width: i32,
        lens_height: i32,
        magnification: f32,
        screen: &ScreenMetrics,
    ) -> Self {
        let (x, y) = center.to_pixel();
        let scaled = |v: i32| (v as f32 / magnification) as i32;

        let source = Rect::new(
            (x - scaled(lens_width / 2)) + scaled(screen.frame_border),
            (y - scaled(lens_height / 2))
                + scaled(screen.caption_height)
                + scaled(screen.frame_border),
            lens_width,
            lens_height,
        );
        let window = Rect::new(
            x - lens_width / 2,
            y - lens_height / 2,
            lens_width,
            lens_height,
        );

        Self { source, window }
    }

    /// Host window rectangle before the first reposition: full screen width,
    /// top quarter of the screen.
    pub fn initial_host_window(screen: &ScreenMetrics) -> Rect {
        Rect::new(0, 0, screen.width, screen.height / 4)
    }
}

/// Headless overlay that logs lens placement instead of drawing it.
#[derive(Debug)]
pub struct LoggingOverlay {
    screen: ScreenMetrics,
    lens_width: i32,
    lens_height: i32,
    magnification: f32,
    next_handle: u32,
    live: Option<u32>,
    last_layout: Option<LensLayout>,
    fail_initialize: bool,
}

impl LoggingOverlay {
    pub fn new(config: &MagnifierConfig) -> Self {
        Self {
            screen: config.screen,
            lens_width: config.lens_width,
            lens_height: config.lens_height,
            magnification: config.magnification,
            next_handle: 1,
            live: None,
            last_layout: None,
            fail_initialize: false,
        }
    }

    /// Make every subsequent `initialize` fail.
    pub fn with_failing_initialize(mut self) -> Self {
        self.fail_initialize = true;
        self
    }

    pub fn is_live(&self) -> bool {
        self.live.is_some()
    }

    pub fn last_layout(&self) -> Option<LensLayout> {
        self.last_layout
    }
}

impl OverlayLifecycle for LoggingOverlay {
    type Handle = u32;

    fn initialize(&mut self, initial_center: Point) -> Result<u32> {
        if self.fail_initialize {
            return Err(MagnifierError::OverlayInit(
                "magnifier window creation refused".to_string(),
            ));
        }

        let handle = self.next_handle;
        self.next_handle += 1;
        self.live = Some(handle);

        let host = LensLayout::initial_host_window(&self.screen);
        log::info!(
            "Overlay #{} created: host {}x{} at ({}, {}), magnification {:.1}x, center ({:.0}, {:.0})",
            handle,
            host.width,
            host.height,
            host.left,
            host.top,
            self.magnification,
            initial_center.x,
            initial_center.y
        );
        Ok(handle)
    }

    fn teardown(&mut self, handle: u32) {
        if self.live == Some(handle) {
            self.live = None;
        }
        log::info!("Overlay #{} destroyed", handle);
    }
}

impl OverlayRenderUpdate for LoggingOverlay {
    fn set_center(&mut self, handle: &u32, center: Point) {
        let layout = LensLayout::compute(
            center,
            self.lens_width,
            self.lens_height,
            self.magnification,
            &self.screen,
        );
        if self.last_layout != Some(layout) {
            log::debug!(
                "Overlay #{}: source ({}, {}) window ({}, {})",
                handle,
                layout.source.left,
                layout.source.top,
                layout.window.left,
                layout.window.top
            );
        }
        self.last_layout = Some(layout);
    }
}

impl MessagePump for LoggingOverlay {
    fn drain_pending(&mut self, _handle: &u32) -> PumpStatus {
        PumpStatus::Continue
    }
}
