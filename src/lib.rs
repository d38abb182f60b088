//! Controller-driven screen magnifier.
//!
//! A fixed-rate loop reads gamepad state, turns the right stick into a
//! smoothed viewport position, and moves a magnifier overlay to follow it.
//! Stick clicks toggle the overlay, the left trigger freezes movement, and
//! holding both sticks up quits.

pub mod config;
pub mod constants;
pub mod error;
pub mod filter;
pub mod gesture;
pub mod input;
pub mod overlay;
pub mod scheduler;
pub mod types;
pub mod utils;
pub mod viewport;

pub use config::MagnifierConfig;
pub use error::{MagnifierError, Result};
pub use filter::InputFilter;
pub use gesture::{GestureDetector, GestureTimers};
pub use input::ControllerSource;
pub use overlay::{
    LensLayout, LoggingOverlay, MessagePump, OverlayLifecycle, OverlayRenderUpdate, PumpStatus,
};
pub use scheduler::{FrameScheduler, QuitReason, TickStatus};
pub use types::*;
pub use utils::TraceWriter;
pub use viewport::ViewportController;

#[cfg(test)]
mod tests;
