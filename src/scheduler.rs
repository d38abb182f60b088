use std::path::Path;
use std::time::{Duration, Instant};

use crate::config::MagnifierConfig;
use crate::error::Result;
use crate::filter::InputFilter;
use crate::gesture::GestureDetector;
use crate::input::ControllerSource;
use crate::overlay::{MessagePump, OverlayLifecycle, OverlayRenderUpdate, PumpStatus};
use crate::types::{OverlayVisibility, Point, TraceSample};
use crate::utils::TraceWriter;
use crate::viewport::ViewportController;

/// Why the loop stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuitReason {
    /// Both sticks held up past the quit threshold.
    Gesture,
    /// The overlay window was closed by the OS.
    WindowClosed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickStatus {
    Running,
    Quit(QuitReason),
}

/// Fixed-rate driver for the whole magnifier.
///
/// Each tick polls every slot, feeds the samples through the filter, gesture
/// detector and viewport, applies gesture decisions, then drains the overlay's
/// messages and moves it to the new center. Gesture decisions made in a tick
/// are applied before that tick's render update.
pub struct FrameScheduler<S, O>
where
    O: OverlayLifecycle,
{
    source: S,
    overlay: O,
    filter: InputFilter,
    viewport: ViewportController,
    detectors: Vec<GestureDetector>,
    visibility: OverlayVisibility,
    handle: Option<O::Handle>,
    tick_interval_ms: u32,
    start_shown: bool,
    ticks: u64,
    quit: Option<QuitReason>,
    trace: Option<TraceWriter>,
}

impl<S, O> FrameScheduler<S, O>
where
    S: ControllerSource,
    O: OverlayRenderUpdate + MessagePump,
{
    pub fn new(config: &MagnifierConfig, source: S, overlay: O) -> Self {
        Self {
            source,
            overlay,
            filter: InputFilter::new(config.deadzone),
            viewport: ViewportController::new(config),
            detectors: (0..config.slots)
                .map(|_| GestureDetector::new(config))
                .collect(),
            visibility: OverlayVisibility::default(),
            handle: None,
            tick_interval_ms: config.tick_interval_ms,
            start_shown: config.start_shown,
            ticks: 0,
            quit: None,
            trace: None,
        }
    }

    /// Stream a [`TraceSample`] row to `path` every tick.
    pub fn with_trace_file(mut self, path: &Path) -> Result<Self> {
        self.trace = Some(TraceWriter::create(path)?);
        log::info!("Tracing ticks to {}", path.display());
        Ok(self)
    }

    pub fn visibility(&self) -> OverlayVisibility {
        self.visibility
    }

    pub fn viewport(&self) -> &ViewportController {
        &self.viewport
    }

    pub fn position(&self) -> Point {
        self.viewport.position()
    }

    pub fn overlay(&self) -> &O {
        &self.overlay
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn quit_reason(&self) -> Option<QuitReason> {
        self.quit
    }

    /// Open the overlay at launch if configured to.
    pub fn start(&mut self) {
        log::info!(
            "Magnifier starting: {} slots, {} ms tick, overlay {}",
            self.detectors.len(),
            self.tick_interval_ms,
            if self.start_shown { "shown" } else { "hidden" }
        );
        if self.start_shown && !self.visibility.shown {
            self.show();
        }
    }

    /// Run one tick without sleeping.
    pub fn tick(&mut self) -> TickStatus {
        if let Some(reason) = self.quit {
            return TickStatus::Quit(reason);
        }

        self.source.begin_tick();

        let mut toggle = false;
        let mut quit = false;
        let mut frozen = false;

        for slot in 0..self.detectors.len() {
            let Some(sample) = self.source.poll(slot) else {
                continue;
            };

            let left = self.filter.stick(sample.left_stick);
            let right = self.filter.stick(sample.right_stick);
            let outcome = self.detectors[slot].observe(&sample, left, right);

            let integrate = self.visibility.shown && !outcome.frozen;
            self.viewport.update(right, integrate);

            if outcome.toggle {
                log::debug!("Slot {} requested toggle", slot);
                toggle = true;
            }
            if outcome.quit {
                log::debug!("Slot {} held quit gesture", slot);
                quit = true;
            }
            frozen = outcome.frozen;
        }
        self.visibility.frozen = frozen;

        if toggle {
            if self.visibility.shown {
                self.hide();
            } else {
                self.show();
            }
            for detector in &mut self.detectors {
                detector.restart_toggle_debounce();
            }
        }

        if quit {
            log::info!("Quit gesture detected");
            return self.finish(QuitReason::Gesture);
        }

        if let Some(handle) = self.handle.as_ref() {
            if self.overlay.drain_pending(handle) == PumpStatus::CloseRequested {
                log::info!("Overlay window closed");
                return self.finish(QuitReason::WindowClosed);
            }
            self.overlay.set_center(handle, self.viewport.position());
        }

        self.end_tick();
        TickStatus::Running
    }

    /// Tick at the configured rate until a quit is requested.
    pub fn run(&mut self) -> QuitReason {
        let interval = Duration::from_millis(u64::from(self.tick_interval_ms));

        loop {
            let tick_start = Instant::now();

            if let TickStatus::Quit(reason) = self.tick() {
                log::info!("Shutting down after {} ticks", self.ticks);
                return reason;
            }

            let elapsed = tick_start.elapsed();
            if elapsed < interval {
                spin_sleep::sleep(interval - elapsed);
            }
        }
    }

    fn show(&mut self) {
        match self.overlay.initialize(self.viewport.position()) {
            Ok(handle) => {
                self.handle = Some(handle);
                self.visibility.shown = true;
                log::info!("Overlay shown");
            }
            Err(e) => {
                log::warn!("{}; overlay stays hidden", e);
            }
        }
    }

    fn hide(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.overlay.teardown(handle);
            log::info!("Overlay hidden");
        }
        self.visibility.shown = false;
    }

    fn finish(&mut self, reason: QuitReason) -> TickStatus {
        self.hide();
        self.quit = Some(reason);
        self.end_tick();
        self.close_trace();
        TickStatus::Quit(reason)
    }

    fn close_trace(&mut self) {
        if let Some(trace) = self.trace.take() {
            let path = trace.path().display().to_string();
            match trace.finish() {
                Ok(rows) => log::info!("Wrote {} trace rows to {}", rows, path),
                Err(e) => log::warn!("{} ({})", e, path),
            }
        }
    }

    fn end_tick(&mut self) {
        if let Some(trace) = self.trace.as_mut() {
            let state = self.viewport.state();
            let sample = TraceSample {
                tick: self.ticks,
                position: state.position,
                velocity: state.velocity,
                shown: self.visibility.shown,
                frozen: self.visibility.frozen,
            };
            if let Err(e) = trace.write_sample(&sample) {
                log::warn!("{}; tracing stopped", e);
                self.trace = None;
            }
        }

        for detector in &mut self.detectors {
            detector.advance_clock(self.tick_interval_ms);
        }
        self.ticks += 1;
    }
}
