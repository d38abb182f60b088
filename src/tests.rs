use crate::constants::{BUTTON_LEFT_THUMB, BUTTON_RIGHT_THUMB, TRACE_FLUSH_ROWS};
use crate::error::{MagnifierError, Result};
use crate::input::ControllerSource;
use crate::overlay::{MessagePump, OverlayLifecycle, OverlayRenderUpdate, PumpStatus};
use crate::scheduler::{FrameScheduler, QuitReason, TickStatus};
use crate::types::{Buttons, ControllerSample, Point, StickReading};
use crate::MagnifierConfig;

const EPSILON: f32 = 1e-4;

/// Replays whatever sample is currently set for each slot.
#[derive(Default)]
struct ScriptedSource {
    slots: Vec<Option<ControllerSample>>,
    begin_ticks: u64,
}

impl ScriptedSource {
    fn with_slots(count: usize) -> Self {
        Self {
            slots: vec![None; count],
            begin_ticks: 0,
        }
    }

    fn connected(sample: ControllerSample) -> Self {
        let mut source = Self::with_slots(4);
        source.set(0, Some(sample));
        source
    }

    fn set(&mut self, slot: usize, sample: Option<ControllerSample>) {
        self.slots[slot] = sample;
    }
}

impl ControllerSource for ScriptedSource {
    fn begin_tick(&mut self) {
        self.begin_ticks += 1;
    }

    fn poll(&mut self, slot: usize) -> Option<ControllerSample> {
        self.slots.get(slot).copied().flatten()
    }
}

#[derive(Clone, Debug, PartialEq)]
enum Call {
    Initialize(Point),
    Teardown(u32),
    SetCenter(Point),
}

#[derive(Default)]
struct RecordingOverlay {
    calls: Vec<Call>,
    next_handle: u32,
    fail_initialize: bool,
    close_on_drain: bool,
}

impl RecordingOverlay {
    fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.iter().filter(|c| pred(*c)).count()
    }

    fn initializes(&self) -> usize {
        self.count(|c| matches!(c, Call::Initialize(_)))
    }

    fn teardowns(&self) -> usize {
        self.count(|c| matches!(c, Call::Teardown(_)))
    }

    fn set_centers(&self) -> usize {
        self.count(|c| matches!(c, Call::SetCenter(_)))
    }
}

impl OverlayLifecycle for RecordingOverlay {
    type Handle = u32;

    fn initialize(&mut self, initial_center: Point) -> Result<u32> {
        self.calls.push(Call::Initialize(initial_center));
        if self.fail_initialize {
            return Err(MagnifierError::OverlayInit("test refusal".to_string()));
        }
        self.next_handle += 1;
        Ok(self.next_handle)
    }

    fn teardown(&mut self, handle: u32) {
        self.calls.push(Call::Teardown(handle));
    }
}

impl OverlayRenderUpdate for RecordingOverlay {
    fn set_center(&mut self, _handle: &u32, center: Point) {
        self.calls.push(Call::SetCenter(center));
    }
}

impl MessagePump for RecordingOverlay {
    fn drain_pending(&mut self, _handle: &u32) -> PumpStatus {
        if self.close_on_drain {
            PumpStatus::CloseRequested
        } else {
            PumpStatus::Continue
        }
    }
}

fn hidden_config() -> MagnifierConfig {
    MagnifierConfig {
        start_shown: false,
        ..Default::default()
    }
}

fn shown_scheduler(source: ScriptedSource) -> FrameScheduler<ScriptedSource, RecordingOverlay> {
    let mut scheduler =
        FrameScheduler::new(&MagnifierConfig::default(), source, RecordingOverlay::default());
    scheduler.start();
    scheduler
}

fn sticks_clicked() -> ControllerSample {
    ControllerSample {
        buttons: Buttons(BUTTON_LEFT_THUMB | BUTTON_RIGHT_THUMB),
        ..Default::default()
    }
}

fn right_stick(x: i16, y: i16) -> ControllerSample {
    ControllerSample {
        right_stick: StickReading::new(x, y),
        ..Default::default()
    }
}

fn both_sticks_up() -> ControllerSample {
    ControllerSample {
        left_stick: StickReading::new(0, i16::MAX),
        right_stick: StickReading::new(0, i16::MAX),
        ..Default::default()
    }
}

#[test]
fn test_start_shown_initializes_at_screen_center() {
    let scheduler = shown_scheduler(ScriptedSource::with_slots(4));
    assert!(scheduler.visibility().shown);
    assert_eq!(
        scheduler.overlay().calls,
        vec![Call::Initialize(Point::new(960.0, 540.0))]
    );
}

#[test]
fn test_full_right_deflection_scenario() {
    let mut scheduler = shown_scheduler(ScriptedSource::connected(right_stick(i16::MAX, 0)));

    let mut last_x = scheduler.position().x;
    for tick in 1..=10 {
        assert_eq!(scheduler.tick(), TickStatus::Running);
        let vx = scheduler.viewport().velocity().x;
        let x = scheduler.position().x;

        if tick >= 4 {
            assert!((vx - 20.0).abs() < EPSILON, "tick {tick}: vx={vx}");
        }
        assert!(x > last_x, "tick {tick}: x={x} did not advance past {last_x}");
        assert!(x <= 1920.0);
        last_x = x;
    }

    // 5 + 10 + 15 + 20 * 7
    assert!((scheduler.position().x - 1130.0).abs() < EPSILON);
    assert_eq!(scheduler.position().y, 540.0);
}

#[test]
fn test_toggle_scenario_initializes_then_tears_down() {
    let mut scheduler = FrameScheduler::new(
        &hidden_config(),
        ScriptedSource::with_slots(4),
        RecordingOverlay::default(),
    );
    scheduler.start();
    assert!(!scheduler.visibility().shown);
    assert!(scheduler.overlay().calls.is_empty());

    scheduler.source_mut().set(0, Some(sticks_clicked()));
    scheduler.tick();
    assert!(scheduler.visibility().shown);
    assert_eq!(scheduler.overlay().initializes(), 1);
    assert_eq!(
        scheduler.overlay().calls[0],
        Call::Initialize(Point::new(960.0, 540.0))
    );

    // Release, then click again 160 ms later: inside the debounce window.
    scheduler.source_mut().set(0, Some(ControllerSample::default()));
    for _ in 1..10 {
        scheduler.tick();
    }
    scheduler.source_mut().set(0, Some(sticks_clicked()));
    scheduler.tick();
    assert!(scheduler.visibility().shown);
    assert_eq!(scheduler.overlay().teardowns(), 0);

    // Keep holding until 416 ms after the first toggle.
    for _ in 11..26 {
        scheduler.tick();
    }
    assert!(scheduler.visibility().shown);
    scheduler.tick();
    assert!(!scheduler.visibility().shown);
    assert_eq!(scheduler.overlay().initializes(), 1);
    assert_eq!(scheduler.overlay().teardowns(), 1);
}

#[test]
fn test_render_update_follows_toggle_in_same_tick() {
    let mut scheduler = FrameScheduler::new(
        &hidden_config(),
        ScriptedSource::connected(sticks_clicked()),
        RecordingOverlay::default(),
    );
    scheduler.tick();
    assert_eq!(
        scheduler.overlay().calls,
        vec![
            Call::Initialize(Point::new(960.0, 540.0)),
            Call::SetCenter(Point::new(960.0, 540.0)),
        ]
    );
}

#[test]
fn test_failed_initialize_rolls_back_toggle() {
    let overlay = RecordingOverlay {
        fail_initialize: true,
        ..Default::default()
    };
    let mut scheduler = FrameScheduler::new(
        &hidden_config(),
        ScriptedSource::connected(sticks_clicked()),
        overlay,
    );

    for _ in 0..5 {
        assert_eq!(scheduler.tick(), TickStatus::Running);
    }
    assert!(!scheduler.visibility().shown);
    assert_eq!(scheduler.overlay().initializes(), 1);
    assert_eq!(scheduler.overlay().set_centers(), 0);
    assert_eq!(scheduler.overlay().teardowns(), 0);
}

#[test]
fn test_quit_gesture_latency() {
    // 1999 ms held: 125 samples at 16 ms.
    let mut scheduler = shown_scheduler(ScriptedSource::connected(both_sticks_up()));
    for _ in 0..125 {
        assert_eq!(scheduler.tick(), TickStatus::Running);
    }
    assert_eq!(scheduler.quit_reason(), None);

    // 2001 ms held: the 126th sample crosses 2000 ms.
    assert_eq!(scheduler.tick(), TickStatus::Quit(QuitReason::Gesture));
    assert_eq!(scheduler.quit_reason(), Some(QuitReason::Gesture));
    assert!(!scheduler.visibility().shown);
    assert_eq!(scheduler.overlay().teardowns(), 1);

    // Later ticks do nothing.
    let calls = scheduler.overlay().calls.len();
    assert_eq!(scheduler.tick(), TickStatus::Quit(QuitReason::Gesture));
    assert_eq!(scheduler.overlay().calls.len(), calls);
    assert_eq!(scheduler.ticks(), 126);
}

#[test]
fn test_quit_while_hidden_skips_teardown() {
    let mut scheduler = FrameScheduler::new(
        &hidden_config(),
        ScriptedSource::connected(both_sticks_up()),
        RecordingOverlay::default(),
    );
    let status = (0..200)
        .map(|_| scheduler.tick())
        .find(|s| *s != TickStatus::Running);
    assert_eq!(status, Some(TickStatus::Quit(QuitReason::Gesture)));
    assert!(scheduler.overlay().calls.is_empty());
}

#[test]
fn test_window_close_ends_loop() {
    let overlay = RecordingOverlay {
        close_on_drain: true,
        ..Default::default()
    };
    let mut scheduler = FrameScheduler::new(
        &MagnifierConfig::default(),
        ScriptedSource::with_slots(4),
        overlay,
    );
    scheduler.start();

    assert_eq!(scheduler.tick(), TickStatus::Quit(QuitReason::WindowClosed));
    assert_eq!(scheduler.overlay().teardowns(), 1);
    assert_eq!(scheduler.overlay().set_centers(), 0);
}

#[test]
fn test_disconnected_slots_are_skipped() {
    let mut scheduler = shown_scheduler(ScriptedSource::with_slots(4));
    for _ in 0..30 {
        assert_eq!(scheduler.tick(), TickStatus::Running);
    }
    assert_eq!(scheduler.position(), Point::new(960.0, 540.0));
    assert_eq!(scheduler.overlay().set_centers(), 30);
    assert_eq!(scheduler.source_mut().begin_ticks, 30);
}

#[test]
fn test_left_trigger_freezes_movement() {
    let sample = ControllerSample {
        left_trigger: 255,
        ..right_stick(i16::MAX, i16::MIN)
    };
    let mut scheduler = shown_scheduler(ScriptedSource::connected(sample));
    for _ in 0..10 {
        scheduler.tick();
    }
    assert!(scheduler.visibility().frozen);
    assert_eq!(scheduler.position(), Point::new(960.0, 540.0));
    assert_eq!(scheduler.viewport().velocity(), Point::new(20.0, 20.0));

    // Releasing the trigger resumes movement with the built-up velocity.
    scheduler.source_mut().set(0, Some(right_stick(i16::MAX, i16::MIN)));
    scheduler.tick();
    assert!(!scheduler.visibility().frozen);
    assert_eq!(scheduler.position(), Point::new(980.0, 560.0));
}

#[test]
fn test_hidden_overlay_does_not_move_viewport() {
    let mut scheduler = FrameScheduler::new(
        &hidden_config(),
        ScriptedSource::connected(right_stick(i16::MAX, 0)),
        RecordingOverlay::default(),
    );
    for _ in 0..10 {
        scheduler.tick();
    }
    assert_eq!(scheduler.position(), Point::new(960.0, 540.0));
    assert_eq!(scheduler.viewport().velocity().x, 20.0);
    assert_eq!(scheduler.overlay().set_centers(), 0);
}

#[test]
fn test_simultaneous_toggles_from_two_slots_apply_once() {
    let mut source = ScriptedSource::with_slots(4);
    source.set(1, Some(sticks_clicked()));
    source.set(3, Some(sticks_clicked()));
    let mut scheduler = FrameScheduler::new(&hidden_config(), source, RecordingOverlay::default());

    scheduler.tick();
    assert!(scheduler.visibility().shown);
    assert_eq!(scheduler.overlay().initializes(), 1);

    // Slot 3 alone inside the debounce window does nothing.
    scheduler.source_mut().set(1, None);
    for _ in 0..10 {
        scheduler.tick();
    }
    assert!(scheduler.visibility().shown);
    assert_eq!(scheduler.overlay().teardowns(), 0);
}

#[test]
fn test_last_connected_slot_decides_frozen_flag() {
    let frozen = ControllerSample {
        left_trigger: 200,
        ..Default::default()
    };
    let mut source = ScriptedSource::with_slots(4);
    source.set(0, Some(frozen));
    source.set(2, Some(ControllerSample::default()));
    let mut scheduler = shown_scheduler(source);

    scheduler.tick();
    assert!(!scheduler.visibility().frozen);

    scheduler.source_mut().set(2, None);
    scheduler.tick();
    assert!(scheduler.visibility().frozen);
}

#[test]
fn test_each_connected_slot_feeds_viewport() {
    let mut source = ScriptedSource::with_slots(4);
    source.set(0, Some(right_stick(i16::MAX, 0)));
    source.set(1, Some(right_stick(i16::MAX, 0)));
    let mut scheduler = shown_scheduler(source);

    scheduler.tick();
    // Two updates this tick: velocity 5 then 10.
    assert_eq!(scheduler.viewport().velocity().x, 10.0);
    assert_eq!(scheduler.position().x, 975.0);
}

#[test]
fn test_bounds_hold_for_long_input_sequence() {
    let mut scheduler = shown_scheduler(ScriptedSource::with_slots(4));

    // Deterministic pseudo-random stick and trigger values.
    let mut seed: u32 = 0x1234_5678;
    let mut next = move || {
        seed = seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        seed
    };

    for _ in 0..2000 {
        let r = next();
        let sample = ControllerSample {
            right_stick: StickReading::new((r >> 16) as i16, r as i16),
            left_trigger: if next() % 7 == 0 { 255 } else { 0 },
            ..Default::default()
        };
        scheduler.source_mut().set(0, Some(sample));
        assert_eq!(scheduler.tick(), TickStatus::Running);

        let v = scheduler.viewport().velocity();
        assert!(v.x.abs() <= 20.0 && v.y.abs() <= 20.0, "velocity out of bounds: {v:?}");
        let p = scheduler.position();
        assert!((0.0..=1920.0).contains(&p.x), "x out of bounds: {}", p.x);
        assert!((0.0..=1080.0).contains(&p.y), "y out of bounds: {}", p.y);
    }
}

#[test]
fn test_trace_rows_reach_disk_while_running() {
    let dir = std::env::temp_dir()
        .join(format!("game-magnifier-scheduler-trace-{}", std::process::id()));
    let path = dir.join("trace.csv");
    let mut scheduler = shown_scheduler(ScriptedSource::connected(right_stick(i16::MAX, 0)))
        .with_trace_file(&path)
        .unwrap();

    for _ in 0..TRACE_FLUSH_ROWS {
        assert_eq!(scheduler.tick(), TickStatus::Running);
    }

    // Still running: rows are already on disk.
    let contents = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len() as u64, TRACE_FLUSH_ROWS + 1);
    assert_eq!(lines[0], "tick,x,y,vx,vy,shown,frozen");
    assert_eq!(lines[1], "0,965,540,5,0,1,0");
    assert_eq!(lines[5], "4,1030,540,20,0,1,0");

    scheduler.source_mut().set(0, Some(both_sticks_up()));
    let mut status = TickStatus::Running;
    for _ in 0..500 {
        status = scheduler.tick();
        if status != TickStatus::Running {
            break;
        }
    }
    assert_eq!(status, TickStatus::Quit(QuitReason::Gesture));

    let contents = std::fs::read_to_string(&path).unwrap();
    assert_eq!(contents.lines().count() as u64, scheduler.ticks() + 1);

    let _ = std::fs::remove_dir_all(dir);
}
