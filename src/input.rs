use crate::constants::{
    BUTTON_GUIDE, BUTTON_LEFT_THUMB, BUTTON_RIGHT_THUMB, MAX_ANALOG_MAGNITUDE,
};
use crate::types::{Buttons, ControllerSample, StickReading};

/// Non-blocking source of controller snapshots, addressed by slot.
pub trait ControllerSource {
    /// Called once per tick before any slot is polled.
    fn begin_tick(&mut self) {}

    /// Current state of `slot`, or `None` when nothing is connected there.
    fn poll(&mut self, slot: usize) -> Option<ControllerSample>;
}

/// Stick axis in `[-1, 1]` scaled to raw stick units. Up stays positive.
pub fn axis_to_raw(value: f32) -> i16 {
    (value.clamp(-1.0, 1.0) * MAX_ANALOG_MAGNITUDE) as i16
}

/// Analog trigger in `[0, 1]` scaled to `0..=255`.
pub fn trigger_to_raw(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0) as u8
}

/// One gamepad as a float-valued backend reports it.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PadSnapshot {
    pub left_stick: (f32, f32),
    pub right_stick: (f32, f32),
    pub left_trigger: f32,
    pub right_trigger: f32,
    pub left_thumb: bool,
    pub right_thumb: bool,
    /// Vendor "mode" button, reported as guide only when enabled.
    pub mode: bool,
}

impl PadSnapshot {
    pub fn to_sample(&self, guide_button: bool) -> ControllerSample {
        let mut buttons = Buttons::default();
        if self.left_thumb {
            buttons = buttons.with(BUTTON_LEFT_THUMB);
        }
        if self.right_thumb {
            buttons = buttons.with(BUTTON_RIGHT_THUMB);
        }
        if guide_button && self.mode {
            buttons = buttons.with(BUTTON_GUIDE);
        }

        let stick = |(x, y): (f32, f32)| StickReading::new(axis_to_raw(x), axis_to_raw(y));

        ControllerSample {
            buttons,
            left_stick: stick(self.left_stick),
            right_stick: stick(self.right_stick),
            left_trigger: trigger_to_raw(self.left_trigger),
            right_trigger: trigger_to_raw(self.right_trigger),
            guide: guide_button.then_some(self.mode),
        }
    }
}

/// Backend gamepad ids bound to controller slots.
#[derive(Clone, Debug)]
pub struct SlotTable<K> {
    slots: Vec<Option<K>>,
}

impl<K: Copy + PartialEq> SlotTable<K> {
    pub fn new(count: usize) -> Self {
        Self {
            slots: vec![None; count],
        }
    }

    pub fn slot_of(&self, id: K) -> Option<usize> {
        self.slots.iter().position(|entry| *entry == Some(id))
    }

    /// Bind `id` to the first free slot. An id that is already bound keeps
    /// its slot. `None` when every slot is taken.
    pub fn assign(&mut self, id: K) -> Option<usize> {
        if let Some(slot) = self.slot_of(id) {
            return Some(slot);
        }
        let slot = self.slots.iter().position(Option::is_none)?;
        self.slots[slot] = Some(id);
        Some(slot)
    }

    /// Free the slot bound to `id`, returning it.
    pub fn release(&mut self, id: K) -> Option<usize> {
        let slot = self.slot_of(id)?;
        self.slots[slot] = None;
        Some(slot)
    }

    pub fn get(&self, slot: usize) -> Option<K> {
        self.slots.get(slot).copied().flatten()
    }
}

#[cfg(feature = "gilrs-input")]
pub use self::gilrs_source::GilrsSource;

#[cfg(feature = "gilrs-input")]
mod gilrs_source {
    use gilrs::{Axis, Button, Event, EventType, Gamepad, GamepadId, Gilrs};

    use super::{ControllerSource, PadSnapshot, SlotTable};
    use crate::config::MagnifierConfig;
    use crate::error::{MagnifierError, Result};
    use crate::types::ControllerSample;

    /// Controller source backed by gilrs.
    ///
    /// Gamepads are assigned to the first free slot when they connect and
    /// release it when they disconnect.
    pub struct GilrsSource {
        gilrs: Gilrs,
        slots: SlotTable<GamepadId>,
        guide_button: bool,
    }

    impl GilrsSource {
        pub fn new(config: &MagnifierConfig) -> Result<Self> {
            let gilrs =
                Gilrs::new().map_err(|e| MagnifierError::ControllerBackend(e.to_string()))?;

            let mut source = Self {
                gilrs,
                slots: SlotTable::new(config.slots),
                guide_button: config.guide_button,
            };

            let connected: Vec<(GamepadId, String)> = source
                .gilrs
                .gamepads()
                .filter(|(_, gp)| gp.is_connected())
                .map(|(id, gp)| (id, gp.name().to_string()))
                .collect();
            for (id, name) in connected {
                source.assign(id, &name);
            }

            Ok(source)
        }

        fn assign(&mut self, id: GamepadId, name: &str) {
            if self.slots.slot_of(id).is_some() {
                return;
            }
            match self.slots.assign(id) {
                Some(slot) => log::debug!(
                    "Gamepad {} ({}) connected on slot {}",
                    usize::from(id),
                    name,
                    slot
                ),
                None => log::debug!(
                    "Gamepad {} ({}) ignored: all slots in use",
                    usize::from(id),
                    name
                ),
            }
        }

        fn release(&mut self, id: GamepadId) {
            if let Some(slot) = self.slots.release(id) {
                log::debug!("Gamepad {} disconnected from slot {}", usize::from(id), slot);
            }
        }

        fn snapshot(gamepad: &Gamepad<'_>) -> PadSnapshot {
            let trigger = |button: Button| gamepad.button_data(button).map_or(0.0, |d| d.value());

            PadSnapshot {
                left_stick: (gamepad.value(Axis::LeftStickX), gamepad.value(Axis::LeftStickY)),
                right_stick: (gamepad.value(Axis::RightStickX), gamepad.value(Axis::RightStickY)),
                left_trigger: trigger(Button::LeftTrigger2),
                right_trigger: trigger(Button::RightTrigger2),
                left_thumb: gamepad.is_pressed(Button::LeftThumb),
                right_thumb: gamepad.is_pressed(Button::RightThumb),
                mode: gamepad.is_pressed(Button::Mode),
            }
        }
    }

    impl ControllerSource for GilrsSource {
        fn begin_tick(&mut self) {
            while let Some(Event { id, event, .. }) = self.gilrs.next_event() {
                match event {
                    EventType::Connected => {
                        let name = self.gilrs.gamepad(id).name().to_string();
                        self.assign(id, &name);
                    }
                    EventType::Disconnected => self.release(id),
                    _ => {}
                }
            }
        }

        fn poll(&mut self, slot: usize) -> Option<ControllerSample> {
            let id = self.slots.get(slot)?;
            let gamepad = self.gilrs.connected_gamepad(id)?;
            Some(Self::snapshot(&gamepad).to_sample(self.guide_button))
        }
    }
}
