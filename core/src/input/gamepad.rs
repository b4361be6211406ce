//! Gamepad input handling via gilrs

use gilrs::{Axis, Button, Gilrs};
use hashbrown::HashMap;

use super::{Buttons, ControllerSource, ControllerState, GamepadState, MAX_CONTROLLERS};

/// gilrs-backed controller slots
pub struct GilrsControllers {
    gilrs: Gilrs,
    /// Gamepad ID to slot mapping
    gamepad_to_slot: HashMap<gilrs::GamepadId, usize>,
}

impl GilrsControllers {
    /// Initialize gilrs and assign already-connected pads to slots
    pub fn new() -> Result<Self, gilrs::Error> {
        let gilrs = Gilrs::new()?;
        let mut controllers = Self {
            gilrs,
            gamepad_to_slot: HashMap::new(),
        };

        let connected: Vec<gilrs::GamepadId> =
            controllers.gilrs.gamepads().map(|(id, _)| id).collect();
        for id in connected {
            controllers.assign_slot(id);
        }
        Ok(controllers)
    }

    fn assign_slot(&mut self, id: gilrs::GamepadId) {
        if self.gamepad_to_slot.contains_key(&id) {
            return;
        }
        let free_slot =
            (0..MAX_CONTROLLERS).find(|&slot| !self.gamepad_to_slot.values().any(|&s| s == slot));
        if let Some(slot) = free_slot {
            self.gamepad_to_slot.insert(id, slot);
            tracing::info!("Gamepad {} connected in slot {}", id, slot);
        } else {
            tracing::warn!("Gamepad {} connected but no free controller slots", id);
        }
    }

    fn read_gamepad(gamepad: &gilrs::Gamepad) -> GamepadState {
        const MAPPING: [(Button, Buttons); 12] = [
            (Button::DPadUp, Buttons::DPAD_UP),
            (Button::DPadDown, Buttons::DPAD_DOWN),
            (Button::DPadLeft, Buttons::DPAD_LEFT),
            (Button::DPadRight, Buttons::DPAD_RIGHT),
            (Button::Start, Buttons::START),
            (Button::Select, Buttons::BACK),
            (Button::LeftTrigger, Buttons::LEFT_SHOULDER),
            (Button::RightTrigger, Buttons::RIGHT_SHOULDER),
            // South=A, East=B, West=X, North=Y in Xbox layout
            (Button::South, Buttons::A),
            (Button::East, Buttons::B),
            (Button::West, Buttons::X),
            (Button::North, Buttons::Y),
        ];

        let buttons = MAPPING
            .iter()
            .filter(|(button, _)| gamepad.is_pressed(*button))
            .fold(Buttons::empty(), |mask, (_, flag)| mask | *flag);

        GamepadState {
            buttons,
            stick_x: axis_to_raw(gamepad.value(Axis::LeftStickX)),
            stick_y: axis_to_raw(-gamepad.value(Axis::LeftStickY)), // Invert Y (up = positive)
        }
    }
}

/// Scale a normalized axis value to the signed 16-bit stick range
fn axis_to_raw(value: f32) -> i16 {
    (value.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
}

impl ControllerSource for GilrsControllers {
    fn refresh(&mut self) {
        while let Some(event) = self.gilrs.next_event() {
            match event.event {
                gilrs::EventType::Connected => self.assign_slot(event.id),
                gilrs::EventType::Disconnected => {
                    if let Some(slot) = self.gamepad_to_slot.remove(&event.id) {
                        tracing::info!("Gamepad {} (slot {}) disconnected", event.id, slot);
                    }
                }
                _ => {}
            }
        }
    }

    fn poll(&mut self, slot: usize) -> ControllerState {
        let id = self
            .gamepad_to_slot
            .iter()
            .find(|&(_, &s)| s == slot)
            .map(|(&id, _)| id);

        match id.and_then(|id| self.gilrs.connected_gamepad(id)) {
            Some(gamepad) => ControllerState::Connected(Self::read_gamepad(&gamepad)),
            None => ControllerState::Disconnected,
        }
    }
}
