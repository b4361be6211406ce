//! Controller input
//!
//! Controllers are polled once per frame per slot. Slots with no device
//! report [`ControllerState::Disconnected`].

mod backend;
mod deadzone;
#[cfg(feature = "gamepad")]
mod gamepad;

pub use backend::GamepadBackend;
pub use deadzone::apply_stick_deadzone;
#[cfg(feature = "gamepad")]
pub use gamepad::GilrsControllers;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Number of logical controller slots polled each frame
pub const MAX_CONTROLLERS: usize = 4;

bitflags! {
    /// Digital button mask (bit layout follows the common XInput convention)
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct Buttons: u16 {
        const DPAD_UP = 0x0001;
        const DPAD_DOWN = 0x0002;
        const DPAD_LEFT = 0x0004;
        const DPAD_RIGHT = 0x0008;
        const START = 0x0010;
        const BACK = 0x0020;
        const LEFT_SHOULDER = 0x0100;
        const RIGHT_SHOULDER = 0x0200;
        const A = 0x1000;
        const B = 0x2000;
        const X = 0x4000;
        const Y = 0x8000;
    }
}

/// Snapshot of one connected gamepad
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GamepadState {
    pub buttons: Buttons,
    /// Left stick X, full signed 16-bit range, right is positive
    pub stick_x: i16,
    /// Left stick Y, full signed 16-bit range, up is positive
    pub stick_y: i16,
}

/// Result of polling one controller slot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ControllerState {
    Connected(GamepadState),
    #[default]
    Disconnected,
}

/// Source of per-slot controller state
pub trait ControllerSource {
    /// Pump pending device events (hotplug etc.) before slots are polled
    fn refresh(&mut self) {}

    /// Current state of `slot` (0..[`MAX_CONTROLLERS`])
    fn poll(&mut self, slot: usize) -> ControllerState;
}

/// Input configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputConfig {
    /// Raw stick magnitude below which deflection reads as zero (0 disables)
    #[serde(default = "default_stick_deadzone")]
    pub stick_deadzone: u16,

    /// Stick deflection divisor for the per-frame scroll step
    #[serde(default = "default_scroll_divisor")]
    pub scroll_divisor: i32,
}

fn default_stick_deadzone() -> u16 {
    7849
}
fn default_scroll_divisor() -> i32 {
    4096
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            stick_deadzone: default_stick_deadzone(),
            scroll_divisor: default_scroll_divisor(),
        }
    }
}
