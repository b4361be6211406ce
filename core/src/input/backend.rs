//! Controller backend resolved once at startup

use super::{ControllerSource, ControllerState};
#[cfg(feature = "gamepad")]
use super::GilrsControllers;

/// Gamepad support, present or absent
///
/// Absence answers [`ControllerState::Disconnected`] for every slot.
pub enum GamepadBackend {
    #[cfg(feature = "gamepad")]
    Present(GilrsControllers),
    Absent,
}

impl GamepadBackend {
    /// Probe for gamepad support
    pub fn detect() -> Self {
        #[cfg(feature = "gamepad")]
        {
            match GilrsControllers::new() {
                Ok(controllers) => return Self::Present(controllers),
                Err(e) => {
                    tracing::warn!(
                        "Failed to initialize gamepad support: {}. Gamepads will not be available.",
                        e
                    );
                }
            }
        }
        #[cfg(not(feature = "gamepad"))]
        tracing::info!("Built without gamepad support");

        Self::Absent
    }

    pub fn is_present(&self) -> bool {
        !matches!(self, Self::Absent)
    }
}

impl ControllerSource for GamepadBackend {
    fn refresh(&mut self) {
        match self {
            #[cfg(feature = "gamepad")]
            Self::Present(controllers) => controllers.refresh(),
            Self::Absent => {}
        }
    }

    fn poll(&mut self, slot: usize) -> ControllerState {
        match self {
            #[cfg(feature = "gamepad")]
            Self::Present(controllers) => controllers.poll(slot),
            Self::Absent => {
                let _ = slot;
                ControllerState::Disconnected
            }
        }
    }
}
