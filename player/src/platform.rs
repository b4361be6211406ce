//! Player platform: real audio and controllers, headless surface

use pulseframe_core::audio::{AudioDevice, CursorDriver, Cursors, SimulatedDevice, SoundOutput};
use pulseframe_core::error::DeviceError;
use pulseframe_core::input::GamepadBackend;
use pulseframe_core::platform::{Platform, SystemClock};

use crate::audio_output::CpalRingDevice;
use crate::headless::{HeadlessEvents, SnapshotPresenter};

/// Output device chosen at startup
pub enum PlayerAudio {
    /// Default cpal output device
    Cpal(CpalRingDevice),
    /// No usable hardware: a ring whose cursor follows wall time
    Simulated(SimulatedDevice),
}

impl PlayerAudio {
    /// Open the cpal device for `sound`, degrading to a wall-clock ring
    pub fn open(sound: &SoundOutput, null_audio: bool) -> Self {
        if !null_audio {
            match CpalRingDevice::new(sound.samples_per_second(), sound.secondary_buffer_size()) {
                Ok(device) => return Self::Cpal(device),
                Err(e) => {
                    tracing::warn!("{}. Falling back to silent audio.", e);
                }
            }
        }
        Self::simulated(sound)
    }

    fn simulated(sound: &SoundOutput) -> Self {
        let bytes_per_second = sound.samples_per_second() * sound.bytes_per_sample();
        Self::Simulated(SimulatedDevice::new(
            sound.secondary_buffer_size(),
            CursorDriver::WallClock { bytes_per_second },
        ))
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Cpal(device) => format!("cpal output at {} Hz", device.sample_rate()),
            Self::Simulated(_) => "simulated output".to_string(),
        }
    }

    fn device(&mut self) -> &mut dyn AudioDevice {
        match self {
            Self::Cpal(device) => device,
            Self::Simulated(device) => device,
        }
    }
}

impl AudioDevice for PlayerAudio {
    fn buffer_size(&self) -> u32 {
        match self {
            Self::Cpal(device) => device.buffer_size(),
            Self::Simulated(device) => device.buffer_size(),
        }
    }

    fn cursors(&mut self) -> Result<Cursors, DeviceError> {
        self.device().cursors()
    }

    fn lock_region(
        &mut self,
        offset: u32,
        len: u32,
        write: &mut dyn FnMut(&mut [u8], &mut [u8]),
    ) -> Result<(), DeviceError> {
        self.device().lock_region(offset, len, write)
    }

    fn play(&mut self) -> Result<(), DeviceError> {
        self.device().play()
    }
}

/// Collaborator types used by the `pulseframe` binary
pub struct PlayerPlatform;

impl Platform for PlayerPlatform {
    type Events = HeadlessEvents;
    type Controllers = GamepadBackend;
    type Audio = PlayerAudio;
    type Presenter = SnapshotPresenter;
    type Clock = SystemClock;
}
