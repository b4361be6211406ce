//! Pulseframe Core - real-time frame and audio loop
//!
//! This crate provides the loop that paints a procedural backbuffer every
//! frame and keeps a device-owned circular audio buffer filled just ahead of
//! its play cursor.
//!
//! # Architecture
//!
//! - [`Platform`] - Bundle of collaborators (events, controllers, audio ring, presenter, clock)
//! - [`Runtime`] - Frame loop orchestration over a platform
//! - [`FrameBuffer`] - Owned top-down BGRX backbuffer
//! - [`SoundOutput`] - Ring bookkeeping and continuous-phase tone synthesis

pub mod audio;
pub mod capture;
pub mod config;
pub mod error;
pub mod framebuffer;
pub mod input;
#[cfg(test)]
mod integration;
pub mod pattern;
pub mod platform;
pub mod runtime;
#[cfg(test)]
pub mod test_utils;

// Re-export core traits and types
pub use audio::{
    AudioDevice, BYTES_PER_SAMPLE, CursorDriver, Cursors, SimulatedDevice, SoundOutput, ToneSynth,
    WriteWindow,
};
pub use config::Config;
pub use error::{CoreError, DeviceError, PlatformError};
pub use framebuffer::FrameBuffer;
pub use input::{
    Buttons, ControllerSource, ControllerState, GamepadBackend, GamepadState, MAX_CONTROLLERS,
};
pub use platform::{
    AppEvent, Clock, Collaborators, EventSource, KeyCode, Platform, Presenter, SystemClock,
};
pub use runtime::{AppContext, FrameStats, LoopState, Runtime, RuntimeConfig};
