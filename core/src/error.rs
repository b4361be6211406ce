//! Error types for the frame loop core
//!
//! Three tiers, matching how the loop treats them:
//! - [`CoreError`] is fatal-init: the loop never starts.
//! - [`DeviceError`] and [`PlatformError`] are recoverable per frame: the
//!   runtime logs them and carries on with the next iteration.

use thiserror::Error;

/// Fatal errors raised while building or starting the runtime
#[derive(Error, Debug)]
pub enum CoreError {
    /// Backbuffer memory could not be reserved
    #[error("Failed to allocate {bytes} bytes for a {width}x{height} backbuffer")]
    Allocation {
        width: u32,
        height: u32,
        bytes: usize,
    },

    /// Requested geometry overflows the addressable pixel count
    #[error("Invalid backbuffer geometry {width}x{height}")]
    InvalidGeometry { width: u32, height: u32 },

    /// Audio device could not be brought up
    #[error("Audio device error: {0}")]
    Device(#[from] DeviceError),

    /// Sound output parameters are inconsistent
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Errors reported by an audio ring device
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeviceError {
    /// The ring is held by the playback side; try again next frame
    #[error("Ring buffer is busy")]
    Busy,

    /// Lock request does not fit inside the ring
    #[error("Lock of {len} bytes at offset {offset} exceeds ring capacity {capacity}")]
    OutOfRange { offset: u32, len: u32, capacity: u32 },

    /// No usable output device
    #[error("Audio device unavailable: {0}")]
    Unavailable(String),

    /// The output stream failed
    #[error("Audio stream error: {0}")]
    Stream(String),
}

/// Errors reported by the event source or presentation surface
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlatformError {
    /// Event dispatch produced something the source could not decode
    #[error("Event dispatch error: {0}")]
    Event(String),

    /// Presenting the backbuffer failed
    #[error("Presentation error: {0}")]
    Present(String),
}
