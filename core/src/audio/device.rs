//! Audio device seam

use crate::error::DeviceError;

/// Byte offsets reported by the device, both modulo the ring size
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursors {
    /// Offset currently being read for output
    pub play: u32,
    /// Offset up to which writing is unsafe right now
    pub write: u32,
}

/// Circular output buffer whose play cursor advances on the device's own clock.
///
/// The frame loop only reads cursors and writes through [`lock_region`];
/// it never moves the cursors itself.
///
/// [`lock_region`]: AudioDevice::lock_region
pub trait AudioDevice {
    /// Ring capacity in bytes
    fn buffer_size(&self) -> u32;

    /// Sample the current play/write cursors
    fn cursors(&mut self) -> Result<Cursors, DeviceError>;

    /// Lock `len` bytes starting at `offset` and hand the (at most two)
    /// contiguous regions to `write`, unlocking when it returns.
    ///
    /// Must fail fast with [`DeviceError::Busy`] instead of blocking when the
    /// ring cannot be acquired.
    fn lock_region(
        &mut self,
        offset: u32,
        len: u32,
        write: &mut dyn FnMut(&mut [u8], &mut [u8]),
    ) -> Result<(), DeviceError>;

    /// Start looping playback
    fn play(&mut self) -> Result<(), DeviceError>;
}
