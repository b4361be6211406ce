//! Cursor-relative ring buffer audio
//!
//! Architecture:
//! - The device owns a fixed-size circular byte buffer and advances its own
//!   play cursor on a timeline the frame loop does not control
//! - Once per frame the loop reads the cursors and computes a forward-only
//!   write window ending one latency budget past the play cursor
//! - [`fill_sound_buffer`] locks that window (possibly split in two at the
//!   wrap point) and writes interleaved 16-bit stereo frames from the
//!   [`ToneSynth`], whose phase runs continuously across fills
//!
//! Audio specs:
//! - 48,000 Hz sample rate by default
//! - Stereo, 16-bit signed little-endian PCM
//! - One second of ring buffer, 1/15th of a second of latency

mod device;
mod ring;
mod simulated;
mod tone;

pub use device::{AudioDevice, Cursors};
pub use ring::{WriteWindow, bytes_to_write, fill_sound_buffer, split_regions};
pub use simulated::{CursorDriver, SimulatedDevice};
pub use tone::ToneSynth;

use crate::config::AudioConfig;
use crate::error::CoreError;

/// Channels per sample frame
pub const CHANNELS: u32 = 2;

/// Bytes per interleaved stereo sample frame (2 channels x 16 bits)
pub const BYTES_PER_SAMPLE: u32 = CHANNELS * std::mem::size_of::<i16>() as u32;

/// Synthesis and ring bookkeeping for the sound output.
///
/// `running_sample_index` only ever grows; the next byte the writer targets is
/// always `running_sample_index * bytes_per_sample mod secondary_buffer_size`.
#[derive(Debug, Clone, PartialEq)]
pub struct SoundOutput {
    samples_per_second: u32,
    bytes_per_sample: u32,
    secondary_buffer_size: u32,
    latency_sample_count: u32,
    running_sample_index: u64,
    tone: ToneSynth,
}

impl SoundOutput {
    /// Build a sound output with a ring of one second and the given latency
    pub fn new(
        samples_per_second: u32,
        tone_hz: u32,
        tone_volume: i16,
        latency_sample_count: u32,
    ) -> Result<Self, CoreError> {
        if samples_per_second == 0 {
            return Err(CoreError::Config(
                "samples_per_second must be non-zero".to_string(),
            ));
        }
        let secondary_buffer_size = samples_per_second
            .checked_mul(BYTES_PER_SAMPLE)
            .ok_or_else(|| {
                CoreError::Config(format!(
                    "ring buffer for {} samples/s does not fit in 32 bits",
                    samples_per_second
                ))
            })?;
        if latency_sample_count == 0 || latency_sample_count >= samples_per_second {
            return Err(CoreError::Config(format!(
                "latency of {} samples must be between 1 and {}",
                latency_sample_count,
                samples_per_second - 1
            )));
        }

        Ok(Self {
            samples_per_second,
            bytes_per_sample: BYTES_PER_SAMPLE,
            secondary_buffer_size,
            latency_sample_count,
            running_sample_index: 0,
            tone: ToneSynth::new(samples_per_second, tone_hz, tone_volume),
        })
    }

    /// Build from the `[audio]` config section
    pub fn from_config(config: &AudioConfig) -> Result<Self, CoreError> {
        let latency = config.samples_per_second / config.latency_divisor.max(1);
        Self::new(
            config.samples_per_second,
            config.tone_hz,
            config.tone_volume,
            latency,
        )
    }

    pub fn samples_per_second(&self) -> u32 {
        self.samples_per_second
    }

    pub fn bytes_per_sample(&self) -> u32 {
        self.bytes_per_sample
    }

    /// Ring capacity in bytes
    pub fn secondary_buffer_size(&self) -> u32 {
        self.secondary_buffer_size
    }

    pub fn latency_sample_count(&self) -> u32 {
        self.latency_sample_count
    }

    /// Latency budget in bytes
    pub fn latency_bytes(&self) -> u32 {
        self.latency_sample_count * self.bytes_per_sample
    }

    /// Total sample frames written since start
    pub fn running_sample_index(&self) -> u64 {
        self.running_sample_index
    }

    /// Byte offset the next write will start at
    pub fn byte_to_lock(&self) -> u32 {
        let total = self.running_sample_index * self.bytes_per_sample as u64;
        (total % self.secondary_buffer_size as u64) as u32
    }

    /// Compute this frame's write window from the device's play cursor
    pub fn write_window(&self, play_cursor: u32) -> WriteWindow {
        let byte_to_lock = self.byte_to_lock();
        let target_cursor = ((play_cursor as u64 + self.latency_bytes() as u64)
            % self.secondary_buffer_size as u64) as u32;
        WriteWindow {
            byte_to_lock,
            target_cursor,
            bytes_to_write: bytes_to_write(byte_to_lock, target_cursor, self.secondary_buffer_size),
        }
    }

    pub fn tone(&self) -> &ToneSynth {
        &self.tone
    }

    pub fn tone_mut(&mut self) -> &mut ToneSynth {
        &mut self.tone
    }

    /// Emit one stereo frame and advance the running index
    pub(crate) fn next_frame(&mut self) -> [i16; 2] {
        self.running_sample_index += 1;
        self.tone.next_frame()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_output() -> SoundOutput {
        SoundOutput::new(48_000, 256, 5000, 48_000 / 15).unwrap()
    }

    #[test]
    fn test_default_geometry() {
        let output = default_output();
        assert_eq!(output.bytes_per_sample(), 4);
        assert_eq!(output.secondary_buffer_size(), 48_000 * 4);
        assert_eq!(output.latency_sample_count(), 3200);
        assert_eq!(output.latency_bytes(), 12_800);
        assert_eq!(output.byte_to_lock(), 0);
    }

    #[test]
    fn test_from_config_defaults() {
        let output = SoundOutput::from_config(&AudioConfig::default()).unwrap();
        assert_eq!(output, default_output());
    }

    #[test]
    fn test_rejects_bad_latency() {
        assert!(SoundOutput::new(48_000, 256, 5000, 0).is_err());
        assert!(SoundOutput::new(48_000, 256, 5000, 48_000).is_err());
        assert!(SoundOutput::new(0, 256, 5000, 10).is_err());
    }

    #[test]
    fn test_byte_to_lock_wraps_with_running_index() {
        let mut output = default_output();
        for _ in 0..48_000 + 25 {
            output.next_frame();
        }
        assert_eq!(output.running_sample_index(), 48_025);
        assert_eq!(output.byte_to_lock(), 100);
    }

    #[test]
    fn test_write_window_targets_latency_past_play_cursor() {
        let output = default_output();
        let window = output.write_window(2000);
        assert_eq!(window.byte_to_lock, 0);
        assert_eq!(window.target_cursor, 14_800);
        assert_eq!(window.bytes_to_write, 14_800);
    }

    #[test]
    fn test_write_window_target_wraps() {
        let output = default_output();
        let window = output.write_window(190_000);
        assert_eq!(window.target_cursor, (190_000 + 12_800) % 192_000);
    }
}
