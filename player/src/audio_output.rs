//! Audio output using cpal and a cursor-addressed byte ring
//!
//! The frame loop writes 16-bit stereo frames into the ring at offsets it
//! computes from the play cursor. The cpal callback reads from the play
//! cursor onward and advances it, so the cursor moves on the device's clock.

use std::sync::{Arc, Mutex, TryLockError};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use tracing::{debug, error, info};

use pulseframe_core::audio::{AudioDevice, BYTES_PER_SAMPLE, CHANNELS, Cursors, split_regions};
use pulseframe_core::error::DeviceError;

/// Ring contents plus the cursor the callback owns
struct SharedRing {
    bytes: Vec<u8>,
    play_cursor: usize,
    /// Bytes consumed by the most recent callback; the device may already
    /// have copied that far past the play cursor
    last_chunk: usize,
    playing: bool,
}

impl SharedRing {
    /// Pop the next stereo frame, or `None` while playback is stopped
    fn next_frame(&mut self) -> Option<[i16; 2]> {
        if !self.playing || self.bytes.is_empty() {
            return None;
        }
        let at = self.play_cursor;
        let b = &self.bytes[at..at + BYTES_PER_SAMPLE as usize];
        let frame = [
            i16::from_le_bytes([b[0], b[1]]),
            i16::from_le_bytes([b[2], b[3]]),
        ];
        self.play_cursor = (at + BYTES_PER_SAMPLE as usize) % self.bytes.len();
        Some(frame)
    }
}

/// Fill an interleaved output buffer from the ring, converting each sample
fn drain_into<T: Copy>(
    shared: &Mutex<SharedRing>,
    data: &mut [T],
    channels: usize,
    silence: T,
    convert: impl Fn(i16) -> T,
) {
    let Ok(mut ring) = shared.lock() else {
        data.fill(silence);
        return;
    };
    for out in data.chunks_mut(channels) {
        match ring.next_frame() {
            Some([left, right]) => {
                for (i, sample) in out.iter_mut().enumerate() {
                    *sample = convert(if i % 2 == 0 { left } else { right });
                }
            }
            None => out.fill(silence),
        }
    }
    ring.last_chunk = data.len() / channels.max(1) * BYTES_PER_SAMPLE as usize;
}

/// Lock `len` bytes at `offset` without waiting on the callback.
///
/// Contention with the output callback reports [`DeviceError::Busy`].
fn write_locked(
    shared: &Mutex<SharedRing>,
    offset: u32,
    len: u32,
    write: &mut dyn FnMut(&mut [u8], &mut [u8]),
) -> Result<(), DeviceError> {
    let mut ring = match shared.try_lock() {
        Ok(ring) => ring,
        Err(TryLockError::WouldBlock) => return Err(DeviceError::Busy),
        Err(TryLockError::Poisoned(_)) => {
            return Err(DeviceError::Stream("Audio ring poisoned".into()));
        }
    };
    let (region1, region2) = split_regions(&mut ring.bytes, offset, len)?;
    write(region1, region2);
    Ok(())
}

/// Circular audio buffer played by the default cpal output device
pub struct CpalRingDevice {
    shared: Arc<Mutex<SharedRing>>,
    /// The cpal stream (kept alive for the duration)
    stream: cpal::Stream,
    buffer_size: u32,
    sample_rate: u32,
}

impl CpalRingDevice {
    /// Open the default output device at `samples_per_second` stereo with a
    /// ring of `buffer_size` bytes
    pub fn new(samples_per_second: u32, buffer_size: u32) -> Result<Self, DeviceError> {
        let host = cpal::default_host();

        let device = host
            .default_output_device()
            .ok_or_else(|| DeviceError::Unavailable("No audio output device available".into()))?;

        let supported = device
            .supported_output_configs()
            .map_err(|e| DeviceError::Unavailable(format!("Failed to query output configs: {}", e)))?
            .filter(|range| range.channels() as u32 == CHANNELS)
            .filter(|range| {
                matches!(
                    range.sample_format(),
                    cpal::SampleFormat::F32 | cpal::SampleFormat::I16 | cpal::SampleFormat::U16
                )
            })
            .find(|range| {
                range.min_sample_rate().0 <= samples_per_second
                    && samples_per_second <= range.max_sample_rate().0
            })
            .ok_or_else(|| {
                DeviceError::Unavailable(format!(
                    "No stereo output config at {} Hz",
                    samples_per_second
                ))
            })?
            .with_sample_rate(cpal::SampleRate(samples_per_second));

        let sample_format = supported.sample_format();
        let config: cpal::StreamConfig = supported.into();
        let channels = config.channels as usize;

        let shared = Arc::new(Mutex::new(SharedRing {
            bytes: vec![0; buffer_size as usize],
            play_cursor: 0,
            last_chunk: 0,
            playing: false,
        }));

        let ring = Arc::clone(&shared);
        let err_fn = |err: cpal::StreamError| error!("Audio stream error: {}", err);
        let stream = match sample_format {
            cpal::SampleFormat::F32 => device.build_output_stream(
                &config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    drain_into(&ring, data, channels, 0.0, |s| s as f32 / 32768.0);
                },
                err_fn,
                None,
            ),
            cpal::SampleFormat::I16 => device.build_output_stream(
                &config,
                move |data: &mut [i16], _: &cpal::OutputCallbackInfo| {
                    drain_into(&ring, data, channels, 0, |s| s);
                },
                err_fn,
                None,
            ),
            // Filtered above, so this is U16 (0x8000 is silence)
            _ => device.build_output_stream(
                &config,
                move |data: &mut [u16], _: &cpal::OutputCallbackInfo| {
                    drain_into(&ring, data, channels, 0x8000, |s| {
                        (s as i32 + 32768) as u16
                    });
                },
                err_fn,
                None,
            ),
        }
        .map_err(|e| DeviceError::Stream(format!("Failed to build audio stream: {}", e)))?;

        info!(
            "Audio output: {} Hz, {} channels, {:?}, {} byte ring",
            config.sample_rate.0, channels, sample_format, buffer_size
        );

        Ok(Self {
            shared,
            stream,
            buffer_size,
            sample_rate: samples_per_second,
        })
    }

    /// Get the output sample rate
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

impl AudioDevice for CpalRingDevice {
    fn buffer_size(&self) -> u32 {
        self.buffer_size
    }

    fn cursors(&mut self) -> Result<Cursors, DeviceError> {
        let ring = self
            .shared
            .lock()
            .map_err(|_| DeviceError::Stream("Audio ring poisoned".into()))?;
        let size = ring.bytes.len().max(1);
        Ok(Cursors {
            play: ring.play_cursor as u32,
            write: ((ring.play_cursor + ring.last_chunk) % size) as u32,
        })
    }

    fn lock_region(
        &mut self,
        offset: u32,
        len: u32,
        write: &mut dyn FnMut(&mut [u8], &mut [u8]),
    ) -> Result<(), DeviceError> {
        write_locked(&self.shared, offset, len, write)
    }

    fn play(&mut self) -> Result<(), DeviceError> {
        if let Ok(mut ring) = self.shared.lock() {
            ring.playing = true;
        }
        self.stream
            .play()
            .map_err(|e| DeviceError::Stream(format!("Failed to play audio stream: {}", e)))?;
        debug!("Audio stream started");
        Ok(())
    }
}
