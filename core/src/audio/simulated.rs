//! In-memory ring device
//!
//! Stands in for a hardware ring when no output device is available, and
//! drives deterministic cursor traces in tests.

use std::time::Instant;

use super::{AudioDevice, BYTES_PER_SAMPLE, Cursors, split_regions};
use crate::error::DeviceError;

/// How the simulated play cursor advances
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CursorDriver {
    /// Only [`SimulatedDevice::advance`] moves the cursor
    Manual,
    /// Each cursor query advances the cursor by this many bytes
    FixedStep(u32),
    /// The cursor follows wall time at this many bytes per second
    WallClock { bytes_per_second: u32 },
}

/// Byte ring with a play cursor owned by the device
#[derive(Debug)]
pub struct SimulatedDevice {
    ring: Vec<u8>,
    driver: CursorDriver,
    play_cursor: u32,
    played_bytes: u64,
    write_lead: u32,
    playing: bool,
    started: Option<Instant>,
    busy: bool,
    last_lock: Option<(u32, u32)>,
}

impl SimulatedDevice {
    /// Create a silent ring of `buffer_size` bytes
    pub fn new(buffer_size: u32, driver: CursorDriver) -> Self {
        Self {
            ring: vec![0; buffer_size as usize],
            driver,
            play_cursor: 0,
            played_bytes: 0,
            // ~1% of the ring, rounded down to whole frames
            write_lead: (buffer_size / 100) / BYTES_PER_SAMPLE * BYTES_PER_SAMPLE,
            playing: false,
            started: None,
            busy: false,
            last_lock: None,
        }
    }

    /// Move the play cursor forward by `bytes`
    pub fn advance(&mut self, bytes: u32) {
        let size = self.ring.len() as u64;
        if size == 0 {
            return;
        }
        self.played_bytes += bytes as u64;
        self.play_cursor = ((self.play_cursor as u64 + bytes as u64) % size) as u32;
    }

    /// Make the next lock attempts fail with [`DeviceError::Busy`]
    pub fn set_busy(&mut self, busy: bool) {
        self.busy = busy;
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Total bytes consumed by the play cursor since playback started
    pub fn played_bytes(&self) -> u64 {
        self.played_bytes
    }

    /// Ring contents
    pub fn ring(&self) -> &[u8] {
        &self.ring
    }

    /// Region sizes handed out by the most recent successful lock
    pub fn last_lock(&self) -> Option<(u32, u32)> {
        self.last_lock
    }

    fn drive(&mut self) {
        if !self.playing {
            return;
        }
        match self.driver {
            CursorDriver::Manual => {}
            CursorDriver::FixedStep(step) => self.advance(step),
            CursorDriver::WallClock { bytes_per_second } => {
                let Some(started) = self.started else {
                    return;
                };
                let elapsed = started.elapsed().as_secs_f64();
                let frames = (elapsed * bytes_per_second as f64) as u64 / BYTES_PER_SAMPLE as u64;
                let target = frames * BYTES_PER_SAMPLE as u64;
                if target > self.played_bytes {
                    let delta = target - self.played_bytes;
                    let size = self.ring.len() as u64;
                    // Anything beyond one full lap lands on the same offset
                    let lap = if size == 0 { 0 } else { delta % size };
                    self.played_bytes += delta - lap;
                    self.advance(lap as u32);
                }
            }
        }
    }
}

impl AudioDevice for SimulatedDevice {
    fn buffer_size(&self) -> u32 {
        self.ring.len() as u32
    }

    fn cursors(&mut self) -> Result<Cursors, DeviceError> {
        self.drive();
        let size = self.ring.len() as u64;
        let write = if size == 0 {
            0
        } else {
            ((self.play_cursor as u64 + self.write_lead as u64) % size) as u32
        };
        Ok(Cursors {
            play: self.play_cursor,
            write,
        })
    }

    fn lock_region(
        &mut self,
        offset: u32,
        len: u32,
        write: &mut dyn FnMut(&mut [u8], &mut [u8]),
    ) -> Result<(), DeviceError> {
        if self.busy {
            return Err(DeviceError::Busy);
        }
        let (region1, region2) = split_regions(&mut self.ring, offset, len)?;
        let sizes = (region1.len() as u32, region2.len() as u32);
        write(region1, region2);
        self.last_lock = Some(sizes);
        Ok(())
    }

    fn play(&mut self) -> Result<(), DeviceError> {
        if !self.playing {
            self.playing = true;
            self.started = Some(Instant::now());
            tracing::debug!("Simulated audio device playing ({} byte ring)", self.ring.len());
        }
        Ok(())
    }
}
