//! Write-window arithmetic and the ring buffer writer

use super::{AudioDevice, SoundOutput};
use crate::error::DeviceError;

/// One frame's forward-only write window into the ring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteWindow {
    /// Where the write starts (continues from the last write)
    pub byte_to_lock: u32,
    /// Play cursor plus the latency budget, modulo the ring size
    pub target_cursor: u32,
    /// Forward distance from `byte_to_lock` to `target_cursor`
    pub bytes_to_write: u32,
}

/// Forward distance around the ring from `byte_to_lock` to `target_cursor`.
///
/// When the lock offset is past the target the window runs through the end of
/// the ring and wraps; otherwise it is the plain difference. Equal offsets
/// mean nothing is due this frame.
pub fn bytes_to_write(byte_to_lock: u32, target_cursor: u32, buffer_size: u32) -> u32 {
    if byte_to_lock > target_cursor {
        (buffer_size - byte_to_lock) + target_cursor
    } else {
        target_cursor - byte_to_lock
    }
}

/// Split `[offset, offset + len)` of `ring` into at most two contiguous regions:
/// `[offset, capacity)` and `[0, remainder)`.
pub fn split_regions(
    ring: &mut [u8],
    offset: u32,
    len: u32,
) -> Result<(&mut [u8], &mut [u8]), DeviceError> {
    let capacity = ring.len();
    let (start, count) = (offset as usize, len as usize);
    if start >= capacity || count > capacity {
        return Err(DeviceError::OutOfRange {
            offset,
            len,
            capacity: capacity as u32,
        });
    }

    let first_len = count.min(capacity - start);
    let second_len = count - first_len;

    // second_len <= start always holds because count <= capacity
    let (head, tail) = ring.split_at_mut(start);
    Ok((&mut tail[..first_len], &mut head[..second_len]))
}

/// Lock `bytes_to_write` bytes at `byte_to_lock` and fill them with tone frames.
///
/// Returns the number of sample frames written. If the device refuses the
/// lock nothing is generated and the running index stays put; the next frame's
/// window is computed from the live play cursor and covers the gap.
pub fn fill_sound_buffer<D: AudioDevice + ?Sized>(
    sound: &mut SoundOutput,
    device: &mut D,
    byte_to_lock: u32,
    bytes_to_write: u32,
) -> Result<u32, DeviceError> {
    if bytes_to_write == 0 {
        return Ok(0);
    }

    let mut frames_written = 0u32;
    device.lock_region(
        byte_to_lock,
        bytes_to_write,
        &mut |region1: &mut [u8], region2: &mut [u8]| {
            frames_written += write_region(sound, region1);
            frames_written += write_region(sound, region2);
        },
    )?;

    tracing::trace!(
        "Filled {} frames at byte {} (running index {})",
        frames_written,
        byte_to_lock,
        sound.running_sample_index()
    );
    Ok(frames_written)
}

/// Write whole stereo frames into one contiguous region; a trailing partial
/// frame is left untouched.
fn write_region(sound: &mut SoundOutput, region: &mut [u8]) -> u32 {
    let bytes_per_sample = sound.bytes_per_sample() as usize;
    let mut frames = 0u32;
    for frame in region.chunks_exact_mut(bytes_per_sample) {
        let [left, right] = sound.next_frame();
        frame[0..2].copy_from_slice(&left.to_le_bytes());
        frame[2..4].copy_from_slice(&right.to_le_bytes());
        frames += 1;
    }
    frames
}
