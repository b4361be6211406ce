//! Backbuffer owned by the frame loop
//!
//! Top-down, row-major, 32 bits per pixel (`xx RR GG BB` as a register value,
//! `BB GG RR xx` in memory on little-endian hosts). Row 0 is the visually
//! topmost row.

use crate::error::CoreError;

/// Bytes per pixel; one of the four is unused padding
pub const BYTES_PER_PIXEL: u32 = 4;

/// Resizable block of packed pixel memory plus its geometry
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    memory: Vec<u32>,
    width: u32,
    height: u32,
    pitch: u32,
}

impl FrameBuffer {
    /// Allocate a backbuffer of the given size
    pub fn new(width: u32, height: u32) -> Result<Self, CoreError> {
        let mut buffer = Self::default();
        buffer.resize(width, height)?;
        Ok(buffer)
    }

    /// Replace the backing storage with a `width * height` block.
    ///
    /// The new block is secured before the old one is released, so a failed
    /// allocation leaves the previous buffer and its geometry intact.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), CoreError> {
        let invalid = || CoreError::InvalidGeometry { width, height };

        let pitch = width.checked_mul(BYTES_PER_PIXEL).ok_or_else(invalid)?;
        let pixel_count = (width as usize)
            .checked_mul(height as usize)
            .ok_or_else(invalid)?;
        let bytes = pixel_count
            .checked_mul(BYTES_PER_PIXEL as usize)
            .ok_or_else(invalid)?;

        let mut memory: Vec<u32> = Vec::new();
        memory
            .try_reserve_exact(pixel_count)
            .map_err(|_| CoreError::Allocation {
                width,
                height,
                bytes,
            })?;
        memory.resize(pixel_count, 0);

        // Geometry and memory are swapped together; the old block drops after.
        let previous = std::mem::replace(&mut self.memory, memory);
        self.width = width;
        self.height = height;
        self.pitch = pitch;
        drop(previous);

        tracing::debug!("Backbuffer resized to {}x{} ({} bytes)", width, height, bytes);
        Ok(())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Bytes per row
    pub fn pitch(&self) -> u32 {
        self.pitch
    }

    pub fn bytes_per_pixel(&self) -> u32 {
        BYTES_PER_PIXEL
    }

    /// Total allocation size in bytes
    pub fn size_in_bytes(&self) -> usize {
        self.memory.len() * BYTES_PER_PIXEL as usize
    }

    /// Pixels as register values, row-major
    pub fn pixels(&self) -> &[u32] {
        &self.memory
    }

    pub fn pixels_mut(&mut self) -> &mut [u32] {
        &mut self.memory
    }

    /// Raw pixel memory in its in-memory byte order
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.memory)
    }

    /// Pixel at `(x, y)`, or `None` outside the buffer
    pub fn pixel(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.memory
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    /// Mutable rows, top to bottom
    pub fn rows_mut(&mut self) -> impl Iterator<Item = &mut [u32]> {
        // chunks_exact_mut rejects a zero chunk size; an empty buffer yields no rows anyway
        let row_len = (self.width as usize).max(1);
        self.memory.chunks_exact_mut(row_len)
    }
}
