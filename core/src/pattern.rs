//! Procedural test pattern
//!
//! Blue ramps with x, green ramps with y, both wrapping every 256 pixels and
//! scrolled by independent offsets. Red and the padding byte stay zero.

use crate::framebuffer::FrameBuffer;

/// Register value of the pattern at `(x, y)`
#[inline]
pub fn gradient_pixel(x: u32, y: u32, blue_offset: i32, green_offset: i32) -> u32 {
    let blue = (x as i32).wrapping_add(blue_offset) as u8;
    let green = (y as i32).wrapping_add(green_offset) as u8;
    ((green as u32) << 8) | blue as u32
}

/// Overwrite every pixel of `buffer` with the scrolled gradient
pub fn paint_gradient(buffer: &mut FrameBuffer, blue_offset: i32, green_offset: i32) {
    for (y, row) in buffer.rows_mut().enumerate() {
        for (x, pixel) in row.iter_mut().enumerate() {
            *pixel = gradient_pixel(x as u32, y as u32, blue_offset, green_offset);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corners() {
        let mut buffer = FrameBuffer::new(320, 240).unwrap();
        paint_gradient(&mut buffer, 0, 0);

        assert_eq!(buffer.pixel(0, 0), Some(0x0000_0000));
        assert_eq!(buffer.pixel(255, 0), Some(0x0000_00FF));
        assert_eq!(buffer.pixel(0, 239), Some(0x0000_EF00));
        // 319 mod 256 = 63, 239 mod 256 = 239
        assert_eq!(buffer.pixel(319, 239), Some(0x0000_EF3F));
    }

    #[test]
    fn test_offset_wraps_on_low_byte() {
        // x=300, blue_offset=50 -> 350 mod 256 = 94
        let mut buffer = FrameBuffer::new(301, 1).unwrap();
        paint_gradient(&mut buffer, 50, 0);
        assert_eq!(buffer.pixel(300, 0), Some(94));
    }

    #[test]
    fn test_negative_offsets() {
        let mut buffer = FrameBuffer::new(16, 16).unwrap();
        paint_gradient(&mut buffer, -1, -300);

        // (0 - 1) mod 256 = 255, (0 - 300) mod 256 = 212
        assert_eq!(buffer.pixel(0, 0), Some((212 << 8) | 255));
        assert_eq!(buffer.pixel(1, 0), Some(212 << 8));
    }

    #[test]
    fn test_red_and_padding_always_zero() {
        let mut buffer = FrameBuffer::new(97, 53).unwrap();
        for &(b, g) in &[(0, 0), (i32::MAX, i32::MIN), (-7, 1_000_003), (255, 256)] {
            paint_gradient(&mut buffer, b, g);
            assert!(buffer.pixels().iter().all(|p| p & 0xFFFF_0000 == 0));
        }
    }

    #[test]
    fn test_matches_reference_formula() {
        let (w, h) = (40u32, 30u32);
        let mut buffer = FrameBuffer::new(w, h).unwrap();
        let (b, g) = (1234, -77);
        paint_gradient(&mut buffer, b, g);

        for y in 0..h {
            for x in 0..w {
                let blue = (x as i64 + b as i64).rem_euclid(256) as u32;
                let green = (y as i64 + g as i64).rem_euclid(256) as u32;
                assert_eq!(buffer.pixel(x, y), Some((green << 8) | blue));
            }
        }
    }

    #[test]
    fn test_in_memory_byte_order() {
        let mut buffer = FrameBuffer::new(2, 1).unwrap();
        paint_gradient(&mut buffer, 10, 20);
        let bytes = buffer.as_bytes();
        // BB GG RR xx on little-endian hosts
        if cfg!(target_endian = "little") {
            assert_eq!(&bytes[0..4], &[10, 20, 0, 0]);
            assert_eq!(&bytes[4..8], &[11, 20, 0, 0]);
        }
    }

    #[test]
    fn test_full_overwrite_after_resize() {
        let mut buffer = FrameBuffer::new(8, 8).unwrap();
        paint_gradient(&mut buffer, 3, 3);
        buffer.resize(5, 9).unwrap();
        paint_gradient(&mut buffer, -2, 4);
        assert_eq!(buffer.pixels().len(), 45);
        assert_eq!(buffer.pixel(4, 8), Some((12 << 8) | 2));
    }
}
