//! Screenshot capture of the backbuffer.
//!
//! The backbuffer stores BGRX words (blue in the low byte); PNG wants RGBA
//! bytes, so capture swizzles and forces alpha to opaque.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::{Context, Result};

use crate::framebuffer::FrameBuffer;

/// Convert the backbuffer to tightly packed RGBA bytes, top row first
pub fn to_rgba(frame: &FrameBuffer) -> Vec<u8> {
    frame
        .pixels()
        .iter()
        .flat_map(|&pixel| {
            let [b, g, r, _] = pixel.to_le_bytes();
            [r, g, b, 0xFF]
        })
        .collect()
}

/// Save the backbuffer as an 8-bit RGBA PNG at `path`.
pub fn save_png(frame: &FrameBuffer, path: &Path) -> Result<()> {
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }

    let file = File::create(path)
        .with_context(|| format!("Failed to create screenshot file {}", path.display()))?;
    let writer = BufWriter::new(file);

    let mut encoder = png::Encoder::new(writer, frame.width(), frame.height());
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);

    let mut png_writer = encoder
        .write_header()
        .context("Failed to write PNG header")?;
    png_writer
        .write_image_data(&to_rgba(frame))
        .context("Failed to write PNG data")?;

    tracing::info!("Screenshot saved: {}", path.display());
    Ok(())
}
