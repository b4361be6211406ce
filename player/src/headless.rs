//! Headless event source and presenter
//!
//! The player has no window: events are synthesized (activation on the first
//! pump, quit once the frame limit is reached) and presentation keeps the
//! most recent frame so it can be written out as a screenshot.

use std::path::{Path, PathBuf};

use anyhow::Result;

use pulseframe_core::capture;
use pulseframe_core::error::PlatformError;
use pulseframe_core::framebuffer::FrameBuffer;
use pulseframe_core::platform::{AppEvent, EventSource, Presenter};

/// Event source that asks to quit after a fixed number of frames
pub struct HeadlessEvents {
    /// Quit on the pump after this many frames (`None` runs forever)
    frame_limit: Option<u64>,
    pumped: u64,
}

impl HeadlessEvents {
    pub fn new(frame_limit: Option<u64>) -> Self {
        Self {
            frame_limit,
            pumped: 0,
        }
    }
}

impl EventSource for HeadlessEvents {
    fn pump_events(&mut self) -> impl Iterator<Item = Result<AppEvent, PlatformError>> + '_ {
        let activated = (self.pumped == 0).then_some(AppEvent::Activated(true));
        let quit = self
            .frame_limit
            .filter(|&limit| self.pumped >= limit)
            .map(|_| AppEvent::Quit);
        self.pumped += 1;
        activated.into_iter().chain(quit).map(Ok)
    }
}

/// Presenter without a surface; optionally retains the last frame
pub struct SnapshotPresenter {
    size: (u32, u32),
    retain: bool,
    last_frame: Option<FrameBuffer>,
    presented: u64,
}

impl SnapshotPresenter {
    pub fn new(width: u32, height: u32, retain: bool) -> Self {
        Self {
            size: (width, height),
            retain,
            last_frame: None,
            presented: 0,
        }
    }

    pub fn presented(&self) -> u64 {
        self.presented
    }

    pub fn last_frame(&self) -> Option<&FrameBuffer> {
        self.last_frame.as_ref()
    }

    /// Write the last presented frame to `path`. Returns the path written, if any.
    pub fn save_last(&self, path: &Path) -> Result<Option<PathBuf>> {
        match &self.last_frame {
            Some(frame) => {
                capture::save_png(frame, path)?;
                Ok(Some(path.to_path_buf()))
            }
            None => {
                tracing::warn!("No frame was presented; skipping screenshot");
                Ok(None)
            }
        }
    }
}

impl Presenter for SnapshotPresenter {
    fn drawable_size(&self) -> (u32, u32) {
        self.size
    }

    fn present(
        &mut self,
        frame: &FrameBuffer,
        dest_width: u32,
        dest_height: u32,
    ) -> Result<(), PlatformError> {
        self.presented += 1;
        tracing::trace!(
            "Present {}x{} (pitch {}) into {}x{}",
            frame.width(),
            frame.height(),
            frame.pitch(),
            dest_width,
            dest_height
        );
        if self.retain {
            match &mut self.last_frame {
                Some(last) => last.clone_from(frame),
                None => self.last_frame = Some(frame.clone()),
            }
        }
        Ok(())
    }
}
