//! Frame loop orchestration
//!
//! Owns the application context (backbuffer, sound output, scroll offsets,
//! timing) and the platform collaborators, and drives one iteration per
//! [`Runtime::frame`] call until a quit request stops the loop.

use crate::audio::{AudioDevice, SoundOutput, WriteWindow, fill_sound_buffer};
use crate::error::{CoreError, DeviceError};
use crate::framebuffer::FrameBuffer;
use crate::platform::{Collaborators, Platform};

mod config;
mod game_loop;
mod timing;


pub use config::RuntimeConfig;
pub use timing::{FRAME_TIME_HISTORY_SIZE, FrameHistory, FrameStats, FrameTiming};

/// Loop lifecycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoopState {
    Running,
    #[default]
    Stopped,
}

/// Gradient scroll position, advanced by stick input
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrollOffsets {
    pub blue: i32,
    pub green: i32,
}

/// Everything the loop mutates, passed explicitly through each step
#[derive(Debug)]
pub struct AppContext {
    pub state: LoopState,
    pub backbuffer: FrameBuffer,
    pub sound: SoundOutput,
    pub offsets: ScrollOffsets,
    pub timing: FrameTiming,
    pub history: FrameHistory,
    pub last_stats: FrameStats,
    /// Write window computed on the most recent iteration
    pub last_window: Option<WriteWindow>,
    /// Counter value when the current iteration began
    pub frame_start: u64,
    /// Completed iterations
    pub frame_index: u64,
}

impl AppContext {
    pub fn new(backbuffer: FrameBuffer, sound: SoundOutput) -> Self {
        Self {
            state: LoopState::Stopped,
            backbuffer,
            sound,
            offsets: ScrollOffsets::default(),
            timing: FrameTiming::default(),
            history: FrameHistory::new(),
            last_stats: FrameStats::default(),
            last_window: None,
            frame_start: 0,
            frame_index: 0,
        }
    }
}

/// Main runtime driving the frame loop
///
/// Generic over the platform so the same loop runs against real devices in
/// the player and against scripted fakes in tests.
pub struct Runtime<P: Platform> {
    platform: Collaborators<P>,
    config: RuntimeConfig,
    context: AppContext,
}

impl<P: Platform> Runtime<P> {
    /// Create a runtime. The audio device's ring must match the sound output's.
    pub fn new(
        platform: Collaborators<P>,
        config: RuntimeConfig,
        backbuffer: FrameBuffer,
        sound: SoundOutput,
    ) -> Result<Self, CoreError> {
        let device_size = platform.audio.buffer_size();
        if device_size != sound.secondary_buffer_size() {
            return Err(CoreError::Config(format!(
                "audio device ring is {} bytes, sound output expects {}",
                device_size,
                sound.secondary_buffer_size()
            )));
        }

        Ok(Self {
            platform,
            config,
            context: AppContext::new(backbuffer, sound),
        })
    }

    /// Prime one latency window of audio, start playback and enter `Running`.
    ///
    /// Calling this on a running loop does nothing.
    pub fn start(&mut self) -> Result<(), CoreError> {
        if self.context.state == LoopState::Running {
            return Ok(());
        }

        let sound = &mut self.context.sound;
        let latency_bytes = sound.latency_bytes();
        let primed = match fill_sound_buffer(sound, &mut self.platform.audio, 0, latency_bytes) {
            Ok(frames) => frames,
            // The first frame fills the window from the live play cursor instead
            Err(DeviceError::Busy) => {
                tracing::warn!("Audio ring busy at startup, playing unprimed");
                0
            }
            Err(e) => return Err(e.into()),
        };
        self.platform.audio.play()?;

        self.context.timing = FrameTiming::start(&self.platform.clock);
        self.context.state = LoopState::Running;
        tracing::info!(
            "Loop started: {}x{} backbuffer, {} Hz audio, {} frames primed",
            self.context.backbuffer.width(),
            self.context.backbuffer.height(),
            self.context.sound.samples_per_second(),
            primed
        );
        Ok(())
    }

    /// Run a single iteration and report the resulting state
    pub fn frame(&mut self) -> LoopState {
        if self.context.state != LoopState::Running {
            return LoopState::Stopped;
        }
        game_loop::execute_frame::<P>(&self.config, &mut self.platform, &mut self.context)
    }

    /// Start if needed, then iterate until the loop stops.
    ///
    /// Returns the number of completed iterations.
    pub fn run(&mut self) -> Result<u64, CoreError> {
        self.start()?;
        while self.frame() == LoopState::Running {}
        tracing::info!("Loop stopped after {} frames", self.context.frame_index);
        Ok(self.context.frame_index)
    }

    /// Set the pacing rate, 0 runs unpaced
    pub fn set_tick_rate(&mut self, tick_rate: u32) {
        self.config.tick_rate = tick_rate;
    }

    pub fn tick_rate(&self) -> u32 {
        self.config.tick_rate
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn state(&self) -> LoopState {
        self.context.state
    }

    pub fn context(&self) -> &AppContext {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut AppContext {
        &mut self.context
    }

    pub fn backbuffer(&self) -> &FrameBuffer {
        &self.context.backbuffer
    }

    pub fn sound(&self) -> &SoundOutput {
        &self.context.sound
    }

    pub fn platform(&self) -> &Collaborators<P> {
        &self.platform
    }

    pub fn platform_mut(&mut self) -> &mut Collaborators<P> {
        &mut self.platform
    }

    /// Tear down and hand back the collaborators
    pub fn into_parts(self) -> (Collaborators<P>, AppContext) {
        (self.platform, self.context)
    }
}
