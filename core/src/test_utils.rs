//! Shared test utilities for integration and unit tests

use std::cell::Cell;
use std::collections::VecDeque;
use std::time::Duration;

use crate::audio::{CursorDriver, SimulatedDevice, SoundOutput};
use crate::error::PlatformError;
use crate::framebuffer::FrameBuffer;
use crate::input::{ControllerSource, ControllerState, GamepadState, MAX_CONTROLLERS};
use crate::platform::{AppEvent, Clock, Collaborators, EventSource, Platform, Presenter};
use crate::runtime::{Runtime, RuntimeConfig};

// ============================================================================
// Clock
// ============================================================================

/// Deterministic clock: each counter read advances time by `step` nanoseconds
pub struct FakeClock {
    now: Cell<u64>,
    step: u64,
    pub slept: Vec<Duration>,
}

impl FakeClock {
    pub fn new(step: Duration) -> Self {
        Self {
            now: Cell::new(0),
            step: step.as_nanos() as u64,
            slept: Vec::new(),
        }
    }
}

impl Clock for FakeClock {
    fn counter(&self) -> u64 {
        let now = self.now.get();
        self.now.set(now + self.step);
        now
    }

    fn frequency(&self) -> u64 {
        1_000_000_000
    }

    fn cycles(&self) -> u64 {
        // 2 GHz worth of cycles
        self.now.get() * 2
    }

    fn sleep(&mut self, duration: Duration) {
        self.now.set(self.now.get() + duration.as_nanos() as u64);
        self.slept.push(duration);
    }
}

// ============================================================================
// Events
// ============================================================================

/// Event source replaying one scripted batch per pump
#[derive(Default)]
pub struct ScriptedEvents {
    batches: VecDeque<Vec<Result<AppEvent, PlatformError>>>,
    pub pumps: usize,
}

impl ScriptedEvents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a batch of successful events for the next pump
    pub fn push_batch(&mut self, events: impl IntoIterator<Item = AppEvent>) -> &mut Self {
        self.batches.push_back(events.into_iter().map(Ok).collect());
        self
    }

    /// Queue a batch that may contain dispatch errors
    pub fn push_raw(&mut self, batch: Vec<Result<AppEvent, PlatformError>>) -> &mut Self {
        self.batches.push_back(batch);
        self
    }

    /// Queue `count` empty batches
    pub fn idle(&mut self, count: usize) -> &mut Self {
        for _ in 0..count {
            self.batches.push_back(Vec::new());
        }
        self
    }

    pub fn pending_batches(&self) -> usize {
        self.batches.len()
    }
}

impl EventSource for ScriptedEvents {
    fn pump_events(&mut self) -> impl Iterator<Item = Result<AppEvent, PlatformError>> + '_ {
        self.pumps += 1;
        self.batches.pop_front().unwrap_or_default().into_iter()
    }
}

// ============================================================================
// Controllers
// ============================================================================

/// Controller slots following a script; the last step persists once exhausted
#[derive(Default)]
pub struct ScriptedControllers {
    script: VecDeque<[ControllerState; MAX_CONTROLLERS]>,
    current: [ControllerState; MAX_CONTROLLERS],
    pub refreshes: usize,
}

impl ScriptedControllers {
    pub fn new() -> Self {
        Self::default()
    }

    /// All slots disconnected for the whole run
    pub fn disconnected() -> Self {
        Self::default()
    }

    /// Slot 0 holds the stick at `(x, y)` for the whole run
    pub fn holding(stick_x: i16, stick_y: i16) -> Self {
        let mut controllers = Self::default();
        controllers.current[0] = pad(stick_x, stick_y);
        controllers
    }

    /// Queue the next frame's slot states
    pub fn push_frame(&mut self, slots: [ControllerState; MAX_CONTROLLERS]) -> &mut Self {
        self.script.push_back(slots);
        self
    }
}

/// Connected pad with the left stick at `(x, y)` and no buttons
pub fn pad(stick_x: i16, stick_y: i16) -> ControllerState {
    ControllerState::Connected(GamepadState {
        stick_x,
        stick_y,
        ..Default::default()
    })
}

impl ControllerSource for ScriptedControllers {
    fn refresh(&mut self) {
        self.refreshes += 1;
        if let Some(next) = self.script.pop_front() {
            self.current = next;
        }
    }

    fn poll(&mut self, slot: usize) -> ControllerState {
        self.current.get(slot).copied().unwrap_or_default()
    }
}

// ============================================================================
// Presenter
// ============================================================================

/// Presenter recording each blit and keeping the last frame
pub struct RecordingPresenter {
    pub size: (u32, u32),
    pub presented: Vec<(u32, u32)>,
    pub last_frame: Option<FrameBuffer>,
    pub fail: bool,
}

impl RecordingPresenter {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: (width, height),
            presented: Vec::new(),
            last_frame: None,
            fail: false,
        }
    }
}

impl Presenter for RecordingPresenter {
    fn drawable_size(&self) -> (u32, u32) {
        self.size
    }

    fn present(
        &mut self,
        frame: &FrameBuffer,
        dest_width: u32,
        dest_height: u32,
    ) -> Result<(), PlatformError> {
        if self.fail {
            return Err(PlatformError::Present("surface lost".to_string()));
        }
        self.presented.push((dest_width, dest_height));
        self.last_frame = Some(frame.clone());
        Ok(())
    }
}

// ============================================================================
// Platform
// ============================================================================

/// Platform made entirely of fakes
pub struct TestPlatform;

impl Platform for TestPlatform {
    type Events = ScriptedEvents;
    type Controllers = ScriptedControllers;
    type Audio = SimulatedDevice;
    type Presenter = RecordingPresenter;
    type Clock = FakeClock;
}

/// Default 48 kHz sound output with a 3200-frame latency window
pub fn test_sound() -> SoundOutput {
    SoundOutput::new(48_000, 256, 5000, 3200).unwrap()
}

/// Build an unpaced runtime over fakes with a small backbuffer
pub fn test_runtime(
    events: ScriptedEvents,
    controllers: ScriptedControllers,
    driver: CursorDriver,
) -> Runtime<TestPlatform> {
    let sound = test_sound();
    let platform = Collaborators::<TestPlatform> {
        events,
        controllers,
        audio: SimulatedDevice::new(sound.secondary_buffer_size(), driver),
        presenter: RecordingPresenter::new(64, 48),
        clock: FakeClock::new(Duration::from_millis(1)),
    };
    let config = RuntimeConfig {
        tick_rate: 0,
        ..RuntimeConfig::default()
    };
    Runtime::new(platform, config, FrameBuffer::new(32, 16).unwrap(), sound).unwrap()
}
