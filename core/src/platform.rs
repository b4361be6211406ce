//! Platform trait and collaborator seams
//!
//! The frame loop talks to the outside world only through the traits here:
//! an event source, controller slots, the audio ring device, a presentation
//! surface and a clock. A [`Platform`] bundles one implementation of each so
//! the runtime can be generic over a single type parameter.

use std::time::{Duration, Instant};

use crate::audio::AudioDevice;
use crate::error::PlatformError;
use crate::framebuffer::FrameBuffer;
use crate::input::ControllerSource;

/// Keys the loop cares about; everything else is carried as a raw code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    W,
    A,
    S,
    D,
    Q,
    E,
    Up,
    Down,
    Left,
    Right,
    Escape,
    Space,
    F4,
    Other(u32),
}

/// Structured input/window event, drained once per iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent {
    /// Application-level quit request
    Quit,
    /// The surface was closed by the user
    CloseRequested,
    /// Drawable area changed size
    Resized { width: u32, height: u32 },
    /// Key transition or repeat
    Key {
        code: KeyCode,
        is_down: bool,
        was_down: bool,
        alt_down: bool,
    },
    /// Focus gained (`true`) or lost (`false`)
    Activated(bool),
}

impl AppEvent {
    /// Alt+F4 pressed
    pub fn is_quit_combo(&self) -> bool {
        matches!(
            self,
            AppEvent::Key {
                code: KeyCode::F4,
                is_down: true,
                alt_down: true,
                ..
            }
        )
    }

    /// Whether this event stops the loop
    pub fn is_quit(&self) -> bool {
        matches!(self, AppEvent::Quit | AppEvent::CloseRequested) || self.is_quit_combo()
    }
}

/// Non-blocking source of pending events
pub trait EventSource {
    /// Drain everything pending right now. The iterator is finite and must not
    /// wait for new events.
    fn pump_events(&mut self) -> impl Iterator<Item = Result<AppEvent, PlatformError>> + '_;
}

/// Presentation surface
pub trait Presenter {
    /// Current drawable size in pixels
    fn drawable_size(&self) -> (u32, u32);

    /// Blit `frame` into a `dest_width` x `dest_height` region of the surface
    fn present(
        &mut self,
        frame: &FrameBuffer,
        dest_width: u32,
        dest_height: u32,
    ) -> Result<(), PlatformError>;
}

/// Monotonic high-resolution clock
pub trait Clock {
    /// Monotonic counter value
    fn counter(&self) -> u64;

    /// Counter ticks per second
    fn frequency(&self) -> u64;

    /// Processor cycle counter (or the best available substitute)
    fn cycles(&self) -> u64;

    /// Block the loop for `duration`
    fn sleep(&mut self, duration: Duration);
}

/// Wall clock backed by [`Instant`]
#[derive(Debug, Clone)]
pub struct SystemClock {
    epoch: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn counter(&self) -> u64 {
        self.epoch.elapsed().as_nanos() as u64
    }

    fn frequency(&self) -> u64 {
        1_000_000_000
    }

    #[cfg(target_arch = "x86_64")]
    fn cycles(&self) -> u64 {
        // SAFETY: RDTSC is available on every x86_64 CPU and has no side effects.
        unsafe { core::arch::x86_64::_rdtsc() }
    }

    #[cfg(not(target_arch = "x86_64"))]
    fn cycles(&self) -> u64 {
        self.counter()
    }

    fn sleep(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Bundle of collaborator types the runtime is generic over
pub trait Platform {
    /// Input/window event source
    type Events: EventSource;
    /// Controller slots
    type Controllers: ControllerSource;
    /// Circular audio output device
    type Audio: AudioDevice;
    /// Presentation surface
    type Presenter: Presenter;
    /// Timing source
    type Clock: Clock;
}

/// Owned collaborator instances for one [`Platform`]
pub struct Collaborators<P: Platform> {
    pub events: P::Events,
    pub controllers: P::Controllers,
    pub audio: P::Audio,
    pub presenter: P::Presenter,
    pub clock: P::Clock,
}
