//! Frame timing measurement

use std::collections::VecDeque;
use std::time::Duration;

use crate::platform::Clock;

/// Number of frame times kept for diagnostics
pub const FRAME_TIME_HISTORY_SIZE: usize = 120;

/// Counter and cycle readings from the previous iteration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameTiming {
    last_counter: u64,
    last_cycles: u64,
}

/// Elapsed time and cycles for one iteration
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameStats {
    pub ms_per_frame: f64,
    pub fps: f64,
    pub mcycles_per_frame: f64,
}

impl FrameTiming {
    /// Take the first readings
    pub fn start<C: Clock + ?Sized>(clock: &C) -> Self {
        Self {
            last_counter: clock.counter(),
            last_cycles: clock.cycles(),
        }
    }

    /// Read the clock again and report the time since the previous reading
    pub fn lap<C: Clock + ?Sized>(&mut self, clock: &C) -> FrameStats {
        let counter = clock.counter();
        let cycles = clock.cycles();

        let stats = FrameStats::from_deltas(
            counter.wrapping_sub(self.last_counter),
            clock.frequency(),
            cycles.wrapping_sub(self.last_cycles),
        );

        self.last_counter = counter;
        self.last_cycles = cycles;
        stats
    }
}

impl FrameStats {
    /// Derive per-frame figures from raw counter and cycle deltas
    pub fn from_deltas(counter_elapsed: u64, frequency: u64, cycles_elapsed: u64) -> Self {
        let frequency = frequency.max(1) as f64;
        let ms_per_frame = 1000.0 * counter_elapsed as f64 / frequency;
        let fps = if counter_elapsed == 0 {
            0.0
        } else {
            frequency / counter_elapsed as f64
        };
        Self {
            ms_per_frame,
            fps,
            mcycles_per_frame: cycles_elapsed as f64 / 1_000_000.0,
        }
    }
}

/// Convert a counter delta at `frequency` ticks per second to a duration
pub fn counter_duration(ticks: u64, frequency: u64) -> Duration {
    let nanos = ticks as u128 * 1_000_000_000 / frequency.max(1) as u128;
    Duration::from_nanos(nanos.min(u64::MAX as u128) as u64)
}

/// Bounded history of frame times in milliseconds
#[derive(Debug, Clone, Default)]
pub struct FrameHistory {
    frame_times: VecDeque<f32>,
}

impl FrameHistory {
    pub fn new() -> Self {
        Self {
            frame_times: VecDeque::with_capacity(FRAME_TIME_HISTORY_SIZE),
        }
    }

    /// Record a frame time, evicting the oldest past the history size
    pub fn push(&mut self, frame_time_ms: f32) {
        self.frame_times.push_back(frame_time_ms);
        while self.frame_times.len() > FRAME_TIME_HISTORY_SIZE {
            self.frame_times.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.frame_times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frame_times.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = f32> + '_ {
        self.frame_times.iter().copied()
    }

    /// Mean frame time over the history
    pub fn average_ms(&self) -> Option<f32> {
        if self.frame_times.is_empty() {
            None
        } else {
            Some(self.frame_times.iter().sum::<f32>() / self.frame_times.len() as f32)
        }
    }

    /// Slowest recorded frame
    pub fn worst_ms(&self) -> Option<f32> {
        self.frame_times.iter().copied().reduce(f32::max)
    }
}
