//! Runtime configuration

use std::time::Duration;

use crate::config::{Config, RuntimeSection};

/// Runtime configuration
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeConfig {
    /// Target frame rate in Hz, 0 runs unpaced
    pub tick_rate: u32,
    /// CPU budget warning threshold per frame
    pub cpu_budget: Duration,
    /// Raw stick magnitude treated as centered
    pub stick_deadzone: u16,
    /// Stick deflection per unit of scroll
    pub scroll_divisor: i32,
    /// Tone frequency with the stick centered
    pub center_hz: i32,
    /// Tone frequency swing across the stick's Y travel
    pub hz_range: i32,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl RuntimeConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            tick_rate: config.runtime.tick_rate,
            cpu_budget: cpu_budget(config.runtime.cpu_budget_ms),
            stick_deadzone: config.input.stick_deadzone,
            scroll_divisor: config.input.scroll_divisor,
            center_hz: config.audio.center_hz,
            hz_range: config.audio.hz_range,
        }
    }

    /// Target time per frame, `None` when unpaced
    pub fn frame_duration(&self) -> Option<Duration> {
        (self.tick_rate > 0).then(|| Duration::from_secs_f64(1.0 / self.tick_rate as f64))
    }
}

/// Convert the configured budget, falling back to the default for values a
/// `Duration` cannot hold (negative, NaN, infinite or overflowing)
fn cpu_budget(cpu_budget_ms: f64) -> Duration {
    Duration::try_from_secs_f64(cpu_budget_ms / 1000.0).unwrap_or_else(|e| {
        let fallback = RuntimeSection::default().cpu_budget_ms;
        tracing::warn!(
            "Invalid cpu_budget_ms {} ({}), using {}ms",
            cpu_budget_ms,
            e,
            fallback
        );
        Duration::from_secs_f64(fallback / 1000.0)
    })
}
