//! Sine tone generator with phase carried across buffer fills

use std::f32::consts::TAU;

/// Stateful sine source.
///
/// The phase is never reset after construction; frequency and volume changes
/// apply from the next sample on.
#[derive(Debug, Clone, PartialEq)]
pub struct ToneSynth {
    samples_per_second: u32,
    tone_hz: u32,
    tone_volume: i16,
    wave_period: u32,
    t_sine: f32,
}

impl ToneSynth {
    pub fn new(samples_per_second: u32, tone_hz: u32, tone_volume: i16) -> Self {
        let mut synth = Self {
            samples_per_second: samples_per_second.max(1),
            tone_hz: 0,
            tone_volume,
            wave_period: 1,
            t_sine: 0.0,
        };
        synth.set_tone_hz(tone_hz);
        synth
    }

    /// Change the tone frequency; recomputes the wave period in whole samples
    pub fn set_tone_hz(&mut self, tone_hz: u32) {
        self.tone_hz = tone_hz.max(1);
        self.wave_period = (self.samples_per_second / self.tone_hz).max(1);
    }

    pub fn set_tone_volume(&mut self, tone_volume: i16) {
        self.tone_volume = tone_volume;
    }

    pub fn tone_hz(&self) -> u32 {
        self.tone_hz
    }

    pub fn tone_volume(&self) -> i16 {
        self.tone_volume
    }

    /// Samples per sine cycle
    pub fn wave_period(&self) -> u32 {
        self.wave_period
    }

    /// Current phase in radians, kept in `[0, 2π)`
    pub fn phase(&self) -> f32 {
        self.t_sine
    }

    /// Phase advance applied after each emitted sample
    pub fn phase_step(&self) -> f32 {
        TAU / self.wave_period as f32
    }

    /// Next mono sample
    pub fn next_sample(&mut self) -> i16 {
        let value = (self.t_sine.sin() * self.tone_volume as f32).round() as i16;

        self.t_sine += self.phase_step();
        // Folding by a whole cycle keeps f32 precision without moving the waveform.
        if self.t_sine >= TAU {
            self.t_sine -= TAU;
        }

        value
    }

    /// Next stereo frame; the mono sample is duplicated into both channels
    pub fn next_frame(&mut self) -> [i16; 2] {
        let sample = self.next_sample();
        [sample, sample]
    }
}
