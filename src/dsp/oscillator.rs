//! Phase-exact oscillators for note rendering.

use std::f64::consts::PI;

/// Supported waveform shapes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Waveform {
    Sine,
    /// Sign of a sine: +1, -1, or 0 exactly at zero crossings.
    Square,
}

/// An oscillator whose phase is derived from the sample index, so every
/// note starts at phase zero and carries no state between notes.
#[derive(Debug, Clone)]
pub struct Oscillator {
    pub waveform: Waveform,
    pub frequency: f64,
    sample_rate: f64,
}

impl Oscillator {
    pub fn new(waveform: Waveform, frequency: f64, sample_rate: f64) -> Self {
        Oscillator {
            waveform,
            frequency,
            sample_rate,
        }
    }

    /// Value at sample offset `i` from the note start.
    pub fn sample_at(&self, i: usize) -> f64 {
        let t = i as f64 / self.sample_rate;
        let s = (2.0 * PI * self.frequency * t).sin();
        match self.waveform {
            Waveform::Sine => s,
            Waveform::Square => sign(s),
        }
    }
}

/// Like `f64::signum`, but zero maps to zero.
fn sign(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}
