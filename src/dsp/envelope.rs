//! Exponential decay envelope.

/// One-shot decay from `peak` towards zero over a note of `length` samples.
///
/// The level at offset `i` is `peak * exp(-rate * i / length)`, so a note
/// always ends at `peak * exp(-rate)` regardless of its length.
#[derive(Debug, Clone, Copy)]
pub struct DecayEnvelope {
    /// Decay rate over the full note length.
    pub rate: f64,
    /// Level at the first sample.
    pub peak: f64,
    length: usize,
}

impl DecayEnvelope {
    pub fn new(rate: f64, peak: f64, length: usize) -> Self {
        DecayEnvelope { rate, peak, length }
    }

    /// Envelope level at sample offset `i`.
    pub fn level(&self, i: usize) -> f64 {
        if self.length == 0 {
            return 0.0;
        }
        self.peak * (-self.rate * (i as f64 / self.length as f64)).exp()
    }
}
