//! Mixer: fixed-length summing buffer with peak normalization.

/// Target peak after normalization.
pub const NORMALIZE_PEAK: f64 = 0.9;

/// Peaks below this are treated as 1.0 so silence is never amplified.
pub const SILENCE_FLOOR: f64 = 1e-5;

/// A summing buffer whose length is fixed at construction.
///
/// Writes outside the buffer are dropped; the buffer never grows.
#[derive(Debug, Clone)]
pub struct Mixer {
    buffer: Vec<f32>,
}

impl Mixer {
    /// A buffer of `num_samples` zeros.
    pub fn new(num_samples: usize) -> Self {
        Mixer {
            buffer: vec![0.0; num_samples],
        }
    }

    /// Add a sample at the given index, ignoring out-of-range indices.
    pub fn add(&mut self, index: i64, sample: f64) {
        if let Ok(idx) = usize::try_from(index) {
            if let Some(slot) = self.buffer.get_mut(idx) {
                *slot = (*slot as f64 + sample) as f32;
            }
        }
    }

    /// Largest absolute sample value.
    pub fn peak(&self) -> f32 {
        self.buffer.iter().fold(0.0f32, |max, &s| max.max(s.abs()))
    }

    /// Scale so the peak lands on [`NORMALIZE_PEAK`], clamping to [-1, 1].
    pub fn normalize(&mut self) {
        let mut peak = self.peak() as f64;
        if peak < SILENCE_FLOOR {
            peak = 1.0;
        }
        let gain = NORMALIZE_PEAK / peak;
        for s in self.buffer.iter_mut() {
            *s = (*s as f64 * gain).clamp(-1.0, 1.0) as f32;
        }
    }

    /// Consume the mixer, yielding the sample buffer.
    pub fn into_samples(self) -> Vec<f32> {
        self.buffer
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}
