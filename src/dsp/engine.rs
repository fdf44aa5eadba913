//! Audio Engine: renders a Track to a normalized mono sample buffer.
//!
//! Melody notes are decaying sines, bass notes decaying square waves, and
//! drum hits short bursts of decaying noise. Everything is summed into one
//! fixed-length [`Mixer`] and peak-normalized. Event times and durations
//! are read as seconds; the track tempo is not applied.

use rand::RngCore;

use crate::composer::{DrumPattern, Track, TrackEvent};
use crate::options::{DrumNoise, RenderOptions};
use crate::rng::{Mulberry32, unit_from_u32};
use crate::theory::note_to_frequency;

use super::envelope::DecayEnvelope;
use super::mixer::Mixer;
use super::oscillator::{Oscillator, Waveform};

/// Shortest render, even for a track with no melody.
pub const MIN_RENDER_SECONDS: f64 = 4.0;
/// Hard cap on buffer length (about 25 minutes at 44.1 kHz).
pub const MAX_RENDER_SAMPLES: usize = 1 << 26;
/// Spacing between drum pattern steps, in seconds.
pub const DRUM_STEP: f64 = 0.25;
/// Length of a single drum hit, in seconds.
pub const DRUM_HIT_LENGTH: f64 = 0.08;

const DRUM_DECAY: f64 = 10.0;
const DRUM_GAIN: f64 = 0.8;
/// Mixed into the track seed so drum noise does not replay the composer's stream.
const DRUM_SEED_SALT: u32 = 0x9E37_79B9;

/// Tone shaping for one pitched part.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Patch {
    pub waveform: Waveform,
    /// Envelope decay rate over the note length.
    pub decay: f64,
    /// Envelope level at note start.
    pub peak: f64,
    /// Output gain applied after velocity and envelope.
    pub gain: f64,
}

/// Plucked lead: sine, fast decay.
pub const MELODY_PATCH: Patch = Patch {
    waveform: Waveform::Sine,
    decay: 3.0,
    peak: 1.0,
    gain: 0.6,
};

/// Bass: square, slower decay from a lower peak.
pub const BASS_PATCH: Patch = Patch {
    waveform: Waveform::Square,
    decay: 2.0,
    peak: 0.9,
    gain: 0.5,
};

/// The rendering engine.
#[derive(Debug, Clone)]
pub struct AudioEngine {
    pub sample_rate: f64,
    pub drum_noise: DrumNoise,
}

impl AudioEngine {
    pub fn new(sample_rate: u32) -> Self {
        AudioEngine {
            sample_rate: sample_rate as f64,
            drum_noise: DrumNoise::Live,
        }
    }

    pub fn with_options(options: &RenderOptions) -> Self {
        AudioEngine {
            sample_rate: options.sample_rate as f64,
            drum_noise: options.drum_noise,
        }
    }

    /// Buffer length for `track`.
    ///
    /// Covers the end of the latest-starting melody note, with a floor of
    /// [`MIN_RENDER_SECONDS`]. Bass and drums do not extend the buffer.
    pub fn total_samples(&self, track: &Track) -> usize {
        let last_end = track
            .melody
            .iter()
            .max_by(|a, b| a.time.total_cmp(&b.time))
            .map(TrackEvent::end)
            .unwrap_or(0.0);
        let seconds = if last_end.is_finite() {
            last_end.max(MIN_RENDER_SECONDS)
        } else {
            MIN_RENDER_SECONDS
        };
        let samples = (seconds * self.sample_rate).ceil();
        if samples.is_finite() && samples > 0.0 {
            samples.min(MAX_RENDER_SAMPLES as f64) as usize
        } else {
            0
        }
    }

    /// Render an entire Track to normalized mono samples in [-1, 1].
    pub fn render(&self, track: &Track) -> Vec<f32> {
        let mut mixer = Mixer::new(self.total_samples(track));

        for event in &track.melody {
            self.render_note(&mut mixer, event, &MELODY_PATCH);
        }
        for event in &track.bass {
            self.render_note(&mut mixer, event, &BASS_PATCH);
        }
        match self.drum_noise {
            DrumNoise::Live => self.render_drums(&mut mixer, &track.drums, &mut rand::thread_rng()),
            DrumNoise::Seeded => {
                let mut rng = Mulberry32::new(track.seed ^ DRUM_SEED_SALT);
                self.render_drums(&mut mixer, &track.drums, &mut rng);
            }
        }

        log::debug!(
            "rendered {} samples at {} Hz, peak {:.4} before normalization",
            mixer.len(),
            self.sample_rate,
            mixer.peak()
        );
        mixer.normalize();
        mixer.into_samples()
    }

    /// Start sample and length for a span in seconds, or `None` if it is
    /// empty or not a finite span.
    fn span(&self, time: f64, duration: f64) -> Option<(i64, usize)> {
        let start = (time * self.sample_rate).floor();
        let len = (duration * self.sample_rate).floor();
        if !start.is_finite() || !(len > 0.0) {
            return None;
        }
        Some((start as i64, len.min(MAX_RENDER_SAMPLES as f64) as usize))
    }

    fn render_note(&self, mixer: &mut Mixer, event: &TrackEvent, patch: &Patch) {
        let Some((start, len)) = self.span(event.time, event.duration) else {
            return;
        };
        let osc = Oscillator::new(patch.waveform, note_to_frequency(&event.note), self.sample_rate);
        let env = DecayEnvelope::new(patch.decay, patch.peak, len);

        // Only visit offsets that land inside the buffer.
        let len_i = len as i64;
        let begin = start.saturating_neg().clamp(0, len_i) as usize;
        let end = (mixer.len() as i64).saturating_sub(start).clamp(0, len_i) as usize;
        for i in begin..end {
            let s = osc.sample_at(i) * event.velocity * env.level(i) * patch.gain;
            mixer.add(start + i as i64, s);
        }
    }

    fn render_drums<R: RngCore + ?Sized>(&self, mixer: &mut Mixer, drums: &DrumPattern, rng: &mut R) {
        for (step, &hit) in drums.pattern.iter().enumerate() {
            if hit == 0 {
                continue;
            }
            let Some((start, len)) = self.span(step as f64 * DRUM_STEP, DRUM_HIT_LENGTH) else {
                continue;
            };
            let env = DecayEnvelope::new(DRUM_DECAY, 1.0, len);
            for j in 0..len {
                let noise = unit_from_u32(rng.next_u32()) * 2.0 - 1.0;
                mixer.add(start + j as i64, noise * env.level(j) * DRUM_GAIN);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composer::compose;
    use crate::options::ComposeOptions;

    fn empty_track() -> Track {
        let mut track = compose(&ComposeOptions::new("t", "ambient"), 0);
        track.melody.clear();
        track.bass.clear();
        track
    }

    fn note(name: &str, time: f64, duration: f64) -> TrackEvent {
        TrackEvent {
            note: name.to_string(),
            time,
            duration,
            velocity: 1.0,
        }
    }

    fn seeded(sample_rate: u32) -> AudioEngine {
        AudioEngine::with_options(&RenderOptions::seeded(sample_rate))
    }

    #[test]
    fn minimum_length_for_empty_melody() {
        let track = empty_track();
        assert_eq!(AudioEngine::new(44100).total_samples(&track), 4 * 44100);
    }

    #[test]
    fn length_follows_latest_starting_note() {
        let mut track = empty_track();
        // Out of order on purpose: the latest start is not the last element.
        track.melody = vec![note("A4", 5.0, 1.0), note("C4", 1.0, 0.5)];
        assert_eq!(AudioEngine::new(1000).total_samples(&track), 6000);
    }

    #[test]
    fn length_uses_latest_start_not_longest_tail() {
        let mut track = empty_track();
        track.melody = vec![note("A4", 4.5, 2.0), note("C4", 4.75, 0.25)];
        assert_eq!(AudioEngine::new(1000).total_samples(&track), 5000);
    }

    #[test]
    fn length_ignores_non_finite_end() {
        let mut track = empty_track();
        track.melody = vec![note("A4", f64::INFINITY, 1.0)];
        assert_eq!(AudioEngine::new(100).total_samples(&track), 400);
    }

    #[test]
    fn zero_sample_rate_renders_nothing() {
        let track = compose(&ComposeOptions::new("t", "zamba"), 1);
        assert!(seeded(0).render(&track).is_empty());
    }

    #[test]
    fn output_is_normalized() {
        for nonce in 0..5 {
            let track = compose(&ComposeOptions::new("t", "house"), nonce);
            let out = seeded(8000).render(&track);
            let peak = out.iter().fold(0.0f32, |m, s| m.max(s.abs()));
            assert!(out.iter().all(|s| (-1.0..=1.0).contains(s)));
            assert!(peak <= 0.9 + 1e-6, "peak {peak}");
            assert!(peak >= 0.9 - 1e-6, "peak {peak}");
        }
    }

    #[test]
    fn seeded_render_is_reproducible() {
        let track = compose(&ComposeOptions::new("t", "brazil"), 11);
        let a = seeded(8000).render(&track);
        let b = seeded(8000).render(&track);
        assert_eq!(a, b);
    }

    #[test]
    fn live_drums_vary_between_renders() {
        let track = empty_track();
        let engine = AudioEngine::new(8000);
        assert_ne!(engine.render(&track), engine.render(&track));
    }

    #[test]
    fn drums_only_occupy_pattern_steps() {
        let sr = 1000;
        let out = seeded(sr).render(&empty_track());
        // Hits at steps 0, 4, 6 (0.0 s, 1.0 s, 1.5 s), 80 samples each.
        let hit_len = 80;
        for (i, &s) in out.iter().enumerate() {
            let in_hit = [0usize, 1000, 1500].iter().any(|&h| i >= h && i < h + hit_len);
            if !in_hit {
                assert_eq!(s, 0.0, "unexpected signal at {i}");
            }
        }
        assert!(out[..hit_len].iter().any(|&s| s != 0.0));
    }

    #[test]
    fn event_order_does_not_matter() {
        let mut forward = empty_track();
        forward.drums.pattern.clear();
        forward.melody = vec![note("C4", 0.0, 0.5), note("E4", 0.25, 0.5), note("G4", 1.0, 1.0)];
        let mut reversed = forward.clone();
        reversed.melody.reverse();
        let engine = seeded(4000);
        assert_eq!(engine.render(&forward), engine.render(&reversed));
    }

    #[test]
    fn single_note_shape() {
        let mut track = empty_track();
        track.drums.pattern.clear();
        track.melody = vec![note("A4", 0.0, 1.0)];
        let out = seeded(44100).render(&track);
        assert_eq!(out.len(), 4 * 44100);
        assert_eq!(out[0], 0.0);
        // Sound only during the note.
        assert!(out[44100..].iter().all(|&s| s == 0.0));
        // Decaying: the first cycle is louder than the last.
        let head = out[..100].iter().fold(0.0f32, |m, s| m.max(s.abs()));
        let tail = out[44000..44100].iter().fold(0.0f32, |m, s| m.max(s.abs()));
        assert!(head > tail * 10.0, "head {head} tail {tail}");
    }

    #[test]
    fn notes_past_end_are_truncated() {
        let mut track = empty_track();
        track.drums.pattern.clear();
        track.melody = vec![note("A4", 0.0, 0.5)];
        track.bass = vec![note("A2", 3.9, 5.0)];
        let out = seeded(1000).render(&track);
        assert_eq!(out.len(), 4000);
        assert!(out[3901..].iter().any(|&s| s != 0.0));
    }

    #[test]
    fn malformed_events_are_skipped() {
        let mut track = empty_track();
        track.drums.pattern.clear();
        track.melody = vec![
            note("A4", f64::NAN, 1.0),
            note("A4", 0.0, -1.0),
            note("A4", 0.0, f64::NAN),
            note("not a note", -0.5, 1.0),
        ];
        let out = seeded(1000).render(&track);
        assert_eq!(out.len(), 4000);
        // Only the negative-start note contributes, from 0.0 s to 0.5 s.
        assert!(out[..500].iter().any(|&s| s != 0.0));
        assert!(out[500..].iter().all(|&s| s == 0.0));
    }

    #[test]
    fn silent_track_stays_silent() {
        let mut track = empty_track();
        track.drums.pattern.clear();
        let out = AudioEngine::new(2000).render(&track);
        assert_eq!(out.len(), 8000);
        assert!(out.iter().all(|&s| s == 0.0));
    }
}
