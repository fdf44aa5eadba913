use serde::{Deserialize, Serialize};

use crate::error::SongSeedError;
use crate::options::ComposeOptions;
use crate::rng::{Mulberry32, derive_seed};
use crate::theory::{Scale, note_from_scale};

// ── Arrangement Constants ───────────────────────────────────

/// Number of bars in every generated track.
pub const BARS: usize = 8;
/// Melody slots per bar.
pub const MELODY_SLOTS_PER_BAR: usize = 4;
/// Bass slots per bar.
pub const BASS_SLOTS_PER_BAR: usize = 2;
/// Spacing between melody slots.
pub const MELODY_SLOT_LENGTH: f64 = 0.25;
/// Spacing between bass slots, also the length of every bass note.
pub const BASS_SLOT_LENGTH: f64 = 0.5;
/// The one drum pattern every track carries.
pub const DRUM_PATTERN: [u8; 8] = [1, 0, 0, 0, 1, 0, 1, 0];
/// Instrument preset label written on every track.
pub const PRESET: &str = "synth";

const MELODY_DENSITY: f64 = 0.5;
const MELODY_HIGH_OCTAVE_CHANCE: f64 = 0.3;
const MELODY_DURATIONS: [f64; 3] = [0.25, 0.5, 1.0];
const BASS_DENSITY: f64 = 0.4;
const BASS_OCTAVE: u8 = 2;
const BASS_VELOCITY: f64 = 0.7;

// ── Profile & Role ──────────────────────────────────────────

/// Instrumentation profile picked from prompt keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Profile {
    #[serde(rename = "zamba")]
    Zamba,
    #[serde(rename = "african voices")]
    AfricanVoices,
    #[serde(rename = "brazil drums")]
    BrazilDrums,
    #[serde(rename = "mexican trumpet")]
    MexicanTrumpet,
    #[serde(rename = "house")]
    House,
    #[serde(rename = "lofi")]
    Lofi,
    #[serde(rename = "ambient")]
    Ambient,
}

/// Keywords in match order; the first one found in the prompt wins.
const PROFILE_KEYWORDS: [(&str, Profile); 6] = [
    ("zamba", Profile::Zamba),
    ("african", Profile::AfricanVoices),
    ("brazil", Profile::BrazilDrums),
    ("trumpet", Profile::MexicanTrumpet),
    ("house", Profile::House),
    ("lofi", Profile::Lofi),
];

impl Profile {
    /// Pick a profile by case-insensitive substring match, defaulting to ambient.
    pub fn from_prompt(prompt: &str) -> Self {
        let lowered = prompt.to_lowercase();
        PROFILE_KEYWORDS
            .iter()
            .find(|(keyword, _)| lowered.contains(keyword))
            .map(|&(_, profile)| profile)
            .unwrap_or(Profile::Ambient)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Profile::Zamba => "zamba",
            Profile::AfricanVoices => "african voices",
            Profile::BrazilDrums => "brazil drums",
            Profile::MexicanTrumpet => "mexican trumpet",
            Profile::House => "house",
            Profile::Lofi => "lofi",
            Profile::Ambient => "ambient",
        }
    }

    pub fn role(&self) -> Role {
        if self.label().contains("house") {
            Role::House
        } else {
            Role::Ethnic
        }
    }
}

/// Coarse style classifier derived from the profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    House,
    Ethnic,
}

// ── Track (Composer Output) ─────────────────────────────────

/// A single pitched note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackEvent {
    /// Canonical note name, e.g. `"D#4"`.
    pub note: String,
    /// Start offset from the beginning of the track.
    pub time: f64,
    pub duration: f64,
    /// Loudness in [0, 1].
    pub velocity: f64,
}

impl TrackEvent {
    pub fn end(&self) -> f64 {
        self.time + self.duration
    }
}

/// Percussion slots at quarter-beat resolution; non-zero means a hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrumPattern {
    pub pattern: Vec<u8>,
}

impl Default for DrumPattern {
    fn default() -> Self {
        DrumPattern {
            pattern: DRUM_PATTERN.to_vec(),
        }
    }
}

/// A complete arrangement. Built once by [`compose`] and only read after.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub channel_id: String,
    pub prompt: String,
    #[serde(rename = "profileName")]
    pub profile: Profile,
    pub preset: String,
    pub role: Role,
    pub bpm: f64,
    pub key: String,
    /// Mode name as the caller gave it, even when it fell back to minor.
    pub mode: String,
    /// Seed the arrangement was drawn from.
    #[serde(default)]
    pub seed: u32,
    pub melody: Vec<TrackEvent>,
    pub bass: Vec<TrackEvent>,
    pub drums: DrumPattern,
}

impl Track {
    pub fn from_json(json: &str) -> Result<Self, SongSeedError> {
        serde_json::from_str(json).map_err(SongSeedError::Track)
    }

    pub fn to_json(&self) -> String {
        // Track holds only strings, numbers and plain enums.
        serde_json::to_string(self).unwrap_or_default()
    }
}

// ── Composer ────────────────────────────────────────────────

/// Compose context: the generator and the resolved harmony.
///
/// Draw order is part of the output contract: melody slots first, then
/// bass slots, each in ascending time.
struct ComposeCtx<'a> {
    rng: Mulberry32,
    key: &'a str,
    scale: Scale,
}

impl ComposeCtx<'_> {
    fn scale_note(&mut self, octave_of: impl FnOnce(&mut Mulberry32) -> u8) -> String {
        let intervals = self.scale.intervals();
        let degree = self.rng.next_index(intervals.len());
        let octave = octave_of(&mut self.rng);
        note_from_scale(self.key, intervals, degree, octave)
    }

    fn melody_slot(&mut self, slot: usize) -> Option<TrackEvent> {
        if self.rng.next_unit() >= MELODY_DENSITY {
            return None;
        }
        let note = self.scale_note(|rng| {
            if rng.next_unit() < MELODY_HIGH_OCTAVE_CHANCE {
                5
            } else {
                4
            }
        });
        let duration = MELODY_DURATIONS[self.rng.next_index(MELODY_DURATIONS.len())];
        let velocity = 0.6 + self.rng.next_unit() * 0.4;
        Some(TrackEvent {
            note,
            time: slot as f64 * MELODY_SLOT_LENGTH,
            duration,
            velocity,
        })
    }

    fn bass_slot(&mut self, slot: usize) -> Option<TrackEvent> {
        if self.rng.next_unit() >= BASS_DENSITY {
            return None;
        }
        let note = self.scale_note(|_| BASS_OCTAVE);
        Some(TrackEvent {
            note,
            time: slot as f64 * BASS_SLOT_LENGTH,
            duration: BASS_SLOT_LENGTH,
            velocity: BASS_VELOCITY,
        })
    }
}

/// Compose a track for `options`, seeding the generator with `nonce`.
pub fn compose(options: &ComposeOptions, nonce: u64) -> Track {
    let profile = Profile::from_prompt(&options.prompt);
    let seed = derive_seed(&options.prompt, nonce);
    log::debug!(
        "composing channel {:?}: profile={} seed={seed} nonce={nonce}",
        options.channel_id,
        profile.label()
    );

    let mut ctx = ComposeCtx {
        rng: Mulberry32::new(seed),
        key: &options.key,
        scale: Scale::from_name(&options.mode),
    };

    let melody: Vec<TrackEvent> = (0..BARS * MELODY_SLOTS_PER_BAR)
        .filter_map(|slot| ctx.melody_slot(slot))
        .collect();
    let bass: Vec<TrackEvent> = (0..BARS * BASS_SLOTS_PER_BAR)
        .filter_map(|slot| ctx.bass_slot(slot))
        .collect();

    log::debug!("composed {} melody / {} bass events", melody.len(), bass.len());

    Track {
        channel_id: options.channel_id.clone(),
        prompt: options.prompt.clone(),
        profile,
        preset: PRESET.to_string(),
        role: profile.role(),
        bpm: options.bpm,
        key: options.key.clone(),
        mode: options.mode.clone(),
        seed,
        melody,
        bass,
        drums: DrumPattern::default(),
    }
}
