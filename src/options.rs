//! Caller-facing configuration for composing and rendering.
//!
//! Both option types deserialize from camelCase JSON with every field
//! optional, so a host can send `{"prompt": "zamba"}` and get the defaults
//! for everything else.

use serde::{Deserialize, Serialize};

use crate::error::SongSeedError;

pub const DEFAULT_BPM: f64 = 100.0;
pub const DEFAULT_KEY: &str = "C";
pub const DEFAULT_MODE: &str = "minor";
pub const DEFAULT_SAMPLE_RATE: u32 = 44100;

/// Inputs to the composer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ComposeOptions {
    /// Opaque caller identifier, copied onto the track.
    pub channel_id: String,
    /// Free-text prompt. Not validated.
    pub prompt: String,
    /// Tempo, carried on the track. Event times are not scaled by it.
    pub bpm: f64,
    /// Root pitch name, e.g. `"C"`, `"F#"` or `"Bb"`.
    pub key: String,
    /// Scale name: `major`, `minor` or `pentatonic`. Anything else is minor.
    pub mode: String,
    /// Seed nonce. `None` means "read the clock" on native targets.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nonce: Option<u64>,
}

impl Default for ComposeOptions {
    fn default() -> Self {
        ComposeOptions {
            channel_id: String::new(),
            prompt: String::new(),
            bpm: DEFAULT_BPM,
            key: DEFAULT_KEY.to_string(),
            mode: DEFAULT_MODE.to_string(),
            nonce: None,
        }
    }
}

impl ComposeOptions {
    pub fn new(channel_id: impl Into<String>, prompt: impl Into<String>) -> Self {
        ComposeOptions {
            channel_id: channel_id.into(),
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self, SongSeedError> {
        serde_json::from_str(json).map_err(SongSeedError::Options)
    }

    /// The nonce to seed with: the pinned one, or the current time.
    pub fn resolve_nonce(&self) -> u64 {
        self.nonce.unwrap_or_else(fallback_nonce)
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn fallback_nonce() -> u64 {
    crate::rng::clock_nonce()
}

// No wall clock without a JS binding; hosts are expected to pass one.
#[cfg(target_arch = "wasm32")]
fn fallback_nonce() -> u64 {
    log::warn!("no nonce supplied, seeding with 0");
    0
}

/// Where drum-hit noise comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrumNoise {
    /// Fresh OS-seeded noise on every render; identical tracks sound
    /// slightly different.
    Live,
    /// Noise drawn from a generator seeded by the track seed; renders of
    /// the same track are bit-identical.
    Seeded,
}

impl Default for DrumNoise {
    fn default() -> Self {
        DrumNoise::Live
    }
}

/// Inputs to the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RenderOptions {
    pub sample_rate: u32,
    pub drum_noise: DrumNoise,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions {
            sample_rate: DEFAULT_SAMPLE_RATE,
            drum_noise: DrumNoise::Live,
        }
    }
}

impl RenderOptions {
    pub fn from_json(json: &str) -> Result<Self, SongSeedError> {
        serde_json::from_str(json).map_err(SongSeedError::Options)
    }

    /// Fully reproducible rendering at `sample_rate`.
    pub fn seeded(sample_rate: u32) -> Self {
        RenderOptions {
            sample_rate,
            drum_noise: DrumNoise::Seeded,
        }
    }
}
