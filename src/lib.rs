pub mod composer;
pub mod dsp;
pub mod error;
pub mod options;
pub mod rng;
pub mod theory;

use wasm_bindgen::prelude::*;

pub use crate::composer::{Profile, Role, Track, TrackEvent, compose};
pub use crate::dsp::renderer::{encode_wav, render_samples, render_wav};
pub use crate::error::SongSeedError;
pub use crate::options::{ComposeOptions, DrumNoise, RenderOptions};

/// The crate version, read from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// WASM-exposed: return the songseed-core version string.
#[wasm_bindgen]
pub fn core_version() -> String {
    VERSION.to_string()
}

/// Compose a track from `options`, using the pinned nonce or the clock.
pub fn generate_track(options: &ComposeOptions) -> Track {
    compose(options, options.resolve_nonce())
}

/// Compose and render in one step, returning a complete WAV file.
pub fn generate_wav(compose_options: &ComposeOptions, render_options: &RenderOptions) -> Vec<u8> {
    render_wav(&generate_track(compose_options), render_options)
}

/// Render a track to WAV and base64-encode it for text transports.
#[cfg(feature = "transport")]
pub fn render_wav_base64(track: &Track, options: &RenderOptions) -> String {
    use base64::Engine as _;

    base64::engine::general_purpose::STANDARD.encode(render_wav(track, options))
}

/// WASM-exposed: compose a track from an options object.
///
/// `nonce` is used unless the options already pin one; hosts normally pass
/// `Date.now()`.
#[wasm_bindgen]
pub fn compose_track(options: JsValue, nonce: f64) -> Result<JsValue, JsValue> {
    let mut options: ComposeOptions = if options.is_undefined() || options.is_null() {
        ComposeOptions::default()
    } else {
        serde_wasm_bindgen::from_value(options).map_err(|e| JsValue::from_str(&format!("{e}")))?
    };
    if options.nonce.is_none() {
        options.nonce = Some(nonce as u64);
    }
    let track = generate_track(&options);
    serde_wasm_bindgen::to_value(&track).map_err(|e| JsValue::from_str(&format!("{e}")))
}

/// WASM-exposed: render a track object to a WAV byte array.
#[wasm_bindgen]
pub fn render_track_wav(track: JsValue, options: JsValue) -> Result<Vec<u8>, JsValue> {
    let (track, options) = track_from_js(track, options)?;
    Ok(render_wav(&track, &options))
}

/// WASM-exposed: render a track object to normalized mono f32 samples.
/// Returns the raw audio buffer for AudioWorklet playback.
#[wasm_bindgen]
pub fn render_track_samples(track: JsValue, options: JsValue) -> Result<Vec<f32>, JsValue> {
    let (track, options) = track_from_js(track, options)?;
    Ok(render_samples(&track, &options))
}

fn track_from_js(track: JsValue, options: JsValue) -> Result<(Track, RenderOptions), JsValue> {
    let track: Track =
        serde_wasm_bindgen::from_value(track).map_err(|e| JsValue::from_str(&format!("{e}")))?;
    let options = if options.is_undefined() || options.is_null() {
        RenderOptions::default()
    } else {
        serde_wasm_bindgen::from_value(options).map_err(|e| JsValue::from_str(&format!("{e}")))?
    };
    Ok((track, options))
}
