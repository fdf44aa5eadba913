//! DSP Engine: pure Rust synthesis of composed tracks.
//!
//! The same code backs native callers and the WASM build, so a track
//! rendered with seeded drum noise is sample-identical on both.

pub mod engine;
pub mod envelope;
pub mod mixer;
pub mod oscillator;
pub mod renderer;
