use std::fmt;

/// Errors raised while decoding caller-supplied JSON.
///
/// Composition, rendering and encoding never fail; only the boundary that
/// turns host data into [`ComposeOptions`](crate::options::ComposeOptions),
/// [`RenderOptions`](crate::options::RenderOptions) or a
/// [`Track`](crate::composer::Track) can.
#[derive(Debug)]
pub enum SongSeedError {
    Options(serde_json::Error),
    Track(serde_json::Error),
}

impl fmt::Display for SongSeedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SongSeedError::Options(e) => write!(f, "Invalid options: {e}"),
            SongSeedError::Track(e) => write!(f, "Invalid track: {e}"),
        }
    }
}

impl std::error::Error for SongSeedError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SongSeedError::Options(e) | SongSeedError::Track(e) => Some(e),
        }
    }
}
