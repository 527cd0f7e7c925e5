//! Space Explorer - a planet discovery music game
//!
//! Core modules:
//! - `note`: Pitch notation and frequencies
//! - `catalog`: Planet configuration and validation
//! - `starfield`: Deterministic background star layout
//! - `style`: Planet presentation styles
//! - `audio`: Enveloped tone sequencer over a pluggable output device
//! - `explorer`: Discovery state machine (guard, discovery set, victory)
//! - `settings`: User-facing configuration

pub mod audio;
pub mod catalog;
pub mod explorer;
pub mod note;
pub mod settings;
pub mod starfield;
pub mod style;

pub use catalog::{Catalog, ConfigError, PlanetConfig, PlanetId};
pub use explorer::{Activation, Explorer, ExplorerEvent};
pub use note::Note;
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Length of a single discovery tone (seconds)
    pub const TONE_DURATION: f64 = 0.5;
    /// Length of one melody note (seconds)
    pub const MELODY_NOTE_DURATION: f64 = 0.6;
    /// Gap between melody note onsets; shorter than a note so they overlap
    pub const MELODY_NOTE_STEP: f64 = 0.3;

    /// Output ceiling for volume 100, keeps stacked sines from clipping
    pub const MAX_OUTPUT_GAIN: f32 = 0.1;
    /// Default volume on the 0-100 scale
    pub const DEFAULT_VOLUME: u8 = 50;

    /// Stars in the background by default
    pub const DEFAULT_STAR_COUNT: usize = 50;
    /// Upper bound accepted from configuration
    pub const MAX_STAR_COUNT: usize = 1000;
    /// Star twinkle delays fall in [0, MAX_STAR_DELAY)
    pub const MAX_STAR_DELAY: f64 = 3.0;

    /// Levels wrap back to 1 after this one
    pub const MAX_LEVEL: u32 = 3;
}
