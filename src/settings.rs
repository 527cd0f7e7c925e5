//! Game settings
//!
//! Read once at startup from an optional JSON block in the page:
//!
//! ```html
//! <script id="explorer-config" type="application/json">
//!   { "volume": 70, "star_count": 80 }
//! </script>
//! ```
//!
//! Missing fields take their defaults. Nothing is written back.

use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, ConfigError, PlanetConfig, solar_system};
use crate::consts::*;

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Audio ===
    /// Volume (0 - 100)
    pub volume: u8,
    /// Start muted
    pub muted: bool,

    // === Background ===
    /// Number of background stars
    pub star_count: usize,
    /// Seed base for the star layout
    pub star_seed: u32,

    // === Accessibility ===
    /// Reduced motion (no twinkle or pulse animations)
    pub reduced_motion: bool,

    // === Level ===
    /// Planets to discover, in melody order
    pub planets: Vec<PlanetConfig>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            volume: DEFAULT_VOLUME,
            muted: false,

            star_count: DEFAULT_STAR_COUNT,
            star_seed: 0,

            reduced_motion: false,

            planets: solar_system(),
        }
    }
}

impl Settings {
    /// Parse and validate a JSON settings document
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check ranges and the planet list
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.volume > 100 {
            return Err(ConfigError::VolumeOutOfRange(self.volume));
        }
        if self.star_count > MAX_STAR_COUNT {
            return Err(ConfigError::TooManyStars {
                count: self.star_count,
                max: MAX_STAR_COUNT,
            });
        }
        self.catalog().map(|_| ())
    }

    /// Build the validated planet catalog
    pub fn catalog(&self) -> Result<Catalog, ConfigError> {
        Catalog::new(self.planets.clone())
    }

    /// Config element id
    #[allow(dead_code)]
    const CONFIG_ELEMENT_ID: &'static str = "explorer-config";

    /// Load settings from the page's config block (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let json = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(Self::CONFIG_ELEMENT_ID))
            .and_then(|el| el.text_content());

        if let Some(json) = json {
            match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from page config");
                    return settings;
                }
                Err(e) => log::warn!("Ignoring page config: {}", e),
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Native stub
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.volume, 50);
        assert_eq!(settings.star_count, 50);
        assert_eq!(settings.catalog().unwrap().len(), 4);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings = Settings::from_json(r#"{ "volume": 80, "reduced_motion": true }"#).unwrap();
        assert_eq!(settings.volume, 80);
        assert!(settings.reduced_motion);
        assert_eq!(settings.star_count, DEFAULT_STAR_COUNT);
        assert_eq!(settings.planets, solar_system());
    }

    #[test]
    fn test_custom_planets() {
        let json = r#"{
            "planets": [
                { "id": "jupiter", "name": "Jupiter", "size_px": 96,
                  "placement": { "x_pct": 40.0, "y_pct": 30.0 },
                  "fact": "The largest planet!", "note": "D5" },
                { "id": "saturn", "name": "Saturn", "size_px": 88,
                  "placement": { "x_pct": 70.0, "y_pct": 60.0 },
                  "fact": "Its rings are mostly ice!", "note": "F5" }
            ]
        }"#;
        let catalog = Settings::from_json(json).unwrap().catalog().unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.index_of("saturn"), Some(1));
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            Settings::from_json(r#"{ "volume": 101 }"#),
            Err(ConfigError::VolumeOutOfRange(101))
        ));
        assert!(matches!(
            Settings::from_json(r#"{ "star_count": 5000 }"#),
            Err(ConfigError::TooManyStars { count: 5000, .. })
        ));
        assert!(matches!(
            Settings::from_json(r#"{ "planets": [] }"#),
            Err(ConfigError::EmptyCatalog)
        ));
        assert!(matches!(
            Settings::from_json("{ not json"),
            Err(ConfigError::Json(_))
        ));
        assert!(matches!(
            Settings::from_json(r#"{ "volume": 300 }"#),
            Err(ConfigError::Json(_))
        ));
        let huge_octave = r#"{
            "planets": [
                { "id": "pluto", "name": "Pluto", "size_px": 32,
                  "placement": { "x_pct": 50.0, "y_pct": 50.0 },
                  "fact": "A dwarf planet!", "note": "C300000000" }
            ]
        }"#;
        assert!(matches!(
            Settings::from_json(huge_octave),
            Err(ConfigError::Json(_))
        ));
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_native_load_uses_defaults() {
        assert_eq!(Settings::load(), Settings::default());
    }
}
