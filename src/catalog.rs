//! Planet catalog
//!
//! The static list of planets a level is played with. Built once at startup,
//! either from the built-in solar system or from the page's config block.

use std::borrow::Borrow;
use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::note::Note;

/// Error type for configuration loading and catalog validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Catalog has no planets")]
    EmptyCatalog,
    #[error("Duplicate planet id: {0}")]
    DuplicatePlanet(PlanetId),
    #[error("Planet {id} placed outside the play field ({x_pct}%, {y_pct}%)")]
    PlacementOutOfRange { id: PlanetId, x_pct: f32, y_pct: f32 },
    #[error("Volume {0} is outside 0-100")]
    VolumeOutOfRange(u8),
    #[error("Star count {count} exceeds the maximum of {max}")]
    TooManyStars { count: usize, max: usize },
}

/// Unique planet key
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlanetId(String);

impl PlanetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlanetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for PlanetId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for PlanetId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

/// Where a planet sits in the play field (center, percent of width/height)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub x_pct: f32,
    pub y_pct: f32,
}

impl Placement {
    pub const fn new(x_pct: f32, y_pct: f32) -> Self {
        Self { x_pct, y_pct }
    }

    fn in_field(&self) -> bool {
        (0.0..=100.0).contains(&self.x_pct) && (0.0..=100.0).contains(&self.y_pct)
    }
}

/// Static planet configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanetConfig {
    pub id: PlanetId,
    pub name: String,
    /// Diameter in CSS pixels
    pub size_px: u32,
    pub placement: Placement,
    pub fact: String,
    pub note: Note,
}

impl PlanetConfig {
    fn new(
        id: &str,
        name: &str,
        size_px: u32,
        placement: Placement,
        fact: &str,
        note: Note,
    ) -> Self {
        Self {
            id: PlanetId::new(id),
            name: name.to_string(),
            size_px,
            placement,
            fact: fact.to_string(),
            note,
        }
    }
}

/// The built-in inner solar system
pub fn solar_system() -> Vec<PlanetConfig> {
    vec![
        PlanetConfig::new(
            "mercury",
            "Mercury",
            48,
            Placement::new(25.0, 25.0),
            "The smallest planet in our solar system!",
            Note::C4,
        ),
        PlanetConfig::new(
            "venus",
            "Venus",
            64,
            Placement::new(33.3, 50.0),
            "The hottest planet in our solar system!",
            Note::E4,
        ),
        PlanetConfig::new(
            "earth",
            "Earth",
            64,
            Placement::new(66.7, 66.7),
            "The only known planet with life!",
            Note::G4,
        ),
        PlanetConfig::new(
            "mars",
            "Mars",
            56,
            Placement::new(75.0, 75.0),
            "Known as the Red Planet!",
            Note::B4,
        ),
    ]
}

/// Validated, ordered planet list
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    planets: Vec<PlanetConfig>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            planets: solar_system(),
        }
    }
}

impl Catalog {
    /// Build a catalog, rejecting empty lists, duplicate ids and off-field placements
    pub fn new(planets: Vec<PlanetConfig>) -> Result<Self, ConfigError> {
        if planets.is_empty() {
            return Err(ConfigError::EmptyCatalog);
        }

        let mut seen = HashSet::new();
        for planet in &planets {
            if !seen.insert(&planet.id) {
                return Err(ConfigError::DuplicatePlanet(planet.id.clone()));
            }
            if !planet.placement.in_field() {
                return Err(ConfigError::PlacementOutOfRange {
                    id: planet.id.clone(),
                    x_pct: planet.placement.x_pct,
                    y_pct: planet.placement.y_pct,
                });
            }
        }

        Ok(Self { planets })
    }

    pub fn planets(&self) -> &[PlanetConfig] {
        &self.planets
    }

    pub fn len(&self) -> usize {
        self.planets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.planets.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&PlanetConfig> {
        self.planets.get(index)
    }

    /// Position of a planet in configured order
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.planets.iter().position(|p| p.id == *id)
    }

    /// Notes in configured order (the victory melody)
    pub fn notes(&self) -> Vec<Note> {
        self.planets.iter().map(|p| p.note).collect()
    }
}
