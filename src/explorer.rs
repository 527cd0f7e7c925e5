//! Discovery state machine
//!
//! A click on an undiscovered planet plays its tone; once the tone has
//! finished the planet joins the discovery set. Completing the set wins the
//! level and plays every planet's note as a melody.
//!
//! Time is passed in explicitly (seconds, any monotonic origin) and the
//! explorer is advanced by calling [`Explorer::update`] every frame.

use std::collections::BTreeSet;

use crate::audio::{AudioDevice, Sequencer};
use crate::catalog::{Catalog, PlanetId};
use crate::consts::MAX_LEVEL;
use crate::note::Note;

/// Planet ids discovered in the current level. Only grows until the level
/// is advanced; never larger than the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoverySet {
    found: BTreeSet<PlanetId>,
    capacity: usize,
}

impl DiscoverySet {
    fn new(capacity: usize) -> Self {
        Self {
            found: BTreeSet::new(),
            capacity,
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.found.contains(id)
    }

    pub fn len(&self) -> usize {
        self.found.len()
    }

    pub fn is_empty(&self) -> bool {
        self.found.is_empty()
    }

    /// Number of planets in the level
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_complete(&self) -> bool {
        self.found.len() == self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlanetId> {
        self.found.iter()
    }

    fn insert(&mut self, id: PlanetId) -> bool {
        debug_assert!(self.found.len() < self.capacity || self.found.contains(&id));
        self.found.insert(id)
    }

    fn clear(&mut self) {
        self.found.clear();
    }
}

/// What the explorer is doing
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Phase {
    /// Accepting clicks
    Idle,
    /// A planet's tone is sounding
    PlayingTone { planet: usize, until: f64 },
    /// Level won; the melody waits for the sequencer to free up
    MelodyPending,
    /// The victory melody is sounding
    Celebrating { until: f64 },
}

/// Why a click did nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    UnknownPlanet,
    AlreadyDiscovered,
    /// Something is still playing
    Busy,
}

/// Result of a planet click
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Activation {
    Started { planet: usize, until: f64 },
    Ignored(IgnoreReason),
}

/// Things the view reacts to
#[derive(Debug, Clone, PartialEq)]
pub enum ExplorerEvent {
    ToneStarted { planet: usize },
    /// Planet joined the discovery set; reveal its fact
    Discovered { planet: usize },
    /// Every planet found. Emitted once per level.
    Victory { level: u32 },
    MelodyStarted { notes: Vec<Note>, until: f64 },
    MelodyFinished,
    LevelAdvanced { level: u32 },
}

/// Game state for one play field
#[derive(Debug, Clone)]
pub struct Explorer {
    catalog: Catalog,
    discovered: DiscoverySet,
    phase: Phase,
    victory: bool,
    /// Current level (1-based)
    level: u32,
    events: Vec<ExplorerEvent>,
}

impl Explorer {
    pub fn new(catalog: Catalog) -> Self {
        let discovered = DiscoverySet::new(catalog.len());
        Self {
            catalog,
            discovered,
            phase: Phase::Idle,
            victory: false,
            level: 1,
            events: Vec::new(),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn discovered(&self) -> &DiscoverySet {
        &self.discovered
    }

    pub fn is_discovered(&self, id: &str) -> bool {
        self.discovered.contains(id)
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Playback guard as seen by the view
    pub fn is_playing(&self) -> bool {
        self.phase != Phase::Idle
    }

    pub fn is_victory(&self) -> bool {
        self.victory
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    /// Handle a click on a planet
    pub fn activate<D: AudioDevice>(
        &mut self,
        id: &str,
        now: f64,
        sequencer: &mut Sequencer<D>,
    ) -> Activation {
        // Settle anything that finished before this click
        self.update(now, sequencer);

        let Some(planet) = self.catalog.index_of(id) else {
            return Activation::Ignored(IgnoreReason::UnknownPlanet);
        };
        if self.discovered.contains(id) {
            return Activation::Ignored(IgnoreReason::AlreadyDiscovered);
        }
        if self.phase != Phase::Idle {
            return Activation::Ignored(IgnoreReason::Busy);
        }

        let note = self.catalog.planets()[planet].note;
        let Some(playback) = sequencer.play_tone(note, now) else {
            return Activation::Ignored(IgnoreReason::Busy);
        };

        log::debug!("Playing {} for {}", note, id);
        self.phase = Phase::PlayingTone {
            planet,
            until: playback.ends_at,
        };
        self.events.push(ExplorerEvent::ToneStarted { planet });
        Activation::Started {
            planet,
            until: playback.ends_at,
        }
    }

    /// Advance time: finish tones, record discoveries, detect victory
    pub fn update<D: AudioDevice>(&mut self, now: f64, sequencer: &mut Sequencer<D>) {
        match self.phase {
            Phase::Idle => {}
            Phase::PlayingTone { planet, until } if now >= until => {
                self.phase = Phase::Idle;
                self.discover(planet, now, sequencer);
            }
            Phase::MelodyPending => self.start_melody(now, sequencer),
            Phase::Celebrating { until } if now >= until => {
                self.phase = Phase::Idle;
                self.events.push(ExplorerEvent::MelodyFinished);
            }
            _ => {}
        }
    }

    fn discover<D: AudioDevice>(&mut self, planet: usize, now: f64, sequencer: &mut Sequencer<D>) {
        let Some(config) = self.catalog.get(planet) else {
            return;
        };
        if self.discovered.insert(config.id.clone()) {
            log::info!(
                "Discovered {} ({}/{})",
                config.name,
                self.discovered.len(),
                self.discovered.capacity()
            );
            self.events.push(ExplorerEvent::Discovered { planet });
        }

        if self.discovered.is_complete() && !self.victory {
            self.victory = true;
            log::info!("Level {} complete!", self.level);
            self.events.push(ExplorerEvent::Victory { level: self.level });
            self.start_melody(now, sequencer);
        }
    }

    /// Play all notes in catalog order, or retry on a later update
    fn start_melody<D: AudioDevice>(&mut self, now: f64, sequencer: &mut Sequencer<D>) {
        let notes = self.catalog.notes();
        match sequencer.play_sequence(notes.iter().copied(), now) {
            Some(playback) => {
                self.phase = Phase::Celebrating {
                    until: playback.ends_at,
                };
                self.events.push(ExplorerEvent::MelodyStarted {
                    notes,
                    until: playback.ends_at,
                });
            }
            None => {
                log::debug!("Victory melody waiting - playback in flight");
                self.phase = Phase::MelodyPending;
            }
        }
    }

    /// Move on after a victory. Levels wrap back to 1 after `MAX_LEVEL`.
    /// Returns the new level, or None if the level isn't won yet.
    pub fn advance_level(&mut self) -> Option<u32> {
        if !self.victory {
            return None;
        }

        self.level = if self.level >= MAX_LEVEL {
            1
        } else {
            self.level + 1
        };
        self.victory = false;
        self.discovered.clear();
        // A melody still waiting belongs to the finished level
        if self.phase == Phase::MelodyPending {
            self.phase = Phase::Idle;
        }
        log::info!("Starting level {}", self.level);
        self.events
            .push(ExplorerEvent::LevelAdvanced { level: self.level });
        Some(self.level)
    }

    /// Take the events produced since the last call
    pub fn drain_events(&mut self) -> Vec<ExplorerEvent> {
        std::mem::take(&mut self.events)
    }
}
