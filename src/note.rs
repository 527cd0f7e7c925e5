//! Musical notes in scientific pitch notation
//!
//! `C4` is middle C, `A4` is tuned to 440 Hz, accidentals are `#` and `b`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Concert pitch reference (A4)
pub const A4_HZ: f32 = 440.0;
const A4_MIDI: i32 = 69;

/// Error type for note parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NoteError {
    #[error("Empty note")]
    Empty,
    #[error("Invalid pitch letter in {0:?}")]
    InvalidLetter(String),
    #[error("Invalid octave in {0:?}")]
    InvalidOctave(String),
    #[error("Note {0:?} is outside the MIDI range")]
    OutOfRange(String),
}

/// A note on the equal-tempered scale, stored as a MIDI number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Note {
    midi: u8,
}

impl Note {
    pub const C4: Note = Note { midi: 60 };
    pub const E4: Note = Note { midi: 64 };
    pub const G4: Note = Note { midi: 67 };
    pub const B4: Note = Note { midi: 71 };

    /// Note from a MIDI number (0-127)
    pub fn from_midi(midi: u8) -> Option<Self> {
        (midi <= 127).then_some(Self { midi })
    }

    pub fn midi(&self) -> u8 {
        self.midi
    }

    /// Frequency in Hz
    pub fn frequency(&self) -> f32 {
        let semitones = self.midi as i32 - A4_MIDI;
        A4_HZ * 2f32.powf(semitones as f32 / 12.0)
    }

    /// Shift by a number of semitones, None if it leaves the MIDI range
    pub fn transpose(&self, semitones: i32) -> Option<Self> {
        let midi = self.midi as i32 + semitones;
        u8::try_from(midi).ok().and_then(Self::from_midi)
    }
}

impl FromStr for Note {
    type Err = NoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let mut chars = s.chars();
        let letter = chars.next().ok_or(NoteError::Empty)?;
        let pitch_class: i32 = match letter.to_ascii_uppercase() {
            'C' => 0,
            'D' => 2,
            'E' => 4,
            'F' => 5,
            'G' => 7,
            'A' => 9,
            'B' => 11,
            _ => return Err(NoteError::InvalidLetter(s.to_string())),
        };

        let rest = chars.as_str();
        let (accidental, octave) = match rest.chars().next() {
            Some('#') => (1, &rest[1..]),
            Some('b') => (-1, &rest[1..]),
            _ => (0, rest),
        };

        let octave: i32 = octave
            .parse()
            .map_err(|_| NoteError::InvalidOctave(s.to_string()))?;

        octave
            .checked_add(1)
            .and_then(|o| o.checked_mul(12))
            .and_then(|m| m.checked_add(pitch_class + accidental))
            .and_then(|midi| u8::try_from(midi).ok())
            .and_then(Self::from_midi)
            .ok_or_else(|| NoteError::OutOfRange(s.to_string()))
    }
}

impl TryFrom<String> for Note {
    type Error = NoteError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Note> for String {
    fn from(note: Note) -> Self {
        note.to_string()
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [&str; 12] = [
            "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
        ];
        let octave = self.midi as i32 / 12 - 1;
        write!(f, "{}{}", NAMES[self.midi as usize % 12], octave)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_planet_notes() {
        assert_eq!("C4".parse::<Note>().unwrap(), Note::C4);
        assert_eq!("E4".parse::<Note>().unwrap(), Note::E4);
        assert_eq!("G4".parse::<Note>().unwrap(), Note::G4);
        assert_eq!("B4".parse::<Note>().unwrap(), Note::B4);
    }

    #[test]
    fn test_frequencies_match_equal_temperament() {
        assert!((Note::C4.frequency() - 261.63).abs() < 0.01);
        assert!((Note::E4.frequency() - 329.63).abs() < 0.01);
        assert!((Note::G4.frequency() - 392.00).abs() < 0.01);
        assert!((Note::B4.frequency() - 493.88).abs() < 0.01);
        assert!(("A4".parse::<Note>().unwrap().frequency() - 440.0).abs() < 0.001);
    }

    #[test]
    fn test_accidentals() {
        let sharp: Note = "F#3".parse().unwrap();
        let flat: Note = "Gb3".parse().unwrap();
        assert_eq!(sharp, flat);
        assert_eq!(sharp.midi(), 54);
        assert_eq!(sharp.to_string(), "F#3");
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!("".parse::<Note>(), Err(NoteError::Empty));
        assert!(matches!("H4".parse::<Note>(), Err(NoteError::InvalidLetter(_))));
        assert!(matches!("C".parse::<Note>(), Err(NoteError::InvalidOctave(_))));
        assert!(matches!("C12".parse::<Note>(), Err(NoteError::OutOfRange(_))));
        assert!(matches!("Cb-1".parse::<Note>(), Err(NoteError::OutOfRange(_))));
        assert!(matches!("C2147483647".parse::<Note>(), Err(NoteError::OutOfRange(_))));
        assert!(matches!("C-2147483648".parse::<Note>(), Err(NoteError::OutOfRange(_))));
        assert!(matches!("B#300000000".parse::<Note>(), Err(NoteError::OutOfRange(_))));
    }

    #[test]
    fn test_transpose() {
        assert_eq!(Note::C4.transpose(4), Some(Note::E4));
        assert_eq!(Note::C4.transpose(-61), None);
        assert_eq!(Note::C4.transpose(12).unwrap().to_string(), "C5");
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&Note::G4).unwrap();
        assert_eq!(json, "\"G4\"");
        let back: Note = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Note::G4);
        assert!(serde_json::from_str::<Note>("\"X9\"").is_err());
    }
}
