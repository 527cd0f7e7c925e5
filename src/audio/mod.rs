//! Tone sequencer
//!
//! Plays enveloped sine tones through an [`AudioDevice`]. The device is opened
//! lazily on the first audible request (browsers block audio until a user
//! gesture) and released by [`Sequencer::shutdown`] or on drop.
//!
//! The sequencer owns the playback guard: while a tone or melody is in flight
//! every new request is refused, no matter who makes it.

mod headless;
#[cfg(target_arch = "wasm32")]
mod web;

pub use headless::HeadlessDevice;
#[cfg(target_arch = "wasm32")]
pub use web::WebAudioDevice;

use thiserror::Error;

use crate::consts::*;
use crate::note::Note;

/// Audio failures. These never escape the sequencer; they degrade to silence.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AudioError {
    #[error("Audio output unavailable: {0}")]
    Unavailable(String),
    #[error("Audio node error: {0}")]
    Node(String),
}

/// Pitch in Hz
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Frequency(pub f32);

impl Frequency {
    pub fn hz(&self) -> f32 {
        self.0
    }
}

impl From<f32> for Frequency {
    fn from(hz: f32) -> Self {
        Self(hz)
    }
}

impl From<Note> for Frequency {
    fn from(note: Note) -> Self {
        Self(note.frequency())
    }
}

/// Gain breakpoint, relative to the voice start and peak gain
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopePoint {
    /// Seconds after the voice starts
    pub at: f64,
    /// Fraction of the voice's peak gain
    pub level: f32,
}

const fn point(at: f64, level: f32) -> EnvelopePoint {
    EnvelopePoint { at, level }
}

/// Piecewise-linear gain envelope. The first point is set, the rest are ramps;
/// the oscillator stops at the last point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Envelope {
    points: &'static [EnvelopePoint],
}

impl Envelope {
    /// Discovery tone: quick swell, linear fade
    pub const TONE: Envelope = Envelope {
        points: &[point(0.0, 0.0), point(0.1, 1.0), point(TONE_DURATION, 0.0)],
    };

    /// Melody note: swell, settle, fade
    pub const MELODY_NOTE: Envelope = Envelope {
        points: &[
            point(0.0, 0.0),
            point(0.1, 1.0),
            point(0.3, 0.6),
            point(MELODY_NOTE_DURATION, 0.0),
        ],
    };

    pub fn points(&self) -> &'static [EnvelopePoint] {
        self.points
    }

    /// Time of the last breakpoint
    pub fn duration(&self) -> f64 {
        self.points.last().map(|p| p.at).unwrap_or(0.0)
    }
}

/// One oscillator to schedule on the device
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Voice {
    pub frequency: Frequency,
    /// Seconds after "now" on the device clock
    pub offset: f64,
    /// Absolute gain at envelope level 1.0 (volume already applied)
    pub peak_gain: f32,
    pub envelope: Envelope,
}

impl Voice {
    /// Seconds after "now" when the voice has fully released
    pub fn end(&self) -> f64 {
        self.offset + self.envelope.duration()
    }
}

/// Where the sequencer sends its voices
pub trait AudioDevice {
    /// Schedule a voice; the device releases its nodes once it ends
    fn schedule(&mut self, voice: &Voice) -> Result<(), AudioError>;

    /// Release the output
    fn close(&mut self);
}

/// Time window of an accepted playback, in the caller's clock (seconds)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Playback {
    pub started_at: f64,
    pub ends_at: f64,
}

/// "Busy until" marker refusing overlapping playback
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlaybackGuard {
    busy_until: Option<f64>,
}

impl PlaybackGuard {
    pub fn is_set(&self, now: f64) -> bool {
        self.busy_until.is_some_and(|until| now < until)
    }

    pub fn hold_until(&mut self, until: f64) {
        self.busy_until = Some(until);
    }

    pub fn clear(&mut self) {
        self.busy_until = None;
    }
}

/// Output device state as seen by callers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioStatus {
    /// Not opened yet (no audible request so far)
    Dormant,
    Ready,
    /// Opening failed; playback continues silently
    Unavailable,
}

enum DeviceSlot<D> {
    Pending,
    Ready(D),
    Unavailable,
}

type Opener<D> = Box<dyn FnMut() -> Result<D, AudioError>>;

/// Enveloped tone and melody player
pub struct Sequencer<D: AudioDevice> {
    open: Opener<D>,
    device: DeviceSlot<D>,
    volume: u8,
    muted: bool,
    guard: PlaybackGuard,
}

impl<D: AudioDevice> Sequencer<D> {
    /// Create a sequencer; `open` runs on the first audible request
    pub fn new(open: impl FnMut() -> Result<D, AudioError> + 'static) -> Self {
        Self {
            open: Box::new(open),
            device: DeviceSlot::Pending,
            volume: DEFAULT_VOLUME,
            muted: false,
            guard: PlaybackGuard::default(),
        }
    }

    pub fn status(&self) -> AudioStatus {
        match self.device {
            DeviceSlot::Pending => AudioStatus::Dormant,
            DeviceSlot::Ready(_) => AudioStatus::Ready,
            DeviceSlot::Unavailable => AudioStatus::Unavailable,
        }
    }

    /// Set volume (0 - 100); applies to tones started afterwards
    pub fn set_volume(&mut self, volume: u8) {
        self.volume = volume.min(100);
    }

    pub fn volume(&self) -> u8 {
        self.volume
    }

    /// Mute/unmute; timing is unaffected
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Whether a tone or melody is still in flight at `now`
    pub fn is_playing(&self, now: f64) -> bool {
        self.guard.is_set(now)
    }

    /// Gain at envelope level 1.0
    fn peak_gain(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.volume as f32 / 100.0 * MAX_OUTPUT_GAIN
        }
    }

    /// Play one tone. Returns None (and plays nothing) while another playback
    /// is in flight.
    pub fn play_tone(&mut self, frequency: impl Into<Frequency>, now: f64) -> Option<Playback> {
        if self.guard.is_set(now) {
            log::debug!("Tone refused - playback in flight");
            return None;
        }

        let voice = Voice {
            frequency: frequency.into(),
            offset: 0.0,
            peak_gain: self.peak_gain(),
            envelope: Envelope::TONE,
        };
        let playback = Playback {
            started_at: now,
            ends_at: now + voice.end(),
        };

        self.dispatch(&[voice]);
        self.guard.hold_until(playback.ends_at);
        Some(playback)
    }

    /// Play notes in order, each starting before the previous one has faded.
    /// Returns None while another playback is in flight.
    pub fn play_sequence<F, I>(&mut self, notes: I, now: f64) -> Option<Playback>
    where
        F: Into<Frequency>,
        I: IntoIterator<Item = F>,
    {
        if self.guard.is_set(now) {
            log::debug!("Melody refused - playback in flight");
            return None;
        }

        let peak_gain = self.peak_gain();
        let voices: Vec<Voice> = notes
            .into_iter()
            .enumerate()
            .map(|(i, f)| Voice {
                frequency: f.into(),
                offset: i as f64 * MELODY_NOTE_STEP,
                peak_gain,
                envelope: Envelope::MELODY_NOTE,
            })
            .collect();

        let Some(last) = voices.last() else {
            return Some(Playback {
                started_at: now,
                ends_at: now,
            });
        };
        let playback = Playback {
            started_at: now,
            ends_at: now + last.end(),
        };

        self.dispatch(&voices);
        self.guard.hold_until(playback.ends_at);
        Some(playback)
    }

    /// Close the device. A later audible request opens it again.
    pub fn shutdown(&mut self) {
        match std::mem::replace(&mut self.device, DeviceSlot::Pending) {
            DeviceSlot::Ready(mut device) => {
                device.close();
                log::info!("Audio output released");
            }
            DeviceSlot::Unavailable => self.device = DeviceSlot::Unavailable,
            DeviceSlot::Pending => {}
        }
        self.guard.clear();
    }

    fn dispatch(&mut self, voices: &[Voice]) {
        if voices.is_empty() || self.peak_gain() <= 0.0 {
            return;
        }

        let Some(device) = self.acquire() else { return };

        for voice in voices {
            if let Err(e) = device.schedule(voice) {
                log::warn!("Failed to schedule {:.2} Hz tone: {}", voice.frequency.hz(), e);
            }
        }
    }

    fn acquire(&mut self) -> Option<&mut D> {
        if matches!(self.device, DeviceSlot::Pending) {
            self.device = match (self.open)() {
                Ok(device) => {
                    log::info!("Audio output acquired");
                    DeviceSlot::Ready(device)
                }
                Err(e) => {
                    log::warn!("{} - audio disabled", e);
                    DeviceSlot::Unavailable
                }
            };
        }

        match &mut self.device {
            DeviceSlot::Ready(device) => Some(device),
            _ => None,
        }
    }
}

impl<D: AudioDevice> Drop for Sequencer<D> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{MAX_OUTPUT_GAIN, MELODY_NOTE_STEP, TONE_DURATION};
    use std::cell::Cell;
    use std::rc::Rc;

    fn sequencer() -> (Sequencer<HeadlessDevice>, HeadlessDevice) {
        let device = HeadlessDevice::new();
        (Sequencer::new(device.opener()), device)
    }

    #[test]
    fn test_device_opened_lazily() {
        let (mut seq, device) = sequencer();
        assert_eq!(seq.status(), AudioStatus::Dormant);
        assert!(device.voices().is_empty());

        seq.play_tone(Note::C4, 0.0);
        assert_eq!(seq.status(), AudioStatus::Ready);
        assert_eq!(device.voices().len(), 1);
    }

    #[test]
    fn test_tone_envelope_and_window() {
        let (mut seq, device) = sequencer();
        let playback = seq.play_tone(Note::E4, 10.0).unwrap();
        assert_eq!(playback.started_at, 10.0);
        assert!((playback.ends_at - 10.5).abs() < 1e-9);

        let voice = device.voices()[0];
        assert_eq!(voice.envelope, Envelope::TONE);
        assert_eq!(voice.offset, 0.0);
        assert!((voice.frequency.hz() - 329.63).abs() < 0.01);
        // Default volume 50 -> half the ceiling
        assert!((voice.peak_gain - 0.05).abs() < 1e-6);
        assert_eq!(Envelope::TONE.points()[0].level, 0.0);
        assert_eq!(Envelope::TONE.points().last().unwrap().level, 0.0);
    }

    #[test]
    fn test_guard_refuses_overlap() {
        let (mut seq, device) = sequencer();
        assert!(seq.play_tone(Note::C4, 0.0).is_some());
        assert!(seq.is_playing(0.2));
        assert!(seq.play_tone(Note::E4, 0.2).is_none());
        assert!(seq.play_sequence([Note::C4, Note::E4], 0.4).is_none());
        assert_eq!(device.voices().len(), 1);

        // Window closes exactly at the tone's end
        assert!(!seq.is_playing(0.5));
        assert!(seq.play_tone(Note::E4, 0.5).is_some());
        assert_eq!(device.voices().len(), 2);
    }

    #[test]
    fn test_sequence_overlaps_in_order() {
        let (mut seq, device) = sequencer();
        let notes = [Note::C4, Note::E4, Note::G4, Note::B4];
        let playback = seq.play_sequence(notes, 1.0).unwrap();

        let voices = device.voices();
        assert_eq!(voices.len(), 4);
        for (i, (voice, note)) in voices.iter().zip(notes).enumerate() {
            assert_eq!(voice.frequency, Frequency::from(note));
            assert!((voice.offset - i as f64 * MELODY_NOTE_STEP).abs() < 1e-9);
            assert_eq!(voice.envelope, Envelope::MELODY_NOTE);
        }
        // Each note starts before the previous has released
        assert!(voices[1].offset < voices[0].end());
        // 3 steps + one full note
        assert!((playback.ends_at - (1.0 + 0.9 + 0.6)).abs() < 1e-9);
    }

    #[test]
    fn test_empty_sequence_completes_immediately() {
        let (mut seq, device) = sequencer();
        let playback = seq.play_sequence(Vec::<Note>::new(), 2.0).unwrap();
        assert_eq!(playback.ends_at, 2.0);
        assert!(!seq.is_playing(2.0));
        assert_eq!(seq.status(), AudioStatus::Dormant);
        assert!(device.voices().is_empty());
    }

    #[test]
    fn test_volume_affects_later_tones_only() {
        let (mut seq, device) = sequencer();
        seq.play_tone(Note::C4, 0.0);
        seq.set_volume(100);
        seq.play_tone(Note::C4, 1.0);
        seq.set_volume(250);
        assert_eq!(seq.volume(), 100);

        let voices = device.voices();
        assert!((voices[0].peak_gain - 0.05).abs() < 1e-6);
        assert!((voices[1].peak_gain - MAX_OUTPUT_GAIN).abs() < 1e-6);
    }

    #[test]
    fn test_muted_keeps_timing_without_sound() {
        let (mut seq, device) = sequencer();
        seq.set_muted(true);
        let playback = seq.play_tone(Note::C4, 0.0).unwrap();
        assert!((playback.ends_at - TONE_DURATION).abs() < 1e-9);
        assert!(seq.is_playing(0.1));
        assert!(device.voices().is_empty());
        assert_eq!(seq.status(), AudioStatus::Dormant);
    }

    #[test]
    fn test_unavailable_audio_is_silent_but_timed() {
        let attempts = Rc::new(Cell::new(0));
        let counter = attempts.clone();
        let mut seq: Sequencer<HeadlessDevice> = Sequencer::new(move || {
            counter.set(counter.get() + 1);
            Err(AudioError::Unavailable("no audio in this environment".into()))
        });

        let playback = seq.play_tone(Note::C4, 0.0).unwrap();
        assert_eq!(seq.status(), AudioStatus::Unavailable);
        assert!((playback.ends_at - TONE_DURATION).abs() < 1e-9);

        assert!(seq.play_sequence([Note::C4, Note::E4], 1.0).is_some());
        seq.shutdown();
        seq.play_tone(Note::G4, 5.0);
        // Opening is attempted once
        assert_eq!(attempts.get(), 1);
        assert_eq!(seq.status(), AudioStatus::Unavailable);
    }

    #[test]
    fn test_shutdown_and_drop_close_device() {
        let (mut seq, device) = sequencer();
        seq.play_tone(Note::C4, 0.0);
        seq.shutdown();
        assert!(device.is_closed());
        assert_eq!(seq.status(), AudioStatus::Dormant);
        assert!(!seq.is_playing(0.1));

        // Re-acquired on the next gesture
        seq.play_tone(Note::C4, 1.0);
        assert_eq!(seq.status(), AudioStatus::Ready);
        assert!(!device.is_closed());

        drop(seq);
        assert!(device.is_closed());
    }
}
