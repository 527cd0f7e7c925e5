//! Recording output device for native builds and tests

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use super::{AudioDevice, AudioError, Voice};

/// Device that records voices instead of playing them. Clones share the record.
#[derive(Debug, Clone, Default)]
pub struct HeadlessDevice {
    voices: Rc<RefCell<Vec<Voice>>>,
    closed: Rc<Cell<bool>>,
}

impl HeadlessDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opener for [`super::Sequencer::new`] handing out clones of this device
    pub fn opener(&self) -> impl FnMut() -> Result<HeadlessDevice, AudioError> + 'static {
        let device = self.clone();
        move || {
            device.closed.set(false);
            Ok(device.clone())
        }
    }

    /// Every voice scheduled so far
    pub fn voices(&self) -> Vec<Voice> {
        self.voices.borrow().clone()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.get()
    }
}

impl AudioDevice for HeadlessDevice {
    fn schedule(&mut self, voice: &Voice) -> Result<(), AudioError> {
        log::debug!(
            "Voice {:.2} Hz at +{:.2}s for {:.2}s (gain {:.3})",
            voice.frequency.hz(),
            voice.offset,
            voice.envelope.duration(),
            voice.peak_gain
        );
        self.voices.borrow_mut().push(*voice);
        Ok(())
    }

    fn close(&mut self) {
        self.closed.set(true);
    }
}
