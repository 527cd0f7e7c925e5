//! Web Audio output
//!
//! Each voice is an oscillator routed through its own gain node, fully
//! scheduled on the audio clock up front. Nodes disconnect themselves when the
//! oscillator ends.

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{AudioContext, AudioContextState, GainNode, OscillatorNode, OscillatorType};

use super::{AudioDevice, AudioError, Voice};

/// Audio output backed by an `AudioContext`
pub struct WebAudioDevice {
    ctx: AudioContext,
}

impl WebAudioDevice {
    /// Create the audio context (call from a user gesture)
    pub fn open() -> Result<Self, AudioError> {
        let ctx = AudioContext::new().map_err(|e| AudioError::Unavailable(describe(&e)))?;
        Ok(Self { ctx })
    }

    /// Create an oscillator feeding a gain node feeding the speakers
    fn create_osc(&self, freq: f32) -> Result<(OscillatorNode, GainNode), AudioError> {
        let osc = self.ctx.create_oscillator().map_err(node_error)?;
        let gain = self.ctx.create_gain().map_err(node_error)?;

        osc.set_type(OscillatorType::Sine);
        osc.frequency().set_value(freq);
        osc.connect_with_audio_node(&gain).map_err(node_error)?;
        gain.connect_with_audio_node(&self.ctx.destination())
            .map_err(node_error)?;

        Ok((osc, gain))
    }
}

impl AudioDevice for WebAudioDevice {
    fn schedule(&mut self, voice: &Voice) -> Result<(), AudioError> {
        // Resume context if suspended (browsers require user gesture)
        if self.ctx.state() == AudioContextState::Suspended {
            let _ = self.ctx.resume();
        }

        let (osc, gain) = self.create_osc(voice.frequency.hz())?;
        let t = self.ctx.current_time() + voice.offset;

        let param = gain.gain();
        for (i, point) in voice.envelope.points().iter().enumerate() {
            let level = point.level * voice.peak_gain;
            let scheduled = if i == 0 {
                param.set_value_at_time(level, t + point.at)
            } else {
                param.linear_ramp_to_value_at_time(level, t + point.at)
            };
            scheduled.map_err(node_error)?;
        }

        let release = {
            let osc = osc.clone();
            let gain = gain.clone();
            Closure::once_into_js(move || {
                let _ = osc.disconnect();
                let _ = gain.disconnect();
            })
        };
        osc.set_onended(Some(release.unchecked_ref()));

        osc.start_with_when(t).map_err(node_error)?;
        osc.stop_with_when(t + voice.envelope.duration())
            .map_err(node_error)?;
        Ok(())
    }

    fn close(&mut self) {
        let _ = self.ctx.close();
    }
}

fn node_error(err: JsValue) -> AudioError {
    AudioError::Node(describe(&err))
}

fn describe(err: &JsValue) -> String {
    err.as_string().unwrap_or_else(|| format!("{:?}", err))
}
