//! Round-robin pool of envelopes fed by one excitation signal.

use super::envelope::Envelope;
use crate::params::EnvelopeShape;

/// Fixed set of envelopes plus a cursor that cycles through them.
///
/// Over any `len()` consecutive triggers every voice is used exactly once,
/// so a voice is only re-triggered after all the others have been.
#[derive(Debug, Clone)]
pub struct VoicePool {
    voices: Vec<Envelope>,
    cursor: usize,
}

impl VoicePool {
    /// Build `voice_count` silent envelopes (at least one)
    pub fn new(voice_count: usize, shape: &EnvelopeShape) -> Self {
        let voice_count = voice_count.max(1);
        let voices = (0..voice_count)
            .map(|_| Envelope::new(shape.clone()))
            .collect();
        // Cursor points at the "last used" voice so the first trigger lands on voice 0
        Self {
            voices,
            cursor: voice_count - 1,
        }
    }

    /// Advance the cursor and trigger the envelope it lands on, returning its index
    pub fn trigger_next(&mut self, now: Option<f64>) -> usize {
        self.cursor = (self.cursor + 1) % self.voices.len();
        self.voices[self.cursor].trigger(now);
        self.cursor
    }

    /// Feed one excitation sample through every envelope and sum the outputs
    pub fn mix(&mut self, t: f64, excitation: f32) -> f32 {
        self.voices
            .iter_mut()
            .map(|voice| voice.gain_at(t) * excitation)
            .sum()
    }

    /// Index of the most recently triggered voice
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.voices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voices.is_empty()
    }

    pub fn voices(&self) -> &[Envelope] {
        &self.voices
    }

    /// Schedules placed on each voice so far
    pub fn trigger_counts(&self) -> Vec<u64> {
        self.voices.iter().map(Envelope::trigger_count).collect()
    }
}
