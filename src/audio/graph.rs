//! Signal graph: noise -> voices -> lowpass -> master gain -> analyser tap.

use std::sync::{Arc, Mutex, PoisonError};

use super::analyser::Analyser;
use super::clock::AudioClock;
use super::filter::BiquadLowpass;
use super::noise::NoiseSource;
use super::voice_pool::VoicePool;
use crate::params::EngineConfig;

/// Analyser shared between the render side (writer) and the draw cycle (reader)
pub type SharedAnalyser = Arc<Mutex<Analyser>>;

/// Every node of the procedural sound, owned in one place.
///
/// All voices read the same noise sample and feed the same filter; the
/// analyser sees the master output before any device-side limiting.
pub struct SignalGraph {
    clock: AudioClock,
    noise: NoiseSource,
    pool: VoicePool,
    filter: BiquadLowpass,
    master_gain: f32,
    analyser: SharedAnalyser,
}

impl SignalGraph {
    /// Connect the nodes for `sample_rate`; `config` is expected to be validated
    pub fn new(config: &EngineConfig, sample_rate: u32, analyser: SharedAnalyser) -> Self {
        Self {
            clock: AudioClock::new(sample_rate),
            noise: NoiseSource::new(config.noise_duration_s, sample_rate, config.noise_seed),
            pool: VoicePool::new(config.voice_count, &config.envelope),
            filter: BiquadLowpass::new(config.filter.cutoff_hz, config.filter.q_db, sample_rate),
            master_gain: config.master_gain,
            analyser,
        }
    }

    /// Let the clock run; until then triggers are no-ops and rendering is silent
    pub fn start_clock(&mut self) {
        self.clock.start();
    }

    pub fn clock(&self) -> &AudioClock {
        &self.clock
    }

    pub fn pool(&self) -> &VoicePool {
        &self.pool
    }

    /// Retrigger the next voice at the current audio time
    pub fn trigger_next(&mut self) -> usize {
        let now = self.clock.now();
        self.pool.trigger_next(now)
    }

    /// Render mono samples into `out` and feed them to the analyser
    pub fn render(&mut self, out: &mut [f32]) {
        if !self.clock.is_running() {
            out.fill(0.0);
            return;
        }

        for (i, sample) in out.iter_mut().enumerate() {
            let t = self.clock.time_of(i);
            let excitation = self.noise.next_sample();
            let voiced = self.pool.mix(t, excitation);
            *sample = self.filter.process(voiced) * self.master_gain;
        }
        self.clock.advance(out.len());

        self.analyser
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_samples(out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(voices: usize) -> SignalGraph {
        let config = EngineConfig {
            voice_count: voices,
            noise_seed: Some(11),
            ..EngineConfig::default()
        };
        let analyser = Arc::new(Mutex::new(Analyser::new(&config.analyser)));
        SignalGraph::new(&config, 44100, analyser)
    }

    fn rms(samples: &[f32]) -> f32 {
        (samples.iter().map(|s| s * s).sum::<f32>() / samples.len() as f32).sqrt()
    }

    #[test]
    fn test_stopped_clock_renders_silence() {
        let mut graph = graph(3);
        graph.trigger_next();
        let mut out = vec![1.0; 512];
        graph.render(&mut out);

        assert!(out.iter().all(|s| *s == 0.0));
        assert_eq!(graph.clock().now(), None);
        assert_eq!(graph.pool().trigger_counts(), vec![0, 0, 0]);
    }

    #[test]
    fn test_untriggered_voices_are_silent() {
        let mut graph = graph(3);
        graph.start_clock();
        let mut out = vec![1.0; 4410];
        graph.render(&mut out);
        assert!(out.iter().all(|s| *s == 0.0));
    }

    #[test]
    fn test_beat_produces_decaying_burst() {
        let mut graph = graph(3);
        graph.start_clock();
        graph.trigger_next();

        let mut burst = vec![0.0; 4410]; // first 100 ms
        graph.render(&mut burst);
        assert!(rms(&burst) > 0.01);

        let mut tail = vec![0.0; 22050]; // 100 ms .. 600 ms
        graph.render(&mut tail);

        let mut after = vec![0.0; 4410]; // envelope finished, filter rung out
        graph.render(&mut after);
        assert!(rms(&after) < 1e-3);
        assert!(rms(&after) < rms(&burst));
    }

    #[test]
    fn test_clock_advances_with_rendering() {
        let mut graph = graph(1);
        graph.start_clock();
        let mut out = vec![0.0; 22050];
        graph.render(&mut out);
        assert_eq!(graph.clock().now(), Some(0.5));
    }
}
