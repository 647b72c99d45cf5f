//! Procedural trading-sound engine.
//!
//! Two independent cycles share only the analyser: beats retrigger voices
//! (externally driven), and the draw cycle repaints the scope at the frame
//! rate until stopped.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use super::analyser::Analyser;
use super::backend::{AudioOutput, BackendKind, DeviceProbe};
use super::graph::{SharedAnalyser, SignalGraph};
use crate::error::{ConfigError, DrawError, EngineError};
use crate::frame_loop::{FrameLoop, FrameLoopExit};
use crate::params::{AnalyserTuning, EngineConfig};
use crate::visual::{CanvasRegistry, ScopeSnapshot, SpectrumScope};

/// Cloneable, thread-safe way to fire beats on an engine
#[derive(Clone)]
pub struct BeatTrigger {
    graph: Arc<Mutex<SignalGraph>>,
}

impl BeatTrigger {
    /// Retrigger the next voice in round-robin order
    pub fn beat_once(&self) {
        let voice = lock(&self.graph).trigger_next();
        log::trace!("Beat on voice {}", voice);
    }
}

pub struct ProceduralAudioEngine {
    config: EngineConfig,
    sample_rate: u32,
    graph: Arc<Mutex<SignalGraph>>,
    scope: Arc<Mutex<SpectrumScope>>,
    output: AudioOutput,
    frame_loop: Option<FrameLoop>,
}

impl ProceduralAudioEngine {
    /// Build the signal graph on the selected backend.
    ///
    /// The draw cycle paints into the canvas registered in `surfaces` under
    /// `config.surface.surface_id`; it is not started until `start()`.
    pub fn new(
        config: EngineConfig,
        backend: BackendKind,
        surfaces: CanvasRegistry,
    ) -> Result<Self, EngineError> {
        config.validate()?;

        let probe = match backend {
            BackendKind::Device => Some(DeviceProbe::open_default()?),
            BackendKind::Offline { .. } | BackendKind::Silent { .. } => None,
        };
        let sample_rate = match (&probe, backend) {
            (Some(probe), _) => probe.sample_rate(),
            (None, BackendKind::Offline { sample_rate })
            | (None, BackendKind::Silent { sample_rate }) => sample_rate,
            (None, BackendKind::Device) => return Err(EngineError::AudioUnavailable),
        };
        config.validate_for(sample_rate)?;

        let analyser: SharedAnalyser = Arc::new(Mutex::new(Analyser::new(&config.analyser)));
        let graph = Arc::new(Mutex::new(SignalGraph::new(
            &config,
            sample_rate,
            Arc::clone(&analyser),
        )));

        let output = match probe {
            Some(probe) => AudioOutput::Device {
                _stream: probe.play(Arc::clone(&graph), config.output_limit)?,
            },
            None if matches!(backend, BackendKind::Offline { .. }) => {
                lock(&graph).start_clock();
                AudioOutput::Offline
            }
            None => AudioOutput::Silent,
        };

        let scope = SpectrumScope::new(
            analyser,
            config.analyser.tuning(),
            surfaces,
            config.surface.clone(),
        );

        log::info!(
            "Engine ready: {} backend, {} voices, {} Hz, FFT {} ({} bins)",
            output.label(),
            config.voice_count,
            sample_rate,
            config.analyser.fft_size,
            scope.bin_count()
        );

        Ok(Self {
            config,
            sample_rate,
            graph,
            scope: Arc::new(Mutex::new(scope)),
            output,
            frame_loop: None,
        })
    }

    /// Retrigger the next voice in round-robin order
    pub fn beat_once(&self) {
        lock(&self.graph).trigger_next();
    }

    /// Handle for firing beats from other threads
    pub fn trigger_handle(&self) -> BeatTrigger {
        BeatTrigger {
            graph: Arc::clone(&self.graph),
        }
    }

    /// Draw a single frame on the calling thread
    pub fn draw(&self) -> Result<(), DrawError> {
        lock(&self.scope).draw()
    }

    /// Start the repeating draw cycle; a running cycle is left alone
    pub fn start(&mut self) {
        if self.is_drawing() {
            log::warn!("Draw loop already running");
            return;
        }
        // Reap a loop that halted on its own before starting a fresh one
        self.stop();

        let interval = Duration::from_secs_f64(1.0 / self.config.frame_rate_hz as f64);
        let scope = Arc::clone(&self.scope);
        self.frame_loop = Some(FrameLoop::spawn(
            interval,
            self.config.frame_error_policy,
            move || lock(&scope).draw(),
        ));
        log::info!("Draw loop started at {} Hz", self.config.frame_rate_hz);
    }

    /// Cancel the draw cycle, reporting how it ended (None if it never started)
    pub fn stop(&mut self) -> Option<FrameLoopExit> {
        let exit = self.frame_loop.take()?.stop();
        match &exit {
            FrameLoopExit::Stopped { frames, skipped } => {
                log::info!("Draw loop stopped after {} frames ({} skipped)", frames, skipped)
            }
            FrameLoopExit::Halted { frames, error } => {
                log::error!("Draw loop had halted after {} frames: {}", frames, error)
            }
        }
        Some(exit)
    }

    /// True while the draw cycle is scheduling frames
    pub fn is_drawing(&self) -> bool {
        self.frame_loop
            .as_ref()
            .is_some_and(FrameLoop::is_running)
    }

    /// Change analyser smoothing and decibel range from the next frame on
    pub fn tune(&self, tuning: AnalyserTuning) -> Result<(), ConfigError> {
        tuning.validate()?;
        lock(&self.scope).set_tuning(tuning);
        Ok(())
    }

    /// Pull the next `out.len()` samples (offline backend only)
    pub fn render_offline(&self, out: &mut [f32]) -> Result<(), EngineError> {
        if !self.output.is_offline() {
            return Err(EngineError::NotOffline);
        }
        lock(&self.graph).render(out);
        Ok(())
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Index of the most recently triggered voice
    pub fn cursor(&self) -> usize {
        lock(&self.graph).pool().cursor()
    }

    /// Schedules placed on each voice so far
    pub fn voice_trigger_counts(&self) -> Vec<u64> {
        lock(&self.graph).pool().trigger_counts()
    }

    pub fn bin_count(&self) -> usize {
        lock(&self.scope).bin_count()
    }

    /// Copies of the frequency and time-domain buffers
    pub fn snapshot(&self) -> ScopeSnapshot {
        lock(&self.scope).snapshot()
    }
}

impl Drop for ProceduralAudioEngine {
    fn drop(&mut self) {
        self.stop();
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
