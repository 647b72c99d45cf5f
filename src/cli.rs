//! Command-line argument parsing.

use clap::Parser;

use crate::params::{EngineConfig, FrameErrorPolicy, RecordingConfig, TickerConfig};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "tradebeat")]
#[command(about = "Procedural trading sound with a live spectrum scope", long_about = None)]
pub struct Args {
    /// Number of round-robin voices
    #[arg(long, value_name = "COUNT", default_value = "10")]
    pub voices: usize,

    /// Analyser FFT size (power of two)
    #[arg(long, value_name = "SAMPLES", default_value = "2048")]
    pub fft_size: usize,

    /// Analyser smoothing constant in [0, 1]
    #[arg(long, value_name = "FACTOR", default_value = "0.8")]
    pub smoothing: f32,

    /// Lowpass cutoff (Hz)
    #[arg(long, value_name = "HZ", default_value = "800")]
    pub cutoff: f32,

    /// Lowpass resonance (dB)
    #[arg(long, value_name = "DB", default_value = "1")]
    pub q: f32,

    /// Scope width (pixels)
    #[arg(long, value_name = "PIXELS", default_value = "640")]
    pub width: u32,

    /// Scope height (pixels)
    #[arg(long, value_name = "PIXELS", default_value = "360")]
    pub height: u32,

    /// Seed for noise and tick timing (random when omitted)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Shortest gap between simulated ticks (milliseconds)
    #[arg(long, value_name = "MS", default_value = "400")]
    pub min_tick_ms: u64,

    /// Random extra delay added to each tick gap (milliseconds)
    #[arg(long, value_name = "MS", default_value = "1000")]
    pub tick_jitter_ms: u64,

    /// What the draw loop does when a frame fails
    #[arg(long, value_enum, default_value = "halt")]
    pub on_frame_error: FrameErrorPolicy,

    /// Keep running without sound when no audio device is available
    #[arg(long)]
    pub allow_silent: bool,

    /// Record offline to WAV + PNG frames instead of opening a window (duration in seconds)
    #[arg(long, value_name = "SECONDS")]
    pub record: Option<f32>,

    /// Output directory for recordings
    #[arg(long, value_name = "DIR", default_value = "recording")]
    pub output_dir: String,

    /// Recording frame rate
    #[arg(long, value_name = "FPS", default_value = "60")]
    pub fps: u32,
}

impl Args {
    /// Engine configuration with command-line overrides applied
    pub fn engine_config(&self) -> EngineConfig {
        let mut config = EngineConfig {
            voice_count: self.voices,
            noise_seed: self.seed,
            frame_error_policy: self.on_frame_error,
            ..EngineConfig::default()
        };
        config.analyser.fft_size = self.fft_size;
        config.analyser.smoothing = self.smoothing;
        config.filter.cutoff_hz = self.cutoff;
        config.filter.q_db = self.q;
        config.surface.width = self.width;
        config.surface.height = self.height;
        config
    }

    pub fn ticker_config(&self) -> TickerConfig {
        TickerConfig {
            min_interval_ms: self.min_tick_ms,
            jitter_ms: self.tick_jitter_ms,
            seed: self.seed,
        }
    }

    /// Recording configuration if recording mode is enabled
    pub fn recording_config(&self) -> Option<RecordingConfig> {
        self.record.map(|duration| RecordingConfig {
            output_dir: self.output_dir.clone(),
            fps: self.fps,
            ..RecordingConfig::new(duration)
        })
    }
}
