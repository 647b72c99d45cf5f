//! Audio engine configuration: voices, noise, filter, envelope and analyser.

use crate::error::ConfigError;
use crate::params::render::{FrameErrorPolicy, SurfaceConfig};

/// Number of control points in one envelope schedule
pub const ENVELOPE_POINTS: usize = 4;

/// Complete configuration for the procedural audio engine
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Number of envelopes in the round-robin pool
    /// Default: 10
    pub voice_count: usize,

    /// Length of the looped noise buffer (seconds)
    /// Default: 5.0
    pub noise_duration_s: f32,

    /// Seed for the noise buffer (None = seeded from the OS)
    pub noise_seed: Option<u64>,

    /// Master gain after the shared filter (linear)
    /// Default: 1.0 (unity)
    pub master_gain: f32,

    /// Hard clip applied to device output after the analyser tap
    /// Default: 1.0
    pub output_limit: f32,

    pub analyser: AnalyserConfig,
    pub filter: FilterConfig,
    pub envelope: EnvelopeShape,
    pub surface: SurfaceConfig,

    /// Draw cycle rate (Hz), stands in for the display refresh
    /// Default: 60
    pub frame_rate_hz: u32,

    /// What the draw cycle does after a failed frame
    pub frame_error_policy: FrameErrorPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            voice_count: 10,
            noise_duration_s: 5.0,
            noise_seed: None,
            master_gain: 1.0,
            output_limit: 1.0,
            analyser: AnalyserConfig::default(),
            filter: FilterConfig::default(),
            envelope: EnvelopeShape::default(),
            surface: SurfaceConfig::default(),
            frame_rate_hz: 60,
            frame_error_policy: FrameErrorPolicy::Halt,
        }
    }
}

impl EngineConfig {
    /// Validate everything that does not depend on the output device
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.voice_count == 0 {
            return Err(ConfigError::NoVoices);
        }
        if !(self.noise_duration_s.is_finite() && self.noise_duration_s > 0.0) {
            return Err(ConfigError::NoiseDuration(self.noise_duration_s));
        }
        if self.frame_rate_hz == 0 {
            return Err(ConfigError::FrameRate);
        }
        if !self.master_gain.is_finite() {
            return Err(ConfigError::MasterGain(self.master_gain));
        }
        // Used as a symmetric clamp bound on every output sample
        if !(self.output_limit.is_finite() && self.output_limit > 0.0) {
            return Err(ConfigError::OutputLimit(self.output_limit));
        }
        self.analyser.validate()?;
        self.envelope.validate()?;
        self.surface.validate()
    }

    /// Validate against the sample rate the backend will run at
    pub fn validate_for(&self, sample_rate: u32) -> Result<(), ConfigError> {
        if sample_rate == 0 {
            return Err(ConfigError::SampleRate);
        }
        self.validate()?;
        self.filter.validate(sample_rate)
    }
}

/// Analyser configuration (Web-Audio style byte spectrum)
#[derive(Debug, Clone)]
pub struct AnalyserConfig {
    /// FFT window size (power of two, 32..=32768)
    /// Default: 2048 (= 1024 bins)
    pub fft_size: usize,

    /// Smoothing time constant between frames, in [0, 1]
    /// Default: 0.8
    pub smoothing: f32,

    /// Level mapped to byte 0 (dB)
    /// Default: -140
    pub min_decibels: f32,

    /// Level mapped to byte 255 (dB)
    /// Default: 0
    pub max_decibels: f32,
}

impl Default for AnalyserConfig {
    fn default() -> Self {
        Self {
            fft_size: 2048,
            smoothing: 0.8,
            min_decibels: -140.0,
            max_decibels: 0.0,
        }
    }
}

impl AnalyserConfig {
    /// Number of frequency bins (half the FFT size)
    pub fn bin_count(&self) -> usize {
        self.fft_size / 2
    }

    /// Runtime-tunable subset of this configuration
    pub fn tuning(&self) -> AnalyserTuning {
        AnalyserTuning {
            smoothing: self.smoothing,
            min_decibels: self.min_decibels,
            max_decibels: self.max_decibels,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.fft_size.is_power_of_two() || !(32..=32768).contains(&self.fft_size) {
            return Err(ConfigError::FftSize(self.fft_size));
        }
        self.tuning().validate()
    }
}

/// Analyser settings that may change while the engine runs
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalyserTuning {
    pub smoothing: f32,
    pub min_decibels: f32,
    pub max_decibels: f32,
}

impl AnalyserTuning {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.smoothing) {
            return Err(ConfigError::Smoothing(self.smoothing));
        }
        if !(self.min_decibels < self.max_decibels) {
            return Err(ConfigError::DecibelRange {
                min: self.min_decibels,
                max: self.max_decibels,
            });
        }
        Ok(())
    }
}

/// Shared lowpass filter settings
#[derive(Debug, Clone)]
pub struct FilterConfig {
    /// Cutoff frequency (Hz)
    /// Default: 800
    pub cutoff_hz: f32,

    /// Resonance at cutoff (dB), as for a Web-Audio lowpass biquad
    /// Default: 1
    pub q_db: f32,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            cutoff_hz: 800.0,
            q_db: 1.0,
        }
    }
}

impl FilterConfig {
    pub fn validate(&self, sample_rate: u32) -> Result<(), ConfigError> {
        let nyquist = sample_rate as f32 / 2.0;
        if !(self.cutoff_hz > 0.0 && self.cutoff_hz < nyquist) {
            return Err(ConfigError::FilterCutoff {
                cutoff: self.cutoff_hz,
                nyquist,
            });
        }
        Ok(())
    }
}

/// One control point of the envelope schedule, relative to the trigger time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RampStep {
    /// Offset after the trigger (seconds)
    pub offset_s: f64,

    /// Gain reached at that offset (linear)
    pub level: f32,
}

/// Fixed attack/decay/release ramp shape shared by every voice
#[derive(Debug, Clone, PartialEq)]
pub struct EnvelopeShape {
    pub steps: [RampStep; ENVELOPE_POINTS],
}

impl Default for EnvelopeShape {
    fn default() -> Self {
        Self {
            steps: [
                RampStep { offset_s: 0.0, level: 0.0 },
                RampStep { offset_s: 0.001, level: 1.0 }, // attack
                RampStep { offset_s: 0.101, level: 0.3 }, // decay
                RampStep { offset_s: 0.5, level: 0.0 },   // release
            ],
        }
    }
}

impl EnvelopeShape {
    /// Total schedule length (seconds)
    pub fn duration_s(&self) -> f64 {
        self.steps[ENVELOPE_POINTS - 1].offset_s
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut last = 0.0;
        for step in &self.steps {
            if !step.offset_s.is_finite() || step.offset_s < last {
                return Err(ConfigError::RampOrder);
            }
            last = step.offset_s;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = EngineConfig::default();
        assert!(config.validate_for(44100).is_ok());
        assert_eq!(config.analyser.bin_count(), 1024);
        assert_eq!(config.envelope.duration_s(), 0.5);
    }

    #[test]
    fn test_fft_size_must_be_power_of_two() {
        let mut config = AnalyserConfig::default();
        config.fft_size = 1000;
        assert_eq!(config.validate(), Err(ConfigError::FftSize(1000)));

        config.fft_size = 16;
        assert_eq!(config.validate(), Err(ConfigError::FftSize(16)));
    }

    #[test]
    fn test_zero_voices_rejected() {
        let config = EngineConfig {
            voice_count: 0,
            ..EngineConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::NoVoices));
    }

    #[test]
    fn test_output_limit_and_gain_rejected() {
        let config = EngineConfig {
            output_limit: -1.0,
            ..EngineConfig::default()
        };
        assert_eq!(config.validate_for(8000), Err(ConfigError::OutputLimit(-1.0)));

        let config = EngineConfig {
            output_limit: 0.0,
            ..EngineConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::OutputLimit(0.0)));

        let config = EngineConfig {
            output_limit: f32::NAN,
            ..EngineConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::OutputLimit(_))));

        let config = EngineConfig {
            master_gain: f32::INFINITY,
            ..EngineConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::MasterGain(f32::INFINITY))
        );
    }

    #[test]
    fn test_cutoff_checked_against_nyquist() {
        let config = EngineConfig::default();
        // 800 Hz is above Nyquist at 1 kHz
        assert!(matches!(
            config.validate_for(1000),
            Err(ConfigError::FilterCutoff { .. })
        ));
        assert_eq!(config.validate_for(0), Err(ConfigError::SampleRate));
    }

    #[test]
    fn test_tuning_bounds() {
        let mut tuning = AnalyserConfig::default().tuning();
        tuning.smoothing = 1.5;
        assert!(tuning.validate().is_err());

        tuning.smoothing = 0.5;
        tuning.min_decibels = 0.0;
        assert!(tuning.validate().is_err());
    }

    #[test]
    fn test_unordered_ramp_rejected() {
        let mut shape = EnvelopeShape::default();
        shape.steps[2].offset_s = 0.0005;
        assert_eq!(shape.validate(), Err(ConfigError::RampOrder));
    }
}
