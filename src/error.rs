//! Error kinds for configuration, engine construction, drawing and output.

use thiserror::Error;

/// Invalid configuration values, caught before anything is built.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("voice count must be at least 1")]
    NoVoices,

    #[error("FFT size must be a power of two in 32..=32768, got {0}")]
    FftSize(usize),

    #[error("smoothing constant must be in [0, 1], got {0}")]
    Smoothing(f32),

    #[error("min decibels ({min}) must be below max decibels ({max})")]
    DecibelRange { min: f32, max: f32 },

    #[error("sample rate must be > 0")]
    SampleRate,

    #[error("noise duration must be positive and finite, got {0} s")]
    NoiseDuration(f32),

    #[error("filter cutoff must be in (0, {nyquist}) Hz, got {cutoff}")]
    FilterCutoff { cutoff: f32, nyquist: f32 },

    #[error("envelope ramp offsets must be finite, non-negative and non-decreasing")]
    RampOrder,

    #[error("surface dimensions must be in 1..={max} pixels, got {width}x{height}")]
    SurfaceSize { width: u32, height: u32, max: u32 },

    #[error("frame rate must be > 0")]
    FrameRate,

    #[error("frame rate {fps} exceeds sample rate {sample_rate}")]
    FrameRateAboveSampleRate { fps: u32, sample_rate: u32 },

    #[error("recording duration must be finite and non-negative, got {0} s")]
    RecordingDuration(f32),

    #[error("output limit must be finite and > 0, got {0}")]
    OutputLimit(f32),

    #[error("master gain must be finite, got {0}")]
    MasterGain(f32),
}

/// Failures while building or driving the audio engine.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("no audio output device available")]
    AudioUnavailable,

    #[error("audio device error: {0}")]
    Device(String),

    #[error("unsupported device sample format {0}, only f32 output is supported")]
    UnsupportedSampleFormat(String),

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("offline rendering requires the offline backend")]
    NotOffline,
}

/// Failures inside a single frame of the draw cycle.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DrawError {
    #[error("drawing surface '{id}' is not registered")]
    SurfaceMissing { id: String },
}

/// Window and GPU presentation failures.
#[derive(Debug, Error)]
pub enum PresentError {
    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("failed to find suitable GPU adapter")]
    NoAdapter,

    #[error("failed to request device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
}

/// Failures while recording an offline run to disk.
#[derive(Debug, Error)]
pub enum RecordingError {
    #[error("invalid recording configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to write frame: {0}")]
    Image(#[from] image::ImageError),

    #[error("failed to write audio: {0}")]
    Wav(#[from] hound::Error),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Draw(#[from] DrawError),
}
