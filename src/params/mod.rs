//! Parameter definitions with physical units and documented semantics.
//!
//! All tunable constants live here with:
//! - Physical units (seconds, Hz, dB, pixels)
//! - Documented defaults
//! - Validation returning typed errors

mod audio;
mod render;
mod ticker;

// Re-export all types
pub use audio::{
    AnalyserConfig, AnalyserTuning, EngineConfig, EnvelopeShape, FilterConfig, RampStep,
    ENVELOPE_POINTS,
};
pub use render::{FrameErrorPolicy, RecordingConfig, SurfaceConfig};
pub use ticker::TickerConfig;
