//! Procedural audio: noise-excited percussive voices, a shared lowpass,
//! and a spectrum analyser feeding the visualization.

mod analyser;
mod backend;
mod clock;
mod engine;
mod envelope;
mod filter;
mod graph;
mod noise;
mod param;
mod voice_pool;

// Re-export public types
pub use analyser::{blackman_window, Analyser};
pub use backend::BackendKind;
pub use clock::AudioClock;
pub use engine::{BeatTrigger, ProceduralAudioEngine};
pub use envelope::Envelope;
pub use filter::BiquadLowpass;
pub use graph::{SharedAnalyser, SignalGraph};
pub use noise::{generate as generate_noise, NoiseSource};
pub use param::{AutomationParam, RampPoint};
pub use voice_pool::VoicePool;
