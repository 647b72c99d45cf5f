//! Output backend selection.
//!
//! The backend is chosen once at engine construction. A live device that
//! cannot be opened is reported as an error instead of yielding a graph
//! nobody listens to.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::{Arc, Mutex, PoisonError};

use super::graph::SignalGraph;
use crate::error::EngineError;

/// Where rendered audio goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Default output device of the default host
    Device,

    /// No device; the caller pulls samples explicitly
    Offline { sample_rate: u32 },

    /// No device and no clock: triggers only move the cursor, draw shows flat data
    Silent { sample_rate: u32 },
}

/// Device chosen for the live backend, before the graph exists
pub struct DeviceProbe {
    device: cpal::Device,
    config: cpal::SupportedStreamConfig,
}

impl DeviceProbe {
    /// Find the default output device and check it accepts f32 samples
    pub fn open_default() -> Result<Self, EngineError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(EngineError::AudioUnavailable)?;

        let config = device
            .default_output_config()
            .map_err(|e| EngineError::Device(format!("failed to get output config: {}", e)))?;

        if config.sample_format() != cpal::SampleFormat::F32 {
            return Err(EngineError::UnsupportedSampleFormat(
                config.sample_format().to_string(),
            ));
        }

        log::info!(
            "Audio: {} @ {}Hz, {} channel(s)",
            device.name().unwrap_or_else(|_| "Unknown".to_string()),
            config.sample_rate().0,
            config.channels()
        );

        Ok(Self { device, config })
    }

    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate().0
    }

    /// Build and start the output stream pulling from `graph`
    pub fn play(
        self,
        graph: Arc<Mutex<SignalGraph>>,
        output_limit: f32,
    ) -> Result<cpal::Stream, EngineError> {
        let channels = usize::from(self.config.channels()).max(1);
        let stream_config: cpal::StreamConfig = self.config.into();
        let mut mono: Vec<f32> = Vec::new();

        graph
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .start_clock();

        let stream = self
            .device
            .build_output_stream(
                &stream_config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    let frames = data.len() / channels;
                    if mono.len() < frames {
                        mono.resize(frames, 0.0);
                    }

                    graph
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .render(&mut mono[..frames]);

                    for (frame, sample) in data.chunks_mut(channels).zip(&mono) {
                        frame.fill(sample.clamp(-output_limit, output_limit));
                    }
                },
                |err| log::error!("Audio stream error: {}", err),
                None,
            )
            .map_err(|e| EngineError::Device(format!("failed to build audio stream: {}", e)))?;

        stream
            .play()
            .map_err(|e| EngineError::Device(format!("failed to start audio stream: {}", e)))?;

        Ok(stream)
    }
}

/// Live resources kept alive for as long as the engine runs
pub enum AudioOutput {
    Device { _stream: cpal::Stream },
    Offline,
    Silent,
}

impl AudioOutput {
    pub fn is_offline(&self) -> bool {
        matches!(self, AudioOutput::Offline)
    }

    pub fn label(&self) -> &'static str {
        match self {
            AudioOutput::Device { .. } => "device",
            AudioOutput::Offline => "offline",
            AudioOutput::Silent => "silent",
        }
    }
}
