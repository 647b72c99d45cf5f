//! Offline recording: deterministic render of audio and scope frames to disk.
//!
//! Beats fire on the simulated tick schedule at exact sample positions, so a
//! seeded run always produces the same WAV and the same frames.

use std::fs;
use std::time::Duration;

use crate::audio::{BackendKind, ProceduralAudioEngine};
use crate::error::{DrawError, RecordingError};
use crate::params::{EngineConfig, RecordingConfig, TickerConfig};
use crate::ticker::TickSchedule;
use crate::visual::{Canvas, CanvasRegistry};

/// What a finished recording contains
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingSummary {
    pub frames: usize,
    pub beats: u64,
    pub samples: usize,
}

/// Render `config.duration_secs` of audio and frames into `config.output_dir`
pub fn record(
    engine_config: EngineConfig,
    ticker: &TickerConfig,
    config: &RecordingConfig,
) -> Result<RecordingSummary, RecordingError> {
    config.validate()?;
    engine_config.validate()?;
    fs::create_dir_all(config.frames_dir())?;

    let surface = engine_config.surface.clone();
    let surfaces = CanvasRegistry::new();
    surfaces.register(
        surface.surface_id.clone(),
        Canvas::new(surface.width, surface.height, surface.background),
    );

    let engine = ProceduralAudioEngine::new(
        engine_config,
        BackendKind::Offline {
            sample_rate: config.sample_rate,
        },
        surfaces.clone(),
    )?;
    let limit = engine.config().output_limit;

    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: config.sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(config.audio_path(), spec)?;

    let total_frames = config.total_frames();
    let mut schedule = TickSchedule::new(ticker);
    let mut buffer = vec![0.0f32; config.max_samples_per_frame()];
    let mut position = 0usize;
    let mut next_beat = 0usize;
    let mut beats = 0u64;

    log::info!(
        "Recording {} frames at {} FPS into {}",
        total_frames,
        config.fps,
        config.output_dir
    );

    for frame in 0..total_frames {
        let block = &mut buffer[..config.samples_for_frame(frame)];
        // Split the frame's block at beat positions so each beat lands on its exact sample
        let mut offset = 0;
        while offset < block.len() {
            if position == next_beat {
                engine.beat_once();
                beats += 1;
                next_beat = position
                    .saturating_add(samples_in(schedule.next_interval(), config.sample_rate));
            }
            let end = (offset + (next_beat - position)).min(block.len());
            engine.render_offline(&mut block[offset..end])?;
            position += end - offset;
            offset = end;
        }

        for sample in block.iter() {
            writer.write_sample(sample.clamp(-limit, limit))?;
        }

        engine.draw()?;
        let frame_path = format!("{}/frame_{:05}.png", config.frames_dir(), frame);
        surfaces
            .with_canvas(&surface.surface_id, |canvas| canvas.save_png(&frame_path))
            .ok_or_else(|| DrawError::SurfaceMissing {
                id: surface.surface_id.clone(),
            })??;

        if frame % config.fps as usize == 0 {
            log::info!("Recorded {}/{} frames ({} beats)", frame, total_frames, beats);
        }
    }

    writer.finalize()?;

    let summary = RecordingSummary {
        frames: total_frames,
        beats,
        samples: position,
    };
    log::info!(
        "Recording finished: {} frames, {} beats, {} samples",
        summary.frames,
        summary.beats,
        summary.samples
    );
    Ok(summary)
}

/// Whole samples in `interval`, never zero so the render loop always advances
fn samples_in(interval: Duration, sample_rate: u32) -> usize {
    ((interval.as_secs_f64() * sample_rate as f64).round() as usize).max(1)
}
