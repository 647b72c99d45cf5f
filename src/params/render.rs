//! Drawing surface, frame loop and recording configuration.

use crate::error::ConfigError;
use crate::visual::Rgba;

/// Largest surface edge (pixels), the default wgpu 2D texture limit
pub const MAX_SURFACE_DIM: u32 = 8192;

/// Drawing surface the draw cycle renders into
#[derive(Debug, Clone)]
pub struct SurfaceConfig {
    /// Registry id of the canvas the engine draws into
    pub surface_id: String,

    /// Surface width (pixels)
    /// Default: 640
    pub width: u32,

    /// Surface height (pixels)
    /// Default: 360
    pub height: u32,

    /// Colour the surface is cleared to at the start of every frame
    pub background: Rgba,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            surface_id: "procedural-canvas".to_string(),
            width: 640,
            height: 360,
            background: Rgba::BLACK,
        }
    }
}

impl SurfaceConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let valid = 1..=MAX_SURFACE_DIM;
        if !valid.contains(&self.width) || !valid.contains(&self.height) {
            return Err(ConfigError::SurfaceSize {
                width: self.width,
                height: self.height,
                max: MAX_SURFACE_DIM,
            });
        }
        Ok(())
    }
}

/// Draw cycle behaviour after a frame fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum FrameErrorPolicy {
    /// Log the error and stop the loop, reporting the halt
    #[default]
    Halt,

    /// Log the error, drop the frame and keep going
    Skip,
}

/// Recording mode configuration
#[derive(Debug, Clone)]
pub struct RecordingConfig {
    /// Duration to record (seconds)
    pub duration_secs: f32,

    /// Output directory for frames and audio
    pub output_dir: String,

    /// Frame rate (FPS)
    pub fps: u32,

    /// Offline render sample rate (Hz)
    pub sample_rate: u32,
}

impl RecordingConfig {
    pub fn new(duration_secs: f32) -> Self {
        Self {
            duration_secs,
            output_dir: "recording".to_string(),
            fps: 60,
            sample_rate: 44100,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.duration_secs.is_finite() && self.duration_secs >= 0.0) {
            return Err(ConfigError::RecordingDuration(self.duration_secs));
        }
        if self.fps == 0 {
            return Err(ConfigError::FrameRate);
        }
        if self.sample_rate == 0 {
            return Err(ConfigError::SampleRate);
        }
        if self.sample_rate < self.fps {
            return Err(ConfigError::FrameRateAboveSampleRate {
                fps: self.fps,
                sample_rate: self.sample_rate,
            });
        }
        Ok(())
    }

    /// Total number of frames to capture
    pub fn total_frames(&self) -> usize {
        (self.duration_secs * self.fps as f32).ceil() as usize
    }

    /// Audio samples rendered before `frame` is drawn.
    ///
    /// Frame boundaries fall on `frame * sample_rate / fps` rounded down, so
    /// uneven rates spread the remainder instead of drifting.
    pub fn samples_for_frame(&self, frame: usize) -> usize {
        self.frame_start(frame + 1) - self.frame_start(frame)
    }

    /// Longest block `samples_for_frame` ever returns
    pub fn max_samples_per_frame(&self) -> usize {
        self.sample_rate.div_ceil(self.fps) as usize
    }

    fn frame_start(&self, frame: usize) -> usize {
        (frame as u64 * self.sample_rate as u64 / self.fps as u64) as usize
    }

    /// Frame directory path
    pub fn frames_dir(&self) -> String {
        format!("{}/frames", self.output_dir)
    }

    /// Audio file path
    pub fn audio_path(&self) -> String {
        format!("{}/audio.wav", self.output_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_frame_math() {
        let config = RecordingConfig::new(2.5);
        assert_eq!(config.total_frames(), 150);
        assert_eq!(config.samples_for_frame(0), 735);
        assert_eq!(config.samples_for_frame(149), 735);
        assert_eq!(config.frames_dir(), "recording/frames");
        assert_eq!(config.audio_path(), "recording/audio.wav");
    }

    #[test]
    fn test_uneven_frame_rate_keeps_audio_length() {
        let config = RecordingConfig {
            fps: 24,
            ..RecordingConfig::new(1.0)
        };
        let blocks: Vec<usize> = (0..config.total_frames())
            .map(|frame| config.samples_for_frame(frame))
            .collect();
        assert_eq!(blocks.iter().sum::<usize>(), 44100);
        assert!(blocks.iter().all(|n| *n == 1837 || *n == 1838));
        assert_eq!(config.max_samples_per_frame(), 1838);
    }

    #[test]
    fn test_recording_validation() {
        assert!(RecordingConfig::new(1.0).validate().is_ok());

        let zero_fps = RecordingConfig {
            fps: 0,
            ..RecordingConfig::new(1.0)
        };
        assert_eq!(zero_fps.validate(), Err(ConfigError::FrameRate));

        let zero_rate = RecordingConfig {
            sample_rate: 0,
            ..RecordingConfig::new(1.0)
        };
        assert_eq!(zero_rate.validate(), Err(ConfigError::SampleRate));

        let fast = RecordingConfig {
            fps: 120,
            sample_rate: 100,
            ..RecordingConfig::new(1.0)
        };
        assert!(matches!(
            fast.validate(),
            Err(ConfigError::FrameRateAboveSampleRate { .. })
        ));

        assert!(RecordingConfig::new(-1.0).validate().is_err());
        assert!(RecordingConfig::new(f32::NAN).validate().is_err());
    }

    #[test]
    fn test_surface_size_validation() {
        let mut surface = SurfaceConfig::default();
        assert!(surface.validate().is_ok());

        surface.height = 0;
        assert!(surface.validate().is_err());

        // Pixel count would overflow u32 arithmetic
        surface.width = 100_000;
        surface.height = 100_000;
        assert!(matches!(
            surface.validate(),
            Err(ConfigError::SurfaceSize { max: MAX_SURFACE_DIM, .. })
        ));
    }
}
