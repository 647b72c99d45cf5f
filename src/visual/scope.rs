//! Per-frame visualization state: the analyser buffers and where they are drawn.

use std::sync::PoisonError;

use super::canvas::CanvasRegistry;
use super::spectrum::draw_spectrum;
use crate::audio::SharedAnalyser;
use crate::error::DrawError;
use crate::params::{AnalyserTuning, SurfaceConfig};

/// Owns the frequency and time-domain byte buffers refreshed every frame.
///
/// Both buffers are sized to the analyser bin count at construction and are
/// only ever overwritten in place.
pub struct SpectrumScope {
    analyser: SharedAnalyser,
    tuning: AnalyserTuning,
    frequencies: Vec<u8>,
    time_domain: Vec<u8>,
    surfaces: CanvasRegistry,
    surface: SurfaceConfig,
    frames: u64,
}

/// Copies of the scope buffers taken between frames
#[derive(Debug, Clone, PartialEq)]
pub struct ScopeSnapshot {
    pub frequencies: Vec<u8>,
    pub time_domain: Vec<u8>,
    pub frames: u64,
}

impl SpectrumScope {
    pub fn new(
        analyser: SharedAnalyser,
        tuning: AnalyserTuning,
        surfaces: CanvasRegistry,
        surface: SurfaceConfig,
    ) -> Self {
        let bin_count = analyser
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .bin_count();
        Self {
            analyser,
            tuning,
            frequencies: vec![0; bin_count],
            time_domain: vec![0; bin_count],
            surfaces,
            surface,
            frames: 0,
        }
    }

    /// Settings applied to the analyser at the start of the next frame
    pub fn set_tuning(&mut self, tuning: AnalyserTuning) {
        self.tuning = tuning;
    }

    /// One frame: pull analyser data into the buffers, then paint the surface
    pub fn draw(&mut self) -> Result<(), DrawError> {
        {
            let mut analyser = self.analyser.lock().unwrap_or_else(PoisonError::into_inner);
            analyser.apply_tuning(self.tuning);
            analyser.get_byte_frequency_data(&mut self.frequencies);
            analyser.get_byte_time_domain_data(&mut self.time_domain);
        }
        self.frames += 1;

        let SurfaceConfig {
            surface_id,
            width,
            height,
            background,
        } = &self.surface;
        let frequencies = &self.frequencies;
        let time_domain = &self.time_domain;

        self.surfaces
            .with_canvas(surface_id, |canvas| {
                canvas.reset(*width, *height, *background);
                draw_spectrum(canvas, frequencies, time_domain);
            })
            .ok_or_else(|| DrawError::SurfaceMissing {
                id: surface_id.clone(),
            })
    }

    pub fn bin_count(&self) -> usize {
        self.frequencies.len()
    }

    pub fn frequencies(&self) -> &[u8] {
        &self.frequencies
    }

    pub fn time_domain(&self) -> &[u8] {
        &self.time_domain
    }

    pub fn snapshot(&self) -> ScopeSnapshot {
        ScopeSnapshot {
            frequencies: self.frequencies.clone(),
            time_domain: self.time_domain.clone(),
            frames: self.frames,
        }
    }
}
