//! Spectrum and waveform analyser over the most recent output samples.
//!
//! Mirrors the byte-oriented analyser found in browsers: a Blackman-windowed
//! FFT over the last `fft_size` samples, exponential smoothing between
//! frames, and a decibel range mapped onto 0..=255.

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::f32::consts::PI;
use std::sync::Arc;

use crate::params::{AnalyserConfig, AnalyserTuning};

pub struct Analyser {
    fft_size: usize,
    tuning: AnalyserTuning,

    /// Ring buffer of the last `fft_size` samples
    history: Vec<f32>,
    write_pos: usize,

    window: Vec<f32>,
    fft: Arc<dyn Fft<f32>>,
    spectrum: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,

    /// Smoothed linear magnitudes, one per bin
    smoothed: Vec<f32>,
}

impl Analyser {
    /// Build an analyser; `config` is expected to be validated already
    pub fn new(config: &AnalyserConfig) -> Self {
        let fft_size = config.fft_size;
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(fft_size);
        let scratch = vec![Complex::new(0.0, 0.0); fft.get_inplace_scratch_len()];

        Self {
            fft_size,
            tuning: config.tuning(),
            history: vec![0.0; fft_size],
            write_pos: 0,
            window: (0..fft_size).map(|i| blackman_window(i, fft_size)).collect(),
            fft,
            spectrum: vec![Complex::new(0.0, 0.0); fft_size],
            scratch,
            smoothed: vec![0.0; fft_size / 2],
        }
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    pub fn bin_count(&self) -> usize {
        self.fft_size / 2
    }

    pub fn tuning(&self) -> AnalyserTuning {
        self.tuning
    }

    pub fn apply_tuning(&mut self, tuning: AnalyserTuning) {
        self.tuning = tuning;
    }

    /// Append output samples, keeping only the newest `fft_size`
    pub fn push_samples(&mut self, samples: &[f32]) {
        let skip = samples.len().saturating_sub(self.fft_size);
        for &sample in &samples[skip..] {
            self.history[self.write_pos] = sample;
            self.write_pos = (self.write_pos + 1) % self.fft_size;
        }
    }

    /// The i-th sample of the current window, oldest first
    fn windowed_sample(&self, i: usize) -> f32 {
        self.history[(self.write_pos + i) % self.fft_size]
    }

    /// Run the FFT over the current window and fold it into the smoothed magnitudes
    fn update_spectrum(&mut self) {
        for i in 0..self.fft_size {
            self.spectrum[i] = Complex::new(self.windowed_sample(i) * self.window[i], 0.0);
        }
        self.fft
            .process_with_scratch(&mut self.spectrum, &mut self.scratch);

        let tau = self.tuning.smoothing;
        let scale = 1.0 / self.fft_size as f32;
        for (bin, smoothed) in self.smoothed.iter_mut().enumerate() {
            let magnitude = self.spectrum[bin].norm() * scale;
            let next = tau * *smoothed + (1.0 - tau) * magnitude;
            *smoothed = if next.is_finite() { next } else { 0.0 };
        }
    }

    /// Smoothed spectrum with the decibel range mapped onto 0..=255
    pub fn get_byte_frequency_data(&mut self, out: &mut [u8]) {
        self.update_spectrum();
        let min = self.tuning.min_decibels;
        let range = self.tuning.max_decibels - min;
        for (dst, magnitude) in out.iter_mut().zip(&self.smoothed) {
            let db = linear_to_db(*magnitude);
            let scaled = (255.0 / range * (db - min)).floor();
            *dst = scaled.clamp(0.0, 255.0) as u8;
        }
    }

    /// First `out.len()` samples of the current window as bytes (128 = silence)
    pub fn get_byte_time_domain_data(&self, out: &mut [u8]) {
        let len = out.len().min(self.fft_size);
        for (i, dst) in out.iter_mut().take(len).enumerate() {
            let scaled = (128.0 * (1.0 + self.windowed_sample(i))).floor();
            *dst = scaled.clamp(0.0, 255.0) as u8;
        }
    }
}

fn linear_to_db(value: f32) -> f32 {
    if value > 0.0 {
        20.0 * value.log10()
    } else {
        f32::NEG_INFINITY
    }
}

/// Blackman window (alpha = 0.16)
pub fn blackman_window(index: usize, size: usize) -> f32 {
    let x = index as f32 / size as f32;
    0.42 - 0.5 * (2.0 * PI * x).cos() + 0.08 * (4.0 * PI * x).cos()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(smoothing: f32) -> AnalyserConfig {
        AnalyserConfig {
            smoothing,
            ..AnalyserConfig::default()
        }
    }

    fn sine_at_bin(bin: usize, fft_size: usize) -> Vec<f32> {
        (0..fft_size)
            .map(|i| (2.0 * PI * bin as f32 * i as f32 / fft_size as f32).sin())
            .collect()
    }

    #[test]
    fn test_silence_maps_to_floor_and_midline() {
        let mut analyser = Analyser::new(&config(0.8));
        let mut freqs = vec![7u8; analyser.bin_count()];
        let mut times = vec![7u8; analyser.bin_count()];

        analyser.get_byte_frequency_data(&mut freqs);
        analyser.get_byte_time_domain_data(&mut times);

        assert!(freqs.iter().all(|v| *v == 0));
        assert!(times.iter().all(|v| *v == 128));
    }

    #[test]
    fn test_sine_peaks_at_its_bin() {
        let mut analyser = Analyser::new(&config(0.0));
        analyser.push_samples(&sine_at_bin(100, 2048));

        let mut freqs = vec![0u8; analyser.bin_count()];
        analyser.get_byte_frequency_data(&mut freqs);

        let (peak_bin, peak) = freqs
            .iter()
            .enumerate()
            .max_by_key(|(_, v)| **v)
            .map(|(i, v)| (i, *v))
            .unwrap();
        assert_eq!(peak_bin, 100);

        // Blackman coherent gain 0.42, half the energy in the positive bin
        let db = 20.0 * 0.21f32.log10();
        let expected = (255.0 / 140.0 * (db + 140.0)).floor() as i32;
        assert!((peak as i32 - expected).abs() <= 1);
    }

    #[test]
    fn test_smoothing_blends_frames() {
        let mut smooth = Analyser::new(&config(0.8));
        let mut sharp = Analyser::new(&config(0.0));
        let sine = sine_at_bin(64, 2048);
        smooth.push_samples(&sine);
        sharp.push_samples(&sine);

        let mut a = vec![0u8; 1024];
        let mut b = vec![0u8; 1024];
        smooth.get_byte_frequency_data(&mut a);
        sharp.get_byte_frequency_data(&mut b);
        assert!(a[64] < b[64]);

        // Repeated frames converge on the unsmoothed level
        for _ in 0..60 {
            smooth.get_byte_frequency_data(&mut a);
        }
        assert!((a[64] as i32 - b[64] as i32).abs() <= 1);
    }

    #[test]
    fn test_history_keeps_newest_window() {
        let mut analyser = Analyser::new(&AnalyserConfig {
            fft_size: 32,
            ..AnalyserConfig::default()
        });
        let ramp: Vec<f32> = (0..48).map(|i| i as f32 / 64.0).collect();
        analyser.push_samples(&ramp[..20]);
        analyser.push_samples(&ramp[20..]);

        let mut times = vec![0u8; 16];
        analyser.get_byte_time_domain_data(&mut times);
        // Window holds samples 16..48; first byte is sample 16
        assert_eq!(times[0], (128.0 * (1.0 + 16.0 / 64.0)) as u8);
        assert_eq!(times[15], (128.0 * (1.0 + 31.0 / 64.0)) as u8);
    }

    #[test]
    fn test_time_domain_clamps() {
        let mut analyser = Analyser::new(&AnalyserConfig {
            fft_size: 32,
            ..AnalyserConfig::default()
        });
        analyser.push_samples(&[1.0; 16]);
        analyser.push_samples(&[-1.0; 16]);

        let mut times = vec![0u8; 32];
        analyser.get_byte_time_domain_data(&mut times);
        assert_eq!(times[0], 255);
        assert_eq!(times[31], 0);
    }

    #[test]
    fn test_blackman_window_shape() {
        let size = 1024;
        assert!(blackman_window(0, size).abs() < 1e-6);
        assert!((blackman_window(size / 2, size) - 1.0).abs() < 1e-6);
    }
}
