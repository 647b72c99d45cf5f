//! Lowpass biquad shared by all voices.
//!
//! Coefficients follow the Audio EQ Cookbook with the resonance expressed in
//! dB, matching a Web-Audio `lowpass` BiquadFilterNode.

use std::f32::consts::PI;

#[derive(Debug, Clone)]
pub struct BiquadLowpass {
    b0: f32,
    b1: f32,
    b2: f32,
    a1: f32,
    a2: f32,
    z1: f32,
    z2: f32,
}

impl BiquadLowpass {
    pub fn new(cutoff_hz: f32, q_db: f32, sample_rate: u32) -> Self {
        let w0 = 2.0 * PI * cutoff_hz / sample_rate as f32;
        let q = 10f32.powf(q_db / 20.0);
        let alpha = w0.sin() / (2.0 * q);
        let cos_w0 = w0.cos();

        let a0 = 1.0 + alpha;
        let b1 = (1.0 - cos_w0) / a0;
        Self {
            b0: b1 / 2.0,
            b1,
            b2: b1 / 2.0,
            a1: -2.0 * cos_w0 / a0,
            a2: (1.0 - alpha) / a0,
            z1: 0.0,
            z2: 0.0,
        }
    }

    /// Filter one sample (transposed direct form II)
    pub fn process(&mut self, x: f32) -> f32 {
        let y = self.b0 * x + self.z1;
        self.z1 = self.b1 * x - self.a1 * y + self.z2;
        self.z2 = self.b2 * x - self.a2 * y;
        y
    }

    pub fn reset(&mut self) {
        self.z1 = 0.0;
        self.z2 = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn steady_state_gain(filter: &mut BiquadLowpass, freq_hz: f32, sample_rate: u32) -> f32 {
        let n = sample_rate as usize;
        let mut peak = 0.0f32;
        for i in 0..n {
            let x = (2.0 * PI * freq_hz * i as f32 / sample_rate as f32).sin();
            let y = filter.process(x);
            if i > n / 2 {
                peak = peak.max(y.abs());
            }
        }
        peak
    }

    #[test]
    fn test_dc_passes_at_unity() {
        let mut filter = BiquadLowpass::new(800.0, 1.0, 44100);
        let mut y = 0.0;
        for _ in 0..10000 {
            y = filter.process(1.0);
        }
        assert!((y - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_high_frequencies_attenuated() {
        let mut low = BiquadLowpass::new(800.0, 1.0, 44100);
        let mut high = BiquadLowpass::new(800.0, 1.0, 44100);

        let pass = steady_state_gain(&mut low, 100.0, 44100);
        let stop = steady_state_gain(&mut high, 8000.0, 44100);

        assert!(pass > 0.9);
        assert!(stop < 0.05);
    }

    #[test]
    fn test_reset_clears_state() {
        let mut filter = BiquadLowpass::new(800.0, 1.0, 44100);
        filter.process(1.0);
        filter.reset();
        assert_eq!(filter.process(0.0), 0.0);
    }
}
