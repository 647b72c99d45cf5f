//! White noise excitation shared by every voice.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Looping player over an immutable buffer of uniform white noise
#[derive(Debug, Clone)]
pub struct NoiseSource {
    samples: Vec<f32>,
    position: usize,
}

impl NoiseSource {
    /// Generate a buffer and start looping it from the beginning
    ///
    /// `seed` makes the buffer reproducible; None draws entropy from the OS.
    pub fn new(duration_s: f32, sample_rate: u32, seed: Option<u64>) -> Self {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            samples: generate(duration_s, sample_rate, &mut rng),
            position: 0,
        }
    }

    /// Next sample, wrapping to the start without a gap
    pub fn next_sample(&mut self) -> f32 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let sample = self.samples[self.position];
        self.position = (self.position + 1) % self.samples.len();
        sample
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// `duration_s * sample_rate` independent samples, uniform over [-1, 1)
pub fn generate<R: Rng + ?Sized>(duration_s: f32, sample_rate: u32, rng: &mut R) -> Vec<f32> {
    let length = (duration_s as f64 * sample_rate as f64).round() as usize;
    // random::<f32>() is in [0, 1) on a 2^-24 grid, so the affine map stays exact and below 1
    (0..length).map(|_| rng.random::<f32>() * 2.0 - 1.0).collect()
}
