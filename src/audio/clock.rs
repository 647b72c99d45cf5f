//! Sample-counting audio clock.

/// Audio time derived from the number of frames rendered so far
#[derive(Debug, Clone)]
pub struct AudioClock {
    sample_rate: u32,
    frames: u64,
    running: bool,
}

impl AudioClock {
    /// Create a stopped clock at the given sample rate
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            frames: 0,
            running: false,
        }
    }

    /// Mark the clock as driven by an output (device stream or offline pull)
    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Current audio time in seconds, or None while nothing drives the clock
    pub fn now(&self) -> Option<f64> {
        self.running.then(|| self.time_of(0))
    }

    /// Time of the frame `offset` frames after the current position
    pub fn time_of(&self, offset: usize) -> f64 {
        (self.frames + offset as u64) as f64 / self.sample_rate as f64
    }

    pub fn advance(&mut self, frames: usize) {
        self.frames += frames as u64;
    }
}
