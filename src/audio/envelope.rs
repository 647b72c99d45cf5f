//! Percussive gain envelope with a fixed ramp shape.

use super::param::AutomationParam;
use crate::params::EnvelopeShape;

/// Amplitude controller for one voice.
///
/// Starts silent. Each trigger replaces whatever is still pending with a
/// fresh copy of the shape anchored at the trigger time, so at most one
/// schedule is ever active.
#[derive(Debug, Clone)]
pub struct Envelope {
    gain: AutomationParam,
    shape: EnvelopeShape,
    triggers: u64,
}

impl Envelope {
    pub fn new(shape: EnvelopeShape) -> Self {
        Self {
            gain: AutomationParam::new(0.0),
            shape,
            triggers: 0,
        }
    }

    /// Schedule the ramp shape starting at `now`; a no-op when there is no audio clock
    pub fn trigger(&mut self, now: Option<f64>) {
        let Some(now) = now else {
            return;
        };

        self.gain.clear(now);
        for step in &self.shape.steps {
            self.gain.linear_ramp_to(step.level, now + step.offset_s);
        }
        self.triggers += 1;
    }

    /// Gain at audio time `t`, advancing the schedule
    pub fn gain_at(&mut self, t: f64) -> f32 {
        self.gain.tick(t)
    }

    /// Gain at audio time `t`, without advancing the schedule
    pub fn peek(&self, t: f64) -> f32 {
        self.gain.value_at(t)
    }

    /// Pending ramp control points
    pub fn point_count(&self) -> usize {
        self.gain.point_count()
    }

    /// Schedules actually placed (triggers without a clock are not counted)
    pub fn trigger_count(&self) -> u64 {
        self.triggers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ENVELOPE_POINTS;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_silent_until_triggered() {
        let mut env = Envelope::new(EnvelopeShape::default());
        assert_eq!(env.gain_at(0.0), 0.0);
        assert_eq!(env.gain_at(1.0), 0.0);
        assert_eq!(env.point_count(), 0);
    }

    #[test]
    fn test_ramp_shape() {
        let mut env = Envelope::new(EnvelopeShape::default());
        env.trigger(Some(2.0));

        assert!(approx(env.peek(2.0), 0.0));
        assert!(approx(env.peek(2.001), 1.0));
        // Halfway through the decay ramp: 1.0 -> 0.3
        assert!(approx(env.peek(2.051), 0.65));
        assert!(approx(env.peek(2.101), 0.3));
        // Halfway through the release ramp: 0.3 -> 0.0
        assert!(approx(env.peek(2.3005), 0.15));
        assert!(approx(env.peek(2.5), 0.0));
        assert!(approx(env.peek(9.0), 0.0));
    }

    #[test]
    fn test_retrigger_never_stacks_points() {
        let mut env = Envelope::new(EnvelopeShape::default());
        let mut t = 0.0;
        for _ in 0..50 {
            env.trigger(Some(t));
            assert!(env.point_count() <= ENVELOPE_POINTS);
            env.gain_at(t + 0.02);
            t += 0.03; // well inside the 500 ms ramp
        }
        assert_eq!(env.point_count(), ENVELOPE_POINTS);
        assert_eq!(env.trigger_count(), 50);
    }

    #[test]
    fn test_retrigger_restarts_from_now() {
        let mut env = Envelope::new(EnvelopeShape::default());
        env.trigger(Some(0.0));
        env.trigger(Some(0.2));

        // New attack peak is one millisecond after the second trigger
        assert!(approx(env.peek(0.201), 1.0));
        assert!(approx(env.peek(0.7), 0.0));
    }

    #[test]
    fn test_trigger_without_clock_is_noop() {
        let mut env = Envelope::new(EnvelopeShape::default());
        env.trigger(None);
        assert_eq!(env.point_count(), 0);
        assert_eq!(env.trigger_count(), 0);
    }

    #[test]
    fn test_schedule_drains_after_release() {
        let mut env = Envelope::new(EnvelopeShape::default());
        env.trigger(Some(0.0));
        env.gain_at(0.6);
        assert_eq!(env.point_count(), 0);
        assert_eq!(env.gain_at(0.7), 0.0);
    }
}
