//! Automated control value with a bounded linear-ramp schedule.

use crate::params::ENVELOPE_POINTS;

/// One scheduled target: reach `value` at absolute audio time `time`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RampPoint {
    pub time: f64,
    pub value: f32,
}

/// Control value moved by linear ramps between scheduled points.
///
/// Before the first point the base value holds; between points the value is
/// interpolated linearly; after the last point it holds the last value.
#[derive(Debug, Clone)]
pub struct AutomationParam {
    base: f32,
    points: Vec<RampPoint>,
}

impl AutomationParam {
    pub fn new(initial: f32) -> Self {
        Self {
            base: initial,
            points: Vec::with_capacity(ENVELOPE_POINTS),
        }
    }

    /// Drop every pending point, holding the value reached at `now`
    pub fn clear(&mut self, now: f64) {
        self.base = self.value_at(now);
        self.points.clear();
    }

    /// Append a ramp ending at `value` at `time`.
    ///
    /// Points must be appended in time order; an earlier time is clamped to
    /// the previous point so the schedule stays monotonic.
    pub fn linear_ramp_to(&mut self, value: f32, time: f64) {
        let time = match self.points.last() {
            Some(last) => time.max(last.time),
            None => time,
        };
        self.points.push(RampPoint { time, value });
    }

    /// Value at audio time `t`, without touching the schedule
    pub fn value_at(&self, t: f64) -> f32 {
        let Some(first) = self.points.first() else {
            return self.base;
        };
        if t < first.time {
            return self.base;
        }

        for pair in self.points.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if t < b.time {
                let span = b.time - a.time;
                if span <= 0.0 {
                    return b.value;
                }
                let frac = (t - a.time) / span;
                return (a.value as f64 + (b.value - a.value) as f64 * frac) as f32;
            }
        }

        self.points[self.points.len() - 1].value
    }

    /// Value at `t`; a schedule whose last point has passed collapses into the base value
    pub fn tick(&mut self, t: f64) -> f32 {
        let value = self.value_at(t);
        if let Some(last) = self.points.last() {
            if t >= last.time {
                self.base = last.value;
                self.points.clear();
            }
        }
        value
    }

    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    pub fn points(&self) -> &[RampPoint] {
        &self.points
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_holds_base_without_points() {
        let param = AutomationParam::new(0.25);
        assert_eq!(param.value_at(0.0), 0.25);
        assert_eq!(param.value_at(100.0), 0.25);
    }

    #[test]
    fn test_linear_interpolation_between_points() {
        let mut param = AutomationParam::new(0.0);
        param.linear_ramp_to(0.0, 1.0);
        param.linear_ramp_to(1.0, 2.0);

        assert_eq!(param.value_at(0.5), 0.0);
        assert!((param.value_at(1.5) - 0.5).abs() < 1e-6);
        assert_eq!(param.value_at(3.0), 1.0);
    }

    #[test]
    fn test_tick_collapses_finished_schedule() {
        let mut param = AutomationParam::new(0.0);
        param.linear_ramp_to(0.8, 0.0);
        param.linear_ramp_to(0.2, 0.1);

        assert_eq!(param.point_count(), 2);
        param.tick(0.05);
        assert_eq!(param.point_count(), 2);

        assert!((param.tick(0.2) - 0.2).abs() < 1e-6);
        assert_eq!(param.point_count(), 0);
        assert!((param.value_at(5.0) - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_clear_keeps_current_value() {
        let mut param = AutomationParam::new(0.0);
        param.linear_ramp_to(0.0, 0.0);
        param.linear_ramp_to(1.0, 1.0);

        param.clear(0.5);
        assert_eq!(param.point_count(), 0);
        assert!((param.value_at(0.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_out_of_order_time_is_clamped() {
        let mut param = AutomationParam::new(0.0);
        param.linear_ramp_to(1.0, 2.0);
        param.linear_ramp_to(0.0, 1.0);
        assert_eq!(param.points()[1].time, 2.0);
    }
}
