//! The PID law shared by the path-tracking controllers.

use crate::util::Interval;
use serde::{Deserialize, Serialize};

/// Proportional, integral and derivative gains.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PidGains {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
}

impl PidGains {
    pub fn new(kp: f64, ki: f64, kd: f64) -> Self {
        Self { kp, ki, kd }
    }

    /// Proportional-only gains.
    pub fn p(kp: f64) -> Self {
        Self::new(kp, 0.0, 0.0)
    }
}

/// The default bound on the integral accumulator.
pub const DEFAULT_INTEGRAL_LIMIT: f64 = 5.0;

/// A PID law driven by error samples taken at known times.
///
/// The integral uses the trapezoidal rule and is clamped to a symmetric limit,
/// [DEFAULT_INTEGRAL_LIMIT] unless configured.
/// The derivative is a backward difference, and is zero for the first sample
/// and whenever time has not moved forward.
#[derive(Clone, Debug)]
pub struct Pid {
    gains: PidGains,
    integral_limit: f64,
    output: Interval<f64>,
    integral: f64,
    derivative: f64,
    last: Option<(f64, f64)>,
}

impl Pid {
    pub fn new(gains: PidGains) -> Self {
        Self {
            gains,
            integral_limit: DEFAULT_INTEGRAL_LIMIT,
            output: Interval::new(-1.0, 1.0),
            integral: 0.0,
            derivative: 0.0,
            last: None,
        }
    }

    /// Limits the magnitude of the integral term's accumulator.
    pub fn with_integral_limit(mut self, limit: f64) -> Self {
        self.integral_limit = limit.abs();
        self
    }

    /// Sets the range the output is clamped to. Defaults to `[-1, 1]`.
    pub fn with_output_range(mut self, output: Interval<f64>) -> Self {
        self.output = output;
        self
    }

    pub fn gains(&self) -> PidGains {
        self.gains
    }

    pub fn set_gains(&mut self, gains: PidGains) {
        self.gains = gains;
    }

    /// The most recent error sample, if any.
    pub fn error(&self) -> Option<f64> {
        self.last.map(|(_, err)| err)
    }

    pub fn integral(&self) -> f64 {
        self.integral
    }

    pub fn derivative(&self) -> f64 {
        self.derivative
    }

    /// Clears the accumulated state.
    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.derivative = 0.0;
        self.last = None;
    }

    /// Feeds the error at `time` and returns the clamped output.
    pub fn update(&mut self, error: f64, time: f64) -> f64 {
        match self.last {
            Some((last_time, last_err)) if time > last_time => {
                let dt = time - last_time;
                self.integral += 0.5 * (error + last_err) * dt;
                self.integral = self.integral.clamp(-self.integral_limit, self.integral_limit);
                self.derivative = (error - last_err) / dt;
            }
            Some(_) => {}
            None => self.derivative = 0.0,
        }
        self.last = Some((time, error));

        let PidGains { kp, ki, kd } = self.gains;
        self.output
            .clamp(kp * error + ki * self.integral + kd * self.derivative)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn proportional_output_is_clamped() {
        let mut pid = Pid::new(PidGains::p(0.5));
        assert_approx_eq!(pid.update(1.0, 0.0), 0.5);
        assert_approx_eq!(pid.update(10.0, 0.1), 1.0);
        assert_approx_eq!(pid.update(-10.0, 0.2), -1.0);
    }

    #[test]
    fn trapezoidal_integral() {
        let mut pid = Pid::new(PidGains::new(0.0, 1.0, 0.0));
        pid.update(0.0, 0.0);
        pid.update(1.0, 1.0);
        assert_approx_eq!(pid.integral(), 0.5);
        pid.update(1.0, 2.0);
        assert_approx_eq!(pid.integral(), 1.5);
    }

    #[test]
    fn integral_is_limited() {
        let mut pid = Pid::new(PidGains::new(0.0, 1.0, 0.0)).with_integral_limit(0.3);
        for i in 0..100 {
            pid.update(1.0, i as f64 * 0.1);
        }
        assert_approx_eq!(pid.integral(), 0.3);
        for i in 100..300 {
            pid.update(-1.0, i as f64 * 0.1);
        }
        assert_approx_eq!(pid.integral(), -0.3);
    }

    #[test]
    fn integral_is_bounded_by_default() {
        let mut pid = Pid::new(PidGains::new(0.0, 0.1, 0.0));
        for i in 0..1000 {
            pid.update(2.0, i as f64 * 0.1);
        }
        assert_approx_eq!(pid.integral(), DEFAULT_INTEGRAL_LIMIT);
        assert_approx_eq!(pid.update(2.0, 100.0), 0.1 * DEFAULT_INTEGRAL_LIMIT);

        // Unwinds as soon as the error changes sign
        pid.update(-2.0, 100.1);
        pid.update(-2.0, 100.2);
        assert!(pid.integral() < DEFAULT_INTEGRAL_LIMIT);
    }

    #[test]
    fn derivative_uses_time_delta() {
        let mut pid = Pid::new(PidGains::new(0.0, 0.0, 0.1));
        assert_eq!(pid.update(5.0, 0.0), 0.0);
        assert_approx_eq!(pid.update(6.0, 0.5), 0.2);
        assert_approx_eq!(pid.derivative(), 2.0);
        // A repeated time keeps the previous derivative
        pid.update(7.0, 0.5);
        assert_approx_eq!(pid.derivative(), 2.0);
        pid.reset();
        assert_eq!(pid.error(), None);
        assert_eq!(pid.update(1.0, 3.0), 0.0);
    }
}
