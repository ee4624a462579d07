use super::pid::{Pid, PidGains};
use crate::inputs::{InputsHandle, VehicleInputs};
use crate::vehicle::StateHandle;
use crate::Result;

/// The default speed the controller holds, in m/s.
pub const DEFAULT_TARGET_SPEED: f64 = 7.0;

/// How far above the target speed, in m/s, the vehicle may drift before the
/// controller brakes rather than coasts.
pub const DEFAULT_THROTTLE_THRESHOLD: f64 = 0.2;

/// Holds a target speed with a PID on speed error.
///
/// A positive output is applied as throttle. A negative output lifts off the
/// throttle while the vehicle is only slightly too fast. Once the overshoot
/// passes the throttle threshold the throttle is cut and the brake is applied
/// in proportion to the output, so a law with no braking authority (zero
/// output) coasts with the throttle closed.
#[derive(Clone, Debug)]
pub struct PidLongitudinalController {
    pid: Pid,
    target_speed: f64,
    throttle_threshold: f64,
    vehicle: StateHandle,
    inputs: InputsHandle,
}

impl PidLongitudinalController {
    /// Creates a controller that writes throttle and braking into `inputs`.
    pub fn new(vehicle: StateHandle, inputs: InputsHandle) -> Self {
        Self {
            pid: Pid::new(PidGains::p(0.4)),
            target_speed: DEFAULT_TARGET_SPEED,
            throttle_threshold: DEFAULT_THROTTLE_THRESHOLD,
            vehicle,
            inputs,
        }
    }

    pub fn with_gains(mut self, gains: PidGains) -> Self {
        self.pid.set_gains(gains);
        self
    }

    pub fn with_target_speed(mut self, speed: f64) -> Self {
        self.target_speed = speed;
        self
    }

    pub fn with_throttle_threshold(mut self, threshold: f64) -> Self {
        self.throttle_threshold = threshold;
        self
    }

    /// Limits the integral accumulator (anti-windup).
    pub fn with_integral_limit(mut self, limit: f64) -> Self {
        self.pid = self.pid.with_integral_limit(limit);
        self
    }

    pub fn set_gains(&mut self, gains: PidGains) {
        self.pid.set_gains(gains);
    }

    pub fn set_target_speed(&mut self, speed: f64) {
        self.target_speed = speed;
    }

    pub fn target_speed(&self) -> f64 {
        self.target_speed
    }

    /// The most recent speed error in m/s.
    pub fn error(&self) -> f64 {
        self.pid.error().unwrap_or(0.0)
    }

    pub fn synchronize(&mut self, time: f64) -> Result<()> {
        let err = self.target_speed - self.vehicle.get().v;
        let u = self.pid.update(err, time);
        let threshold = self.throttle_threshold;
        self.inputs.update(|inputs| {
            if u > 0.0 {
                inputs.throttle = u;
                inputs.braking = 0.0;
            } else if err < -threshold {
                inputs.throttle = 0.0;
                inputs.braking = f64::max(-u, 0.0);
            } else {
                inputs.throttle = f64::max(inputs.throttle + u, 0.0);
                inputs.braking = 0.0;
            }
        });
        Ok(())
    }

    pub fn inputs(&self) -> VehicleInputs {
        self.inputs.get()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::vehicle::VehicleState;

    fn moving(v: f64) -> VehicleState {
        VehicleState {
            v,
            ..Default::default()
        }
    }

    #[test]
    fn throttle_then_brake() {
        let vehicle = StateHandle::new(moving(0.0));
        let mut c = PidLongitudinalController::new(vehicle.clone(), InputsHandle::default())
            .with_target_speed(10.0);
        c.synchronize(0.0).unwrap();
        assert!(c.inputs().throttle > 0.0);
        assert_eq!(c.inputs().braking, 0.0);

        vehicle.set(moving(10.5));
        c.synchronize(0.1).unwrap();
        assert_eq!(c.inputs().throttle, 0.0);
        assert!(c.inputs().braking > 0.0);
    }

    #[test]
    fn coasts_within_threshold() {
        let vehicle = StateHandle::new(moving(5.0));
        let mut c = PidLongitudinalController::new(vehicle.clone(), InputsHandle::default())
            .with_target_speed(10.0);
        c.synchronize(0.0).unwrap();
        let throttle = c.inputs().throttle;
        assert_eq!(throttle, 1.0);

        // Slightly too fast: ease off without braking
        vehicle.set(moving(10.1));
        c.synchronize(0.1).unwrap();
        assert!(c.inputs().throttle < throttle);
        assert!(c.inputs().throttle > 0.0);
        assert_eq!(c.inputs().braking, 0.0);
    }

    #[test]
    fn overshoot_without_output_closes_the_throttle() {
        let vehicle = StateHandle::new(moving(12.0));
        let inputs = InputsHandle::new(VehicleInputs::new(0.0, 0.6, 0.0));
        let mut c = PidLongitudinalController::new(vehicle, inputs.clone())
            .with_gains(PidGains::default())
            .with_target_speed(10.0);
        c.synchronize(0.0).unwrap();
        assert_eq!(inputs.get().throttle, 0.0);
        assert_eq!(inputs.get().braking, 0.0);
        assert!(c.error() < -DEFAULT_THROTTLE_THRESHOLD);
    }

    #[test]
    fn leaves_steering_alone() {
        let inputs = InputsHandle::new(VehicleInputs::new(0.3, 0.0, 0.0));
        let mut c = PidLongitudinalController::new(StateHandle::new(moving(0.0)), inputs.clone());
        c.synchronize(0.0).unwrap();
        assert_eq!(inputs.get().steering, 0.3);
    }
}
