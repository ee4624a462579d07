//! Normalized driver inputs and their shared handle.

use crate::util::Interval;
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::rc::Rc;

/// The range of the steering input. Positive values steer left.
pub const STEERING_RANGE: Interval<f64> = Interval::new(-1.0, 1.0);

/// The range of the throttle and braking inputs.
pub const PEDAL_RANGE: Interval<f64> = Interval::new(0.0, 1.0);

/// A normalized driver command.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VehicleInputs {
    /// Steering in `[-1, 1]`; positive turns left.
    pub steering: f64,
    /// Throttle in `[0, 1]`.
    pub throttle: f64,
    /// Braking in `[0, 1]`.
    pub braking: f64,
}

impl VehicleInputs {
    pub fn new(steering: f64, throttle: f64, braking: f64) -> Self {
        Self {
            steering,
            throttle,
            braking,
        }
    }

    /// Returns a copy with every channel saturated to its range.
    pub fn clamped(&self) -> Self {
        Self {
            steering: STEERING_RANGE.clamp(self.steering),
            throttle: PEDAL_RANGE.clamp(self.throttle),
            braking: PEDAL_RANGE.clamp(self.braking),
        }
    }
}

/// A shared, single-threaded handle to a [VehicleInputs] record.
///
/// Controllers write through the handle and the vehicle reads from it. Cloning
/// the handle shares the same record.
#[derive(Clone, Debug, Default)]
pub struct InputsHandle(Rc<Cell<VehicleInputs>>);

impl InputsHandle {
    pub fn new(inputs: VehicleInputs) -> Self {
        Self(Rc::new(Cell::new(inputs)))
    }

    /// Gets a copy of the current inputs.
    pub fn get(&self) -> VehicleInputs {
        self.0.get()
    }

    /// Replaces the inputs.
    pub fn set(&self, inputs: VehicleInputs) {
        self.0.set(inputs);
    }

    /// Updates the inputs in place.
    pub fn update(&self, f: impl FnOnce(&mut VehicleInputs)) {
        let mut inputs = self.0.get();
        f(&mut inputs);
        self.0.set(inputs);
    }

    pub fn set_steering(&self, steering: f64) {
        self.update(|i| i.steering = steering);
    }

    pub fn set_throttle(&self, throttle: f64) {
        self.update(|i| i.throttle = throttle);
    }

    pub fn set_braking(&self, braking: f64) {
        self.update(|i| i.braking = braking);
    }

    /// Returns true if both handles share the same record.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

/// Moves inputs gradually toward target values.
///
/// Each channel moves at a rate proportional to its distance from the target,
/// limited to at most `delta` per call to [InputSmoother::advance].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InputSmoother {
    /// Rate gains per channel, as (steering, throttle, braking).
    pub gains: VehicleInputs,
    /// Maximum change per step for each channel.
    pub deltas: VehicleInputs,
}

impl InputSmoother {
    /// Creates a smoother whose deltas are scaled to the render interval.
    pub fn for_render_step(render_step_size: f64) -> Self {
        Self {
            gains: VehicleInputs::new(4.0, 4.0, 4.0),
            deltas: VehicleInputs::new(
                render_step_size / 2.0,
                render_step_size / 6.0,
                render_step_size / 1.5,
            ),
        }
    }

    /// Moves `current` toward `target` over `step` seconds.
    pub fn advance(&self, current: VehicleInputs, target: VehicleInputs, step: f64) -> VehicleInputs {
        let approach = |current: f64, target: f64, gain: f64, delta: f64| {
            let change = step * gain * (target - current);
            current + change.clamp(-delta.abs(), delta.abs())
        };
        VehicleInputs {
            steering: approach(
                current.steering,
                target.steering,
                self.gains.steering,
                self.deltas.steering,
            ),
            throttle: approach(
                current.throttle,
                target.throttle,
                self.gains.throttle,
                self.deltas.throttle,
            ),
            braking: approach(
                current.braking,
                target.braking,
                self.gains.braking,
                self.deltas.braking,
            ),
        }
    }
}

impl Default for InputSmoother {
    fn default() -> Self {
        Self::for_render_step(crate::clock::DEFAULT_RENDER_STEP_SIZE)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use rand::{Rng, SeedableRng};

    #[test]
    fn clamped_saturates_every_channel() {
        let inputs = VehicleInputs::new(2.0, -0.5, 1.5).clamped();
        assert_eq!(inputs, VehicleInputs::new(1.0, 0.0, 1.0));

        let mut rng = rand::rngs::StdRng::from_seed(*b"Bucky badger runs a kinematic...");
        for _ in 0..100 {
            let inputs = VehicleInputs::new(
                rng.gen_range(-5.0..5.0),
                rng.gen_range(-5.0..5.0),
                rng.gen_range(-5.0..5.0),
            )
            .clamped();
            assert!(STEERING_RANGE.contains(inputs.steering));
            assert!(PEDAL_RANGE.contains(inputs.throttle));
            assert!(PEDAL_RANGE.contains(inputs.braking));
        }
    }

    #[test]
    fn handles_share_state() {
        let a = InputsHandle::default();
        let b = a.clone();
        a.set_throttle(0.7);
        b.set_steering(-0.2);
        assert_eq!(a.get(), VehicleInputs::new(-0.2, 0.7, 0.0));
        assert!(a.ptr_eq(&b));
        assert!(!a.ptr_eq(&InputsHandle::default()));
    }

    #[test]
    fn smoother_is_rate_limited() {
        let smoother = InputSmoother::for_render_step(0.1);
        let target = VehicleInputs::new(1.0, 1.0, 0.0);
        let next = smoother.advance(VehicleInputs::default(), target, 1.0);
        assert_approx_eq!(next.steering, 0.05);
        assert_approx_eq!(next.throttle, 0.1 / 6.0);
        assert_approx_eq!(next.braking, 0.0);

        // Small steps follow the proportional law
        let next = smoother.advance(VehicleInputs::default(), target, 0.001);
        assert_approx_eq!(next.steering, 0.004);
    }

    #[test]
    fn smoother_converges() {
        let smoother = InputSmoother::default();
        let target = VehicleInputs::new(-0.5, 0.3, 0.8);
        let mut inputs = VehicleInputs::default();
        for _ in 0..10_000 {
            inputs = smoother.advance(inputs, target, 0.01);
        }
        assert_approx_eq!(inputs.steering, target.steering, 1e-6);
        assert_approx_eq!(inputs.throttle, target.throttle, 1e-6);
        assert_approx_eq!(inputs.braking, target.braking, 1e-6);
    }
}
