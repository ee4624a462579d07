use super::lateral::PidLateralController;
use super::longitudinal::PidLongitudinalController;
use crate::inputs::{InputSmoother, InputsHandle, VehicleInputs};
use crate::math::Point3d;
use crate::path::Path;
use crate::vehicle::StateHandle;
use crate::Result;
use std::rc::Rc;

/// Follows a path at a target speed.
///
/// A lateral controller picks the steering and a longitudinal controller picks
/// the pedals. Both write into a private set of target inputs, which the shared
/// inputs then chase at a limited rate.
#[derive(Clone, Debug)]
pub struct PathFollower {
    lateral: PidLateralController,
    longitudinal: PidLongitudinalController,
    targets: InputsHandle,
    smoother: InputSmoother,
    inputs: InputsHandle,
}

impl PathFollower {
    /// Creates a follower with default gains, a 5 m lookahead and a target
    /// speed of 7 m/s.
    pub fn new(path: Rc<Path>, vehicle: StateHandle, inputs: InputsHandle) -> Self {
        let targets = InputsHandle::new(inputs.get());
        let lateral = PidLateralController::new(path, vehicle.clone(), targets.clone());
        let longitudinal = PidLongitudinalController::new(vehicle, targets.clone());
        Self::from_parts(lateral, longitudinal, targets, inputs)
    }

    /// Builds a follower from preconfigured controllers.
    ///
    /// Both controllers must write into `targets`.
    pub fn from_parts(
        lateral: PidLateralController,
        longitudinal: PidLongitudinalController,
        targets: InputsHandle,
        inputs: InputsHandle,
    ) -> Self {
        Self {
            lateral,
            longitudinal,
            targets,
            smoother: InputSmoother {
                gains: VehicleInputs::new(4.0, 0.25, 4.0),
                deltas: VehicleInputs::new(1.0 / 50.0, 1.0 / 50.0, 1.0 / 50.0),
            },
            inputs,
        }
    }

    pub fn with_smoother(mut self, smoother: InputSmoother) -> Self {
        self.smoother = smoother;
        self
    }

    pub fn lateral(&self) -> &PidLateralController {
        &self.lateral
    }

    pub fn lateral_mut(&mut self) -> &mut PidLateralController {
        &mut self.lateral
    }

    pub fn longitudinal(&self) -> &PidLongitudinalController {
        &self.longitudinal
    }

    pub fn longitudinal_mut(&mut self) -> &mut PidLongitudinalController {
        &mut self.longitudinal
    }

    /// The path point being steered towards.
    pub fn target_point(&self) -> Point3d {
        self.lateral.target()
    }

    pub fn sentinel_point(&self) -> Point3d {
        self.lateral.sentinel()
    }

    /// The inputs the shared inputs are moving toward.
    pub fn targets(&self) -> VehicleInputs {
        self.targets.get()
    }

    pub fn synchronize(&mut self, time: f64) -> Result<()> {
        self.lateral.synchronize(time)?;
        self.longitudinal.synchronize(time)
    }

    pub fn advance(&mut self, step: f64) -> Result<()> {
        let next = self
            .smoother
            .advance(self.inputs.get(), self.targets.get(), step);
        self.inputs.set(next.clamped());
        Ok(())
    }

    pub fn inputs(&self) -> VehicleInputs {
        self.inputs.get()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::path::PathOptions;
    use crate::vehicle::VehicleState;
    use assert_approx_eq::assert_approx_eq;

    fn x_axis() -> Rc<Path> {
        Rc::new(
            Path::new(
                &[Point3d::new(-50.0, 0.0, 0.0), Point3d::new(50.0, 0.0, 0.0)],
                PathOptions {
                    num_points: 1001,
                    is_closed: false,
                },
            )
            .unwrap(),
        )
    }

    #[test]
    fn targets_are_smoothed() {
        let inputs = InputsHandle::default();
        let vehicle = StateHandle::new(VehicleState::at(0.0, -1.0, 0.0));
        let mut c = PathFollower::new(x_axis(), vehicle, inputs.clone());
        c.synchronize(0.0).unwrap();

        // Steer left and accelerate from standstill
        assert_approx_eq!(c.targets().steering, 0.4, 1e-9);
        assert_approx_eq!(c.targets().throttle, 1.0);
        assert_eq!(inputs.get(), VehicleInputs::default());

        c.advance(1.0).unwrap();
        assert_approx_eq!(inputs.get().steering, 0.02);
        assert_approx_eq!(inputs.get().throttle, 0.02);

        c.advance(0.01).unwrap();
        assert_approx_eq!(inputs.get().steering, 0.02 + 0.01 * 4.0 * 0.38);
        assert_approx_eq!(inputs.get().throttle, 0.02 + 0.01 * 0.25 * 0.98);
    }

    #[test]
    fn exposes_lateral_points() {
        let vehicle = StateHandle::new(VehicleState::at(0.0, 0.0, 0.0));
        let mut c = PathFollower::new(x_axis(), vehicle, InputsHandle::default());
        c.synchronize(0.0).unwrap();
        assert_approx_eq!(c.sentinel_point().x, 5.0);
        assert_approx_eq!(c.target_point().x, 5.0, 1e-9);
    }
}
