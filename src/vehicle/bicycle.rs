use super::{Drivetrain, StateHandle, Vehicle, VehicleParams, VehicleSpec, VehicleState};
use crate::component::{Advance, Component, Stage, Synchronize};
use crate::data::DataDirectory;
use crate::inputs::{InputsHandle, VehicleInputs};
use crate::{Error, Result};
use std::path::Path;

/// A single-track vehicle with front-wheel steering and no tire slip.
///
/// The state is integrated with forward Euler. Speed is floored at zero,
/// so the vehicle never reverses.
#[derive(Clone, Debug)]
pub struct KinematicBicycle {
    name: String,
    params: VehicleParams,
    drivetrain: Drivetrain,
    inputs: InputsHandle,
    state: VehicleState,
    published: StateHandle,
    /// The time of the last synchronize call.
    time: f64,
}

impl KinematicBicycle {
    /// Creates a vehicle at rest at the origin.
    ///
    /// # Parameters
    /// * `params` - The vehicle's physical parameters.
    /// * `inputs` - The handle the vehicle reads driver inputs from.
    pub fn new(params: VehicleParams, inputs: InputsHandle) -> Self {
        let state = VehicleState::default();
        Self {
            name: "vehicle".into(),
            drivetrain: Drivetrain::new(&params),
            params,
            inputs,
            state,
            published: StateHandle::new(state),
            time: 0.0,
        }
    }

    /// Loads a vehicle file.
    pub fn from_json_file(
        data: &DataDirectory,
        name: impl AsRef<Path>,
        inputs: InputsHandle,
    ) -> Result<Self> {
        let spec = VehicleSpec::from_json_file(data, name)?;
        let params = spec.params()?;
        let mut vehicle = Self::new(params, inputs);
        if !spec.name.is_empty() {
            vehicle.name = spec.name;
        }
        Ok(vehicle)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the initial pose and speed.
    pub fn with_initial_state(mut self, state: VehicleState) -> Self {
        self.state = VehicleState {
            v: state.v.max(0.0),
            engine_speed: self.drivetrain.engine_speed(state.v.max(0.0)),
            ..state
        };
        self.published.set(self.state);
        self
    }

    pub fn params(&self) -> &VehicleParams {
        &self.params
    }

    /// The time of the last synchronize call.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Maps a normalized steering input onto a front wheel angle in rad.
    pub fn steering_angle(&self, steering: f64) -> f64 {
        let range = self.params.steering;
        range.clamp(range.lerp(0.5 * (steering + 1.0)))
    }

    /// Reads the inputs, saturated to the vehicle's ranges.
    fn read_inputs(&self) -> VehicleInputs {
        let inputs = self.inputs.get().clamped();
        VehicleInputs {
            steering: inputs.steering,
            throttle: self.params.throttle.clamp(inputs.throttle),
            braking: self.params.braking.clamp(inputs.braking),
        }
    }
}

impl Component for KinematicBicycle {
    fn name(&self) -> &str {
        &self.name
    }

    fn stage(&self) -> Stage {
        Stage::Vehicle
    }

    fn as_synchronize(&mut self) -> Option<&mut dyn Synchronize> {
        Some(self)
    }

    fn as_advance(&mut self) -> Option<&mut dyn Advance> {
        Some(self)
    }
}

impl Synchronize for KinematicBicycle {
    fn synchronize(&mut self, time: f64) -> Result<()> {
        self.time = time;
        Ok(())
    }
}

impl Advance for KinematicBicycle {
    fn advance(&mut self, step: f64) -> Result<()> {
        if !(step.is_finite() && step > 0.0) {
            return Err(Error::InvalidStep(step));
        }

        let inputs = self.read_inputs();
        let delta = self.steering_angle(inputs.steering);
        let wheelbase = self.params.wheelbase();
        let s = &mut self.state;

        let acc = self
            .drivetrain
            .acceleration(inputs.throttle, inputs.braking, s.v);
        let beta = f64::atan(self.params.rear_axle * delta.tan() / wheelbase);
        let yaw_rate = s.v * beta.cos() * delta.tan() / wheelbase;

        s.x += s.v * f64::cos(s.yaw + beta) * step;
        s.y += s.v * f64::sin(s.yaw + beta) * step;
        s.yaw += yaw_rate * step;
        s.v = f64::max(s.v + acc * step, 0.0);
        s.yaw_rate = yaw_rate;
        s.acceleration = acc;
        s.engine_speed = self.drivetrain.engine_speed(s.v);

        self.published.set(self.state);
        Ok(())
    }
}

impl Vehicle for KinematicBicycle {
    fn state(&self) -> VehicleState {
        self.state
    }

    fn inputs(&self) -> &InputsHandle {
        &self.inputs
    }

    fn state_handle(&self) -> StateHandle {
        self.published.clone()
    }
}
