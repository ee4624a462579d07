use super::pid::{Pid, PidGains};
use crate::inputs::{InputsHandle, VehicleInputs};
use crate::math::{cross_sign, planar_vec, Point3d, Vector3d};
use crate::path::Path;
use crate::vehicle::StateHandle;
use crate::Result;
use cgmath::prelude::*;
use std::rc::Rc;

/// The default distance ahead of the vehicle the controller aims for, in m.
pub const DEFAULT_LOOKAHEAD: f64 = 5.0;

/// Steers a vehicle along a path with a PID on lateral error.
///
/// Each update places a sentinel point `lookahead` metres ahead of the vehicle
/// along its heading and finds the path sample closest to it (the target).
/// The error is the planar distance between the two, signed positive when the
/// target lies to the left of the sentinel as seen from the vehicle.
#[derive(Clone, Debug)]
pub struct PidLateralController {
    pid: Pid,
    lookahead: f64,
    path: Rc<Path>,
    vehicle: StateHandle,
    inputs: InputsHandle,
    target: Point3d,
    sentinel: Point3d,
}

impl PidLateralController {
    /// Creates a controller that writes steering into `inputs`.
    ///
    /// # Parameters
    /// * `path` - The path to follow.
    /// * `vehicle` - The state of the vehicle being steered.
    /// * `inputs` - Where the steering command is written.
    pub fn new(path: Rc<Path>, vehicle: StateHandle, inputs: InputsHandle) -> Self {
        Self {
            pid: Pid::new(PidGains::p(0.4)),
            lookahead: DEFAULT_LOOKAHEAD,
            path,
            vehicle,
            inputs,
            target: Point3d::origin(),
            sentinel: Point3d::origin(),
        }
    }

    pub fn with_gains(mut self, gains: PidGains) -> Self {
        self.pid.set_gains(gains);
        self
    }

    pub fn with_lookahead(mut self, dist: f64) -> Self {
        self.lookahead = dist;
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

    pub fn set_lookahead_distance(&mut self, dist: f64) {
        self.lookahead = dist;
    }

    pub fn lookahead_distance(&self) -> f64 {
        self.lookahead
    }

    /// The path point the controller is steering towards.
    pub fn target(&self) -> Point3d {
        self.target
    }

    /// The point `lookahead` metres ahead of the vehicle.
    pub fn sentinel(&self) -> Point3d {
        self.sentinel
    }

    /// The most recent signed lateral error in m.
    pub fn error(&self) -> f64 {
        self.pid.error().unwrap_or(0.0)
    }

    pub fn path(&self) -> &Rc<Path> {
        &self.path
    }

    pub fn synchronize(&mut self, time: f64) -> Result<()> {
        let state = self.vehicle.get();
        let pos = Point3d::new(state.x, state.y, 0.0);
        let dir = state.direction();
        self.sentinel = pos + Vector3d::new(dir.x, dir.y, 0.0) * self.lookahead;
        self.target = self.path.calc_closest_point(self.sentinel)?.point;

        let offset = planar_vec(self.target - self.sentinel).magnitude();
        let err = self.calc_sign(pos) * offset;
        let steering = self.pid.update(err, time);
        self.inputs.set_steering(steering);
        Ok(())
    }

    /// +1 when the target is anti-clockwise of the sentinel as seen from `pos`,
    /// -1 when clockwise, 0 when aligned.
    fn calc_sign(&self, pos: Point3d) -> f64 {
        cross_sign(
            planar_vec(self.sentinel - pos),
            planar_vec(self.target - pos),
        )
    }

    pub fn inputs(&self) -> VehicleInputs {
        self.inputs.get()
    }
}
