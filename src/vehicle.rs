//! Vehicle models.

use crate::component::{Advance, Component, Synchronize};
use crate::inputs::InputsHandle;
use crate::math::{heading, Point2d, Vector2d};
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::rc::Rc;

pub use bicycle::KinematicBicycle;
pub use drivetrain::Drivetrain;
pub use params::{TireDesign, TireSpec, VehicleParams, VehicleProperties, VehicleSpec};

mod bicycle;
mod drivetrain;
mod params;

/// The full kinematic state of a vehicle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VehicleState {
    /// The x coordinate of the reference point in m.
    pub x: f64,
    /// The y coordinate of the reference point in m.
    pub y: f64,
    /// The heading, anti-clockwise from the x-axis, in rad.
    pub yaw: f64,
    /// The longitudinal speed in m/s. Never negative.
    pub v: f64,
    /// The yaw rate in rad/s.
    pub yaw_rate: f64,
    /// The longitudinal acceleration in m/s^2.
    pub acceleration: f64,
    /// The engine angular velocity in rad/s.
    pub engine_speed: f64,
}

impl VehicleState {
    /// A state at rest at the given pose.
    pub fn at(x: f64, y: f64, yaw: f64) -> Self {
        Self {
            x,
            y,
            yaw,
            ..Default::default()
        }
    }

    pub fn position(&self) -> Point2d {
        Point2d::new(self.x, self.y)
    }

    /// A unit vector along the vehicle's heading.
    pub fn direction(&self) -> Vector2d {
        heading(self.yaw)
    }

    /// The planar velocity of the vehicle.
    pub fn velocity(&self) -> Vector2d {
        self.direction() * self.v
    }

    /// The lateral (centripetal) acceleration in m/s^2.
    pub fn lateral_acceleration(&self) -> f64 {
        self.v * self.yaw_rate
    }
}

/// The pose and speed of a vehicle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SimpleState {
    pub x: f64,
    pub y: f64,
    pub yaw: f64,
    pub v: f64,
}

impl From<VehicleState> for SimpleState {
    fn from(state: VehicleState) -> Self {
        Self {
            x: state.x,
            y: state.y,
            yaw: state.yaw,
            v: state.v,
        }
    }
}

impl From<SimpleState> for (f64, f64, f64, f64) {
    fn from(state: SimpleState) -> Self {
        (state.x, state.y, state.yaw, state.v)
    }
}

/// A shared, read-mostly view of a vehicle's latest state.
///
/// The vehicle publishes into the handle after every advance; controllers and
/// visualizations read snapshots from it.
#[derive(Clone, Debug, Default)]
pub struct StateHandle(Rc<Cell<VehicleState>>);

impl StateHandle {
    pub fn new(state: VehicleState) -> Self {
        Self(Rc::new(Cell::new(state)))
    }

    pub fn get(&self) -> VehicleState {
        self.0.get()
    }

    pub(crate) fn set(&self, state: VehicleState) {
        self.0.set(state);
    }
}

/// A vehicle that can be stepped by the simulation.
///
/// The built-in implementation is [KinematicBicycle]; an external physics
/// engine can be plugged in by implementing this trait.
pub trait Vehicle: Component + Synchronize + Advance {
    /// Gets the current state.
    fn state(&self) -> VehicleState;

    /// The handle the vehicle reads its inputs from.
    fn inputs(&self) -> &InputsHandle;

    /// A handle that always reflects the latest state.
    fn state_handle(&self) -> StateHandle;

    /// Gets the pose and speed.
    fn simple_state(&self) -> SimpleState {
        self.state().into()
    }
}

#[cfg(test)]
pub(crate) fn go_kart() -> VehicleParams {
    use crate::util::Interval;
    VehicleParams {
        mass: 150.0,
        inertia: Some(0.5),
        front_axle: 1.0,
        rear_axle: 0.0,
        gear_ratio: 0.3,
        effective_radius: 0.3,
        torque_coefficients: [100.0, 0.1, -0.1],
        aerodynamic_coefficient: 0.5,
        friction_coefficient: 0.02,
        max_force: 500.0,
        max_braking_force: 800.0,
        steering: Interval::new(-0.5, 0.5),
        throttle: Interval::new(0.0, 1.0),
        braking: Interval::new(0.0, 1.0),
    }
}
