//! A lightweight simulator for autonomous vehicle controls.
//!
//! A [SimulationManager] steps an environment, vehicles, visualizations and
//! controllers in lockstep with a fixed-step [SimulationClock]. Controllers
//! and vehicles communicate through shared [InputsHandle] and [StateHandle]
//! records.

pub use cgmath;
pub use clock::{SimulationClock, SimulationConfig};
pub use component::{Advance, Component, Poll, Stage, Synchronize};
pub use controller::{CompositeController, Controller};
pub use data::DataDirectory;
pub use environment::{Body, Environment};
pub use error::{Error, Result};
pub use inputs::{InputSmoother, InputsHandle, VehicleInputs};
pub use path::{create_path_from_json, load_waypoints_from_csv, ClosestPoint, Path, PathOptions};
pub use simulation::SimulationManager;
pub use slotmap::{Key, KeyData};
pub use track::{create_track_from_json, Track};
pub use util::Interval;
pub use vehicle::{
    KinematicBicycle, SimpleState, StateHandle, Vehicle, VehicleParams, VehicleState,
};
pub use visualization::{Frame, TelemetryRecorder, Visualization, VisualizationComponent};

pub mod clock;
pub mod component;
pub mod controller;
pub mod data;
pub mod environment;
mod error;
pub mod inputs;
pub mod math;
pub mod path;
mod simulation;
pub mod track;
mod util;
pub mod vehicle;
pub mod visualization;

use slotmap::new_key_type;

new_key_type! {
    /// Unique ID of a [Component] added to a [SimulationManager].
    pub struct ComponentId;
    /// Unique ID of a [Body] in an [Environment].
    pub struct BodyId;
}
