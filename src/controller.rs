//! Controllers produce the driver inputs a vehicle reads each step.
//!
//! Every controller writes into an [InputsHandle] shared with the vehicle it
//! drives. Controllers that make decisions do so in `synchronize`, while
//! those that smooth their output over time do so in `advance`.

use crate::component::{Advance, Component, Poll, Stage, Synchronize};
use crate::inputs::{InputsHandle, VehicleInputs};
use crate::Result;

pub use bridge::{Bridge, BridgeController, ChannelBridge};
pub use follower::PathFollower;
pub use keyboard::{Key, KeyboardController};
pub use lateral::PidLateralController;
pub use longitudinal::PidLongitudinalController;
pub use pid::{Pid, PidGains, DEFAULT_INTEGRAL_LIMIT};
pub use scripted::{read_commands, Command, ScriptedController};

mod bridge;
mod follower;
mod keyboard;
mod lateral;
mod longitudinal;
mod pid;
mod scripted;

/// A source of driver inputs.
#[derive(Debug)]
pub enum Controller {
    Keyboard(KeyboardController),
    Scripted(ScriptedController),
    Lateral(PidLateralController),
    Longitudinal(PidLongitudinalController),
    PathFollower(PathFollower),
    Bridge(BridgeController),
    Composite(CompositeController),
}

impl Controller {
    /// Gets the inputs most recently written by the controller.
    pub fn inputs(&self) -> VehicleInputs {
        match self {
            Controller::Keyboard(c) => c.inputs(),
            Controller::Scripted(c) => c.inputs(),
            Controller::Lateral(c) => c.inputs(),
            Controller::Longitudinal(c) => c.inputs(),
            Controller::PathFollower(c) => c.inputs(),
            Controller::Bridge(c) => c.inputs(),
            Controller::Composite(c) => c.inputs(),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Controller::Keyboard(_) => "keyboard controller",
            Controller::Scripted(_) => "scripted controller",
            Controller::Lateral(_) => "lateral controller",
            Controller::Longitudinal(_) => "longitudinal controller",
            Controller::PathFollower(_) => "path follower",
            Controller::Bridge(_) => "bridge controller",
            Controller::Composite(_) => "composite controller",
        }
    }
}

impl Synchronize for Controller {
    fn synchronize(&mut self, time: f64) -> Result<()> {
        match self {
            Controller::Keyboard(c) => c.synchronize(time),
            Controller::Scripted(c) => c.synchronize(time),
            Controller::Lateral(c) => c.synchronize(time),
            Controller::Longitudinal(c) => c.synchronize(time),
            Controller::PathFollower(c) => c.synchronize(time),
            Controller::Bridge(c) => c.synchronize(time),
            Controller::Composite(c) => c.synchronize(time),
        }
    }
}

impl Advance for Controller {
    fn advance(&mut self, step: f64) -> Result<()> {
        match self {
            Controller::Keyboard(c) => c.advance(step),
            Controller::PathFollower(c) => c.advance(step),
            Controller::Composite(c) => c.advance(step),
            Controller::Scripted(_)
            | Controller::Lateral(_)
            | Controller::Longitudinal(_)
            | Controller::Bridge(_) => Ok(()),
        }
    }
}

impl Poll for Controller {
    fn is_ok(&self) -> bool {
        match self {
            Controller::Scripted(c) => c.is_ok(),
            Controller::Bridge(c) => c.is_ok(),
            Controller::Composite(c) => c.is_ok(),
            Controller::Keyboard(_)
            | Controller::Lateral(_)
            | Controller::Longitudinal(_)
            | Controller::PathFollower(_) => true,
        }
    }
}

impl Component for Controller {
    fn name(&self) -> &str {
        self.kind()
    }

    fn stage(&self) -> Stage {
        Stage::Controller
    }

    fn as_synchronize(&mut self) -> Option<&mut dyn Synchronize> {
        Some(self)
    }

    fn as_advance(&mut self) -> Option<&mut dyn Advance> {
        Some(self)
    }

    fn as_poll(&self) -> Option<&dyn Poll> {
        Some(self)
    }
}

macro_rules! impl_from {
    ($($variant:ident($ty:ty)),*) => {
        $(impl From<$ty> for Controller {
            fn from(c: $ty) -> Self {
                Controller::$variant(c)
            }
        })*
    };
}

impl_from!(
    Keyboard(KeyboardController),
    Scripted(ScriptedController),
    Lateral(PidLateralController),
    Longitudinal(PidLongitudinalController),
    PathFollower(PathFollower),
    Bridge(BridgeController),
    Composite(CompositeController)
);

/// Runs several controllers as one.
///
/// The sub-controllers are stepped in the order they were added. They should
/// all write into the handle the composite was built with, each owning
/// disjoint channels, such as a lateral controller for steering alongside a
/// scripted controller for the pedals. Where two write the same channel, the
/// one added last wins.
#[derive(Debug)]
pub struct CompositeController {
    controllers: Vec<Controller>,
    inputs: InputsHandle,
}

impl CompositeController {
    /// Creates an empty composite reporting the inputs in `inputs`.
    pub fn new(inputs: InputsHandle) -> Self {
        Self {
            controllers: vec![],
            inputs,
        }
    }

    pub fn with(mut self, controller: impl Into<Controller>) -> Self {
        self.push(controller);
        self
    }

    pub fn push(&mut self, controller: impl Into<Controller>) {
        self.controllers.push(controller.into());
    }

    pub fn controllers(&self) -> &[Controller] {
        &self.controllers
    }

    pub fn synchronize(&mut self, time: f64) -> Result<()> {
        for c in &mut self.controllers {
            c.synchronize(time)?;
        }
        Ok(())
    }

    pub fn advance(&mut self, step: f64) -> Result<()> {
        for c in &mut self.controllers {
            c.advance(step)?;
        }
        Ok(())
    }

    /// The merged inputs in the shared handle.
    pub fn inputs(&self) -> VehicleInputs {
        self.inputs.get()
    }

    pub fn is_ok(&self) -> bool {
        self.controllers.iter().all(Poll::is_ok)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::math::Point3d;
    use crate::path::{Path, PathOptions};
    use crate::vehicle::{StateHandle, VehicleState};
    use std::rc::Rc;

    fn pedals(inputs: &InputsHandle) -> ScriptedController {
        ScriptedController::new(
            vec![
                Command::new(0.0, 0.0, 0.5, 0.0),
                Command::new(1.0, 0.0, 0.0, 0.8),
            ],
            inputs.clone(),
        )
        .unwrap()
    }

    #[test]
    fn dispatches_to_variants() {
        let inputs = InputsHandle::default();
        let mut c = Controller::from(pedals(&inputs));
        assert_eq!(c.name(), "scripted controller");
        assert_eq!(c.stage(), Stage::Controller);
        c.as_synchronize().unwrap().synchronize(0.0).unwrap();
        c.as_advance().unwrap().advance(0.1).unwrap();
        assert_eq!(c.inputs().throttle, 0.5);
        assert!(c.as_poll().unwrap().is_ok());
        c.synchronize(2.0).unwrap();
        assert_eq!(inputs.get().braking, 0.8);
        assert!(!c.as_poll().unwrap().is_ok());
    }

    #[test]
    fn composite_splits_channels() {
        let path = Rc::new(
            Path::new(
                &[Point3d::new(-50.0, 0.0, 0.0), Point3d::new(50.0, 0.0, 0.0)],
                PathOptions {
                    num_points: 1001,
                    is_closed: false,
                },
            )
            .unwrap(),
        );
        let inputs = InputsHandle::default();
        let vehicle = StateHandle::new(VehicleState::at(0.0, -1.0, 0.0));
        let steering = PidLateralController::new(path, vehicle, inputs.clone());
        let mut c = CompositeController::new(inputs.clone())
            .with(steering)
            .with(pedals(&inputs).with_hold_after_end(true));

        c.synchronize(0.0).unwrap();
        let out = inputs.get();
        assert!(out.steering > 0.0);
        assert_eq!(out.throttle, 0.5);
        assert_eq!(c.inputs(), out);
        assert!(c.is_ok());
        assert_eq!(c.controllers().len(), 2);
    }

    #[test]
    fn composite_reports_every_channel() {
        let inputs = InputsHandle::default();
        let mut c = CompositeController::new(inputs.clone());

        // Written outside any child, e.g. by a driver at the keyboard
        inputs.update(|i| i.steering = 0.4);
        assert_eq!(c.inputs(), VehicleInputs::new(0.4, 0.0, 0.0));

        c.push(pedals(&inputs));
        c.synchronize(1.5).unwrap();
        assert_eq!(c.inputs(), VehicleInputs::new(0.0, 0.0, 0.8));
        assert_eq!(Controller::from(c).inputs(), inputs.get());
    }

    #[test]
    fn composite_stops_when_any_stops() {
        let inputs = InputsHandle::default();
        let mut c = CompositeController::new(inputs.clone())
            .with(pedals(&inputs).with_hold_after_end(true))
            .with(pedals(&inputs));
        c.synchronize(5.0).unwrap();
        assert!(!c.is_ok());
    }
}
