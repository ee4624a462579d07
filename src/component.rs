//! The protocol between the simulation manager and its components.
//!
//! A component opts into each phase of the loop by implementing the matching
//! capability trait and returning itself from the accessor on [Component].

use crate::Result;

/// Receives the current simulation time before each step.
pub trait Synchronize {
    fn synchronize(&mut self, time: f64) -> Result<()>;
}

/// Integrates its own state forward by one step.
pub trait Advance {
    fn advance(&mut self, step: f64) -> Result<()>;
}

/// Reports whether the simulation should keep running.
pub trait Poll {
    fn is_ok(&self) -> bool;
}

/// The order in which components are visited within a phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    Environment,
    Vehicle,
    Visualization,
    Controller,
}

/// Something the simulation manager steps.
pub trait Component {
    /// A name used in logs and errors.
    fn name(&self) -> &str;

    fn stage(&self) -> Stage;

    fn as_synchronize(&mut self) -> Option<&mut dyn Synchronize> {
        None
    }

    fn as_advance(&mut self) -> Option<&mut dyn Advance> {
        None
    }

    fn as_poll(&self) -> Option<&dyn Poll> {
        None
    }
}
