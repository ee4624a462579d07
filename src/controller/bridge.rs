use crate::inputs::{InputsHandle, VehicleInputs};
use crate::vehicle::{StateHandle, VehicleState};
use crate::Result;
use std::sync::mpsc::{Receiver, Sender, TryRecvError};

/// A link to an external program that drives the vehicle.
///
/// Every step the simulation sends the vehicle state across the link and
/// applies whatever inputs have arrived from the other side.
pub trait Bridge {
    /// Sends the current vehicle state.
    fn send(&mut self, state: &VehicleState) -> Result<()>;

    /// Returns the most recent inputs received since the last call, if any.
    /// Never blocks.
    fn receive(&mut self) -> Option<VehicleInputs>;

    fn is_connected(&self) -> bool;
}

/// A [Bridge] over in-process channels, for driving a vehicle from another
/// thread.
#[derive(Debug)]
pub struct ChannelBridge {
    states: Sender<VehicleState>,
    inputs: Receiver<VehicleInputs>,
    connected: bool,
}

impl ChannelBridge {
    pub fn new(states: Sender<VehicleState>, inputs: Receiver<VehicleInputs>) -> Self {
        Self {
            states,
            inputs,
            connected: true,
        }
    }
}

impl Bridge for ChannelBridge {
    fn send(&mut self, state: &VehicleState) -> Result<()> {
        if self.connected && self.states.send(*state).is_err() {
            log::warn!("Bridge peer stopped listening for vehicle state");
            self.connected = false;
        }
        Ok(())
    }

    fn receive(&mut self) -> Option<VehicleInputs> {
        let mut latest = None;
        while self.connected {
            match self.inputs.try_recv() {
                Ok(inputs) => latest = Some(inputs),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    log::warn!("Bridge peer disconnected");
                    self.connected = false;
                }
            }
        }
        latest
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}

/// Drives a vehicle with inputs received over a [Bridge].
pub struct BridgeController {
    bridge: Box<dyn Bridge>,
    vehicle: StateHandle,
    inputs: InputsHandle,
}

impl BridgeController {
    pub fn new(bridge: Box<dyn Bridge>, vehicle: StateHandle, inputs: InputsHandle) -> Self {
        Self {
            bridge,
            vehicle,
            inputs,
        }
    }

    pub fn synchronize(&mut self, _time: f64) -> Result<()> {
        self.bridge.send(&self.vehicle.get())?;
        if let Some(inputs) = self.bridge.receive() {
            self.inputs.set(inputs.clamped());
        }
        Ok(())
    }

    pub fn inputs(&self) -> VehicleInputs {
        self.inputs.get()
    }

    pub fn is_ok(&self) -> bool {
        self.bridge.is_connected()
    }
}

impl std::fmt::Debug for BridgeController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BridgeController")
            .field("connected", &self.bridge.is_connected())
            .field("inputs", &self.inputs.get())
            .finish()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::sync::mpsc::channel;

    #[test]
    fn exchanges_state_and_inputs() {
        let (state_tx, state_rx) = channel();
        let (inputs_tx, inputs_rx) = channel();
        let vehicle = StateHandle::new(VehicleState::at(1.0, 2.0, 0.5));
        let inputs = InputsHandle::default();
        let mut c = BridgeController::new(
            Box::new(ChannelBridge::new(state_tx, inputs_rx)),
            vehicle,
            inputs.clone(),
        );

        inputs_tx.send(VehicleInputs::new(0.1, 0.2, 0.0)).unwrap();
        inputs_tx.send(VehicleInputs::new(0.3, 2.0, 0.0)).unwrap();
        c.synchronize(0.0).unwrap();
        assert_eq!(state_rx.try_recv().unwrap().x, 1.0);
        // Only the latest inputs apply, clamped
        assert_eq!(inputs.get(), VehicleInputs::new(0.3, 1.0, 0.0));

        // Nothing new: inputs hold
        c.synchronize(0.1).unwrap();
        assert_eq!(inputs.get(), VehicleInputs::new(0.3, 1.0, 0.0));
        assert!(c.is_ok());
    }

    #[test]
    fn stops_when_peer_leaves() {
        let (state_tx, state_rx) = channel();
        let (inputs_tx, inputs_rx) = channel::<VehicleInputs>();
        let mut c = BridgeController::new(
            Box::new(ChannelBridge::new(state_tx, inputs_rx)),
            StateHandle::default(),
            InputsHandle::default(),
        );
        drop(inputs_tx);
        drop(state_rx);
        c.synchronize(0.0).unwrap();
        assert!(!c.is_ok());
    }
}
