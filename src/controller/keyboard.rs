use crate::inputs::{InputSmoother, InputsHandle, VehicleInputs, PEDAL_RANGE, STEERING_RANGE};
use crate::Result;
use std::sync::mpsc::{Receiver, TryRecvError};

/// An arrow key press.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
}

/// Drives a vehicle from arrow key presses.
///
/// Key presses arrive over a channel from whatever owns the terminal or window.
/// Each press nudges a target input, and the actual inputs chase the targets
/// at a limited rate during [KeyboardController::advance].
#[derive(Debug)]
pub struct KeyboardController {
    keys: Receiver<Key>,
    connected: bool,
    targets: VehicleInputs,
    key_deltas: VehicleInputs,
    smoother: InputSmoother,
    inputs: InputsHandle,
}

impl KeyboardController {
    /// Creates a controller smoothing over the given render interval.
    pub fn new(keys: Receiver<Key>, inputs: InputsHandle, render_step_size: f64) -> Self {
        let smoother = InputSmoother::for_render_step(render_step_size);
        Self {
            keys,
            connected: true,
            targets: inputs.get(),
            key_deltas: smoother.deltas,
            smoother,
            inputs,
        }
    }

    /// Sets how far each key press moves the targets.
    pub fn with_key_deltas(mut self, deltas: VehicleInputs) -> Self {
        self.key_deltas = deltas;
        self
    }

    pub fn with_smoother(mut self, smoother: InputSmoother) -> Self {
        self.smoother = smoother;
        self
    }

    /// The inputs the controller is moving toward.
    pub fn targets(&self) -> VehicleInputs {
        self.targets
    }

    /// Applies a single key press to the targets.
    pub fn press(&mut self, key: Key) {
        let d = self.key_deltas;
        let t = &mut self.targets;
        match key {
            Key::Up => {
                t.throttle = PEDAL_RANGE.clamp(t.throttle + d.throttle);
                if t.throttle > 0.0 {
                    t.braking = PEDAL_RANGE.clamp(t.braking - 3.0 * d.braking);
                }
            }
            Key::Down => {
                t.throttle = PEDAL_RANGE.clamp(t.throttle - 3.0 * d.throttle);
                if t.throttle <= 0.0 {
                    t.braking = PEDAL_RANGE.clamp(t.braking + d.braking);
                }
            }
            Key::Left => t.steering = STEERING_RANGE.clamp(t.steering + d.steering),
            Key::Right => t.steering = STEERING_RANGE.clamp(t.steering - d.steering),
        }
    }

    /// Drains pending key presses without blocking.
    pub fn synchronize(&mut self, _time: f64) -> Result<()> {
        while self.connected {
            match self.keys.try_recv() {
                Ok(key) => self.press(key),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    log::warn!("Keyboard disconnected, holding the current targets");
                    self.connected = false;
                }
            }
        }
        Ok(())
    }

    pub fn advance(&mut self, step: f64) -> Result<()> {
        let next = self.smoother.advance(self.inputs.get(), self.targets, step);
        self.inputs.set(next.clamped());
        Ok(())
    }

    pub fn inputs(&self) -> VehicleInputs {
        self.inputs.get()
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }
}
