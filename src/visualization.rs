//! Rendering hooks and telemetry capture.

use crate::clock::SimulationClock;
use crate::component::{Advance, Component, Poll, Stage, Synchronize};
use crate::inputs::{InputsHandle, VehicleInputs};
use crate::vehicle::{StateHandle, VehicleState};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::io::Write;
use std::path::Path;
use std::rc::Rc;

/// A snapshot handed to a [Visualization] on each rendered step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub time: f64,
    /// The number of physics steps taken before this frame.
    pub step: u64,
    pub state: VehicleState,
    pub inputs: VehicleInputs,
}

/// Something that displays or records frames.
pub trait Visualization {
    fn render(&mut self, frame: &Frame) -> Result<()>;

    /// False once the sink wants the simulation to stop, e.g. a closed window.
    fn is_ok(&self) -> bool {
        true
    }
}

/// Lets the caller keep a handle to a sink owned by the simulation.
impl<V: Visualization> Visualization for Rc<RefCell<V>> {
    fn render(&mut self, frame: &Frame) -> Result<()> {
        self.borrow_mut().render(frame)
    }

    fn is_ok(&self) -> bool {
        self.borrow().is_ok()
    }
}

/// Feeds a [Visualization] at the render cadence.
///
/// The component advances a private copy of the simulation clock and renders
/// whenever [SimulationClock::should_render] holds. Frames in between are
/// dropped rather than queued.
pub struct VisualizationComponent<V> {
    name: String,
    sink: V,
    vehicle: StateHandle,
    inputs: InputsHandle,
    clock: SimulationClock,
}

impl<V: Visualization> VisualizationComponent<V> {
    /// Renders once every `render_steps` steps.
    pub fn new(sink: V, vehicle: StateHandle, inputs: InputsHandle, render_steps: u64) -> Self {
        let clock = SimulationClock::default().with_render_steps(render_steps);
        Self::with_clock(sink, vehicle, inputs, clock)
    }

    /// Renders at the clock's render interval.
    pub fn for_clock(
        sink: V,
        vehicle: StateHandle,
        inputs: InputsHandle,
        clock: &SimulationClock,
    ) -> Self {
        Self::with_clock(sink, vehicle, inputs, clock.clone())
    }

    fn with_clock(
        sink: V,
        vehicle: StateHandle,
        inputs: InputsHandle,
        clock: SimulationClock,
    ) -> Self {
        Self {
            name: "visualization".into(),
            sink,
            vehicle,
            inputs,
            clock: clock.restarted(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn sink(&self) -> &V {
        &self.sink
    }

    pub fn into_sink(self) -> V {
        self.sink
    }
}

impl<V: Visualization> Synchronize for VisualizationComponent<V> {
    fn synchronize(&mut self, time: f64) -> Result<()> {
        if !self.clock.should_render() {
            return Ok(());
        }
        self.sink.render(&Frame {
            time,
            step: self.clock.step_number(),
            state: self.vehicle.get(),
            inputs: self.inputs.get(),
        })
    }
}

impl<V: Visualization> Advance for VisualizationComponent<V> {
    fn advance(&mut self, step: f64) -> Result<()> {
        self.clock.advance(step)
    }
}

impl<V: Visualization> Poll for VisualizationComponent<V> {
    fn is_ok(&self) -> bool {
        self.sink.is_ok()
    }
}

impl<V: Visualization> Component for VisualizationComponent<V> {
    fn name(&self) -> &str {
        &self.name
    }

    fn stage(&self) -> Stage {
        Stage::Visualization
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

/// A row of exported telemetry.
#[derive(Serialize)]
struct TelemetryRow {
    time: f64,
    x: f64,
    y: f64,
    yaw: f64,
    v: f64,
    steering: f64,
    throttle: f64,
    braking: f64,
}

impl From<&Frame> for TelemetryRow {
    fn from(frame: &Frame) -> Self {
        Self {
            time: frame.time,
            x: frame.state.x,
            y: frame.state.y,
            yaw: frame.state.yaw,
            v: frame.state.v,
            steering: frame.inputs.steering,
            throttle: frame.inputs.throttle,
            braking: frame.inputs.braking,
        }
    }
}

/// Records every rendered frame.
#[derive(Clone, Debug, Default)]
pub struct TelemetryRecorder {
    frames: Vec<Frame>,
}

impl TelemetryRecorder {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn last(&self) -> Option<&Frame> {
        self.frames.last()
    }

    /// Writes the frames as CSV with the header
    /// `time,x,y,yaw,v,steering,throttle,braking`.
    pub fn write_csv<W: Write>(&self, out: W) -> csv::Result<()> {
        let mut writer = csv::Writer::from_writer(out);
        for frame in &self.frames {
            writer.serialize(TelemetryRow::from(frame))?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Saves the frames to a CSV file.
    pub fn save_csv(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = std::fs::File::create(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.write_csv(file).map_err(|source| Error::Csv {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Saved {} frames to {}", self.frames.len(), path.display());
        Ok(())
    }
}

impl Visualization for TelemetryRecorder {
    fn render(&mut self, frame: &Frame) -> Result<()> {
        self.frames.push(*frame);
        Ok(())
    }
}

/// Logs each frame at debug level.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogVisualization;

impl Visualization for LogVisualization {
    fn render(&mut self, frame: &Frame) -> Result<()> {
        let Frame { time, state, inputs, .. } = frame;
        log::debug!(
            "t={:.3} pos=({:.2}, {:.2}) yaw={:.3} v={:.2} inputs=({:.2}, {:.2}, {:.2})",
            time,
            state.x,
            state.y,
            state.yaw,
            state.v,
            inputs.steering,
            inputs.throttle,
            inputs.braking
        );
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn recorder(render_steps: u64) -> (VisualizationComponent<TelemetryRecorder>, StateHandle) {
        let vehicle = StateHandle::default();
        let c = VisualizationComponent::new(
            TelemetryRecorder::new(),
            vehicle.clone(),
            InputsHandle::new(VehicleInputs::new(0.1, 0.5, 0.0)),
            render_steps,
        );
        (c, vehicle)
    }

    #[test]
    fn renders_on_cadence() {
        let (mut c, _) = recorder(5);
        for i in 0..12 {
            c.synchronize(i as f64 * 0.01).unwrap();
            c.advance(0.01).unwrap();
        }
        let steps: Vec<u64> = c.sink().frames().iter().map(|f| f.step).collect();
        assert_eq!(steps, vec![0, 5, 10]);
        assert_eq!(c.stage(), Stage::Visualization);
    }

    #[test]
    fn follows_the_clock_cadence() {
        let clock = SimulationClock::new(0.01, 0.05, Some(1.0)).unwrap();
        let mut c = VisualizationComponent::for_clock(
            TelemetryRecorder::new(),
            StateHandle::default(),
            InputsHandle::default(),
            &clock,
        );
        let mut reference = clock.clone();
        let mut expected = vec![];
        for _ in 0..12 {
            if reference.should_render() {
                expected.push(reference.step_number());
            }
            c.synchronize(reference.time()).unwrap();
            c.advance(reference.step_size()).unwrap();
            reference.advance(reference.step_size()).unwrap();
        }
        let steps: Vec<u64> = c.sink().frames().iter().map(|f| f.step).collect();
        assert_eq!(steps, expected);
        assert_eq!(steps, vec![0, 5, 10]);
    }

    #[test]
    fn rejects_bad_steps() {
        let (mut c, _) = recorder(1);
        assert!(matches!(c.advance(0.0), Err(Error::InvalidStep(_))));
    }

    #[test]
    fn exports_csv() {
        let (mut c, _) = recorder(1);
        c.synchronize(0.0).unwrap();
        let mut out = vec![];
        c.into_sink().write_csv(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("time,x,y,yaw,v,steering,throttle,braking")
        );
        assert_eq!(lines.next(), Some("0.0,0.0,0.0,0.0,0.0,0.1,0.5,0.0"));
        assert_eq!(lines.next(), None);
    }
}
