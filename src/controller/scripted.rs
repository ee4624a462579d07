use crate::data::DataDirectory;
use crate::inputs::{InputsHandle, VehicleInputs};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;

/// The columns of a command table, in order.
pub const COMMAND_HEADER: [&str; 4] = ["time", "steering", "throttle", "braking"];

/// A driver command that takes effect at a given time.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Command {
    /// When the command takes effect, in s.
    pub time: f64,
    pub steering: f64,
    pub throttle: f64,
    pub braking: f64,
}

impl Command {
    pub fn new(time: f64, steering: f64, throttle: f64, braking: f64) -> Self {
        Self {
            time,
            steering,
            throttle,
            braking,
        }
    }

    pub fn inputs(&self) -> VehicleInputs {
        VehicleInputs::new(self.steering, self.throttle, self.braking)
    }
}

/// Replays a time-ordered table of commands.
///
/// Each synchronize applies the latest command whose time has been reached.
/// After the last command the inputs stay where they were and the controller
/// reports that it is finished, unless told to hold the last command.
#[derive(Clone, Debug)]
pub struct ScriptedController {
    commands: Vec<Command>,
    next: usize,
    hold_after_end: bool,
    inputs: InputsHandle,
}

impl ScriptedController {
    /// Creates a controller from commands sorted by time.
    pub fn new(commands: Vec<Command>, inputs: InputsHandle) -> Result<Self> {
        check_times(&commands, "command table")?;
        Ok(Self {
            commands,
            next: 0,
            hold_after_end: false,
            inputs,
        })
    }

    /// Loads a command table from a CSV file with the header
    /// `time,steering,throttle,braking`.
    pub fn from_csv_file(
        data: &DataDirectory,
        name: impl AsRef<Path>,
        inputs: InputsHandle,
    ) -> Result<Self> {
        let (path, mut reader) = data.csv_reader(name, true)?;
        let commands = read_commands(&mut reader, &path.display().to_string())?;
        log::info!("Loaded {} commands from {}", commands.len(), path.display());
        Self::new(commands, inputs)
    }

    /// Keeps the controller running after its last command.
    pub fn with_hold_after_end(mut self, hold: bool) -> Self {
        self.hold_after_end = hold;
        self
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Returns true while some commands have not yet been applied.
    pub fn has_remaining(&self) -> bool {
        self.next < self.commands.len()
    }

    pub fn synchronize(&mut self, time: f64) -> Result<()> {
        let mut latest = None;
        while let Some(command) = self.commands.get(self.next) {
            if command.time > time {
                break;
            }
            latest = Some(*command);
            self.next += 1;
        }
        if let Some(command) = latest {
            self.inputs.set(command.inputs());
        }
        Ok(())
    }

    pub fn inputs(&self) -> VehicleInputs {
        self.inputs.get()
    }

    pub fn is_ok(&self) -> bool {
        self.hold_after_end || self.has_remaining()
    }
}

fn check_times(commands: &[Command], location: &str) -> Result<()> {
    if let Some(i) = commands.iter().position(|c| !c.time.is_finite()) {
        return Err(Error::data(
            location,
            format!("command {} has a non-finite time", i),
        ));
    }
    for (i, pair) in commands.windows(2).enumerate() {
        if pair[1].time < pair[0].time {
            return Err(Error::data(
                location,
                format!(
                    "command {} at t={} comes before the previous command at t={}",
                    i + 1,
                    pair[1].time,
                    pair[0].time
                ),
            ));
        }
    }
    Ok(())
}

/// Parses a command table, checking the header and every value.
pub fn read_commands<R: Read>(reader: &mut csv::Reader<R>, location: &str) -> Result<Vec<Command>> {
    let header = reader
        .headers()
        .map_err(|e| Error::data(location, e.to_string()))?;
    if header.len() != COMMAND_HEADER.len()
        || header.iter().zip(COMMAND_HEADER).any(|(a, b)| a.trim() != b)
    {
        return Err(Error::data(
            location,
            format!(
                "expected header \"{}\", found \"{}\"",
                COMMAND_HEADER.join(","),
                header.iter().collect::<Vec<_>>().join(",")
            ),
        ));
    }

    let mut commands = vec![];
    for record in reader.records() {
        let record = record.map_err(|e| Error::data(location, e.to_string()))?;
        let line = record.position().map_or(0, |p| p.line());
        let at = || format!("{}:{}", location, line);
        if record.len() != COMMAND_HEADER.len() {
            return Err(Error::data(
                at(),
                format!("expected 4 values, found {}", record.len()),
            ));
        }
        let mut values = [0.0f64; 4];
        for (value, (field, column)) in values.iter_mut().zip(record.iter().zip(COMMAND_HEADER)) {
            let field = field.trim();
            if field.is_empty() {
                return Err(Error::data(at(), format!("missing {}", column)));
            }
            *value = field.parse().map_err(|_| {
                Error::data(at(), format!("{} is not a number: \"{}\"", column, field))
            })?;
            if !value.is_finite() {
                return Err(Error::data(
                    at(),
                    format!("{} is not a finite number: \"{}\"", column, field),
                ));
            }
        }
        let [time, steering, throttle, braking] = values;
        commands.push(Command::new(time, steering, throttle, braking));
    }
    check_times(&commands, location)?;
    Ok(commands)
}
