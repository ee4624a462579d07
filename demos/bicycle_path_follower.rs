//! Drives a kinematic bicycle around the oval track with a PID path follower.
//!
//! Usage: `cargo run --example bicycle_path_follower [telemetry.csv]`

use std::cell::RefCell;
use std::f64::consts::FRAC_PI_2;
use std::rc::Rc;
use wa_sim::controller::PathFollower;
use wa_sim::visualization::LogVisualization;
use wa_sim::*;

fn main() -> Result<()> {
    env_logger::builder()
        .target(env_logger::Target::Stdout)
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let data = DataDirectory::new(concat!(env!("CARGO_MANIFEST_DIR"), "/data"));
    let config = SimulationConfig::from_json_file(&data, "simulation.json")?;
    let clock = SimulationClock::from_config(&config)?;

    let environment = Environment::from_json_file(&data, "environments/oval.json")?;
    let path = Rc::new(create_path_from_json(&data, "paths/oval.json")?);

    let inputs = InputsHandle::default();
    let vehicle = KinematicBicycle::from_json_file(&data, "vehicles/sedan.json", inputs.clone())?
        .with_initial_state(VehicleState::at(40.0, 0.0, FRAC_PI_2));
    let state = vehicle.state_handle();

    let controller = PathFollower::new(path, state.clone(), inputs.clone());
    let recorder = Rc::new(RefCell::new(TelemetryRecorder::new()));

    let mut sim = SimulationManager::new(clock.clone());
    sim.add(environment);
    sim.add(vehicle);
    sim.add(
        VisualizationComponent::for_clock(recorder.clone(), state.clone(), inputs.clone(), &clock)
            .with_name("telemetry"),
    );
    sim.add(
        VisualizationComponent::for_clock(LogVisualization, state.clone(), inputs, &clock)
            .with_name("log"),
    );
    sim.add(Controller::from(controller));
    sim.run()?;

    let end = state.get();
    log::info!(
        "Finished at ({:.2}, {:.2}) travelling {:.2} m/s",
        end.x,
        end.y,
        end.v
    );
    if let Some(out) = std::env::args().nth(1) {
        recorder.borrow().save_csv(out)?;
    }
    Ok(())
}
