//! Replays a table of driver commands on a kinematic bicycle.
//!
//! Usage: `cargo run --example scripted_drive [commands.csv]`

use wa_sim::controller::ScriptedController;
use wa_sim::visualization::LogVisualization;
use wa_sim::*;

fn main() -> Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let data = DataDirectory::new(concat!(env!("CARGO_MANIFEST_DIR"), "/data"));
    let commands = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "commands/lane_change.csv".into());

    let inputs = InputsHandle::default();
    let vehicle = KinematicBicycle::from_json_file(&data, "vehicles/sedan.json", inputs.clone())?;
    let state = vehicle.state_handle();
    let script = ScriptedController::from_csv_file(&data, &commands, inputs.clone())?;

    let clock = SimulationClock::new(1e-3, 0.5, None)?;
    let mut sim = SimulationManager::new(clock.clone());
    sim.add(vehicle);
    sim.add(VisualizationComponent::for_clock(
        LogVisualization,
        state.clone(),
        inputs,
        &clock,
    ));
    sim.add(Controller::from(script));
    sim.run()?;

    let end = state.get();
    log::info!(
        "Script finished at t={:.2}: ({:.2}, {:.2}) yaw {:.2} rad, {:.2} m/s",
        sim.time(),
        end.x,
        end.y,
        end.yaw,
        end.v
    );
    Ok(())
}
