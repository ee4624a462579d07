use std::path::PathBuf;
use wa_sim::controller::ScriptedController;
use wa_sim::vehicle::TireSpec;
use wa_sim::*;

fn data() -> DataDirectory {
    DataDirectory::new(concat!(env!("CARGO_MANIFEST_DIR"), "/data"))
}

/// A scratch directory unique to one test.
fn scratch(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("wa-sim-{}-{}", name, std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn loads_vehicle_params() {
    let params = VehicleParams::from_json_file(&data(), "vehicles/sedan.json").unwrap();
    assert_eq!(params.mass, 1000.0);
    assert_eq!(params.wheelbase(), 2.5);
    assert_eq!(params.torque_coefficients, [200.0, 1.0, -0.005]);
    assert_eq!(params.steering, Interval::new(-0.5, 0.5));
}

#[test]
fn loads_tire() {
    let tire = TireSpec::from_json_file(&data(), "tires/basic.json").unwrap();
    assert_eq!(tire.design.radius, 0.3);
    assert_eq!(tire.parameter("Load Index"), Some(95.0));
}

#[test]
fn loads_simulation_config() {
    let config = SimulationConfig::from_json_file(&data(), "simulation.json").unwrap();
    let clock = SimulationClock::from_config(&config).unwrap();
    assert_eq!(clock.step_size(), 0.003);
    assert_eq!(clock.end_time(), Some(30.0));
}

#[test]
fn loads_closed_path() {
    let path = create_path_from_json(&data(), "paths/oval.json").unwrap();
    assert!(path.is_closed());
    assert_eq!(path.len(), 500);
    assert_eq!(path.points()[0], path.points()[499]);
    // The perimeter of a 40 x 20 m ellipse is about 193.8 m
    assert!((path.length() - 193.8).abs() < 2.0, "length {}", path.length());
}

#[test]
fn loads_environment_with_track() {
    let env = Environment::from_json_file(&data(), "environments/oval.json").unwrap();
    assert_eq!(env.body_by_name("grandstand").unwrap().size.x, 30.0);
    assert!(env.body_by_name("pit wall").unwrap().color.is_none());
    // Markers from both boundaries
    assert!(env.iter_bodies().count() > 20);

    let track = env.track().unwrap();
    assert_eq!(track.width(), 6.0);
    assert_eq!(track.left().len(), track.center().len());
    assert!(track.inside_boundaries(cgmath::Point3::new(40.0, 1.0, 0.0)).unwrap());
    assert!(!track.inside_boundaries(cgmath::Point3::new(50.0, 0.0, 0.0)).unwrap());
}

#[test]
fn loads_commands() {
    let script = ScriptedController::from_csv_file(
        &data(),
        "commands/lane_change.csv",
        InputsHandle::default(),
    )
    .unwrap();
    assert_eq!(script.commands().len(), 5);
    assert_eq!(script.commands()[3].throttle, 1.0);
}

#[test]
fn missing_files_name_the_path() {
    match VehicleParams::from_json_file(&data(), "vehicles/missing.json") {
        Err(Error::Io { path, .. }) => assert!(path.ends_with("vehicles/missing.json")),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn malformed_files_are_rejected() {
    let dir = scratch("malformed");
    std::fs::write(dir.join("broken.json"), "{ \"Type\": ").unwrap();
    std::fs::write(
        dir.join("commands.csv"),
        "time,steering,throttle,braking\n0,0,0,0\n2,0,0.5,0\n1,0,0,1\n",
    )
    .unwrap();
    std::fs::write(dir.join("points.csv"), "x,y\n0,0\n1,one\n").unwrap();
    std::fs::write(dir.join("infinite.csv"), "x,y\n0,0\ninf,1\n2,NaN\n").unwrap();
    std::fs::write(dir.join("single.csv"), "0,0\n").unwrap();
    std::fs::write(
        dir.join("single.json"),
        r#"{"Type": "Path", "Template": "WASplinePath", "Waypoints Input File": "single.csv"}"#,
    )
    .unwrap();
    let data = DataDirectory::new(&dir);

    assert!(matches!(
        SimulationConfig::from_json_file(&data, "broken.json"),
        Err(Error::Json { .. })
    ));
    assert!(matches!(
        ScriptedController::from_csv_file(&data, "commands.csv", InputsHandle::default()),
        Err(Error::DataFormat { .. })
    ));
    assert!(matches!(
        load_waypoints_from_csv(&data, "points.csv"),
        Err(Error::DataFormat { .. })
    ));
    assert!(matches!(
        load_waypoints_from_csv(&data, "infinite.csv"),
        Err(Error::DataFormat { .. })
    ));
    assert!(matches!(
        create_path_from_json(&data, "single.json"),
        Err(Error::DataFormat { .. })
    ));

    std::fs::remove_dir_all(&dir).unwrap();
}
