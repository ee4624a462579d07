//! Vehicle and tire parameter files.

use crate::data::DataDirectory;
use crate::util::Interval;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

/// The default steering angle range in rad.
pub const DEFAULT_STEERING: Interval<f64> = Interval::new(-0.5, 0.5);

/// The validated physical parameters of a vehicle.
#[derive(Clone, Debug, PartialEq)]
pub struct VehicleParams {
    /// Mass in kg.
    pub mass: f64,
    /// Engine/drivetrain rotational inertia in kg m^2.
    ///
    /// Kept for vehicle files shared with dynamic models. The kinematic bicycle
    /// treats the drivetrain as rigid and never reads it.
    pub inertia: Option<f64>,
    /// Distance from the centre of mass to the front axle in m.
    pub front_axle: f64,
    /// Distance from the centre of mass to the rear axle in m.
    pub rear_axle: f64,
    pub gear_ratio: f64,
    /// Effective rolling radius of the driven wheels in m.
    pub effective_radius: f64,
    /// Engine torque map `T(w) = a0 + a1 w + a2 w^2`.
    pub torque_coefficients: [f64; 3],
    /// Aerodynamic drag coefficient, drag = `c_a v^2`.
    pub aerodynamic_coefficient: f64,
    /// Rolling resistance coefficient, resistance = `c_rl m g`.
    pub friction_coefficient: f64,
    /// Maximum drive force at the wheels in N.
    pub max_force: f64,
    /// Maximum brake force in N.
    pub max_braking_force: f64,
    /// Steering angle range in rad.
    pub steering: Interval<f64>,
    pub throttle: Interval<f64>,
    pub braking: Interval<f64>,
}

impl VehicleParams {
    /// The distance between the axles in m.
    pub fn wheelbase(&self) -> f64 {
        self.front_axle + self.rear_axle
    }

    /// Loads the "Vehicle Properties" section of a vehicle file.
    pub fn from_json_file(data: &DataDirectory, name: impl AsRef<Path>) -> Result<Self> {
        VehicleSpec::from_json_file(data, name)?.params()
    }

    /// Validates a raw properties record.
    pub fn from_properties(props: &VehicleProperties) -> Result<Self> {
        let require = |value: Option<f64>, key: &str| {
            value.ok_or_else(|| Error::config("vehicle", format!("missing \"{}\"", key)))
        };

        let (front_axle, rear_axle) = match (props.wheelbase, props.front_axle, props.rear_axle) {
            (_, Some(front), Some(rear)) => (front, rear),
            // A bare wheelbase puts the reference point on the rear axle
            (Some(wheelbase), None, None) => (wheelbase, 0.0),
            _ => {
                return Err(Error::config(
                    "vehicle",
                    "expected \"Wheelbase\" or both \"Front Axle Distance\" and \"Rear Axle Distance\"",
                ))
            }
        };

        let max_force = require(props.max_force, "Max Force")?;
        let params = Self {
            mass: require(props.mass, "Mass")?,
            inertia: props.inertia,
            front_axle,
            rear_axle,
            gear_ratio: require(props.gear_ratio, "Gear Ratio")?,
            effective_radius: require(props.effective_radius, "Effective Radius")?,
            torque_coefficients: props
                .torque_coefficients
                .ok_or_else(|| Error::config("vehicle", "missing \"Torque Coefficients\""))?,
            aerodynamic_coefficient: props.aerodynamic_coefficient.unwrap_or(0.0),
            friction_coefficient: props.friction_coefficient.unwrap_or(0.0),
            max_force,
            max_braking_force: props.max_braking_force.unwrap_or(max_force),
            steering: props.steering.unwrap_or(DEFAULT_STEERING),
            throttle: props.throttle.unwrap_or(Interval::new(0.0, 1.0)),
            braking: props.braking.unwrap_or(Interval::new(0.0, 1.0)),
        };
        params.validate()?;
        Ok(params)
    }

    fn validate(&self) -> Result<()> {
        let positive = [
            ("Mass", self.mass),
            ("Gear Ratio", self.gear_ratio),
            ("Effective Radius", self.effective_radius),
            ("wheelbase", self.wheelbase()),
        ];
        let inertia = self.inertia.map(|inertia| ("Inertia", inertia));
        for (key, value) in positive.into_iter().chain(inertia) {
            if !(value.is_finite() && value > 0.0) {
                return Err(Error::config(
                    "vehicle",
                    format!("\"{}\" must be positive, got {}", key, value),
                ));
            }
        }

        let non_negative = [
            ("Front Axle Distance", self.front_axle),
            ("Rear Axle Distance", self.rear_axle),
            ("Aerodynamic Coefficient", self.aerodynamic_coefficient),
            ("Friction Coefficient", self.friction_coefficient),
            ("Max Force", self.max_force),
            ("Max Braking Force", self.max_braking_force),
        ];
        for (key, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(Error::config(
                    "vehicle",
                    format!("\"{}\" must be non-negative, got {}", key, value),
                ));
            }
        }

        let bounds = [
            ("Steering", self.steering),
            ("Throttle", self.throttle),
            ("Braking", self.braking),
        ];
        for (key, range) in bounds {
            if !range.is_ordered() {
                return Err(Error::config(
                    "vehicle",
                    format!("\"{}\" has min greater than max: {:?}", key, range),
                ));
            }
        }
        Ok(())
    }

    /// Converts back to a raw properties record, always writing both axle distances.
    pub fn to_properties(&self) -> VehicleProperties {
        VehicleProperties {
            mass: Some(self.mass),
            inertia: self.inertia,
            wheelbase: None,
            front_axle: Some(self.front_axle),
            rear_axle: Some(self.rear_axle),
            gear_ratio: Some(self.gear_ratio),
            effective_radius: Some(self.effective_radius),
            torque_coefficients: Some(self.torque_coefficients),
            aerodynamic_coefficient: Some(self.aerodynamic_coefficient),
            friction_coefficient: Some(self.friction_coefficient),
            max_force: Some(self.max_force),
            max_braking_force: Some(self.max_braking_force),
            steering: Some(self.steering),
            throttle: Some(self.throttle),
            braking: Some(self.braking),
        }
    }
}

/// The "Vehicle Properties" section of a vehicle file, as written.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VehicleProperties {
    #[serde(rename = "Mass", default, skip_serializing_if = "Option::is_none")]
    pub mass: Option<f64>,
    #[serde(rename = "Inertia", default, skip_serializing_if = "Option::is_none")]
    pub inertia: Option<f64>,
    #[serde(rename = "Wheelbase", default, skip_serializing_if = "Option::is_none")]
    pub wheelbase: Option<f64>,
    #[serde(
        rename = "Front Axle Distance",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub front_axle: Option<f64>,
    #[serde(
        rename = "Rear Axle Distance",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub rear_axle: Option<f64>,
    #[serde(rename = "Gear Ratio", default, skip_serializing_if = "Option::is_none")]
    pub gear_ratio: Option<f64>,
    #[serde(
        rename = "Effective Radius",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub effective_radius: Option<f64>,
    #[serde(
        rename = "Torque Coefficients",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub torque_coefficients: Option<[f64; 3]>,
    #[serde(
        rename = "Aerodynamic Coefficient",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub aerodynamic_coefficient: Option<f64>,
    #[serde(
        rename = "Friction Coefficient",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub friction_coefficient: Option<f64>,
    #[serde(rename = "Max Force", default, skip_serializing_if = "Option::is_none")]
    pub max_force: Option<f64>,
    #[serde(
        rename = "Max Braking Force",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub max_braking_force: Option<f64>,
    #[serde(rename = "Steering", default, skip_serializing_if = "Option::is_none")]
    pub steering: Option<Interval<f64>>,
    #[serde(rename = "Throttle", default, skip_serializing_if = "Option::is_none")]
    pub throttle: Option<Interval<f64>>,
    #[serde(rename = "Braking", default, skip_serializing_if = "Option::is_none")]
    pub braking: Option<Interval<f64>>,
}

/// A vehicle file.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VehicleSpec {
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(rename = "Type", default)]
    pub kind: String,
    #[serde(rename = "Template", default)]
    pub template: String,
    #[serde(rename = "Vehicle Properties", default)]
    pub properties: Option<VehicleProperties>,
    /// Free-form properties for visualizers, such as mesh files.
    #[serde(
        rename = "Visualization Properties",
        default,
        skip_serializing_if = "Map::is_empty"
    )]
    pub visualization: Map<String, Value>,
}

impl VehicleSpec {
    pub fn from_json_file(data: &DataDirectory, name: impl AsRef<Path>) -> Result<Self> {
        let name = name.as_ref();
        let spec: Self = data.read_json(name)?;
        if !spec.kind.is_empty() && spec.kind != "Vehicle" {
            return Err(Error::config(
                "vehicle",
                format!("{} has type \"{}\", expected \"Vehicle\"", name.display(), spec.kind),
            ));
        }
        log::info!("Loaded vehicle \"{}\" ({})", spec.name, spec.template);
        Ok(spec)
    }

    /// Validates the vehicle properties.
    pub fn params(&self) -> Result<VehicleParams> {
        let props = self
            .properties
            .as_ref()
            .ok_or_else(|| Error::config("vehicle", "missing \"Vehicle Properties\""))?;
        VehicleParams::from_properties(props)
    }
}

/// A tire file. The parameters are kept as written for an external engine.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TireSpec {
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(rename = "Type", default)]
    pub kind: String,
    #[serde(rename = "Template", default)]
    pub template: String,
    #[serde(rename = "Design")]
    pub design: TireDesign,
    #[serde(rename = "Parameters", default)]
    pub parameters: Map<String, Value>,
    #[serde(rename = "Visualization", default)]
    pub visualization: Map<String, Value>,
}

/// The physical design of a tire.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TireDesign {
    /// Mass in kg.
    #[serde(rename = "Mass")]
    pub mass: f64,
    /// Principal moments of inertia in kg m^2.
    #[serde(rename = "Inertia")]
    pub inertia: [f64; 3],
    /// Unloaded radius in m.
    #[serde(rename = "Radius", alias = "Unloaded Radius")]
    pub radius: f64,
    /// Width in m.
    #[serde(rename = "Width")]
    pub width: f64,
}

impl TireSpec {
    pub fn from_json_file(data: &DataDirectory, name: impl AsRef<Path>) -> Result<Self> {
        let spec: Self = data.read_json(name)?;
        spec.validate()?;
        log::info!("Loaded tire \"{}\" ({})", spec.name, spec.template);
        Ok(spec)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.kind.is_empty() && self.kind != "Tire" {
            return Err(Error::config(
                "tire",
                format!("type \"{}\", expected \"Tire\"", self.kind),
            ));
        }
        let d = &self.design;
        if !(d.mass > 0.0 && d.radius > 0.0 && d.width > 0.0) {
            return Err(Error::config(
                "tire",
                "\"Mass\", \"Radius\" and \"Width\" must be positive",
            ));
        }
        if d.inertia.iter().any(|i| !(*i > 0.0)) {
            return Err(Error::config("tire", "\"Inertia\" must be positive"));
        }
        Ok(())
    }

    /// Gets a numeric entry of the "Parameters" section.
    pub fn parameter(&self, key: &str) -> Option<f64> {
        self.parameters.get(key).and_then(Value::as_f64)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const GO_KART: &str = r#"{
        "Name": "GoKart",
        "Type": "Vehicle",
        "Template": "KinematicBicycle",
        "Vehicle Properties": {
            "Mass": 150.0,
            "Inertia": 0.5,
            "Wheelbase": 1.0,
            "Gear Ratio": 0.3,
            "Effective Radius": 0.3,
            "Torque Coefficients": [100.0, 0.1, -0.1],
            "Aerodynamic Coefficient": 0.5,
            "Friction Coefficient": 0.02,
            "Max Force": 1500.0
        },
        "Visualization Properties": {
            "Mesh": "vehicles/GoKart/GoKart.obj"
        }
    }"#;

    fn params(json: &str) -> Result<VehicleParams> {
        serde_json::from_str::<VehicleSpec>(json).unwrap().params()
    }

    #[test]
    fn loads_with_defaults() {
        let params = params(GO_KART).unwrap();
        assert_eq!(params.mass, 150.0);
        assert_eq!(params.wheelbase(), 1.0);
        assert_eq!(params.rear_axle, 0.0);
        assert_eq!(params.max_braking_force, 1500.0);
        assert_eq!(params.steering, DEFAULT_STEERING);
        assert_eq!(params.throttle, Interval::new(0.0, 1.0));
    }

    #[test]
    fn round_trips_through_json() {
        let params = params(GO_KART).unwrap();
        let spec = VehicleSpec {
            name: "GoKart".into(),
            kind: "Vehicle".into(),
            template: "KinematicBicycle".into(),
            properties: Some(params.to_properties()),
            visualization: Map::new(),
        };
        let json = serde_json::to_string_pretty(&spec).unwrap();
        let back: VehicleSpec = serde_json::from_str(&json).unwrap();
        assert_eq!(back, spec);
        assert_eq!(back.params().unwrap(), params);
    }

    #[test]
    fn missing_wheelbase_is_rejected() {
        let json = GO_KART.replace("\"Wheelbase\": 1.0,", "");
        assert!(matches!(params(&json), Err(Error::Configuration { .. })));

        let json = GO_KART.replace(
            "\"Wheelbase\": 1.0,",
            "\"Front Axle Distance\": 0.6, \"Rear Axle Distance\": 0.4,",
        );
        let params = params(&json).unwrap();
        assert_eq!(params.front_axle, 0.6);
        assert_eq!(params.wheelbase(), 1.0);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let json = GO_KART.replace("\"Mass\": 150.0", "\"Mass\": -1.0");
        assert!(matches!(params(&json), Err(Error::Configuration { .. })));

        let json = GO_KART.replace(
            "\"Max Force\": 1500.0",
            "\"Max Force\": 1500.0, \"Steering\": [0.5, -0.5]",
        );
        assert!(matches!(params(&json), Err(Error::Configuration { .. })));

        let spec: VehicleSpec = serde_json::from_str(r#"{"Name": "Empty"}"#).unwrap();
        assert!(matches!(spec.params(), Err(Error::Configuration { .. })));
    }

    #[test]
    fn inertia_is_optional() {
        assert_eq!(params(GO_KART).unwrap().inertia, Some(0.5));

        let json = GO_KART.replace("\"Inertia\": 0.5,", "");
        let params_without = params(&json).unwrap();
        assert_eq!(params_without.inertia, None);
        assert!(params_without.to_properties().inertia.is_none());

        let json = GO_KART.replace("\"Inertia\": 0.5", "\"Inertia\": 0.0");
        assert!(matches!(params(&json), Err(Error::Configuration { .. })));
    }

    #[test]
    fn tire_sections() {
        let json = r#"{
            "Name": "GoKart Tire",
            "Type": "Tire",
            "Template": "TMeasyTire",
            "Design": {
                "Mass": 2.0,
                "Inertia": [0.05, 0.09, 0.05],
                "Unloaded Radius": 0.14,
                "Width": 0.2
            },
            "Parameters": {"Longitudinal Stiffness": 2e5, "Comment": "front"},
            "Visualization": {"Mesh Filename": "tire.obj"}
        }"#;
        let tire: TireSpec = serde_json::from_str(json).unwrap();
        tire.validate().unwrap();
        assert_eq!(tire.design.radius, 0.14);
        assert_eq!(tire.parameter("Longitudinal Stiffness"), Some(2e5));
        assert_eq!(tire.parameter("Comment"), None);
        assert_eq!(tire.parameter("Missing"), None);

        let mut heavy = tire.clone();
        heavy.design.width = 0.0;
        assert!(matches!(heavy.validate(), Err(Error::Configuration { .. })));
    }
}
