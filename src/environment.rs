//! The static world a vehicle drives in.

use crate::component::{Component, Stage};
use crate::data::DataDirectory;
use crate::math::{Point3d, Vector3d};
use crate::track::{create_track_from_json, Track};
use crate::{BodyId, Error, Result};
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;
use std::collections::HashMap;
use std::path::Path;

/// A static box-shaped object in the world.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub name: String,
    /// The centre of the body.
    pub position: Point3d,
    /// The extents of the body along each axis, in m.
    pub size: Vector3d,
    /// The heading about the z-axis, in rad.
    pub yaw: f64,
    /// An RGB colour with channels in `[0, 1]`.
    pub color: Option<[f64; 3]>,
}

/// The world around the vehicles: bodies and an optional track.
///
/// The environment does not change during a simulation, so it takes no part
/// in the synchronize and advance phases.
#[derive(Default)]
pub struct Environment {
    bodies: SlotMap<BodyId, Body>,
    names: HashMap<String, BodyId>,
    track: Option<Track>,
}

impl Environment {
    pub fn new() -> Self {
        Default::default()
    }

    /// Loads an environment file, along with any track it references.
    pub fn from_json_file(data: &DataDirectory, name: impl AsRef<Path>) -> Result<Self> {
        let spec: EnvironmentSpec = data.read_json(name)?;
        if !spec.kind.is_empty() && spec.kind != "Environment" {
            return Err(Error::config(
                "environment",
                format!("type \"{}\", expected \"Environment\"", spec.kind),
            ));
        }

        let mut env = Self::new();
        for (i, object) in spec.objects.into_iter().enumerate() {
            env.add_body(Body {
                name: object.name.unwrap_or_else(|| format!("object {}", i)),
                position: object.position.map(Point3d::from).unwrap_or(Point3d::new(0.0, 0.0, 0.0)),
                size: Vector3d::from(object.size),
                yaw: object.yaw,
                color: object.color,
            });
        }
        if let Some(track) = spec.track {
            let track = create_track_from_json(data, &track.file)?;
            env.set_track(track);
        }
        log::info!(
            "Loaded environment with {} bodies{}",
            env.bodies.len(),
            if env.track.is_some() { " and a track" } else { "" }
        );
        Ok(env)
    }

    /// Adds a body. A body with the same name as an existing body replaces it
    /// in name lookups.
    pub fn add_body(&mut self, body: Body) -> BodyId {
        let name = body.name.clone();
        let id = self.bodies.insert(body);
        self.names.insert(name, id);
        id
    }

    pub fn remove_body(&mut self, id: BodyId) -> Option<Body> {
        let body = self.bodies.remove(id)?;
        if self.names.get(&body.name) == Some(&id) {
            self.names.remove(&body.name);
        }
        Some(body)
    }

    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.bodies.get(id)
    }

    /// Finds a body by name.
    pub fn body_by_name(&self, name: &str) -> Option<&Body> {
        self.names.get(name).and_then(|id| self.bodies.get(*id))
    }

    /// Returns an iterator over all the bodies.
    pub fn iter_bodies(&self) -> impl Iterator<Item = (BodyId, &Body)> {
        self.bodies.iter()
    }

    /// Sets the track, adding its markers as bodies.
    pub fn set_track(&mut self, track: Track) {
        for body in track.marker_bodies() {
            self.add_body(body);
        }
        self.track = Some(track);
    }

    pub fn track(&self) -> Option<&Track> {
        self.track.as_ref()
    }
}

impl Component for Environment {
    fn name(&self) -> &str {
        "environment"
    }

    fn stage(&self) -> Stage {
        Stage::Environment
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
struct EnvironmentSpec {
    #[serde(rename = "Type", default)]
    kind: String,
    #[serde(rename = "Objects", default)]
    objects: Vec<ObjectSpec>,
    #[serde(rename = "Track", default)]
    track: Option<TrackRef>,
}

#[derive(Clone, Debug, Deserialize)]
struct ObjectSpec {
    #[serde(rename = "Name", default)]
    name: Option<String>,
    #[serde(rename = "Size")]
    size: [f64; 3],
    #[serde(rename = "Position", default)]
    position: Option<[f64; 3]>,
    #[serde(rename = "Yaw", default)]
    yaw: f64,
    #[serde(rename = "Color", default)]
    color: Option<[f64; 3]>,
}

#[derive(Clone, Debug, Deserialize)]
struct TrackRef {
    #[serde(rename = "Track Input File")]
    file: String,
}

#[cfg(test)]
mod test {
    use super::*;

    fn cone(name: &str, x: f64) -> Body {
        Body {
            name: name.into(),
            position: Point3d::new(x, 0.0, 0.0),
            size: Vector3d::new(0.3, 0.3, 0.5),
            yaw: 0.0,
            color: Some([1.0, 0.5, 0.0]),
        }
    }

    #[test]
    fn bodies_by_name() {
        let mut env = Environment::new();
        let a = env.add_body(cone("a", 1.0));
        env.add_body(cone("b", 2.0));
        assert_eq!(env.body_by_name("b").unwrap().position.x, 2.0);
        assert_eq!(env.iter_bodies().count(), 2);
        assert_eq!(env.remove_body(a).unwrap().name, "a");
        assert!(env.body_by_name("a").is_none());
        assert!(env.body(a).is_none());
    }

    #[test]
    fn parses_objects() {
        let spec: EnvironmentSpec = serde_json::from_str(
            r#"{
                "Type": "Environment",
                "Template": "Simple",
                "Objects": [
                    {"Name": "barrier", "Size": [10, 1, 1], "Position": [0, 5, 0.5]},
                    {"Size": [1, 1, 1]}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(spec.objects.len(), 2);
        assert_eq!(spec.objects[0].position, Some([0.0, 5.0, 0.5]));
        assert!(spec.track.is_none());
    }
}
