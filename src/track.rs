//! Tracks: a centerline with a boundary on either side.

use crate::data::DataDirectory;
use crate::environment::Body;
use crate::math::{planar, OffsetCurve, ParametricCurve, Point3d, Vector3d};
use crate::path::{create_path_from_json, Path};
use crate::{Error, Result};
use cgmath::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path as FilePath;

/// A centerline path with left and right boundaries.
///
/// Left and right are relative to the direction of travel along the centerline.
#[derive(Clone, Debug)]
pub struct Track {
    center: Path,
    left: Path,
    right: Path,
    width: f64,
    style: TrackStyle,
}

impl Track {
    /// Builds a track whose boundaries lie `width / 2` either side of `center`.
    ///
    /// The boundaries have one sample for each sample of the centerline.
    pub fn constant_width(center: Path, width: f64) -> Result<Self> {
        if !(width.is_finite() && width > 0.0) {
            return Err(Error::config(
                "track",
                format!("width must be positive, got {}", width),
            ));
        }
        if center.is_empty() {
            return Err(Error::EmptyPath);
        }

        let half = 0.5 * width;
        let left = Self::boundary(&center, half);
        let right = Self::boundary(&center, -half);
        Ok(Self {
            center,
            left,
            right,
            width,
            style: TrackStyle::default(),
        })
    }

    fn boundary(center: &Path, offset: f64) -> Path {
        let curve = OffsetCurve::new(center, offset);
        let mut points: Vec<Point3d> = (0..center.len()).map(|i| curve.sample(i as f64)).collect();
        if center.is_closed() {
            let n = points.len();
            points[n - 1] = points[0];
        }
        Path::from_samples(points, center.is_closed())
    }

    /// Sets how the track is drawn.
    pub fn with_style(mut self, style: TrackStyle) -> Result<Self> {
        style.validate()?;
        self.style = style;
        Ok(self)
    }

    pub fn center(&self) -> &Path {
        &self.center
    }

    pub fn left(&self) -> &Path {
        &self.left
    }

    pub fn right(&self) -> &Path {
        &self.right
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn style(&self) -> &TrackStyle {
        &self.style
    }

    /// Checks whether `point` lies between the boundaries, level with the
    /// nearest centerline sample.
    ///
    /// The point is inside when its projection onto the segment joining the
    /// left and right boundary samples falls within that segment.
    pub fn inside_boundaries(&self, point: Point3d) -> Result<bool> {
        let idx = self.center.calc_closest_point(point)?.index;
        let (a, b, c) = (point, self.left.points()[idx], self.right.points()[idx]);
        let bc = (b - c).magnitude2();
        let ca = (c - a).magnitude2();
        let ab = (a - b).magnitude2();
        Ok(bc + ca >= ab && bc + ab >= ca)
    }

    /// The planar distance from `point` to the nearest centerline sample.
    pub fn distance_from_center(&self, point: Point3d) -> Result<f64> {
        let closest = self.center.calc_closest_point(point)?;
        Ok(planar(closest.point).distance(planar(point)))
    }

    /// Bodies for the markers placed along each path, as described by the style.
    pub fn marker_bodies(&self) -> Vec<Body> {
        let mut bodies = vec![];
        let paths = [
            ("center", &self.center, &self.style.center),
            ("left", &self.left, &self.style.left),
            ("right", &self.right, &self.style.right),
        ];
        for (name, path, style) in paths {
            if let Some(marker) = style.as_ref().and_then(|s| s.object.as_ref()) {
                bodies.extend(marker.place_along(name, path));
            }
        }
        bodies
    }
}

/// A track file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrackSpec {
    #[serde(rename = "Type")]
    pub kind: String,
    #[serde(rename = "Template")]
    pub template: String,
    /// A path file describing the centerline.
    #[serde(rename = "Center Input File")]
    pub center_file: String,
    #[serde(rename = "Width")]
    pub width: f64,
    #[serde(rename = "Visualization", default)]
    pub style: TrackStyle,
}

/// Colours and markers for each path of a track.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackStyle {
    #[serde(rename = "Center", default, skip_serializing_if = "Option::is_none")]
    pub center: Option<PathStyle>,
    #[serde(rename = "Left", default, skip_serializing_if = "Option::is_none")]
    pub left: Option<PathStyle>,
    #[serde(rename = "Right", default, skip_serializing_if = "Option::is_none")]
    pub right: Option<PathStyle>,
}

impl TrackStyle {
    fn validate(&self) -> Result<()> {
        for style in [&self.center, &self.left, &self.right].into_iter().flatten() {
            if let Some(marker) = &style.object {
                marker.validate()?;
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PathStyle {
    #[serde(rename = "Color", default, skip_serializing_if = "Option::is_none")]
    pub color: Option<[f64; 3]>,
    /// Objects placed along the path.
    #[serde(rename = "Object", default, skip_serializing_if = "Option::is_none")]
    pub object: Option<MarkerSpec>,
}

/// How densely markers are placed along a path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarkerMode {
    /// Back to back.
    #[serde(alias = "Solid")]
    Continuous,
    /// 3 m apart, like dashed lane lines.
    Dashed,
    /// 6 m apart.
    Spread,
}

/// Objects placed along a path, such as cones or lane markings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarkerSpec {
    #[serde(rename = "Size")]
    pub size: [f64; 3],
    #[serde(rename = "Color", default, skip_serializing_if = "Option::is_none")]
    pub color: Option<[f64; 3]>,
    /// Alternating colours; both or neither must be set.
    #[serde(rename = "Color #1", default, skip_serializing_if = "Option::is_none")]
    pub color1: Option<[f64; 3]>,
    #[serde(rename = "Color #2", default, skip_serializing_if = "Option::is_none")]
    pub color2: Option<[f64; 3]>,
    #[serde(rename = "Mode", default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<MarkerMode>,
}

impl MarkerSpec {
    fn validate(&self) -> Result<()> {
        match (self.color, self.color1, self.color2) {
            (Some(_), None, None) | (None, Some(_), Some(_)) | (None, None, None) => {}
            (Some(_), _, _) => {
                return Err(Error::config(
                    "track",
                    "\"Color\" cannot be combined with \"Color #1\" or \"Color #2\"",
                ))
            }
            _ => {
                return Err(Error::config(
                    "track",
                    "\"Color #1\" and \"Color #2\" must be used together",
                ))
            }
        }
        if self.mode.unwrap_or(MarkerMode::Continuous) == MarkerMode::Continuous
            && !(self.size[1] > 0.0)
        {
            return Err(Error::config(
                "track",
                "continuous markers need a positive size along y",
            ));
        }
        Ok(())
    }

    /// The colour of the `i`th marker.
    fn color_of(&self, i: usize) -> Option<[f64; 3]> {
        match (self.color1, self.color2) {
            (Some(a), Some(b)) => Some(if i % 2 == 0 { a } else { b }),
            _ => self.color,
        }
    }

    fn place_along(&self, name: &str, path: &Path) -> Vec<Body> {
        let spacing = match self.mode.unwrap_or(MarkerMode::Continuous) {
            MarkerMode::Continuous => self.size[1],
            MarkerMode::Dashed => 3.0,
            MarkerMode::Spread => 6.0,
        };
        let count = path.length() / spacing;
        let len = path.len();
        let stride = if (len as f64) < count {
            1
        } else {
            usize::max((len as f64 / count) as usize, 1)
        };

        let size = Vector3d::from(self.size);
        (0..len)
            .step_by(stride)
            .enumerate()
            .map(|(n, i)| {
                let dir = path.d_points()[i];
                Body {
                    name: format!("{} marker {}", name, n),
                    position: path.points()[i],
                    size,
                    yaw: f64::atan2(dir.y, dir.x),
                    color: self.color_of(n),
                }
            })
            .collect()
    }
}

/// Loads a track file and the centerline path it references.
pub fn create_track_from_json(data: &DataDirectory, name: impl AsRef<FilePath>) -> Result<Track> {
    let spec: TrackSpec = data.read_json(name)?;
    if spec.kind != "Track" {
        return Err(Error::config(
            "track",
            format!("type \"{}\", expected \"Track\"", spec.kind),
        ));
    }
    if spec.template != "Constant Width Track" {
        return Err(Error::config(
            "track",
            format!("unknown template \"{}\"", spec.template),
        ));
    }
    let center = create_path_from_json(data, &spec.center_file)?;
    let track = Track::constant_width(center, spec.width)?.with_style(spec.style)?;
    log::info!(
        "Loaded track of width {} m and length {:.1} m",
        track.width(),
        track.center().length()
    );
    Ok(track)
}
