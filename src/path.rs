//! Paths through waypoints.

use crate::data::DataDirectory;
use crate::math::{HermiteSpline, ParametricCurve, Point3d, Vector3d};
use crate::util::Interval;
use crate::{Error, Result};
use cgmath::prelude::*;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::path::Path as FilePath;

/// The curvature reported where the path's tangent vanishes.
pub const CURVATURE_SENTINEL: f64 = 1e6;

/// The default number of samples along an interpolated path.
pub const DEFAULT_NUM_POINTS: usize = 100;

/// Options for building a [Path] from waypoints.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PathOptions {
    /// The number of samples along the path.
    pub num_points: usize,
    /// Whether the path loops back to its start.
    pub is_closed: bool,
}

impl Default for PathOptions {
    fn default() -> Self {
        Self {
            num_points: DEFAULT_NUM_POINTS,
            is_closed: false,
        }
    }
}

/// The sample on a path nearest to a query point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClosestPoint {
    pub point: Point3d,
    /// The index of the sample.
    pub index: usize,
    /// The distance from the query point in m.
    pub distance: f64,
}

/// An immutable, densely sampled path.
///
/// Derivatives are taken with respect to the sample index, which is also the
/// parameter of the path's [ParametricCurve] implementation.
#[derive(Clone, Debug)]
pub struct Path {
    waypoints: Vec<Point3d>,
    points: Vec<Point3d>,
    d_points: Vec<Vector3d>,
    dd_points: Vec<Vector3d>,
    lengths: Vec<f64>,
    curvature: Vec<f64>,
    closed: bool,
}

impl Path {
    /// Interpolates a smooth path through `waypoints`.
    ///
    /// A closed path must repeat its first waypoint at the end; if it doesn't
    /// the path is built open.
    pub fn new(waypoints: &[Point3d], options: PathOptions) -> Result<Self> {
        if options.num_points < 2 {
            return Err(Error::config("path", "num_points must be at least 2"));
        }

        let mut closed = options.is_closed;
        if closed && waypoints.first() != waypoints.last() {
            log::warn!(
                "Path declared closed but its first and last waypoints differ; treating it as open"
            );
            closed = false;
        }

        let spline = HermiteSpline::new(waypoints, closed).ok_or_else(|| {
            Error::data(
                "waypoints",
                if closed {
                    "a closed path needs at least three distinct waypoints"
                } else {
                    "a path needs at least two distinct waypoints"
                },
            )
        })?;

        // Parameter distance between consecutive samples
        let h = spline.length() / (options.num_points - 1) as f64;
        let params = (0..options.num_points).map(|i| i as f64 * h);
        let mut points = Vec::with_capacity(options.num_points);
        let mut d_points = Vec::with_capacity(options.num_points);
        let mut dd_points = Vec::with_capacity(options.num_points);
        for u in params {
            points.push(spline.sample(u));
            d_points.push(spline.sample_dt(u) * h);
            dd_points.push(spline.sample_dt2(u) * (h * h));
        }
        if closed {
            // The loop ends exactly where it starts
            let n = points.len();
            points[n - 1] = points[0];
        }

        log::debug!(
            "Built {} path with {} samples from {} waypoints",
            if closed { "closed" } else { "open" },
            points.len(),
            waypoints.len()
        );
        Ok(Self::build(waypoints.to_vec(), points, d_points, dd_points, closed))
    }

    /// Wraps existing samples as a path, estimating derivatives by finite differences.
    ///
    /// A closed path should repeat its first sample at the end.
    pub fn from_samples(points: Vec<Point3d>, closed: bool) -> Self {
        let n = points.len();
        let closed = closed && n > 2;
        let at = |i: isize| -> Point3d {
            if closed {
                // The last sample duplicates the first
                let m = (n - 1) as isize;
                points[i.rem_euclid(m) as usize]
            } else {
                points[i.clamp(0, n as isize - 1) as usize]
            }
        };

        let mut d_points = Vec::with_capacity(n);
        let mut dd_points = Vec::with_capacity(n);
        for i in 0..n as isize {
            let (prev, here, next) = (at(i - 1), at(i), at(i + 1));
            let span = if !closed && (i == 0 || i == n as isize - 1) {
                1.0
            } else {
                2.0
            };
            d_points.push((next - prev) / span);
            dd_points.push(if span == 2.0 {
                (next - here) - (here - prev)
            } else {
                Vector3d::zero()
            });
        }
        Self::build(points.clone(), points, d_points, dd_points, closed)
    }

    fn build(
        waypoints: Vec<Point3d>,
        points: Vec<Point3d>,
        d_points: Vec<Vector3d>,
        dd_points: Vec<Vector3d>,
        closed: bool,
    ) -> Self {
        let mut lengths = Vec::with_capacity(points.len());
        if !points.is_empty() {
            lengths.push(0.0);
        }
        for (a, b) in points.iter().tuple_windows() {
            let planar = (b.x - a.x).hypot(b.y - a.y);
            lengths.push(lengths[lengths.len() - 1] + planar);
        }

        let curvature = d_points
            .iter()
            .zip(&dd_points)
            .map(|(d, dd)| curvature(*d, *dd))
            .collect();

        Self {
            waypoints,
            points,
            d_points,
            dd_points,
            lengths,
            curvature,
            closed,
        }
    }

    /// The waypoints the path was built from.
    pub fn waypoints(&self) -> &[Point3d] {
        &self.waypoints
    }

    /// The sampled points.
    pub fn points(&self) -> &[Point3d] {
        &self.points
    }

    /// The first derivative at each sample.
    pub fn d_points(&self) -> &[Vector3d] {
        &self.d_points
    }

    /// The second derivative at each sample.
    pub fn dd_points(&self) -> &[Vector3d] {
        &self.dd_points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// The signed curvature at each sample, positive when turning left.
    pub fn curvature(&self) -> &[f64] {
        &self.curvature
    }

    /// The planar arc length from the start to each sample.
    pub fn length_cumulative(&self) -> &[f64] {
        &self.lengths
    }

    /// The total planar length of the path.
    pub fn length(&self) -> f64 {
        self.lengths.last().copied().unwrap_or(0.0)
    }

    /// Finds the sample nearest to `query`. Ties go to the lowest index.
    pub fn calc_closest_point(&self, query: Point3d) -> Result<ClosestPoint> {
        self.closest_in(query, 0..self.points.len())
    }

    /// Finds the sample nearest to `query` within `window` samples either side
    /// of `hint`, wrapping around closed paths.
    ///
    /// This is cheaper than [Path::calc_closest_point] when tracking a point that
    /// moves a little between queries.
    pub fn calc_closest_point_near(
        &self,
        query: Point3d,
        hint: usize,
        window: usize,
    ) -> Result<ClosestPoint> {
        let n = self.points.len();
        if n == 0 {
            return Err(Error::EmptyPath);
        }
        if 2 * window + 1 >= n {
            return self.calc_closest_point(query);
        }
        let hint = usize::min(hint, n - 1);
        if self.closed {
            let m = n - 1;
            let start = (hint + m - window % m) % m;
            let indices = (0..=2 * window).map(|k| (start + k) % m);
            self.closest_in(query, indices)
        } else {
            let start = hint.saturating_sub(window);
            let end = usize::min(hint + window + 1, n);
            self.closest_in(query, start..end)
        }
    }

    fn closest_in(
        &self,
        query: Point3d,
        indices: impl Iterator<Item = usize>,
    ) -> Result<ClosestPoint> {
        let mut best: Option<ClosestPoint> = None;
        for index in indices {
            let point = self.points[index];
            let distance = point.distance(query);
            if best.map_or(true, |b| distance < b.distance) {
                best = Some(ClosestPoint {
                    point,
                    index,
                    distance,
                });
            }
        }
        best.ok_or(Error::EmptyPath)
    }

    /// Gets the point at arc length `s` from the start, interpolating between
    /// samples. Closed paths wrap; open paths saturate at their ends.
    pub fn point_at_distance(&self, s: f64) -> Result<Point3d> {
        let total = self.length();
        match self.points.len() {
            0 => return Err(Error::EmptyPath),
            1 => return Ok(self.points[0]),
            _ => {}
        }
        let s = if self.closed && total > 0.0 {
            s.rem_euclid(total)
        } else {
            Interval::new(0.0, total).clamp(s)
        };
        let i = self
            .lengths
            .partition_point(|l| *l <= s)
            .clamp(1, self.points.len() - 1);
        let span = Interval::new(self.lengths[i - 1], self.lengths[i]);
        let t = if span.length() > 0.0 {
            span.inv_lerp(s)
        } else {
            0.0
        };
        Ok(self.points[i - 1] + (self.points[i] - self.points[i - 1]) * t)
    }

    /// The index-parameter sample neighbours and blend factor for `t`.
    fn locate(&self, t: f64) -> (usize, usize, f64) {
        let last = self.points.len().saturating_sub(1);
        let t = t.clamp(0.0, last as f64);
        let i = usize::min(t.floor() as usize, last.saturating_sub(1));
        let j = usize::min(i + 1, last);
        (i, j, t - i as f64)
    }
}

/// Signed curvature from first and second derivatives in the xy-plane.
fn curvature(d: Vector3d, dd: Vector3d) -> f64 {
    let denom = (d.x * d.x + d.y * d.y).powf(1.5);
    if denom <= f64::EPSILON {
        return CURVATURE_SENTINEL;
    }
    let k = (d.x * dd.y - d.y * dd.x) / denom;
    k.clamp(-CURVATURE_SENTINEL, CURVATURE_SENTINEL)
}

impl ParametricCurve for Path {
    fn sample(&self, t: f64) -> Point3d {
        if self.points.is_empty() {
            return Point3d::origin();
        }
        let (i, j, f) = self.locate(t);
        self.points[i] + (self.points[j] - self.points[i]) * f
    }

    fn bounds(&self) -> Interval<f64> {
        Interval::new(0.0, self.points.len().saturating_sub(1) as f64)
    }

    fn sample_dt(&self, t: f64) -> Vector3d {
        if self.points.is_empty() {
            return Vector3d::zero();
        }
        let (i, j, f) = self.locate(t);
        self.d_points[i] + (self.d_points[j] - self.d_points[i]) * f
    }

    fn sample_dt2(&self, t: f64) -> Vector3d {
        if self.points.is_empty() {
            return Vector3d::zero();
        }
        let (i, j, f) = self.locate(t);
        self.dd_points[i] + (self.dd_points[j] - self.dd_points[i]) * f
    }
}

/// Loads waypoints from a CSV file of `x,y,z` or `x,y` rows.
///
/// A non-numeric first row is treated as a header and skipped.
pub fn load_waypoints_from_csv(
    data: &DataDirectory,
    name: impl AsRef<FilePath>,
) -> Result<Vec<Point3d>> {
    let (path, mut reader) = data.csv_reader(name, false)?;
    let location = path.display().to_string();
    let mut waypoints = vec![];
    for (line, record) in reader.records().enumerate() {
        let record = record.map_err(|source| Error::Csv {
            path: path.clone(),
            source,
        })?;
        if record.iter().all(|field| field.is_empty()) {
            continue;
        }
        let values: std::result::Result<Vec<f64>, _> =
            record.iter().map(str::parse::<f64>).collect();
        let values = match values {
            Ok(values) => values,
            Err(_) if line == 0 => continue,
            Err(_) => {
                return Err(Error::data(
                    format!("{}:{}", location, line + 1),
                    "expected numeric coordinates",
                ))
            }
        };
        if values.iter().any(|v| !v.is_finite()) {
            return Err(Error::data(
                format!("{}:{}", location, line + 1),
                "coordinates must be finite numbers",
            ));
        }
        let point = match values[..] {
            [x, y] => Point3d::new(x, y, 0.0),
            [x, y, z] => Point3d::new(x, y, z),
            _ => {
                return Err(Error::data(
                    format!("{}:{}", location, line + 1),
                    format!("expected 2 or 3 columns, found {}", values.len()),
                ))
            }
        };
        waypoints.push(point);
    }
    log::info!("Loaded {} waypoints from {}", waypoints.len(), location);
    Ok(waypoints)
}

/// A path file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PathSpec {
    #[serde(rename = "Type")]
    pub kind: String,
    #[serde(rename = "Template")]
    pub template: String,
    #[serde(rename = "Waypoints Input File")]
    pub waypoints_file: String,
    #[serde(default = "default_num_points")]
    pub num_points: usize,
    #[serde(default)]
    pub is_closed: bool,
    /// Spline smoothing factor. Only exact interpolation (zero) is supported.
    #[serde(default)]
    pub smoothness: f64,
}

fn default_num_points() -> usize {
    DEFAULT_NUM_POINTS
}

impl PathSpec {
    pub fn validate(&self) -> Result<()> {
        if self.kind != "Path" {
            return Err(Error::config(
                "path",
                format!("type \"{}\", expected \"Path\"", self.kind),
            ));
        }
        if self.template != "WASplinePath" {
            return Err(Error::config(
                "path",
                format!("unknown template \"{}\"", self.template),
            ));
        }
        Ok(())
    }

    pub fn options(&self) -> PathOptions {
        PathOptions {
            num_points: self.num_points,
            is_closed: self.is_closed,
        }
    }
}

/// Loads a path file and the waypoints it references.
pub fn create_path_from_json(data: &DataDirectory, name: impl AsRef<FilePath>) -> Result<Path> {
    let spec: PathSpec = data.read_json(name)?;
    spec.validate()?;
    if spec.smoothness != 0.0 {
        log::warn!(
            "Ignoring path smoothness {}; paths interpolate their waypoints exactly",
            spec.smoothness
        );
    }
    let waypoints = load_waypoints_from_csv(data, &spec.waypoints_file)?;
    Path::new(&waypoints, spec.options())
}
