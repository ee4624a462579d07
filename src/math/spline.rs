//! Interpolating splines through waypoints.

use super::{CubicSegment, ParametricCurve, Point3d, Vector3d};
use crate::util::Interval;
use cgmath::prelude::*;
use itertools::Itertools;

/// A cubic Hermite spline through a sequence of points, with Catmull-Rom
/// tangents and chord-length parameterisation.
///
/// The parameter is approximately the arc length along the curve, which keeps
/// the first derivative close to unit length.
#[derive(Clone, Debug)]
pub struct HermiteSpline {
    /// The parameter value at each knot.
    knots: Vec<f64>,
    /// One cubic for every span between two knots.
    segments: Vec<CubicSegment>,
}

impl HermiteSpline {
    /// Fits a spline through `points`.
    ///
    /// Consecutive duplicate points are skipped. When `closed` is set the curve
    /// wraps back to the first point with a continuous tangent; the first point
    /// should not be repeated at the end. Returns `None` when fewer than two
    /// distinct points remain (three for a closed curve).
    pub fn new(points: &[Point3d], closed: bool) -> Option<Self> {
        let mut pts: Vec<Point3d> = points
            .iter()
            .copied()
            .dedup_by(|a, b| a.distance2(*b) == 0.0)
            .collect();
        if closed {
            while pts.len() > 1 && pts[0].distance2(pts[pts.len() - 1]) == 0.0 {
                pts.pop();
            }
            if pts.len() < 3 {
                return None;
            }
            pts.push(pts[0]);
        } else if pts.len() < 2 {
            return None;
        }

        let mut knots = Vec::with_capacity(pts.len());
        knots.push(0.0);
        for (a, b) in pts.iter().tuple_windows() {
            let last = knots[knots.len() - 1];
            knots.push(last + a.distance(*b));
        }

        let tangents = Self::tangents(&pts, &knots, closed);

        let segments = (0..pts.len() - 1)
            .map(|i| {
                CubicSegment::fit(
                    knots[i],
                    pts[i],
                    tangents[i],
                    knots[i + 1],
                    pts[i + 1],
                    tangents[i + 1],
                )
            })
            .collect();

        Some(Self { knots, segments })
    }

    /// The total parameter length, which approximates the curve length.
    pub fn length(&self) -> f64 {
        self.knots[self.knots.len() - 1]
    }

    /// Catmull-Rom tangents at every knot.
    fn tangents(pts: &[Point3d], knots: &[f64], closed: bool) -> Vec<Vector3d> {
        let n = pts.len();
        let mut tangents = Vec::with_capacity(n);
        for i in 0..n {
            let tangent = if closed && (i == 0 || i == n - 1) {
                // The wrap point: neighbours are the second and second-to-last points
                let before = knots[n - 1] - knots[n - 2];
                let after = knots[1] - knots[0];
                (pts[1] - pts[n - 2]) / (before + after)
            } else if i == 0 {
                (pts[1] - pts[0]) / (knots[1] - knots[0])
            } else if i == n - 1 {
                (pts[n - 1] - pts[n - 2]) / (knots[n - 1] - knots[n - 2])
            } else {
                (pts[i + 1] - pts[i - 1]) / (knots[i + 1] - knots[i - 1])
            };
            tangents.push(tangent);
        }
        tangents
    }

    /// Finds the segment containing the parameter `u`.
    fn segment(&self, u: f64) -> &CubicSegment {
        let idx = self.knots.partition_point(|k| *k <= u).saturating_sub(1);
        &self.segments[usize::min(idx, self.segments.len() - 1)]
    }

    fn clamp(&self, u: f64) -> f64 {
        self.bounds().clamp(u)
    }
}

impl ParametricCurve for HermiteSpline {
    fn sample(&self, t: f64) -> Point3d {
        let t = self.clamp(t);
        self.segment(t).point(t)
    }

    fn bounds(&self) -> Interval<f64> {
        Interval::new(0.0, self.length())
    }

    fn sample_dt(&self, t: f64) -> Vector3d {
        let t = self.clamp(t);
        self.segment(t).velocity(t)
    }

    fn sample_dt2(&self, t: f64) -> Vector3d {
        let t = self.clamp(t);
        self.segment(t).acceleration(t)
    }
}
