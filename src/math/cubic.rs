//! Cubic Hermite segments.

use super::{Point3d, Vector3d};
use cgmath::prelude::*;

/// One span of a cubic Hermite curve between two knots.
///
/// The span is stored in power form over the local parameter
/// `s = (u - start) / width`, which runs from 0 to 1 across the span.
#[derive(Clone, Copy, Debug)]
pub struct CubicSegment {
    start: f64,
    width: f64,
    /// Coefficients of `s^3`, `s^2`, `s` and the constant term.
    coeffs: [Vector3d; 4],
}

impl CubicSegment {
    /// Fits the segment that leaves `p0` with velocity `m0` at `u0` and
    /// arrives at `p1` with velocity `m1` at `u1`.
    ///
    /// The velocities are derivatives with respect to `u`.
    pub fn fit(u0: f64, p0: Point3d, m0: Vector3d, u1: f64, p1: Point3d, m1: Vector3d) -> Self {
        let width = u1 - u0;
        let (p0, p1) = (p0.to_vec(), p1.to_vec());
        let (m0, m1) = (m0 * width, m1 * width);
        Self {
            start: u0,
            width,
            coeffs: [
                p0 * 2.0 - p1 * 2.0 + m0 + m1,
                p1 * 3.0 - p0 * 3.0 - m0 * 2.0 - m1,
                m0,
                p0,
            ],
        }
    }

    fn local(&self, u: f64) -> f64 {
        (u - self.start) / self.width
    }

    /// The point at `u`.
    pub fn point(&self, u: f64) -> Point3d {
        let s = self.local(u);
        let [a, b, c, d] = self.coeffs;
        Point3d::from_vec(((a * s + b) * s + c) * s + d)
    }

    /// The first derivative with respect to `u`.
    pub fn velocity(&self, u: f64) -> Vector3d {
        let s = self.local(u);
        let [a, b, c, _] = self.coeffs;
        ((a * (3.0 * s) + b * 2.0) * s + c) / self.width
    }

    /// The second derivative with respect to `u`.
    pub fn acceleration(&self, u: f64) -> Vector3d {
        let s = self.local(u);
        let [a, b, _, _] = self.coeffs;
        (a * (6.0 * s) + b * 2.0) / (self.width * self.width)
    }
}
