use super::ParametricCurve;
use crate::math::{planar_vec, rot90, Point3d, Vector3d};
use crate::util::Interval;
use cgmath::InnerSpace;

/// A curve displaced a fixed distance sideways from another, in the xy-plane.
///
/// Positive distances lie to the left of the direction of travel. Height is
/// carried over from the base curve unchanged.
#[derive(Clone, Debug)]
pub struct OffsetCurve<C> {
    base: C,
    distance: f64,
}

impl<C: ParametricCurve> OffsetCurve<C> {
    pub fn new(base: C, distance: f64) -> Self {
        Self { base, distance }
    }

    /// The unit normal to the left of the base curve at `t`, if the curve is
    /// not stationary there.
    fn left_normal(&self, t: f64) -> Option<Vector3d> {
        let tangent = planar_vec(self.base.sample_dt(t));
        if tangent.magnitude2() == 0.0 {
            return None;
        }
        let n = rot90(tangent.normalize());
        Some(Vector3d::new(n.x, n.y, 0.0))
    }
}

impl<C: ParametricCurve> ParametricCurve for OffsetCurve<C> {
    fn sample(&self, t: f64) -> Point3d {
        let base = self.base.sample(t);
        match self.left_normal(t) {
            Some(normal) => base + normal * self.distance,
            None => base,
        }
    }

    fn bounds(&self) -> Interval<f64> {
        self.base.bounds()
    }
}
