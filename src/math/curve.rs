use super::{Point3d, Vector3d};
use crate::util::Interval;
use cgmath::prelude::*;
pub use offset::OffsetCurve;

mod offset;

/// A curve through 3D space over a closed parameter interval.
pub trait ParametricCurve {
    /// The point at parameter `t`.
    fn sample(&self, t: f64) -> Point3d;

    /// The parameter interval the curve is defined on.
    fn bounds(&self) -> Interval<f64>;

    /// The first derivative at `t`.
    ///
    /// Defaults to a central difference, one-sided at the ends of the curve.
    fn sample_dt(&self, t: f64) -> Vector3d {
        difference(self.bounds(), t, |t| self.sample(t).to_vec())
    }

    /// The second derivative at `t`.
    ///
    /// Defaults to a central difference of [`ParametricCurve::sample_dt`].
    fn sample_dt2(&self, t: f64) -> Vector3d {
        difference(self.bounds(), t, |t| self.sample_dt(t))
    }
}

/// Parameter step for numerical derivatives, relative to the curve's extent.
const DIFFERENCE_STEP: f64 = 1e-5;

fn difference(bounds: Interval<f64>, t: f64, f: impl Fn(f64) -> Vector3d) -> Vector3d {
    let h = DIFFERENCE_STEP * bounds.length().max(1.0);
    let lo = bounds.clamp(t - h);
    let hi = bounds.clamp(t + h);
    if hi <= lo {
        return Vector3d::zero();
    }
    (f(hi) - f(lo)) / (hi - lo)
}

impl<T: ParametricCurve + ?Sized> ParametricCurve for &T {
    fn sample(&self, t: f64) -> Point3d {
        (**self).sample(t)
    }

    fn bounds(&self) -> Interval<f64> {
        (**self).bounds()
    }

    fn sample_dt(&self, t: f64) -> Vector3d {
        (**self).sample_dt(t)
    }

    fn sample_dt2(&self, t: f64) -> Vector3d {
        (**self).sample_dt2(t)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    /// The parabola `y = x^2` over `x` in [-2, 2].
    struct Parabola;

    impl ParametricCurve for Parabola {
        fn sample(&self, t: f64) -> Point3d {
            Point3d::new(t, t * t, 0.0)
        }

        fn bounds(&self) -> Interval<f64> {
            Interval::new(-2.0, 2.0)
        }
    }

    #[test]
    fn numerical_derivatives() {
        for t in [-1.5, -0.2, 0.0, 0.7, 1.9] {
            let d = Parabola.sample_dt(t);
            assert_approx_eq!(d.x, 1.0, 1e-6);
            assert_approx_eq!(d.y, 2.0 * t, 1e-6);
            let dd = Parabola.sample_dt2(t);
            assert_approx_eq!(dd.x, 0.0, 1e-3);
            assert_approx_eq!(dd.y, 2.0, 1e-3);
        }
    }

    #[test]
    fn derivatives_stay_inside_bounds() {
        let d = (&Parabola).sample_dt(2.0);
        assert_approx_eq!(d.y, 4.0, 1e-3);
        let d = Parabola.sample_dt(-2.0);
        assert_approx_eq!(d.y, -4.0, 1e-3);
    }
}
