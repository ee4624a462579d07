//! Mathematical structs and functions.

use cgmath::{Point2, Point3, Vector2, Vector3};
pub use cubic::CubicSegment;
pub use curve::{OffsetCurve, ParametricCurve};
pub use spline::HermiteSpline;
pub use util::*;

mod cubic;
mod curve;
mod spline;
mod util;

/// A 2D point
pub type Point2d = Point2<f64>;

/// A 2D vector
pub type Vector2d = Vector2<f64>;

/// A 3D point
pub type Point3d = Point3<f64>;

/// A 3D vector
pub type Vector3d = Vector3<f64>;

/// Gravitational acceleration in m/s^2.
pub const GRAVITY: f64 = 9.81;
